mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use tracing::info;

use pnlview::config::Config;
use pnlview::series::Accumulation;
use pnlview::{fetch, reconcile, series};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.url.as_deref())?;
    let client = fetch::build_client()?;
    let snapshot = fetch::fetch_snapshot(&config, &client)
        .await
        .context("Failed to fetch snapshot from gateway")?;

    match cli.command {
        Commands::Current => {
            let accounts = reconcile::reconcile_accounts(
                &snapshot.positions,
                &snapshot.account_summary,
                &snapshot.history,
            );
            info!("Reconciled {} accounts", accounts.len());

            if cli.json {
                println!("{}", cli::formatters::format_accounts_json(&accounts));
            } else {
                println!("{}", cli::formatters::format_accounts_table(&accounts));
            }
        }

        Commands::Total { account, exact_sum } => {
            let accumulation = if exact_sum {
                Accumulation::SumThenRound
            } else {
                Accumulation::RoundBeforeSum
            };
            let mut daily = series::build_daily_series_with(&snapshot.history_all, accumulation);
            if let Some(ref account_id) = account {
                daily.retain(|id, _| id == account_id);
            }
            info!("Built daily series for {} accounts", daily.len());

            if cli.json {
                println!("{}", cli::formatters::format_series_json(&daily));
            } else {
                println!("{}", cli::formatters::format_series_tables(&daily));
            }
        }

        Commands::Fetch => {
            print!("{}", cli::formatters::format_snapshot_summary(&snapshot));
        }
    }

    Ok(())
}
