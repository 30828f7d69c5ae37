//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use std::collections::BTreeMap;

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use pnlview::reconcile::DetailedAccount;
use pnlview::series::DailySeriesPoint;
use pnlview::snapshot::Snapshot;
use pnlview::utils::{format_amount, format_money, format_signed};

fn colorize_pl(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format_signed(value).green().to_string()
    } else {
        format_signed(value).red().to_string()
    }
}

/// Format the "current" view: one block per account with its positions
pub fn format_accounts_table(accounts: &[DetailedAccount]) -> String {
    if accounts.is_empty() {
        return format!("{} No accounts found\n", "ℹ".blue().bold());
    }

    let mut output = String::new();
    output.push_str(&format!(
        "\n{} Current Profit/Loss by Account\n",
        "📊".cyan().bold()
    ));

    #[derive(Tabled)]
    struct PositionRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Type")]
        sec_type: String,
        #[tabled(rename = "Size")]
        size: String,
        #[tabled(rename = "Market Value")]
        market_value: String,
    }

    for account in accounts {
        output.push_str(&format!("\n{}\n", account.account.red().bold()));
        output.push_str(&format!(
            "  Net Liquidation: {}  Total Cash Value: {}  Profit/Loss: {}\n",
            format_money(&account.net_liquidation),
            format_money(&account.total_cash_value),
            colorize_pl(account.difference),
        ));
        output.push_str(&format!("  Positions: ({})\n", account.position_count));

        if account.positions.is_empty() {
            output.push_str(&format!("  {}\n", "No open positions".bright_black()));
            continue;
        }

        let rows: Vec<PositionRow> = account
            .positions
            .iter()
            .map(|p| PositionRow {
                symbol: p.symbol.clone(),
                sec_type: p.sec_type.clone().unwrap_or_else(|| "N/A".to_string()),
                size: p.position.to_string(),
                market_value: p
                    .market_value
                    .map(|v| format!("{} {}", p.currency, format_amount(v)))
                    .unwrap_or_else(|| "N/A".to_string()),
            })
            .collect();

        let mut table = Table::new(&rows);
        table.with(Style::modern());
        // Right-align all columns except Symbol (0) and Type (1)
        table.modify(Columns::new(2..), Alignment::right());
        output.push_str(&table.to_string());
        output.push('\n');
    }

    output
}

/// Format the "current" view as JSON for the presentation layer
pub fn format_accounts_json(accounts: &[DetailedAccount]) -> String {
    serde_json::to_string_pretty(accounts)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format the "total" view: one daily-series table per account
pub fn format_series_tables(series: &BTreeMap<String, Vec<DailySeriesPoint>>) -> String {
    if series.is_empty() {
        return format!("{} No historical data available\n", "ℹ".blue().bold());
    }

    #[derive(Tabled)]
    struct SeriesRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Daily P/L")]
        pl: String,
        #[tabled(rename = "Cumulative P/L")]
        cumulative_pl: String,
    }

    let mut output = String::new();
    for (account, points) in series {
        if points.is_empty() {
            continue;
        }

        let total_pl = points
            .last()
            .map(|p| p.cumulative_pl)
            .unwrap_or(Decimal::ZERO);
        output.push_str(&format!("\n{}\n", account.red().bold()));
        output.push_str(&format!("  Total P/L: {}\n", colorize_pl(total_pl)));

        let rows: Vec<SeriesRow> = points
            .iter()
            .map(|p| SeriesRow {
                date: p.date.format("%Y-%m-%d").to_string(),
                pl: colorize_pl(p.pl),
                cumulative_pl: colorize_pl(p.cumulative_pl),
            })
            .collect();

        let mut table = Table::new(&rows);
        table.with(Style::modern());
        table.modify(Columns::new(1..), Alignment::right());
        output.push_str(&table.to_string());
        output.push('\n');
    }

    output
}

/// Format the "total" view as JSON for the presentation layer
pub fn format_series_json(series: &BTreeMap<String, Vec<DailySeriesPoint>>) -> String {
    serde_json::to_string_pretty(series)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// One-line shape summary of a fetched snapshot
pub fn format_snapshot_summary(snapshot: &Snapshot) -> String {
    format!(
        "{} Snapshot: {} accounts, {} positions, {} exit records, {} history rows\n",
        "✓".green().bold(),
        snapshot.account_summary.len(),
        snapshot.positions.len(),
        snapshot.history.len(),
        snapshot.history_all.len(),
    )
}
