use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "pnlview")]
#[command(version, about = "Brokerage profit/loss viewer")]
#[command(
    long_about = "Fetches the account/position snapshot from a remote gateway and renders per-account profit/loss views: current P/L per account (net liquidation minus last recorded exit) and daily/cumulative P/L series."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Gateway base URL (overrides PNLVIEW_BACKEND_URL and the config file)
    #[arg(long = "url", global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Current per-account P/L with open positions
    Current,

    /// Daily and cumulative P/L series per account
    Total {
        /// Restrict output to a single account
        #[arg(short, long)]
        account: Option<String>,

        /// Accumulate exact daily deltas and round only at output
        /// (default rounds each daily P/L before accumulating)
        #[arg(long = "exact-sum")]
        exact_sum: bool,
    },

    /// Fetch the snapshot and print a shape summary
    Fetch,
}
