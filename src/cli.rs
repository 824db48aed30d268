use std::path::PathBuf;

use clap::{Parser, Subcommand};

use market_snapshot::config::CONFIG_ENV_VAR;

#[derive(Parser)]
#[command(name = "market-snapshot")]
#[command(about = "Fetch and cache live index snapshots from the NSE market site")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON config file; the builtin NSE profile is used when omitted
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch once and print the `{"data": [...]}` payload
    Fetch {
        #[arg(short, long)]
        pretty: bool,
    },

    /// Keep the cache warm by refreshing on a fixed interval
    Watch {
        #[arg(short, long, default_value_t = 60)]
        interval_secs: u64,

        /// Stop after this many rounds instead of running until Ctrl+C
        #[arg(short, long)]
        rounds: Option<u64>,
    },

    /// Print the effective configuration as JSON
    Config,
}
