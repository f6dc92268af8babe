//! Sounder CLI - Command-line interface
//!
//! Fetches a tracker list, probes every endpoint, and saves the ones that
//! answer their protocol correctly, fastest first.

mod commands;
mod report;
mod source;

use std::path::PathBuf;

use clap::Parser;
use sounder_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "sounder")]
#[command(about = "Probes BitTorrent trackers and keeps the ones that answer")]
pub(crate) struct Cli {
    /// URL of the raw tracker list to fetch
    #[arg(long, default_value = source::DEFAULT_TRACKER_LIST_URL)]
    pub list_url: String,

    /// Output file for the surviving trackers (overwritten)
    #[arg(short, long, default_value = "valid_trackers.txt")]
    pub output: PathBuf,

    /// Maximum simultaneous probes
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Drop valid trackers slower than this many milliseconds
    #[arg(long)]
    pub max_response_time_ms: Option<u64>,

    /// HTTP announce timeout in seconds
    #[arg(long)]
    pub http_timeout_secs: Option<u64>,

    /// UDP handshake timeout in seconds
    #[arg(long)]
    pub udp_timeout_secs: Option<u64>,

    /// Additional tracker URIs to skip (repeatable)
    #[arg(long = "skip")]
    pub skip: Vec<String>,

    /// Console log level
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn)]
    pub log_level: CliLogLevel,

    /// Directory for the full debug log (defaults to ./logs)
    #[arg(long)]
    pub logs_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())
        .map_err(|error| anyhow::anyhow!("tracing setup failed: {error}"))?;

    commands::run(cli).await
}
