//! Run orchestration: fetch, probe, rank, persist

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use sounder_core::config::SounderConfig;
use sounder_core::tracker::{ProbeDispatcher, aggregate, run_all};
use tokio::sync::mpsc;

use crate::Cli;
use crate::report;
use crate::source;

/// Runs one full validation pass over the configured tracker list.
///
/// # Errors
/// Returns an error when the tracker list cannot be fetched, contains no
/// candidates, or the output file cannot be written. Individual probe
/// failures never abort the run.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli);

    let candidates = source::fetch_candidates(&cli.list_url)
        .await
        .with_context(|| format!("failed to fetch tracker list from {}", cli.list_url))?;
    if candidates.is_empty() {
        bail!("tracker list at {} contained no candidates", cli.list_url);
    }
    tracing::info!("fetched {} candidate trackers", candidates.len());

    let dispatcher = Arc::new(ProbeDispatcher::new(&config));
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(report::print_progress(progress_rx));

    let batch = run_all(
        dispatcher,
        candidates,
        config.run.max_workers,
        Some(progress_tx),
    )
    .await;
    let _ = printer.await;

    let result = aggregate(&batch, config.run.max_response_time);
    report::print_summary(&batch, &result);

    if result.trackers.is_empty() {
        println!("COMPLETED. No valid trackers were found.");
        return Ok(());
    }

    report::write_tracker_list(&cli.output, &result.trackers)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    println!(
        "COMPLETED. {} trackers saved to {}.",
        result.trackers.len(),
        cli.output.display()
    );

    Ok(())
}

/// Environment defaults overridden by whatever flags were given.
fn build_config(cli: &Cli) -> SounderConfig {
    let mut config = SounderConfig::from_env();

    if let Some(workers) = cli.max_workers {
        config.run.max_workers = workers;
    }
    if let Some(millis) = cli.max_response_time_ms {
        config.run.max_response_time = Some(Duration::from_millis(millis));
    }
    if let Some(seconds) = cli.http_timeout_secs {
        config.probe.http_timeout = Duration::from_secs(seconds);
    }
    if let Some(seconds) = cli.udp_timeout_secs {
        config.probe.udp_timeout = Duration::from_secs(seconds);
    }
    config.run.denylist.extend(cli.skip.iter().cloned());

    config
}

#[cfg(test)]
mod commands_tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "sounder",
            "--max-workers",
            "10",
            "--max-response-time-ms",
            "750",
            "--udp-timeout-secs",
            "3",
            "--skip",
            "udp://bad.example:6969/announce",
        ]);

        let config = build_config(&cli);

        assert_eq!(config.run.max_workers, 10);
        assert_eq!(
            config.run.max_response_time,
            Some(Duration::from_millis(750))
        );
        assert_eq!(config.probe.udp_timeout, Duration::from_secs(3));
        assert!(
            config
                .run
                .denylist
                .contains(&"udp://bad.example:6969/announce".to_string())
        );
        // The built-in denylist survives alongside --skip additions.
        assert!(
            config
                .run
                .denylist
                .contains(&"udp://tracker.theoks.net:6969/announce".to_string())
        );
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["sounder"]);

        assert_eq!(cli.list_url, source::DEFAULT_TRACKER_LIST_URL);
        assert_eq!(cli.output.to_str(), Some("valid_trackers.txt"));
        assert!(cli.max_workers.is_none());
    }
}
