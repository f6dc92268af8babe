//! Console reporting and result persistence

use std::io::Write as _;
use std::path::Path;

use sounder_core::tracker::{
    BUCKET_BOUNDS_MS, Distribution, ProbeBatch, ProgressEvent, RankedResult, RankedTracker,
};
use tokio::sync::mpsc::UnboundedReceiver;

/// Renders the advisory progress stream as a single updating console line.
///
/// Ends when the coordinator drops its sender.
pub async fn print_progress(mut events: UnboundedReceiver<ProgressEvent>) {
    let mut saw_any = false;
    while let Some(event) = events.recv().await {
        saw_any = true;
        print!(
            "\rprobed {}/{} trackers, {} valid",
            event.completed, event.total, event.valid
        );
        let _ = std::io::stdout().flush();
    }
    if saw_any {
        println!();
    }
}

/// Prints the end-of-run summary with the latency distribution.
pub fn print_summary(batch: &ProbeBatch, result: &RankedResult) {
    println!(
        "Probed {} trackers: {} answered validly.",
        batch.len(),
        batch.valid_count()
    );

    if let Some(distribution) = &result.distribution {
        println!(
            "Response times (ms): min {:.1}, median {:.1}, mean {:.1}, max {:.1}",
            distribution.min_ms, distribution.median_ms, distribution.mean_ms, distribution.max_ms
        );
        for (label, count) in bucket_rows(distribution) {
            println!("  {label:>12}  {count}");
        }
    }
}

/// Writes surviving trackers in tracker-list format: URIs separated by
/// blank lines, fastest first.
pub fn write_tracker_list(path: &Path, trackers: &[RankedTracker]) -> std::io::Result<()> {
    let uris: Vec<&str> = trackers.iter().map(|tracker| tracker.uri.as_str()).collect();
    std::fs::write(path, uris.join("\n\n"))
}

fn bucket_rows(distribution: &Distribution) -> Vec<(String, usize)> {
    (0..distribution.buckets.len())
        .map(|index| (bucket_label(index), distribution.buckets[index]))
        .collect()
}

fn bucket_label(index: usize) -> String {
    let lower = if index == 0 {
        0u64
    } else {
        BUCKET_BOUNDS_MS[index - 1] as u64
    };
    match BUCKET_BOUNDS_MS.get(index) {
        Some(&upper) => format!("{lower}-{} ms", upper as u64 - 1),
        None => format!("{lower}+ ms"),
    }
}
