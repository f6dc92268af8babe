//! Reduction of a probe batch into the final ranked tracker list

use std::collections::HashSet;
use std::time::Duration;

use super::types::ProbeBatch;

/// One surviving tracker in the ranked output.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTracker {
    pub uri: String,
    pub response_time_ms: f64,
}

/// Final output of a probing run.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    /// Valid trackers within the threshold, fastest first.
    pub trackers: Vec<RankedTracker>,
    /// Latency distribution over every valid outcome, computed before
    /// threshold filtering. `None` when nothing answered validly.
    pub distribution: Option<Distribution>,
}

/// Upper bounds (exclusive, milliseconds) of the finite histogram buckets;
/// the last bucket is open-ended.
pub const BUCKET_BOUNDS_MS: [f64; 5] = [100.0, 250.0, 500.0, 1000.0, 2000.0];

/// Response-time distribution summary in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub min_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub mean_ms: f64,
    /// Counts per bucket: [0,100), [100,250), [250,500), [500,1000),
    /// [1000,2000), [2000,inf)
    pub buckets: [usize; 6],
}

impl Distribution {
    fn from_times(times: &[f64]) -> Option<Self> {
        if times.is_empty() {
            return None;
        }

        let mut sorted = times.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let min_ms = sorted[0];
        let max_ms = sorted[count - 1];
        let mean_ms = sorted.iter().sum::<f64>() / count as f64;
        let median_ms = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };

        let mut buckets = [0usize; 6];
        for &time in &sorted {
            let index = BUCKET_BOUNDS_MS
                .iter()
                .position(|&bound| time < bound)
                .unwrap_or(BUCKET_BOUNDS_MS.len());
            buckets[index] += 1;
        }

        Some(Self {
            min_ms,
            max_ms,
            median_ms,
            mean_ms,
            buckets,
        })
    }
}

/// Reduces a finished batch into the ranked tracker list.
///
/// Valid outcomes slower than `max_response_time` are dropped (equal is
/// kept). The distribution is computed before that filter. Output order is
/// ascending response time, ties broken by URI so equal inputs always rank
/// identically; URIs are unique in the output even if the batch invariant
/// were ever violated.
pub fn aggregate(batch: &ProbeBatch, max_response_time: Option<Duration>) -> RankedResult {
    let mut trackers: Vec<RankedTracker> = batch
        .outcomes()
        .filter_map(|outcome| {
            outcome.response_time_ms().map(|response_time_ms| RankedTracker {
                uri: outcome.uri().to_string(),
                response_time_ms,
            })
        })
        .collect();

    let times: Vec<f64> = trackers
        .iter()
        .map(|tracker| tracker.response_time_ms)
        .collect();
    let distribution = Distribution::from_times(&times);

    if let Some(threshold) = max_response_time {
        let threshold_ms = threshold.as_secs_f64() * 1000.0;
        trackers.retain(|tracker| tracker.response_time_ms <= threshold_ms);
    }

    trackers.sort_by(|a, b| {
        a.response_time_ms
            .total_cmp(&b.response_time_ms)
            .then_with(|| a.uri.cmp(&b.uri))
    });

    let mut seen = HashSet::new();
    trackers.retain(|tracker| seen.insert(tracker.uri.clone()));

    RankedResult {
        trackers,
        distribution,
    }
}

#[cfg(test)]
mod aggregate_tests {
    use proptest::prelude::*;

    use super::*;
    use crate::tracker::types::{ProbeError, ProbeOutcome};

    fn batch_of(times_ms: &[(&str, u64)]) -> ProbeBatch {
        let mut batch = ProbeBatch::new();
        for (uri, ms) in times_ms {
            batch.insert(ProbeOutcome::valid(*uri, Duration::from_millis(*ms)));
        }
        batch
    }

    #[test]
    fn test_threshold_drops_strictly_slower_only() {
        let batch = batch_of(&[
            ("udp://fast.example:6969/announce", 500),
            ("udp://edge.example:6969/announce", 750),
            ("udp://slow.example:6969/announce", 751),
        ]);

        let result = aggregate(&batch, Some(Duration::from_millis(750)));

        let uris: Vec<&str> = result.trackers.iter().map(|t| t.uri.as_str()).collect();
        assert_eq!(
            uris,
            vec![
                "udp://fast.example:6969/announce",
                "udp://edge.example:6969/announce"
            ]
        );
    }

    #[test]
    fn test_invalid_outcomes_are_excluded() {
        let mut batch = batch_of(&[("udp://ok.example:6969/announce", 40)]);
        batch.insert(ProbeOutcome::failed(
            "udp://dead.example:6969/announce",
            ProbeError::Timeout { timeout_ms: 10_000 },
        ));

        let result = aggregate(&batch, None);

        assert_eq!(result.trackers.len(), 1);
        assert_eq!(result.trackers[0].uri, "udp://ok.example:6969/announce");
    }

    #[test]
    fn test_ties_break_by_uri() {
        let batch = batch_of(&[
            ("udp://b.example:6969/announce", 100),
            ("udp://a.example:6969/announce", 100),
        ]);

        let result = aggregate(&batch, None);

        let uris: Vec<&str> = result.trackers.iter().map(|t| t.uri.as_str()).collect();
        assert_eq!(
            uris,
            vec![
                "udp://a.example:6969/announce",
                "udp://b.example:6969/announce"
            ]
        );
    }

    #[test]
    fn test_distribution_summary() {
        let batch = batch_of(&[
            ("udp://a.example:6969/announce", 50),
            ("udp://b.example:6969/announce", 150),
            ("udp://c.example:6969/announce", 300),
            ("udp://d.example:6969/announce", 750),
            ("udp://e.example:6969/announce", 1500),
            ("udp://f.example:6969/announce", 2500),
        ]);

        let distribution = aggregate(&batch, None).distribution.unwrap();

        assert_eq!(distribution.min_ms, 50.0);
        assert_eq!(distribution.max_ms, 2500.0);
        assert_eq!(distribution.median_ms, 525.0);
        assert_eq!(distribution.mean_ms, 875.0);
        assert_eq!(distribution.buckets, [1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_distribution_ignores_threshold() {
        let batch = batch_of(&[
            ("udp://fast.example:6969/announce", 50),
            ("udp://slow.example:6969/announce", 5000),
        ]);

        let result = aggregate(&batch, Some(Duration::from_millis(100)));

        assert_eq!(result.trackers.len(), 1);
        let distribution = result.distribution.unwrap();
        assert_eq!(distribution.max_ms, 5000.0);
        assert_eq!(distribution.buckets[5], 1);
    }

    #[test]
    fn test_empty_batch_has_no_distribution() {
        let result = aggregate(&ProbeBatch::new(), None);

        assert!(result.trackers.is_empty());
        assert!(result.distribution.is_none());
    }

    proptest! {
        #[test]
        fn test_output_is_sorted_for_any_input(times in proptest::collection::vec(0u64..10_000, 0..64)) {
            let mut batch = ProbeBatch::new();
            for (index, ms) in times.iter().enumerate() {
                batch.insert(ProbeOutcome::valid(
                    format!("udp://tracker{index}.example:6969/announce"),
                    Duration::from_millis(*ms),
                ));
            }

            let result = aggregate(&batch, None);

            prop_assert_eq!(result.trackers.len(), times.len());
            for window in result.trackers.windows(2) {
                prop_assert!(window[0].response_time_ms <= window[1].response_time_ms);
            }
        }

        #[test]
        fn test_aggregation_is_idempotent(times in proptest::collection::vec(0u64..10_000, 0..64)) {
            let mut batch = ProbeBatch::new();
            for (index, ms) in times.iter().enumerate() {
                batch.insert(ProbeOutcome::valid(
                    format!("udp://tracker{index}.example:6969/announce"),
                    Duration::from_millis(*ms),
                ));
            }

            let first = aggregate(&batch, None);
            let second = aggregate(&batch, None);
            prop_assert_eq!(first, second);
        }
    }
}
