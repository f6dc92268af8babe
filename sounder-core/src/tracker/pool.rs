//! Bounded parallel execution of probes

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;

use super::dispatch::ProbeDispatcher;
use super::types::{ProbeBatch, ProbeError, ProbeOutcome, ProgressEvent};

/// Probes every candidate URI under a bounded worker pool.
///
/// Spawns one task per candidate; each task acquires a semaphore permit
/// before dispatching, so at most `max_workers` probes are in flight at
/// once. Outcomes come back through the join handle (no shared map), and a
/// task that dies is converted into an `InternalError` outcome for its URI
/// without disturbing sibling probes. Returns once every candidate has
/// exactly one outcome.
///
/// Progress events are advisory: sent after each completion over the
/// optional unbounded channel, they can never block a probe.
pub async fn run_all(
    dispatcher: Arc<ProbeDispatcher>,
    candidates: Vec<String>,
    max_workers: usize,
    progress: Option<UnboundedSender<ProgressEvent>>,
) -> ProbeBatch {
    let total = candidates.len();
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let mut tasks = JoinSet::new();
    let mut task_uris: HashMap<tokio::task::Id, String> = HashMap::with_capacity(total);

    for uri in candidates {
        let dispatcher = Arc::clone(&dispatcher);
        let semaphore = Arc::clone(&semaphore);
        let task_uri = uri.clone();
        let handle = tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("probe semaphore is never closed");
            dispatcher.dispatch(&task_uri).await
        });
        task_uris.insert(handle.id(), uri);
    }

    let mut batch = ProbeBatch::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        let outcome = match joined {
            Ok((id, outcome)) => {
                task_uris.remove(&id);
                outcome
            }
            Err(join_error) => {
                let uri = task_uris.remove(&join_error.id()).unwrap_or_default();
                tracing::warn!("probe task for {uri} died: {join_error}");
                ProbeOutcome::failed(
                    uri,
                    ProbeError::InternalError {
                        reason: join_error.to_string(),
                    },
                )
            }
        };

        batch.insert(outcome);
        if let Some(progress) = &progress {
            let _ = progress.send(ProgressEvent {
                completed: batch.len(),
                total,
                valid: batch.valid_count(),
            });
        }
    }

    batch
}

#[cfg(test)]
mod pool_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::*;
    use crate::tracker::endpoint::TrackerEndpoint;
    use crate::tracker::types::Prober;

    /// Prober that answers instantly, panicking for URIs containing "boom".
    struct InstantProber;

    #[async_trait]
    impl Prober for InstantProber {
        async fn probe(&self, endpoint: &TrackerEndpoint) -> ProbeOutcome {
            if endpoint.uri().contains("boom") {
                panic!("injected prober fault");
            }
            ProbeOutcome::valid(endpoint.uri(), Duration::from_millis(1))
        }
    }

    /// Prober that tracks the high-water mark of concurrent invocations.
    struct GaugedProber {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl GaugedProber {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }

        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Prober for GaugedProber {
        async fn probe(&self, endpoint: &TrackerEndpoint) -> ProbeOutcome {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            ProbeOutcome::valid(endpoint.uri(), Duration::from_millis(10))
        }
    }

    fn dispatcher(prober: Arc<dyn Prober>) -> Arc<ProbeDispatcher> {
        Arc::new(ProbeDispatcher::with_probers(
            Default::default(),
            prober.clone(),
            prober,
        ))
    }

    fn candidate_uris(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("udp://tracker{i}.example:6969/announce"))
            .collect()
    }

    #[tokio::test]
    async fn test_run_all_yields_one_outcome_per_candidate() {
        let candidates = candidate_uris(1000);
        let batch = run_all(dispatcher(Arc::new(InstantProber)), candidates.clone(), 50, None).await;

        assert_eq!(batch.len(), 1000);
        for uri in &candidates {
            assert!(batch.get(uri).is_some(), "missing outcome for {uri}");
        }
    }

    #[tokio::test]
    async fn test_faulting_probe_is_isolated() {
        let mut candidates = candidate_uris(999);
        candidates.push("udp://boom.example:6969/announce".to_string());

        let batch = run_all(dispatcher(Arc::new(InstantProber)), candidates, 50, None).await;

        assert_eq!(batch.len(), 1000);
        assert_eq!(batch.valid_count(), 999);
        assert!(matches!(
            batch.get("udp://boom.example:6969/announce").unwrap().error(),
            Some(ProbeError::InternalError { .. })
        ));
    }

    #[tokio::test]
    async fn test_worker_cap_is_respected() {
        let prober = GaugedProber::new();
        let batch = run_all(dispatcher(prober.clone()), candidate_uris(100), 8, None).await;

        assert_eq!(batch.len(), 100);
        assert!(
            prober.peak() <= 8,
            "peak concurrency {} exceeded cap",
            prober.peak()
        );
    }

    #[tokio::test]
    async fn test_progress_events_track_completions() {
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let batch = run_all(
            dispatcher(Arc::new(InstantProber)),
            candidate_uris(25),
            5,
            Some(progress_tx),
        )
        .await;

        let mut events = Vec::new();
        while let Ok(event) = progress_rx.try_recv() {
            events.push(event);
        }

        assert_eq!(events.len(), 25);
        assert_eq!(
            events.last(),
            Some(&ProgressEvent {
                completed: 25,
                total: 25,
                valid: batch.valid_count(),
            })
        );
        for window in events.windows(2) {
            assert!(window[1].completed == window[0].completed + 1);
            assert!(window[1].valid >= window[0].valid);
        }
    }

    #[test]
    fn test_run_all_with_no_candidates() {
        let batch = tokio_test::block_on(run_all(
            dispatcher(Arc::new(InstantProber)),
            Vec::new(),
            50,
            None,
        ));

        assert!(batch.is_empty());
        assert_eq!(batch.valid_count(), 0);
    }
}
