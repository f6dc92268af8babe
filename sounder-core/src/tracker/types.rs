//! Core types for tracker probing

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::endpoint::TrackerEndpoint;

/// Classified failure of a single probe.
///
/// Every way a probe can go wrong maps to exactly one variant. These are
/// terminal per endpoint and never abort the surrounding run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("unparseable tracker URI: {reason}")]
    Unparseable { reason: String },

    #[error("endpoint is denylisted")]
    Skipped,

    #[error("unsupported tracker scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("connection failed: {reason}")]
    ConnectionError { reason: String },

    #[error("no response within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("request failed: {reason}")]
    RequestError { reason: String },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("socket error: {reason}")]
    SocketError { reason: String },

    #[error("reply does not match request: {reason}")]
    ProtocolMismatch { reason: String },

    #[error("probe failed internally: {reason}")]
    InternalError { reason: String },
}

/// Result of probing one endpoint.
///
/// Carries the measured response time when the endpoint answered with a
/// valid protocol reply, or the classified failure otherwise. The `Result`
/// encoding makes "response time iff valid" impossible to violate.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    uri: String,
    result: Result<Duration, ProbeError>,
}

impl ProbeOutcome {
    /// Creates an outcome for an endpoint that answered validly.
    pub fn valid(uri: impl Into<String>, response_time: Duration) -> Self {
        Self {
            uri: uri.into(),
            result: Ok(response_time),
        }
    }

    /// Creates an outcome for a probe that failed or was screened out.
    pub fn failed(uri: impl Into<String>, error: ProbeError) -> Self {
        Self {
            uri: uri.into(),
            result: Err(error),
        }
    }

    /// Original URI of the probed endpoint.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }

    /// Measured response time in fractional milliseconds, present iff valid.
    pub fn response_time_ms(&self) -> Option<f64> {
        self.result
            .as_ref()
            .ok()
            .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
    }

    /// Classified failure, present iff the probe was not valid.
    pub fn error(&self) -> Option<&ProbeError> {
        self.result.as_ref().err()
    }
}

/// Advisory progress notification emitted after each completed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub valid: usize,
}

/// Accumulated outcomes of one probing run, keyed by endpoint URI.
///
/// Append-only while the run is in flight; consumed once by the aggregator.
#[derive(Debug, Default)]
pub struct ProbeBatch {
    outcomes: HashMap<String, ProbeOutcome>,
    valid: usize,
}

impl ProbeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one outcome. At most one outcome may exist per URI; a repeat
    /// insert replaces the previous entry.
    pub fn insert(&mut self, outcome: ProbeOutcome) {
        if outcome.is_valid() {
            self.valid += 1;
        }
        if let Some(previous) = self.outcomes.insert(outcome.uri.clone(), outcome) {
            if previous.is_valid() {
                self.valid -= 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of recorded outcomes that were valid.
    pub fn valid_count(&self) -> usize {
        self.valid
    }

    pub fn get(&self, uri: &str) -> Option<&ProbeOutcome> {
        self.outcomes.get(uri)
    }

    /// Iterates outcomes in arbitrary order.
    pub fn outcomes(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.values()
    }
}

/// Protocol-specific probe implementation.
///
/// One implementation per transport; the dispatcher selects among them by
/// endpoint scheme. Implementations classify their own failures into the
/// outcome and never return an error past this boundary.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &TrackerEndpoint) -> ProbeOutcome;
}
