//! Sounder Core - BitTorrent tracker probing engine
//!
//! Validates tracker endpoints by speaking their wire protocols directly:
//! BEP 3 announce requests for HTTP(S) trackers and the BEP 15 connect
//! handshake for UDP trackers. Probes fan out across a bounded worker pool
//! and the survivors are ranked by measured response time.

pub mod config;
pub mod tracing_setup;
pub mod tracker;

// Re-export main types for convenient access
pub use config::{ProbeConfig, RunConfig, SounderConfig};
pub use tracker::{
    ProbeBatch, ProbeDispatcher, ProbeError, ProbeOutcome, ProgressEvent, RankedResult,
    TrackerEndpoint, aggregate, run_all,
};
