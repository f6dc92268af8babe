//! BitTorrent tracker endpoint probing.
//!
//! Speaks the tracker wire protocols directly: BEP 3 announce requests over
//! HTTP(S) and the BEP 15 connect handshake over UDP. Candidate URIs flow
//! through the dispatcher into protocol-specific probers under a bounded
//! worker pool; the aggregator ranks whatever answered.

pub mod aggregate;
pub mod dispatch;
pub mod endpoint;
pub mod http;
pub mod pool;
pub mod protocol;
pub mod types;
pub mod udp;

// Re-export public API
pub use aggregate::{BUCKET_BOUNDS_MS, Distribution, RankedResult, RankedTracker, aggregate};
pub use dispatch::ProbeDispatcher;
pub use endpoint::{Scheme, TrackerEndpoint};
pub use http::HttpProber;
pub use pool::run_all;
pub use types::{ProbeBatch, ProbeError, ProbeOutcome, Prober, ProgressEvent};
pub use udp::UdpProber;
