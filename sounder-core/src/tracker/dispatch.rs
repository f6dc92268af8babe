//! Scheme routing and denylist screening for probe candidates

use std::collections::HashSet;
use std::sync::Arc;

use super::endpoint::{Scheme, TrackerEndpoint};
use super::http::HttpProber;
use super::types::{ProbeError, ProbeOutcome, Prober};
use super::udp::UdpProber;
use crate::config::SounderConfig;

/// Routes each candidate URI to the prober for its scheme.
///
/// Denylisted URIs short-circuit before parsing: nothing on the denylist
/// ever reaches a prober or the network. Retry or deadline policies belong
/// in wrappers around [`ProbeDispatcher::dispatch`], not in the probers.
pub struct ProbeDispatcher {
    denylist: HashSet<String>,
    http: Arc<dyn Prober>,
    udp: Arc<dyn Prober>,
}

impl ProbeDispatcher {
    /// Creates a dispatcher backed by the real HTTP and UDP probers.
    pub fn new(config: &SounderConfig) -> Self {
        Self::with_probers(
            config.run.denylist.iter().cloned().collect(),
            Arc::new(HttpProber::new(&config.probe)),
            Arc::new(UdpProber::new(&config.probe)),
        )
    }

    /// Creates a dispatcher with caller-supplied probers.
    pub fn with_probers(
        denylist: HashSet<String>,
        http: Arc<dyn Prober>,
        udp: Arc<dyn Prober>,
    ) -> Self {
        Self {
            denylist,
            http,
            udp,
        }
    }

    /// Probes a single candidate URI.
    ///
    /// Everything that cannot be probed is classified into the outcome
    /// (`Skipped`, `Unparseable`, `UnsupportedScheme`) instead of erroring.
    pub async fn dispatch(&self, uri: &str) -> ProbeOutcome {
        if self.denylist.contains(uri) {
            tracing::debug!("skipping denylisted tracker {uri}");
            return ProbeOutcome::failed(uri, ProbeError::Skipped);
        }

        let endpoint = match TrackerEndpoint::parse(uri) {
            Ok(endpoint) => endpoint,
            Err(error) => return ProbeOutcome::failed(uri, error),
        };

        match endpoint.scheme() {
            Scheme::Udp => self.udp.probe(&endpoint).await,
            Scheme::Http | Scheme::Https => self.http.probe(&endpoint).await,
            Scheme::Other(scheme) => ProbeOutcome::failed(
                uri,
                ProbeError::UnsupportedScheme {
                    scheme: scheme.clone(),
                },
            ),
        }
    }
}
