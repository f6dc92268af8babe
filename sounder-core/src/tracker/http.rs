//! HTTP(S) tracker probing via BEP 3 announce requests

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::endpoint::TrackerEndpoint;
use super::protocol::{self, encoding};
use super::types::{ProbeError, ProbeOutcome, Prober};
use crate::config::ProbeConfig;

/// Probes HTTP and HTTPS trackers with a synthetic announce request.
///
/// The announce carries a fixed probe info hash and a freshly generated
/// peer id per request; the endpoint only has to answer with a bencoded
/// dictionary to count as valid.
pub struct HttpProber {
    client: reqwest::Client,
    timeout: Duration,
    announce_port: u16,
    client_id: &'static str,
    info_hash: [u8; 20],
}

impl HttpProber {
    /// Creates an HTTP prober from probe configuration.
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(config.http_timeout)
                .user_agent(config.user_agent)
                .redirect(reqwest::redirect::Policy::limited(3))
                .build()
                .expect("HTTP client creation should not fail"),
            timeout: config.http_timeout,
            announce_port: config.announce_port,
            client_id: config.client_id,
            info_hash: protocol::probe_info_hash(),
        }
    }

    /// Appends BEP 3 announce parameters to the endpoint URI.
    ///
    /// Binary fields are manually percent-encoded to avoid double-encoding.
    fn build_announce_url(&self, endpoint: &TrackerEndpoint) -> String {
        let info_hash = encoding::url_encode_bytes(&self.info_hash);
        let peer_id = encoding::url_encode_bytes(&protocol::generate_peer_id(self.client_id));

        let query = format!(
            "info_hash={info_hash}&peer_id={peer_id}&port={}&uploaded=0&downloaded=0&left=0&compact=1&event=started",
            self.announce_port
        );

        let separator = if endpoint.uri().contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", endpoint.uri())
    }

    /// Shape check only: longer than two bytes, `d` first, `e` last. A
    /// failure-reason dictionary still counts; full bencode decoding is
    /// out of scope.
    fn is_bencoded_dictionary(body: &[u8]) -> bool {
        body.len() > 2 && body.first() == Some(&b'd') && body.last() == Some(&b'e')
    }

    fn classify_transport_error(&self, error: &reqwest::Error) -> ProbeError {
        if error.is_timeout() {
            ProbeError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if error.is_connect() {
            ProbeError::ConnectionError {
                reason: error.to_string(),
            }
        } else {
            ProbeError::RequestError {
                reason: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &TrackerEndpoint) -> ProbeOutcome {
        let url = self.build_announce_url(endpoint);
        tracing::debug!("announcing to {}", endpoint.uri());

        let started = Instant::now();
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!("announce to {} failed: {error}", endpoint.uri());
                return ProbeOutcome::failed(endpoint.uri(), self.classify_transport_error(&error));
            }
        };

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(error) => {
                tracing::debug!("reading body from {} failed: {error}", endpoint.uri());
                return ProbeOutcome::failed(endpoint.uri(), self.classify_transport_error(&error));
            }
        };
        let elapsed = started.elapsed();

        if Self::is_bencoded_dictionary(&body) {
            ProbeOutcome::valid(endpoint.uri(), elapsed)
        } else {
            ProbeOutcome::failed(
                endpoint.uri(),
                ProbeError::InvalidResponse {
                    reason: "body is not a bencoded dictionary".to_string(),
                },
            )
        }
    }
}
