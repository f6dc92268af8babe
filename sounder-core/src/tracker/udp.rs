//! UDP tracker probing via the BEP 15 connect handshake

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::UdpSocket;

use super::endpoint::TrackerEndpoint;
use super::protocol::{self, constants};
use super::types::{ProbeError, ProbeOutcome, Prober};
use crate::config::ProbeConfig;

/// Probes UDP trackers with a single connect handshake per endpoint.
///
/// One request datagram, one reply, no retry: a tracker that cannot answer
/// the first connect within the timeout does not count as valid for this
/// run. Each probe owns its own ephemeral socket.
pub struct UdpProber {
    timeout: Duration,
}

impl UdpProber {
    /// Creates a UDP prober from probe configuration.
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            timeout: config.udp_timeout,
        }
    }

    /// Runs one connect handshake and measures send-to-reply time.
    ///
    /// # Errors
    /// - `ProbeError::SocketError` - bind/resolve/send/recv failure
    /// - `ProbeError::Timeout` - no reply within the configured timeout
    /// - `ProbeError::InvalidResponse` - reply is not exactly 16 bytes
    /// - `ProbeError::ProtocolMismatch` - wrong action or transaction id
    async fn connect_handshake(&self, endpoint: &TrackerEndpoint) -> Result<Duration, ProbeError> {
        let port = endpoint.port().unwrap_or(constants::DEFAULT_UDP_PORT);

        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(socket_error)?;
        socket
            .connect((endpoint.host(), port))
            .await
            .map_err(socket_error)?;

        let transaction_id: u32 = rand::random();
        let request = protocol::build_connect_request(transaction_id);

        let started = Instant::now();
        socket.send(&request).await.map_err(socket_error)?;

        // Oversized buffer so replies longer than 16 bytes are detected
        // instead of silently truncated.
        let mut reply = [0u8; 64];
        let len = tokio::time::timeout(self.timeout, socket.recv(&mut reply))
            .await
            .map_err(|_| ProbeError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            })?
            .map_err(socket_error)?;
        let elapsed = started.elapsed();

        let response = protocol::parse_connect_response(&reply[..len])?;
        if response.action != constants::ACTION_CONNECT {
            return Err(ProbeError::ProtocolMismatch {
                reason: format!("unexpected action {}", response.action),
            });
        }
        if response.transaction_id != transaction_id {
            return Err(ProbeError::ProtocolMismatch {
                reason: format!(
                    "transaction id {:#010x} does not match sent {:#010x}",
                    response.transaction_id, transaction_id
                ),
            });
        }

        Ok(elapsed)
    }
}

fn socket_error(error: std::io::Error) -> ProbeError {
    ProbeError::SocketError {
        reason: error.to_string(),
    }
}

#[async_trait]
impl Prober for UdpProber {
    async fn probe(&self, endpoint: &TrackerEndpoint) -> ProbeOutcome {
        tracing::debug!("connect handshake with {}", endpoint.uri());
        match self.connect_handshake(endpoint).await {
            Ok(elapsed) => ProbeOutcome::valid(endpoint.uri(), elapsed),
            Err(error) => {
                tracing::debug!("handshake with {} failed: {error}", endpoint.uri());
                ProbeOutcome::failed(endpoint.uri(), error)
            }
        }
    }
}
