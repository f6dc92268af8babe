//! Tracker endpoint parsing and representation

use url::Url;

use super::protocol::constants::DEFAULT_UDP_PORT;
use super::types::ProbeError;

/// Transport scheme of a tracker endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
    Udp,
    /// A scheme sounder cannot probe (ws, wss, ...)
    Other(String),
}

/// A parsed tracker endpoint.
///
/// Immutable snapshot of the original URI plus the pieces the probers need.
/// UDP endpoints always carry a port (6969 when the URI omits one); HTTP(S)
/// endpoints keep whatever the URI says since the full URI is requested
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerEndpoint {
    uri: String,
    scheme: Scheme,
    host: String,
    port: Option<u16>,
}

impl TrackerEndpoint {
    /// Parses a tracker URI.
    ///
    /// Total over arbitrary input: malformed or hostless URIs come back as
    /// `ProbeError::Unparseable`, never a panic. No network access.
    pub fn parse(uri: &str) -> Result<Self, ProbeError> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(ProbeError::Unparseable {
                reason: "empty URI".to_string(),
            });
        }

        let parsed = Url::parse(trimmed).map_err(|e| ProbeError::Unparseable {
            reason: e.to_string(),
        })?;

        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ProbeError::Unparseable {
                reason: "missing host".to_string(),
            })?
            .to_string();

        let scheme = match parsed.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            "udp" => Scheme::Udp,
            other => Scheme::Other(other.to_string()),
        };

        let port = match scheme {
            Scheme::Udp => Some(parsed.port().unwrap_or(DEFAULT_UDP_PORT)),
            _ => parsed.port(),
        };

        Ok(Self {
            uri: trimmed.to_string(),
            scheme,
            host,
            port,
        })
    }

    /// Original URI as given (trimmed).
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}
