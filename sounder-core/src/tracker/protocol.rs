//! BitTorrent tracker wire-protocol constants and helpers
//!
//! Binary BEP 15 connect packets plus the announce-identity material
//! (probe info hash, peer id, URL byte-encoding) used for BEP 3 probes.

use sha1::{Digest, Sha1};

use super::types::ProbeError;

/// BitTorrent tracker protocol constants
pub mod constants {
    /// Magic protocol id opening every BEP 15 connect request
    pub const CONNECT_MAGIC: u64 = 0x0000_0417_2710_1980;

    /// BEP 15 action code for a connect request/response
    pub const ACTION_CONNECT: u32 = 0;

    /// Exact size of a BEP 15 connect request and response in bytes
    pub const CONNECT_PACKET_LEN: usize = 16;

    /// Default port for UDP trackers when the URI omits one
    pub const DEFAULT_UDP_PORT: u16 = 6969;
}

/// Seed for the fixed info hash advertised by announce probes. Not a real
/// torrent; trackers only need a syntactically valid 20-byte hash.
const INFO_HASH_SEED: &[u8] = b"sounder announce probe v1";

/// Derives the fixed 20-byte info hash used by every announce probe.
pub fn probe_info_hash() -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(INFO_HASH_SEED);
    let digest = hasher.finalize();
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&digest);
    hash
}

/// Generates a probe peer id: client tag prefix, pseudo-random tail.
pub fn generate_peer_id(client_id: &str) -> [u8; 20] {
    let mut id = [0u8; 20];
    let tag = client_id.as_bytes();
    let tag_len = tag.len().min(id.len());
    id[..tag_len].copy_from_slice(&tag[..tag_len]);
    for byte in &mut id[tag_len..] {
        *byte = rand::random();
    }
    id
}

/// URL encoding utilities for announce parameters
pub mod encoding {
    /// Encode bytes for tracker URL parameters
    pub fn url_encode_bytes(bytes: &[u8]) -> String {
        bytes.iter().map(|&b| format!("%{b:02X}")).collect()
    }
}

/// Builds the 16-byte BEP 15 connect request carrying `transaction_id`.
///
/// Layout, all big-endian: magic(8) + action(4) + transaction_id(4).
pub fn build_connect_request(transaction_id: u32) -> [u8; constants::CONNECT_PACKET_LEN] {
    let mut packet = [0u8; constants::CONNECT_PACKET_LEN];
    packet[0..8].copy_from_slice(&constants::CONNECT_MAGIC.to_be_bytes());
    packet[8..12].copy_from_slice(&constants::ACTION_CONNECT.to_be_bytes());
    packet[12..16].copy_from_slice(&transaction_id.to_be_bytes());
    packet
}

/// Decoded BEP 15 connect response.
///
/// Layout, all big-endian: action(4) + transaction_id(4) + connection_id(8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectResponse {
    pub action: u32,
    pub transaction_id: u32,
    pub connection_id: u64,
}

/// Parses a connect response datagram.
///
/// # Errors
/// - `ProbeError::InvalidResponse` - datagram is not exactly 16 bytes
pub fn parse_connect_response(datagram: &[u8]) -> Result<ConnectResponse, ProbeError> {
    if datagram.len() != constants::CONNECT_PACKET_LEN {
        return Err(ProbeError::InvalidResponse {
            reason: format!(
                "expected {} byte connect reply, got {}",
                constants::CONNECT_PACKET_LEN,
                datagram.len()
            ),
        });
    }

    let action = u32::from_be_bytes(datagram[0..4].try_into().expect("sliced to length"));
    let transaction_id = u32::from_be_bytes(datagram[4..8].try_into().expect("sliced to length"));
    let connection_id = u64::from_be_bytes(datagram[8..16].try_into().expect("sliced to length"));

    Ok(ConnectResponse {
        action,
        transaction_id,
        connection_id,
    })
}
