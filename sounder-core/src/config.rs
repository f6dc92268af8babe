//! Centralized configuration for Sounder.
//!
//! All tunable parameters live here to avoid hard-coded values scattered
//! throughout the probing engine.

use std::time::Duration;

/// Central configuration for a probing run.
///
/// Groups related settings into logical sections. Supports environment
/// variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct SounderConfig {
    pub probe: ProbeConfig,
    pub run: RunConfig,
}

/// Protocol-level parameters shared by every probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// HTTP announce request timeout
    pub http_timeout: Duration,
    /// UDP connect handshake timeout
    pub udp_timeout: Duration,
    /// User agent presented to HTTP trackers
    pub user_agent: &'static str,
    /// Client identifier prefix for generated peer ids
    pub client_id: &'static str,
    /// TCP port advertised in announce requests
    pub announce_port: u16,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(5),
            udp_timeout: Duration::from_secs(10),
            user_agent: "sounder/0.1.0",
            client_id: "-SD0001-",
            announce_port: 6881,
        }
    }
}

/// Run-wide scheduling and filtering parameters.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum simultaneous probes
    pub max_workers: usize,
    /// Drop valid trackers slower than this (None keeps everything)
    pub max_response_time: Option<Duration>,
    /// Tracker URIs that are never probed
    pub denylist: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_workers: 50,
            max_response_time: None,
            // Known to hang probes indefinitely.
            denylist: vec!["udp://tracker.theoks.net:6969/announce".to_string()],
        }
    }
}

impl SounderConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("SOUNDER_HTTP_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.probe.http_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(timeout) = std::env::var("SOUNDER_UDP_TIMEOUT") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.probe.udp_timeout = Duration::from_secs(seconds);
            }
        }

        if let Ok(workers) = std::env::var("SOUNDER_MAX_WORKERS") {
            if let Ok(count) = workers.parse::<usize>() {
                config.run.max_workers = count;
            }
        }

        if let Ok(threshold) = std::env::var("SOUNDER_MAX_RESPONSE_TIME_MS") {
            if let Ok(millis) = threshold.parse::<u64>() {
                config.run.max_response_time = Some(Duration::from_millis(millis));
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = SounderConfig::default();

        assert_eq!(config.probe.http_timeout, Duration::from_secs(5));
        assert_eq!(config.probe.udp_timeout, Duration::from_secs(10));
        assert_eq!(config.probe.client_id, "-SD0001-");
        assert_eq!(config.probe.announce_port, 6881);
        assert_eq!(config.run.max_workers, 50);
        assert_eq!(config.run.max_response_time, None);
        assert!(
            config
                .run
                .denylist
                .contains(&"udp://tracker.theoks.net:6969/announce".to_string())
        );
    }

    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("SOUNDER_HTTP_TIMEOUT", "2");
            std::env::set_var("SOUNDER_UDP_TIMEOUT", "3");
            std::env::set_var("SOUNDER_MAX_WORKERS", "8");
            std::env::set_var("SOUNDER_MAX_RESPONSE_TIME_MS", "750");
        }

        let config = SounderConfig::from_env();

        assert_eq!(config.probe.http_timeout, Duration::from_secs(2));
        assert_eq!(config.probe.udp_timeout, Duration::from_secs(3));
        assert_eq!(config.run.max_workers, 8);
        assert_eq!(
            config.run.max_response_time,
            Some(Duration::from_millis(750))
        );

        // Unparseable values leave the defaults untouched.
        unsafe {
            std::env::set_var("SOUNDER_MAX_WORKERS", "banana");
        }
        let config = SounderConfig::from_env();
        assert_eq!(config.run.max_workers, 50);

        // Cleanup
        unsafe {
            std::env::remove_var("SOUNDER_HTTP_TIMEOUT");
            std::env::remove_var("SOUNDER_UDP_TIMEOUT");
            std::env::remove_var("SOUNDER_MAX_WORKERS");
            std::env::remove_var("SOUNDER_MAX_RESPONSE_TIME_MS");
        }
    }
}
