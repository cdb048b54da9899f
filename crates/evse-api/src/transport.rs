// Shared transport configuration for building reqwest::Client instances.
//
// The device speaks plain HTTP on its own access point, so the only knobs
// are timeouts and the user agent.

use std::time::Duration;

const USER_AGENT: &str = concat!("evse-panel/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// TCP connect timeout. `None` leaves reqwest's default in place.
    pub connect_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Some(Duration::from_secs(3)),
        }
    }
}

impl TransportConfig {
    /// Config with the given request timeout and the default connect timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if let Some(connect) = self.connect_timeout {
            builder = builder.connect_timeout(connect);
        }

        builder.build().map_err(crate::error::Error::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_timeout_keeps_connect_default() {
        let cfg = TransportConfig::with_timeout(Duration::from_secs(1));
        assert_eq!(cfg.timeout, Duration::from_secs(1));
        assert_eq!(cfg.connect_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn builds_a_client() {
        assert!(TransportConfig::default().build_client().is_ok());
    }
}
