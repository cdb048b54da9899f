// ── Runtime connection configuration ──
//
// Describes *how* to talk to one charging controller. Never touches disk:
// the CLI/TUI builds a `PanelConfig` (usually via evse-config) and hands it
// to `Panel::new`.

use std::time::Duration;

use url::Url;

/// Origin the controller serves on its own access point.
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.4.1";

/// Configuration for a single device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    /// Device origin (e.g., `http://192.168.4.1`).
    pub url: Url,
    /// Whole-request timeout for every call except the probe.
    pub timeout: Duration,
    /// Upper bound on the connectivity probe.
    pub probe_timeout: Duration,
    /// Telemetry poll period.
    pub poll_interval: Duration,
}

impl PanelConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

    /// Config for `url` with default timings.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: Self::DEFAULT_TIMEOUT,
            probe_timeout: Self::DEFAULT_PROBE_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }
}
