//! Shared configuration for the evse CLI and TUI.
//!
//! TOML profiles (one per charging controller), figment layering of
//! defaults, file, and `EVSE_*` environment, and translation to
//! `evse_core::PanelConfig`. Both binaries depend on this crate; the CLI
//! adds flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use evse_core::{DEFAULT_DEVICE_URL, PanelConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

/// Values used when neither a profile nor a flag says otherwise.
///
/// Key names avoid underscores so `EVSE_DEFAULTS_<KEY>` maps onto them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Connectivity probe bound, humantime (`"3s"`).
    #[serde(default = "default_probe")]
    pub probe: String,

    /// Telemetry poll period, humantime (`"3s"`).
    #[serde(default = "default_interval")]
    pub interval: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            probe: default_probe(),
            interval: default_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    PanelConfig::DEFAULT_TIMEOUT.as_secs()
}
fn default_probe() -> String {
    "3s".into()
}
fn default_interval() -> String {
    "3s".into()
}

/// A named device profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Device origin (e.g., "http://192.168.4.1"). A bare host gets `http://`.
    pub device: String,

    /// Override request timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override probe bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<String>,

    /// Override poll period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

impl Profile {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            timeout: None,
            probe: None,
            interval: None,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_URL)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "evse-panel", "evse").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("evse");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path, layered the same way as
/// [`load_config`]. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("EVSE_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

impl Config {
    /// Pick a profile by explicit name, else the default profile.
    ///
    /// An explicitly named profile must exist. When the default profile is
    /// missing, the built-in access-point address is used.
    pub fn resolve_profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        if let Some(name) = name {
            return self
                .profiles
                .get(name)
                .map(|p| (name.to_owned(), p.clone()))
                .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() });
        }

        let default_name = self.default_profile.as_deref().unwrap_or("default");
        let profile = self.profiles.get(default_name).cloned().unwrap_or_default();
        Ok((default_name.to_owned(), profile))
    }
}

/// Build a `PanelConfig` from a profile and the global defaults.
pub fn profile_to_panel_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<PanelConfig, ConfigError> {
    let url = parse_device_url(&profile.device)?;
    let mut config = PanelConfig::new(url);

    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.probe_timeout = parse_duration(
        "probe",
        profile.probe.as_deref().unwrap_or(&defaults.probe),
    )?;
    config.poll_interval = parse_duration(
        "interval",
        profile.interval.as_deref().unwrap_or(&defaults.interval),
    )?;

    Ok(config)
}

/// Parse a device address, accepting a bare host (`192.168.4.1`).
pub fn parse_device_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("http://{raw}")
    };
    let url: Url = with_scheme.parse().map_err(|_| ConfigError::Validation {
        field: "device".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "device".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn parse_duration(field: &str, raw: &str) -> Result<Duration, ConfigError> {
    let value = humantime::parse_duration(raw).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("'{raw}': {e}"),
    })?;
    if value.is_zero() {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("absent.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn file_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "garage"

                [defaults]
                timeout = 5

                [profiles.garage]
                device = "10.0.0.40"
                interval = "5s"
                "#,
            )?;
            jail.set_env("EVSE_DEFAULTS_TIMEOUT", "7");
            jail.set_env("EVSE_DEFAULTS_OUTPUT", "json");

            let cfg = load_config_from(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(cfg.default_profile.as_deref(), Some("garage"));
            assert_eq!(cfg.defaults.timeout, 7);
            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.defaults.color, "auto");
            assert_eq!(cfg.profiles["garage"].interval.as_deref(), Some("5s"));
            Ok(())
        });
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), Profile::new("http://192.168.4.1"));
        save_config_to(&path, &cfg).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[profiles.default]"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn missing_default_profile_falls_back_to_access_point() {
        let cfg = Config::default();
        let (name, profile) = cfg.resolve_profile(None).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.device, DEFAULT_DEVICE_URL);
    }

    #[test]
    fn explicit_profile_must_exist() {
        let err = Config::default().resolve_profile(Some("shed")).unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { ref name } if name == "shed"));
    }

    #[test]
    fn profile_overrides_defaults() {
        let profile = Profile {
            timeout: Some(2),
            interval: Some("750ms".into()),
            ..Profile::new("192.168.4.1")
        };
        let cfg = profile_to_panel_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(cfg.url.as_str(), "http://192.168.4.1/");
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert_eq!(cfg.probe_timeout, Duration::from_secs(3));
        assert_eq!(cfg.poll_interval, Duration::from_millis(750));
    }

    #[test]
    fn rejects_bad_durations_and_schemes() {
        let bad_interval = Profile {
            interval: Some("0s".into()),
            ..Profile::default()
        };
        assert!(profile_to_panel_config(&bad_interval, &Defaults::default()).is_err());
        assert!(parse_device_url("ftp://192.168.4.1").is_err());
        assert!(parse_device_url("http://").is_err());
    }
}
