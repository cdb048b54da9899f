//! Flag-aware wrappers over `evse-config`.
//!
//! Resolution order for each setting: command-line flag (or its `EVSE_*`
//! env var), then the active profile, then `[defaults]`.

use clap::ValueEnum;

use evse_config::{Config, ConfigError, Defaults};
use evse_core::PanelConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use evse_config::{config_path, load_config_or_default, save_config};

/// Active profile name: `--profile`, else the configured default.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Fill `--output` / `--color` from `[defaults]` when neither the flag nor
/// its env var was given.
pub fn apply_output_defaults(global: &mut GlobalOpts, defaults: &Defaults) -> Result<(), CliError> {
    if global.output.is_none() {
        global.output = Some(parse_default::<OutputFormat>("output", &defaults.output)?);
    }
    if global.color.is_none() {
        global.color = Some(parse_default::<ColorMode>("color", &defaults.color)?);
    }
    Ok(())
}

fn parse_default<T: ValueEnum>(key: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw.trim(), true).map_err(|_| CliError::Validation {
        field: format!("defaults.{key}"),
        reason: format!("unknown value '{raw}'"),
    })
}

/// Build the `PanelConfig` for this invocation from a loaded config.
pub fn build_panel_config_from(cfg: &Config, global: &GlobalOpts) -> Result<PanelConfig, CliError> {
    let (_, mut profile) = cfg
        .resolve_profile(global.profile.as_deref())
        .map_err(|e| match e {
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: available_profiles(cfg),
            },
            other => other.into(),
        })?;

    if let Some(ref device) = global.device {
        profile.device.clone_from(device);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    Ok(evse_config::profile_to_panel_config(&profile, &cfg.defaults)?)
}

/// Comma-separated, sorted profile names for help text.
pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}
