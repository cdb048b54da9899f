//! Config subcommand handlers. None of these contact the device.

use dialoguer::Input;

use evse_config::{Profile, parse_device_url};
use evse_core::DEFAULT_DEVICE_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { name, url } => {
            let path = config::config_path();
            let device = if let Some(url) = url {
                url
            } else {
                eprintln!("EVSE panel: configuration wizard");
                eprintln!("   Config path: {}\n", path.display());
                Input::new()
                    .with_prompt("Device URL")
                    .default(DEFAULT_DEVICE_URL.to_owned())
                    .interact_text()
                    .map_err(prompt_err)?
            };
            let device = parse_device_url(&device)?.to_string();

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(name.clone(), Profile::new(device));
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("✓ Configuration written to {}", path.display());
                eprintln!("  Active profile: {name}");
                eprintln!("  Test it: evse ping");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                global.output(),
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n({e})")),
                |c| config::active_profile_name(global, c),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetDevice <url> ─────────────────────────────────────────
        ConfigCommand::SetDevice { url } => {
            let device = parse_device_url(&url)?.to_string();
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            cfg.profiles
                .entry(profile_name.clone())
                .or_default()
                .device
                .clone_from(&device);
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("✓ Profile '{profile_name}' now points at {device}");
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
