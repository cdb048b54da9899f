//! `evse-tui`: terminal panel for an EVSE charging controller.
//!
//! Four screens navigable via number keys (1-4): Dashboard, Settings,
//! Cards, and Alarms. A background data bridge probes the device, loads
//! the collections, and streams telemetry into the action loop.
//!
//! Logs are written to a file (default `/tmp/evse-tui.log`) to avoid
//! corrupting the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use evse_core::{Panel, PanelConfig};

use crate::app::App;

/// Terminal panel for monitoring and configuring an EVSE controller.
#[derive(Parser, Debug)]
#[command(name = "evse-tui", version, about)]
struct Cli {
    /// Configuration profile to use
    #[arg(short = 'p', long, env = "EVSE_PROFILE")]
    profile: Option<String>,

    /// Device address (overrides the profile), e.g. http://192.168.4.1
    #[arg(short = 'd', long, env = "EVSE_DEVICE")]
    device: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/evse-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; stdout belongs to the terminal UI. Hold the guard
/// for the lifetime of the app so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "evse_tui={log_level},evse_core={log_level},evse_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("evse-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Resolve the panel settings: CLI flags > config file > built-in defaults.
fn build_panel_config(cli: &Cli) -> Result<PanelConfig> {
    let cfg = evse_config::load_config_or_default();
    let (name, mut profile) = cfg.resolve_profile(cli.profile.as_deref())?;
    if let Some(ref device) = cli.device {
        profile.device.clone_from(device);
    }
    info!(profile = %name, device = %profile.device, "resolved profile");
    Ok(evse_config::profile_to_panel_config(&profile, &cfg.defaults)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal is touched
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let config = build_panel_config(&cli)?;
    info!(device = %config.url, "starting evse-tui");

    let panel = Panel::new(config)?;
    let mut app = App::new(panel);
    app.run().await?;

    Ok(())
}
