//! Clap derive structures for the `evse` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Only
//! clap and clap_complete may be used here: build.rs includes this file to
//! render man pages.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// evse -- control panel for an ESP32 EV charging controller
#[derive(Debug, Parser)]
#[command(
    name = "evse",
    version,
    about = "Monitor and configure an EV charging controller from the command line",
    long_about = "Talks to the charging controller's local HTTP API (by default on its own\n\
        access point at http://192.168.4.1): live telemetry, protection thresholds,\n\
        the authorized-card allowlist, and the alarm log.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "EVSE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device URL or host (overrides profile)
    #[arg(long, short = 'd', env = "EVSE_DEVICE", global = true)]
    pub device: Option<String>,

    /// Output format [default: `[defaults] output`, else table]
    #[arg(long, short = 'o', env = "EVSE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: `[defaults] color`, else auto]
    #[arg(long, env = "EVSE_COLOR", global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "EVSE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// Resolved output format; unset only before defaults are applied.
    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Table)
    }

    pub fn color(&self) -> ColorMode {
        self.color.unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether the device answers
    Ping,

    /// Show live telemetry
    #[command(alias = "st")]
    Status(StatusArgs),

    /// View and change protection thresholds on the device
    Settings(SettingsArgs),

    /// Manage the authorized-card allowlist
    Cards(CardsArgs),

    /// View and clear the alarm log
    Alarms(AlarmsArgs),

    /// Manage local CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Keep polling and print every sample until Ctrl-C
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Poll period for --watch (e.g. "3s", "500ms"; overrides profile)
    #[arg(long, requires = "watch")]
    pub interval: Option<String>,
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show thresholds stored on the device
    Show,

    /// Change thresholds; unspecified fields keep their current value
    Set(SettingsSetArgs),

    /// Restore factory thresholds on the device
    Reset,
}

#[derive(Debug, Args)]
#[allow(clippy::struct_field_names)]
pub struct SettingsSetArgs {
    /// Tolerated supply voltage deviation (%)
    #[arg(long)]
    pub voltage_deviation: Option<u32>,

    /// Maximum charge current (A)
    #[arg(long)]
    pub max_current: Option<u32>,

    /// Tolerated control-pilot deviation (%)
    #[arg(long)]
    pub cp_deviation: Option<u32>,

    /// AC leakage threshold (mA)
    #[arg(long)]
    pub leakage_ac: Option<u32>,

    /// DC leakage threshold (mA)
    #[arg(long)]
    pub leakage_dc: Option<u32>,
}

// ── Cards ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CardsArgs {
    #[command(subcommand)]
    pub command: CardsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CardsCommand {
    /// List authorized cards
    #[command(alias = "ls")]
    List,

    /// Authorize a card
    Add {
        /// Card number (8 digits)
        id: String,

        /// Expiry date, YYYY-MM-DD (default: one year from today)
        #[arg(long, short = 'e')]
        expires: Option<String>,
    },

    /// Revoke a card
    #[command(alias = "rm")]
    Delete {
        /// Card number
        id: String,
    },
}

// ── Alarms ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlarmsArgs {
    #[command(subcommand)]
    pub command: AlarmsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlarmsCommand {
    /// List alarm records, newest first
    #[command(alias = "ls")]
    List,

    /// Delete every alarm record
    Clear,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile (prompts unless --url is given)
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Device URL or host
        #[arg(long = "url")]
        url: Option<String>,
    },

    /// Display current resolved configuration
    Show,

    /// Point the active profile at a different device
    SetDevice {
        /// Device URL or host
        url: String,
    },

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
