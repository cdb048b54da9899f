//! Command dispatch: bridges CLI args -> panel calls -> output formatting.

pub mod alarms;
pub mod cards;
pub mod config_cmd;
pub mod ping;
pub mod settings;
pub mod status;
pub mod util;

use evse_core::Panel;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, panel: &Panel, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Ping => ping::handle(panel, global).await,
        Command::Status(args) => status::handle(panel, args, global).await,
        Command::Settings(args) => settings::handle(panel, args, global).await,
        Command::Cards(args) => cards::handle(panel, args, global).await,
        Command::Alarms(args) => alarms::handle(panel, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
