//! Connectivity probe.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use evse_core::{ConnectionState, Panel, Tone};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(panel: &Panel, global: &GlobalOpts) -> Result<(), CliError> {
    let spinner = spinner(panel, global);
    let state = panel.probe().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match state {
        ConnectionState::Connected => {
            let color = output::should_color(global.color());
            output::print_output(&output::paint(state.label(), Tone::Success, color), global.quiet);
            Ok(())
        }
        ConnectionState::Disconnected | ConnectionState::Unknown => Err(CliError::Disconnected {
            url: panel.config().url.to_string(),
        }),
    }
}

fn spinner(panel: &Panel, global: &GlobalOpts) -> Option<ProgressBar> {
    if global.quiet || !io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Probing {}", panel.config().url));
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}
