//! Alarm log handlers.

use tabled::Tabled;

use evse_core::{AlarmRow, CollectionView, Panel};

use crate::cli::{AlarmsArgs, AlarmsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlarmTableRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Cover")]
    cover: String,
    #[tabled(rename = "Status")]
    handled: String,
}

impl AlarmTableRow {
    fn new(a: &AlarmRow, color: bool) -> Self {
        Self {
            index: a.index,
            time: a.time.clone(),
            cover: output::paint(&a.cover.text, a.cover.tone, color),
            handled: output::paint(&a.handled.text, a.handled.tone, color),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    panel: &Panel,
    args: AlarmsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AlarmsCommand::List => {
            let view = panel.load_alarms().await;
            print_alarms(&view, global);
            Ok(())
        }

        AlarmsCommand::Clear => {
            let gate = util::confirm_gate(global, "alarms clear")?;
            let Some(outcome) = panel.clear_alarms(&gate).await else {
                return Err(CliError::Declined {
                    action: "alarms clear".into(),
                });
            };
            if let Some(view) = util::finish(outcome, global)? {
                print_alarms(&view, global);
            }
            Ok(())
        }
    }
}

fn print_alarms(view: &CollectionView<AlarmRow>, global: &GlobalOpts) {
    let color = output::should_color(global.color());
    let out = output::render_collection(
        global.output(),
        view,
        color,
        |a| AlarmTableRow::new(a, color),
        |a| format!("{}\t{}\t{}", a.time, a.cover.text, a.handled.text),
    );
    output::print_output(&out, global.quiet);
}
