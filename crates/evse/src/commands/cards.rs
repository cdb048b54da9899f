//! Authorized-card handlers.

use tabled::Tabled;

use evse_core::{CardRow, CollectionView, Panel, default_expiry};

use crate::cli::{CardsArgs, CardsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CardTableRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Card ID")]
    id: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl From<&CardRow> for CardTableRow {
    fn from(c: &CardRow) -> Self {
        Self {
            index: c.index,
            id: c.id.clone(),
            expires: c.expires.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(panel: &Panel, args: CardsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        CardsCommand::List => {
            let view = panel.load_cards().await;
            print_cards(&view, global);
            Ok(())
        }

        CardsCommand::Add { id, expires } => {
            let expires = match expires {
                Some(raw) => util::parse_expiry(&raw)?,
                None => default_expiry(chrono::Local::now().date_naive()),
            };
            let outcome = panel.add_card(&id, expires).await?;
            if let Some(view) = util::finish(outcome, global)? {
                print_cards(&view, global);
            }
            Ok(())
        }

        CardsCommand::Delete { id } => {
            let gate = util::confirm_gate(global, "cards delete")?;
            let Some(outcome) = panel.delete_card(&id, &gate).await else {
                return Err(CliError::Declined {
                    action: "cards delete".into(),
                });
            };
            if let Some(view) = util::finish(outcome, global)? {
                print_cards(&view, global);
            }
            Ok(())
        }
    }
}

fn print_cards(view: &CollectionView<CardRow>, global: &GlobalOpts) {
    let out = output::render_collection(
        global.output(),
        view,
        output::should_color(global.color()),
        |c| CardTableRow::from(c),
        |c| c.id.clone(),
    );
    output::print_output(&out, global.quiet);
}
