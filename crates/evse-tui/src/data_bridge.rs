//! Data bridge: connects the [`Panel`] to TUI actions.
//!
//! On startup it fires the one-shot probe and the three collection loads as
//! independent tasks, then runs the telemetry poller and forwards every
//! sample as an [`Action`] until cancelled.

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use evse_core::{ConnectionState, Panel};

use crate::action::Action;

/// Run the bridge until `cancel` fires. Stops the poller before returning.
pub async fn run_data_bridge(
    panel: Panel,
    action_tx: UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    spawn_probe(&panel, &action_tx);
    spawn_load_config(&panel, &action_tx);
    spawn_load_cards(&panel, &action_tx);
    spawn_load_alarms(&panel, &action_tx);

    let poller = panel.poller();
    let mut samples = poller.subscribe();
    let handle = match poller.start() {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "telemetry poller did not start");
            return;
        }
    };

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = samples.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = samples.borrow_and_update().clone();
                if action_tx.send(Action::Telemetry(view)).is_err() {
                    break;
                }
            }
        }
    }

    handle.stop().await;
    debug!("data bridge shut down");
}

pub fn spawn_probe(panel: &Panel, tx: &UnboundedSender<Action>) {
    let _ = tx.send(Action::Connection(ConnectionState::Unknown));
    let panel = panel.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let state = panel.probe().await;
        let _ = tx.send(Action::Connection(state));
    });
}

pub fn spawn_load_config(panel: &Panel, tx: &UnboundedSender<Action>) {
    let panel = panel.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let _ = tx.send(Action::ConfigLoaded(panel.load_config().await));
    });
}

pub fn spawn_load_cards(panel: &Panel, tx: &UnboundedSender<Action>) {
    let panel = panel.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let _ = tx.send(Action::CardsLoaded(panel.load_cards().await));
    });
}

pub fn spawn_load_alarms(panel: &Panel, tx: &UnboundedSender<Action>) {
    let panel = panel.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let _ = tx.send(Action::AlarmsLoaded(panel.load_alarms().await));
    });
}
