// ── Panel ──
//
// The dashboard controller: one connectivity probe, on-demand loaders for
// the three collections, and the mutation flows. Every device failure is
// caught here and turned into a degraded view or a notice; nothing is
// retried.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use evse_api::{Ack, EvseClient, TransportConfig};

use crate::config::PanelConfig;
use crate::confirm::{self, ConfirmGate};
use crate::error::CoreError;
use crate::model::{AlarmRecord, AuthorizedCard, CardId, ConfigUpdate, DeviceConfig, DeviceStatus, NewCard};
use crate::poller::TelemetryPoller;
use crate::view::{
    self, AlarmRow, CARD_RELOAD_DELAY, CardRow, CollectionView, ConfigView, MutationOutcome,
    Notice, TelemetryView, text,
};

// ── ConnectionState ──────────────────────────────────────────────

/// Result of the connectivity probe, observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Probe not finished yet.
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => text::LOADING,
            Self::Connected => text::CONNECTED,
            Self::Disconnected => text::DISCONNECTED,
        }
    }
}

// ── Panel ────────────────────────────────────────────────────────

/// Entry point for the CLI and TUI.
///
/// Cheaply cloneable via `Arc<PanelInner>`.
#[derive(Clone)]
pub struct Panel {
    inner: Arc<PanelInner>,
}

struct PanelInner {
    config: PanelConfig,
    client: EvseClient,
    connection: watch::Sender<ConnectionState>,
}

impl Panel {
    /// Build the HTTP client for `config`. Does not contact the device.
    pub fn new(config: PanelConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = EvseClient::new(config.url.clone(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Wrap an existing client.
    pub fn with_client(config: PanelConfig, client: EvseClient) -> Self {
        let (connection, _) = watch::channel(ConnectionState::Unknown);
        Self {
            inner: Arc::new(PanelInner {
                config,
                client,
                connection,
            }),
        }
    }

    pub fn config(&self) -> &PanelConfig {
        &self.inner.config
    }

    /// Raw API access. Errors are returned, not degraded.
    pub fn client(&self) -> &EvseClient {
        &self.inner.client
    }

    /// A telemetry poller bound to this panel at the configured period.
    pub fn poller(&self) -> TelemetryPoller {
        TelemetryPoller::new(self.clone(), self.inner.config.poll_interval)
    }

    // ── Connectivity ─────────────────────────────────────────────

    /// Probe `/api/ping` once, bounded by `probe_timeout`.
    ///
    /// Resolves within the bound even if the transport would wait longer.
    pub async fn probe(&self) -> ConnectionState {
        let bound = self.inner.config.probe_timeout;
        let result = tokio::time::timeout(bound, self.inner.client.ping(bound)).await;

        let state = match result {
            Ok(Ok(())) => {
                info!(url = %self.inner.config.url, "device reachable");
                ConnectionState::Connected
            }
            Ok(Err(e)) => {
                warn!(error = %e, "connectivity probe failed");
                ConnectionState::Disconnected
            }
            Err(_) => {
                warn!(bound = ?bound, "connectivity probe timed out");
                ConnectionState::Disconnected
            }
        };
        self.inner.connection.send_replace(state);
        state
    }

    /// Subscribe to probe results.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection.subscribe()
    }

    // ── Telemetry ────────────────────────────────────────────────

    pub async fn fetch_status(&self) -> Result<DeviceStatus, CoreError> {
        let raw = self.inner.client.get_status().await?;
        Ok(raw.into())
    }

    /// One telemetry sample rendered for display. Failures render as
    /// [`TelemetryView::failed`].
    pub async fn telemetry(&self) -> TelemetryView {
        match self.fetch_status().await {
            Ok(status) => TelemetryView::from_status(&status),
            Err(e) => {
                warn!(error = %e, "status fetch failed");
                TelemetryView::failed()
            }
        }
    }

    // ── Collection loaders ───────────────────────────────────────

    pub async fn load_config(&self) -> ConfigView {
        match self.inner.client.get_config().await {
            Ok(raw) => ConfigView::loaded(DeviceConfig::from(raw)),
            Err(e) => {
                warn!(error = %e, "config load failed");
                ConfigView::failed()
            }
        }
    }

    pub async fn load_cards(&self) -> CollectionView<CardRow> {
        match self.inner.client.list_cards().await {
            Ok(raw) => view::render_cards(raw.into_iter().map(AuthorizedCard::from).collect()),
            Err(e) => {
                warn!(error = %e, "card list load failed");
                CollectionView::failed()
            }
        }
    }

    pub async fn load_alarms(&self) -> CollectionView<AlarmRow> {
        match self.inner.client.list_alarms().await {
            Ok(raw) => view::render_alarms(raw.into_iter().map(AlarmRecord::from).collect()),
            Err(e) => {
                warn!(error = %e, "alarm list load failed");
                CollectionView::failed()
            }
        }
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Submit the settings form; reload config once on success.
    pub async fn save_config(&self, update: &ConfigUpdate) -> MutationOutcome<ConfigView> {
        match self.inner.client.set_config(&update.to_payload()).await {
            Ok(Ack { success: true, .. }) => {
                info!(?update, "settings saved");
                MutationOutcome {
                    notice: Notice::success(text::SETTINGS_SAVED),
                    reloaded: Some(self.load_config().await),
                }
            }
            Ok(ack) => {
                warn!(msg = ?ack.msg, "device rejected settings");
                MutationOutcome::failed(Notice::failure(text::SAVE_FAILED))
            }
            Err(e) => {
                warn!(error = %e, "settings save failed");
                MutationOutcome::failed(Notice::failure(text::SAVE_FAILED))
            }
        }
    }

    /// Validate and submit a new card, then reload the list after the
    /// settle delay.
    ///
    /// Only an invalid id is an `Err`; it is raised before any request.
    pub async fn add_card(
        &self,
        raw_id: &str,
        expires: NaiveDate,
    ) -> Result<MutationOutcome<CollectionView<CardRow>>, CoreError> {
        let id: CardId = raw_id.parse()?;
        let card = NewCard { id, expires };

        let outcome = match self.inner.client.add_card(&card.to_entry()).await {
            Ok(Ack { success: true, .. }) => {
                info!(id = %card.id, %expires, "card added");
                tokio::time::sleep(CARD_RELOAD_DELAY).await;
                MutationOutcome {
                    notice: Notice::success(text::CARD_ADDED),
                    reloaded: Some(self.load_cards().await),
                }
            }
            Ok(ack) => {
                let msg = ack.msg.unwrap_or_else(|| "unknown error".into());
                warn!(id = %card.id, %msg, "device rejected card");
                MutationOutcome::failed(Notice::failure(format!("Add failed: {msg}")))
            }
            Err(e) => {
                warn!(error = %e, "card add failed");
                MutationOutcome::failed(Notice::failure(text::ADD_RETRY))
            }
        };
        Ok(outcome)
    }

    /// Delete one card after confirmation. `None` when declined.
    pub async fn delete_card(
        &self,
        id: &str,
        gate: &(dyn ConfirmGate + Sync),
    ) -> Option<MutationOutcome<CollectionView<CardRow>>> {
        if !gate.confirm(&confirm::delete_card_prompt(id)) {
            debug!(id, "card delete declined");
            return None;
        }

        let outcome = match self.inner.client.delete_card(id).await {
            Ok(Ack { success: true, .. }) => {
                info!(id, "card deleted");
                MutationOutcome {
                    notice: Notice::success(format!("Card {id} deleted")),
                    reloaded: Some(self.load_cards().await),
                }
            }
            Ok(ack) => {
                warn!(id, msg = ?ack.msg, "device refused card delete");
                MutationOutcome::failed(Notice::failure(text::DELETE_FAILED))
            }
            Err(e) => {
                warn!(error = %e, id, "card delete failed");
                MutationOutcome::failed(Notice::failure(text::DELETE_FAILED))
            }
        };
        Some(outcome)
    }

    /// Wipe the alarm log after confirmation. `None` when declined.
    pub async fn clear_alarms(
        &self,
        gate: &(dyn ConfirmGate + Sync),
    ) -> Option<MutationOutcome<CollectionView<AlarmRow>>> {
        if !gate.confirm(confirm::CLEAR_ALARMS_PROMPT) {
            debug!("alarm clear declined");
            return None;
        }

        let outcome = match self.inner.client.clear_alarms().await {
            Ok(Ack { success: true, .. }) => {
                info!("alarm records cleared");
                MutationOutcome {
                    notice: Notice::success(text::ALARMS_CLEARED),
                    reloaded: Some(self.load_alarms().await),
                }
            }
            Ok(ack) => {
                warn!(msg = ?ack.msg, "device refused alarm clear");
                MutationOutcome::failed(Notice::failure(text::CLEAR_FAILED))
            }
            Err(e) => {
                warn!(error = %e, "alarm clear failed");
                MutationOutcome::failed(Notice::failure(text::CLEAR_FAILED))
            }
        };
        Some(outcome)
    }

    /// Factory form values after confirmation. Submits nothing.
    pub fn reset_form(&self, gate: &dyn ConfirmGate) -> Option<ConfigUpdate> {
        gate.confirm(confirm::RESET_SETTINGS_PROMPT)
            .then_some(ConfigUpdate::FACTORY)
    }
}
