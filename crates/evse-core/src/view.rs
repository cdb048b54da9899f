// ── Render models ──
//
// Plain data produced by the panel and drawn by the CLI or TUI. Views are
// replaced wholesale on every load; nothing here remembers an earlier
// sample.

use std::time::Duration;

use serde::Serialize;

use crate::format::format_reading;
use crate::model::{
    AlarmRecord, AuthorizedCard, ChargeState, ConfigUpdate, CoverState, DeviceConfig,
    DeviceStatus, NetworkState, Tone,
};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Settle delay between a successful card add and the list reload.
pub const CARD_RELOAD_DELAY: Duration = Duration::from_millis(500);

/// Operator-visible strings.
pub mod text {
    pub const CONNECTED: &str = "Connected to device";
    pub const DISCONNECTED: &str = "Device not connected";
    pub const FETCH_FAILED: &str = "Data fetch failed";
    pub const LOAD_FAILED: &str = "Load failed";
    pub const NO_CARDS: &str = "No authorized cards";
    pub const NO_ALARMS: &str = "No alarm records";
    pub const HANDLED: &str = "Handled";
    pub const UNHANDLED: &str = "Unhandled";
    pub const SETTINGS_SAVED: &str = "Settings saved";
    pub const SAVE_FAILED: &str = "Save failed";
    pub const CARD_ADDED: &str = "Card added";
    pub const ADD_RETRY: &str = "Add failed, please retry";
    pub const DELETE_FAILED: &str = "Delete failed";
    pub const ALARMS_CLEARED: &str = "Alarm records cleared";
    pub const CLEAR_FAILED: &str = "Clear failed";
    pub const SETTINGS_RESET: &str = "Default settings restored";
    pub const LOADING: &str = "Loading...";
}

// ── Status text ─────────────────────────────────────────────────────

/// A label with its display tone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusText {
    pub text: String,
    pub tone: Tone,
}

impl StatusText {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

impl From<ChargeState> for StatusText {
    fn from(state: ChargeState) -> Self {
        Self::new(state.to_string(), state.tone())
    }
}

impl From<NetworkState> for StatusText {
    fn from(state: NetworkState) -> Self {
        Self::new(state.to_string(), state.tone())
    }
}

impl From<CoverState> for StatusText {
    fn from(state: CoverState) -> Self {
        Self::new(state.to_string(), state.tone())
    }
}

// ── Telemetry ───────────────────────────────────────────────────────

/// Dashboard bindings for one telemetry sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryView {
    pub voltage: String,
    pub current: String,
    pub power: String,
    pub charge: StatusText,
    pub network: StatusText,
    /// Variant build readings. `None` when the device did not report them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leakage_ac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leakage_dc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cp_voltage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<StatusText>,
}

impl TelemetryView {
    pub fn from_status(status: &DeviceStatus) -> Self {
        let charge = status.charge_state.map_or_else(
            || StatusText::from(ChargeState::Unknown(u8::MAX)),
            StatusText::from,
        );
        let network = status.network_state.map_or_else(
            || StatusText::from(NetworkState::Unknown(u8::MAX)),
            StatusText::from,
        );
        Self {
            voltage: format_reading(status.voltage, "V"),
            current: format_reading(status.current, "A"),
            power: format_reading(status.power, "W"),
            charge,
            network,
            leakage_ac: status.leakage_ac_ma.map(|v| format_reading(Some(v), "mA")),
            leakage_dc: status.leakage_dc_ma.map(|v| format_reading(Some(v), "mA")),
            cp_voltage: status.cp_voltage.map(|v| format_reading(Some(v), "V")),
            cover: status.cover.map(StatusText::from),
        }
    }

    /// What the dashboard shows after a failed fetch.
    pub fn failed() -> Self {
        Self {
            voltage: format_reading(None, "V"),
            current: format_reading(None, "A"),
            power: format_reading(None, "W"),
            charge: StatusText::new(text::FETCH_FAILED, Tone::Danger),
            network: StatusText::new(text::FETCH_FAILED, Tone::Danger),
            leakage_ac: None,
            leakage_dc: None,
            cp_voltage: None,
            cover: None,
        }
    }

    /// Before the first sample arrives.
    pub fn pending() -> Self {
        Self {
            charge: StatusText::new(text::LOADING, Tone::Neutral),
            network: StatusText::new(text::LOADING, Tone::Neutral),
            ..Self::failed()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.charge.text == text::FETCH_FAILED
    }
}

impl Default for TelemetryView {
    fn default() -> Self {
        Self::pending()
    }
}

// ── Collections ─────────────────────────────────────────────────────

/// A table region: rows, an explicit empty row, or an error row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CollectionView<T> {
    Rows { rows: Vec<T> },
    Empty { message: String },
    Failed { message: String },
}

impl<T> CollectionView<T> {
    pub fn failed() -> Self {
        Self::Failed {
            message: text::LOAD_FAILED.into(),
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Self::Rows { rows } => rows,
            Self::Empty { .. } | Self::Failed { .. } => &[],
        }
    }

    /// The single-row message for empty and failed states.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Rows { .. } => None,
            Self::Empty { message } | Self::Failed { message } => Some(message),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    fn from_rows(rows: Vec<T>, empty: &str) -> Self {
        if rows.is_empty() {
            Self::Empty {
                message: empty.into(),
            }
        } else {
            Self::Rows { rows }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardRow {
    /// 1-based.
    pub index: usize,
    pub id: String,
    pub expires: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmRow {
    /// 1-based, assigned after reversal.
    pub index: usize,
    pub time: String,
    pub cover: StatusText,
    pub handled: StatusText,
}

pub fn render_cards(cards: Vec<AuthorizedCard>) -> CollectionView<CardRow> {
    let rows = cards
        .into_iter()
        .enumerate()
        .map(|(i, card)| CardRow {
            index: i + 1,
            id: card.id,
            expires: card.expires,
        })
        .collect();
    CollectionView::from_rows(rows, text::NO_CARDS)
}

/// Newest first: the device logs oldest first.
pub fn render_alarms(alarms: Vec<AlarmRecord>) -> CollectionView<AlarmRow> {
    let rows = alarms
        .into_iter()
        .rev()
        .enumerate()
        .map(|(i, alarm)| AlarmRow {
            index: i + 1,
            time: alarm.time,
            cover: alarm.cover.into(),
            handled: if alarm.handled {
                StatusText::new(text::HANDLED, Tone::Success)
            } else {
                StatusText::new(text::UNHANDLED, Tone::Warning)
            },
        })
        .collect();
    CollectionView::from_rows(rows, text::NO_ALARMS)
}

// ── Settings ────────────────────────────────────────────────────────

/// Settings screen state after a config load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigView {
    /// What the device reported. `None` when the load failed.
    pub device: Option<DeviceConfig>,
    /// Editable form, seeded from `device` or left at factory values.
    pub form: ConfigUpdate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConfigView {
    pub fn loaded(device: DeviceConfig) -> Self {
        Self {
            form: ConfigUpdate::seeded_from(&device),
            device: Some(device),
            error: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            device: None,
            form: ConfigUpdate::FACTORY,
            error: Some(text::LOAD_FAILED.into()),
        }
    }
}

// ── Notices ─────────────────────────────────────────────────────────

/// Transient feedback after a mutation, hidden after [`NOTICE_TTL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub text: String,
    pub tone: Tone,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Success,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Danger,
        }
    }

    pub fn is_success(&self) -> bool {
        self.tone == Tone::Success
    }
}

/// Result of a mutation flow: the notice to show, plus the reloaded view
/// when the mutation succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome<V> {
    pub notice: Notice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reloaded: Option<V>,
}

impl<V> MutationOutcome<V> {
    pub fn failed(notice: Notice) -> Self {
        Self {
            notice,
            reloaded: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.notice.is_success()
    }
}
