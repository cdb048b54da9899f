//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;

use chrono::NaiveDate;

use evse_core::confirm::{self, CLEAR_ALARMS_PROMPT, RESET_SETTINGS_PROMPT};
use evse_core::{
    AlarmRow, CardRow, CollectionView, ConfigUpdate, ConfigView, ConnectionState, Notice,
    TelemetryView,
};

use crate::screen::ScreenId;

/// A destructive action waiting on the y/n dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteCard { id: String },
    ClearAlarms,
    ResetSettings,
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteCard { id } => f.write_str(&confirm::delete_card_prompt(id)),
            Self::ClearAlarms => f.write_str(CLEAR_ALARMS_PROMPT),
            Self::ResetSettings => f.write_str(RESET_SETTINGS_PROMPT),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ──
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Device data (from the data bridge and mutation tasks) ──
    Connection(ConnectionState),
    Telemetry(TelemetryView),
    ConfigLoaded(ConfigView),
    CardsLoaded(CollectionView<CardRow>),
    AlarmsLoaded(CollectionView<AlarmRow>),

    // ── Requests from screens ──
    Reprobe,
    ReloadConfig,
    ReloadCards,
    ReloadAlarms,
    SaveSettings(ConfigUpdate),
    AddCard { id: String, expires: NaiveDate },
    /// Card id failed validation; the add form stays open.
    CardRejected(String),
    /// The add request reached the device; the form closes on success.
    CardSubmitted { success: bool },
    /// Replace the settings form without touching the device.
    FillSettingsForm(ConfigUpdate),

    // ── Confirmation ──
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Notices ──
    Notify(Notice),
}
