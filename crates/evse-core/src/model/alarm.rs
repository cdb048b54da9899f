// ── Alarm log types ──

use serde::{Deserialize, Serialize};

use evse_api::AlarmEntry;

use super::tone::Tone;

/// Enclosure tamper sensor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
pub enum CoverState {
    #[strum(to_string = "Abnormally open")]
    Open,
    #[strum(to_string = "Normally closed")]
    Closed,
}

impl CoverState {
    /// Only the literal `"open"` means open.
    pub fn from_wire(raw: &str) -> Self {
        if raw == "open" { Self::Open } else { Self::Closed }
    }

    pub fn tone(self) -> Tone {
        match self {
            Self::Open => Tone::Danger,
            Self::Closed => Tone::Success,
        }
    }
}

/// One entry of the device's append-only fault log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    /// Passed through verbatim; the firmware decides the format.
    pub time: String,
    pub cover: CoverState,
    pub handled: bool,
}

impl From<AlarmEntry> for AlarmRecord {
    fn from(raw: AlarmEntry) -> Self {
        Self {
            time: raw.time.unwrap_or_default(),
            cover: raw
                .cover_status
                .as_deref()
                .map_or(CoverState::Closed, CoverState::from_wire),
            handled: raw.handled,
        }
    }
}
