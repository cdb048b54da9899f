// ── Live telemetry types ──

use serde::{Deserialize, Serialize};

use evse_api::StatusResponse;

use super::alarm::CoverState;
use super::tone::Tone;

/// Phase of the charger's state machine, decoded from `charge_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum ChargeState {
    /// Just booted.
    #[strum(to_string = "Starting")]
    Starting,
    /// No plug, no card.
    #[strum(to_string = "Idle")]
    Idle,
    /// Plugged in, waiting for a card swipe.
    #[strum(to_string = "Waiting for card")]
    WaitingForCard,
    /// Card swiped, waiting for the plug.
    #[strum(to_string = "Waiting for plug")]
    WaitingForPlug,
    /// Plugged in and authorized.
    #[strum(to_string = "Ready to charge")]
    Ready,
    #[strum(to_string = "Charging")]
    Charging,
    #[strum(to_string = "Charging paused")]
    Paused,
    #[strum(to_string = "Charging stopped")]
    Stopped,
    #[strum(to_string = "Charging complete")]
    Complete,
    #[strum(to_string = "Fault")]
    Fault,
    /// A code this panel does not know.
    #[strum(to_string = "Unknown state")]
    Unknown(u8),
}

impl ChargeState {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Starting,
            1 => Self::Idle,
            2 => Self::WaitingForCard,
            3 => Self::WaitingForPlug,
            4 => Self::Ready,
            5 => Self::Charging,
            6 => Self::Paused,
            7 => Self::Stopped,
            8 => Self::Complete,
            9 => Self::Fault,
            other => Self::Unknown(other),
        }
    }

    /// Only fault and charging stand out; every other code, unknown ones
    /// included, reads as success.
    pub fn tone(self) -> Tone {
        match self {
            Self::Fault => Tone::Danger,
            Self::Charging => Tone::Info,
            _ => Tone::Success,
        }
    }
}

/// Uplink state, decoded from `net_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum NetworkState {
    /// Access point only.
    #[strum(to_string = "Disconnected")]
    Disconnected,
    /// Access point plus station uplink.
    #[strum(to_string = "Connected")]
    Connected,
    #[strum(to_string = "Unknown network state")]
    Unknown(u8),
}

impl NetworkState {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Disconnected,
            1 => Self::Connected,
            other => Self::Unknown(other),
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Self::Connected => Tone::Success,
            Self::Disconnected | Self::Unknown(_) => Tone::Warning,
        }
    }
}

/// One telemetry sample. Never cached: each poll replaces the last.
///
/// `None` means the device did not report a usable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub power: Option<f64>,
    pub charge_state: Option<ChargeState>,
    pub network_state: Option<NetworkState>,
    // Variant build only.
    pub leakage_ac_ma: Option<f64>,
    pub leakage_dc_ma: Option<f64>,
    pub cover: Option<CoverState>,
    pub cp_voltage: Option<f64>,
}

impl From<StatusResponse> for DeviceStatus {
    fn from(raw: StatusResponse) -> Self {
        Self {
            voltage: raw.voltage,
            current: raw.current,
            power: raw.power,
            charge_state: raw.charge_status.map(ChargeState::from_code),
            network_state: raw.net_status.map(NetworkState::from_code),
            leakage_ac_ma: raw.leakage_ac,
            leakage_dc_ma: raw.leakage_dc,
            cover: raw.cover_status.as_deref().map(CoverState::from_wire),
            cp_voltage: raw.cp_voltage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_code_round_trips() {
        for code in 0..=9 {
            let state = ChargeState::from_code(code);
            assert!(!matches!(state, ChargeState::Unknown(_)), "code {code}");
        }
    }

    #[test]
    fn unknown_codes_keep_their_value() {
        let state = ChargeState::from_code(42);
        assert_eq!(state, ChargeState::Unknown(42));
        assert_eq!(state.to_string(), "Unknown state");
        assert_eq!(state.tone(), Tone::Success);
    }

    #[test]
    fn tones_follow_severity() {
        assert_eq!(ChargeState::Fault.tone(), Tone::Danger);
        assert_eq!(ChargeState::Charging.tone(), Tone::Info);
        assert_eq!(ChargeState::Idle.tone(), Tone::Success);
        assert_eq!(NetworkState::Connected.tone(), Tone::Success);
        assert_eq!(NetworkState::Disconnected.tone(), Tone::Warning);
        assert_eq!(NetworkState::Unknown(4).tone(), Tone::Warning);
    }

    #[test]
    fn network_labels() {
        assert_eq!(NetworkState::from_code(1).to_string(), "Connected");
        assert_eq!(NetworkState::from_code(7).to_string(), "Unknown network state");
    }

    #[test]
    fn status_conversion_maps_codes_and_cover() {
        let status = DeviceStatus::from(StatusResponse {
            voltage: Some(230.0),
            charge_status: Some(9),
            net_status: Some(0),
            cover_status: Some("open".into()),
            ..StatusResponse::default()
        });
        assert_eq!(status.charge_state, Some(ChargeState::Fault));
        assert_eq!(status.network_state, Some(NetworkState::Disconnected));
        assert_eq!(status.cover, Some(CoverState::Open));
        assert_eq!(status.current, None);
    }
}
