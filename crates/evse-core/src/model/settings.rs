// ── Protection threshold types ──

use serde::{Deserialize, Serialize};

use evse_api::{ConfigPayload, ConfigResponse};

/// Thresholds as stored on the device (`GET /api/config`).
///
/// Missing, zero, or non-finite values fall back to the firmware defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Over-voltage threshold, volts.
    pub ov_threshold: f64,
    /// Under-voltage threshold, volts.
    pub uv_threshold: f64,
    /// DC leakage threshold, milliamps.
    pub leakage_dc: f64,
    /// AC leakage threshold, milliamps.
    pub leakage_ac: f64,
    /// Maximum charge current, amps.
    pub max_current: f64,
}

impl DeviceConfig {
    pub const DEFAULT: Self = Self {
        ov_threshold: 286.0,
        uv_threshold: 154.0,
        leakage_dc: 30.0,
        leakage_ac: 30.0,
        max_current: 32.0,
    };
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<ConfigResponse> for DeviceConfig {
    fn from(raw: ConfigResponse) -> Self {
        let d = Self::DEFAULT;
        Self {
            ov_threshold: or_default(raw.ov_threshold, d.ov_threshold),
            uv_threshold: or_default(raw.uv_threshold, d.uv_threshold),
            leakage_dc: or_default(raw.leakagedc, d.leakage_dc),
            leakage_ac: or_default(raw.leakageac, d.leakage_ac),
            max_current: or_default(raw.maxcc, d.max_current),
        }
    }
}

fn or_default(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => default,
    }
}

/// The editable form behind `POST /api/config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub voltage_deviation: u32,
    pub max_current: u32,
    pub cp_deviation: u32,
    pub leakage_ac: u32,
    pub leakage_dc: u32,
}

impl ConfigUpdate {
    /// Values the reset action restores.
    pub const FACTORY: Self = Self {
        voltage_deviation: 5,
        max_current: 32,
        cp_deviation: 10,
        leakage_ac: 30,
        leakage_dc: 6,
    };

    /// Seed the form from what the device reports. Fields the device does
    /// not expose keep their factory values.
    pub fn seeded_from(device: &DeviceConfig) -> Self {
        Self {
            max_current: to_whole(device.max_current),
            leakage_ac: to_whole(device.leakage_ac),
            leakage_dc: to_whole(device.leakage_dc),
            ..Self::FACTORY
        }
    }

    pub fn to_payload(self) -> ConfigPayload {
        ConfigPayload {
            voltage_deviation: self.voltage_deviation,
            max_current: self.max_current,
            cp_deviation: self.cp_deviation,
            leakage_ac: self.leakage_ac,
            leakage_dc: self.leakage_dc,
        }
    }

    pub fn get(&self, field: FormField) -> u32 {
        match field {
            FormField::VoltageDeviation => self.voltage_deviation,
            FormField::MaxCurrent => self.max_current,
            FormField::CpDeviation => self.cp_deviation,
            FormField::LeakageAc => self.leakage_ac,
            FormField::LeakageDc => self.leakage_dc,
        }
    }

    pub fn set(&mut self, field: FormField, value: u32) {
        let slot = match field {
            FormField::VoltageDeviation => &mut self.voltage_deviation,
            FormField::MaxCurrent => &mut self.max_current,
            FormField::CpDeviation => &mut self.cp_deviation,
            FormField::LeakageAc => &mut self.leakage_ac,
            FormField::LeakageDc => &mut self.leakage_dc,
        };
        *slot = value;
    }
}

impl Default for ConfigUpdate {
    fn default() -> Self {
        Self::FACTORY
    }
}

/// The form's editable fields, in display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::EnumCount,
)]
pub enum FormField {
    #[strum(to_string = "Voltage deviation")]
    VoltageDeviation,
    #[strum(to_string = "Max current")]
    MaxCurrent,
    #[strum(to_string = "CP deviation")]
    CpDeviation,
    #[strum(to_string = "AC leakage")]
    LeakageAc,
    #[strum(to_string = "DC leakage")]
    LeakageDc,
}

impl FormField {
    pub fn unit(self) -> &'static str {
        match self {
            Self::VoltageDeviation | Self::CpDeviation => "%",
            Self::MaxCurrent => "A",
            Self::LeakageAc | Self::LeakageDc => "mA",
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_whole(value: f64) -> u32 {
    // Finite and non-zero by construction; clamp before casting.
    value.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn missing_and_zero_values_fall_back() {
        let cfg = DeviceConfig::from(ConfigResponse {
            ov_threshold: Some(0.0),
            uv_threshold: None,
            leakagedc: Some(6.0),
            leakageac: Some(f64::NAN),
            maxcc: Some(16.0),
        });
        assert_eq!(cfg.ov_threshold, 286.0);
        assert_eq!(cfg.uv_threshold, 154.0);
        assert_eq!(cfg.leakage_dc, 6.0);
        assert_eq!(cfg.leakage_ac, 30.0);
        assert_eq!(cfg.max_current, 16.0);
    }

    #[test]
    fn form_seeds_overlapping_fields_only() {
        let device = DeviceConfig {
            max_current: 16.0,
            leakage_ac: 25.0,
            leakage_dc: 6.0,
            ..DeviceConfig::DEFAULT
        };
        let form = ConfigUpdate::seeded_from(&device);
        assert_eq!(form.max_current, 16);
        assert_eq!(form.leakage_ac, 25);
        assert_eq!(form.leakage_dc, 6);
        assert_eq!(form.voltage_deviation, 5);
        assert_eq!(form.cp_deviation, 10);
    }

    #[test]
    fn get_and_set_cover_every_field() {
        let mut form = ConfigUpdate::FACTORY;
        for (i, field) in FormField::iter().enumerate() {
            let value = u32::try_from(i).unwrap_or_default() + 100;
            form.set(field, value);
            assert_eq!(form.get(field), value);
        }
        assert_eq!(form.to_payload().leakage_dc, 104);
    }
}
