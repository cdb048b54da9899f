// Wire models for the device API.
//
// Field names follow the firmware's JSON exactly. The device is loose about
// types (numbers arrive as strings, nulls appear for unread sensors), so
// numeric fields decode leniently into `Option` and never fail the payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `GET /api/status` body.
///
/// Every field is optional: a missing or unreadable value is `None` and the
/// panel renders a placeholder for it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub voltage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub power: Option<f64>,
    /// Charge state machine code (0-9 on current firmware).
    #[serde(default, deserialize_with = "lenient_u8")]
    pub charge_status: Option<u8>,
    /// Uplink state code (0 = AP only, 1 = AP+STA).
    #[serde(default, deserialize_with = "lenient_u8")]
    pub net_status: Option<u8>,

    // Variant build fields. Absent on the base firmware.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub leakage_ac: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub leakage_dc: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cover_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cp_voltage: Option<f64>,
}

/// `GET /api/config` body: the protection thresholds stored on the device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ConfigResponse {
    /// Over-voltage threshold (V).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ov_threshold: Option<f64>,
    /// Under-voltage threshold (V).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub uv_threshold: Option<f64>,
    /// DC leakage threshold (mA).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub leakagedc: Option<f64>,
    /// AC leakage threshold (mA).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub leakageac: Option<f64>,
    /// Maximum charge current (A).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub maxcc: Option<f64>,
}

/// `POST /api/config` body. All fields are integers on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    pub voltage_deviation: u32,
    pub max_current: u32,
    pub cp_deviation: u32,
    #[serde(rename = "leakageAC")]
    pub leakage_ac: u32,
    #[serde(rename = "leakageDC")]
    pub leakage_dc: u32,
}

/// One entry of `GET /api/cards`, also the `POST /api/cards` body.
///
/// A broken entry decodes with empty fields so the rest of the list still
/// renders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CardEntry {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub id: String,
    /// ISO `YYYY-MM-DD`, passed through as sent.
    #[serde(rename = "expireDate", default, deserialize_with = "string_or_empty")]
    pub expire_date: String,
}

/// One entry of `GET /api/alarms`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AlarmEntry {
    /// Timestamp as the device reports it (string or number).
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(rename = "coverStatus", default, deserialize_with = "lenient_string")]
    pub cover_status: Option<String>,
    #[serde(default)]
    pub handled: bool,
}

/// Application-level acknowledgement returned by every mutation.
///
/// A missing `success` reads as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

// ── Lenient decoders ────────────────────────────────────────────────

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

fn lenient_u8<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u8>().ok(),
        _ => None,
    }))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_tolerates_missing_and_malformed_fields() {
        let status: StatusResponse = serde_json::from_value(json!({
            "voltage": "229.84",
            "current": null,
            "power": "n/a",
            "charge_status": 5
        }))
        .unwrap();

        assert_eq!(status.voltage, Some(229.84));
        assert_eq!(status.current, None);
        assert_eq!(status.power, None);
        assert_eq!(status.charge_status, Some(5));
        assert_eq!(status.net_status, None);
    }

    #[test]
    fn out_of_range_codes_decode_as_none() {
        let status: StatusResponse =
            serde_json::from_value(json!({ "charge_status": 300, "net_status": -1 })).unwrap();
        assert_eq!(status.charge_status, None);
        assert_eq!(status.net_status, None);
    }

    #[test]
    fn numeric_card_ids_become_strings() {
        let card: CardEntry =
            serde_json::from_value(json!({ "id": 12_345_678, "expireDate": "2027-01-01" })).unwrap();
        assert_eq!(card.id, "12345678");
    }

    #[test]
    fn broken_card_entries_do_not_fail_the_list() {
        let cards: Vec<CardEntry> = serde_json::from_value(json!([
            { "id": "12345678", "expireDate": "2027-01-01" },
            { "id": null, "expireDate": "2027-02-01" },
            { "expireDate": null },
            { "id": "87654321" }
        ]))
        .unwrap();

        assert_eq!(cards.len(), 4);
        assert_eq!(cards[1].id, "");
        assert_eq!(cards[1].expire_date, "2027-02-01");
        assert_eq!(cards[2].id, "");
        assert_eq!(cards[2].expire_date, "");
        assert_eq!(cards[3].expire_date, "");
    }

    #[test]
    fn alarm_time_accepts_numbers() {
        let alarm: AlarmEntry =
            serde_json::from_value(json!({ "time": 1, "coverStatus": "open" })).unwrap();
        assert_eq!(alarm.time.as_deref(), Some("1"));
        assert!(!alarm.handled);
    }

    #[test]
    fn ack_without_success_is_a_failure() {
        let ack: Ack = serde_json::from_value(json!({ "msg": "busy" })).unwrap();
        assert!(!ack.success);
        assert_eq!(ack.msg.as_deref(), Some("busy"));
    }

    #[test]
    fn config_payload_uses_firmware_field_names() {
        let payload = ConfigPayload {
            voltage_deviation: 5,
            max_current: 32,
            cp_deviation: 10,
            leakage_ac: 30,
            leakage_dc: 6,
        };
        insta::assert_json_snapshot!(payload, @r#"
        {
          "voltageDeviation": 5,
          "maxCurrent": 32,
          "cpDeviation": 10,
          "leakageAC": 30,
          "leakageDC": 6
        }
        "#);
    }
}
