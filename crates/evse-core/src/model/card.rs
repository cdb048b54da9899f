// ── Authorized card types ──

use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use evse_api::CardEntry;

use crate::error::CoreError;

const CARD_ID_LEN: usize = 8;
const EXPIRY_FORMAT: &str = "%Y-%m-%d";

/// An RFID card number: exactly eight ASCII digits.
///
/// The only client-side validation the panel performs. Constructing one is
/// the gate in front of `POST /api/cards`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CardId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == CARD_ID_LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(CoreError::ValidationFailed {
                message: "Card ID must be 8 digits".into(),
            })
        }
    }
}

impl TryFrom<String> for CardId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CardId> for String {
    fn from(id: CardId) -> Self {
        id.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated card ready to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub id: CardId,
    pub expires: NaiveDate,
}

impl NewCard {
    pub fn to_entry(&self) -> CardEntry {
        CardEntry {
            id: self.id.to_string(),
            expire_date: self.expires.format(EXPIRY_FORMAT).to_string(),
        }
    }
}

/// One allowlist entry as the device reports it.
///
/// The id is not re-validated: whatever the device stores is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedCard {
    pub id: String,
    /// Raw `expireDate` string.
    pub expires: String,
}

impl From<CardEntry> for AuthorizedCard {
    fn from(raw: CardEntry) -> Self {
        Self {
            id: raw.id,
            expires: raw.expire_date,
        }
    }
}

/// Expiry offered by default when adding a card: one calendar year out.
///
/// Feb 29 clamps to Feb 28.
pub fn default_expiry(today: NaiveDate) -> NaiveDate {
    today.checked_add_months(Months::new(12)).unwrap_or(today)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_eight_digits() {
        let id: CardId = "01234567".parse().unwrap();
        assert_eq!(id.as_str(), "01234567");
    }

    #[test]
    fn surrounding_whitespace_is_rejected() {
        for padded in [" 12345678", "12345678\n", "\t12345678 "] {
            assert!(padded.parse::<CardId>().is_err(), "input {padded:?}");
        }
    }

    #[test]
    fn rejects_wrong_length_and_non_digits() {
        for bad in ["1234", "123456789", "1234567a", "", "１２３４５６７８"] {
            let err = bad.parse::<CardId>().unwrap_err();
            assert_eq!(err.to_string(), "Card ID must be 8 digits", "input {bad:?}");
        }
    }

    #[test]
    fn new_card_serializes_iso_date() {
        let card = NewCard {
            id: "12345678".parse().unwrap(),
            expires: NaiveDate::from_ymd_opt(2027, 3, 1).unwrap(),
        };
        let entry = card.to_entry();
        assert_eq!(entry.expire_date, "2027-03-01");
    }

    #[test]
    fn default_expiry_is_one_year_out() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(default_expiry(today), NaiveDate::from_ymd_opt(2027, 10, 19).unwrap());

        let leap = NaiveDate::from_ymd_opt(2028, 2, 29).unwrap();
        assert_eq!(default_expiry(leap), NaiveDate::from_ymd_opt(2029, 2, 28).unwrap());
    }
}
