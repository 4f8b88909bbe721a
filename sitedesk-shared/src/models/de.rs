//! Lenient deserializers for request payloads coming from the web forms.
//!
//! The frontend posts empty strings for untouched inputs and sends money as
//! whatever the user typed, so request structs opt into these per field.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use std::{fmt::Display, str::FromStr};

use crate::format::sanitize_amount;

/// Treats a missing, null, or blank string as `None`, otherwise parses it
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Like [`blank_as_none`], for fields of a partial update
///
/// A missing field stays `None` (pair with `#[serde(default)]`); a field sent
/// as null or blank becomes `Some(None)` so the stored value is cleared.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    blank_as_none(deserializer).map(Some)
}

/// [`amount`] for nullable money columns of a partial update
pub fn nullable_amount<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    amount(deserializer).map(Some)
}

/// Accepts a JSON number or a free-form money string such as `"$1,234.56"`
///
/// Strings that contain no number at all become `0.0`.
pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => Some(sanitize_amount(&s).unwrap_or(0.0)),
        Some(other) => return Err(de::Error::custom(format!("invalid amount: {other}"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Form {
        #[serde(default, deserialize_with = "blank_as_none")]
        deadline: Option<NaiveDate>,
        #[serde(default, deserialize_with = "amount")]
        cost: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    struct Changes {
        #[serde(default, deserialize_with = "nullable")]
        notes: Option<Option<String>>,
        #[serde(default, deserialize_with = "nullable")]
        deadline: Option<Option<NaiveDate>>,
        #[serde(default, deserialize_with = "nullable_amount")]
        cost: Option<Option<f64>>,
    }

    #[test]
    fn test_blank_date_is_none() {
        let form: Form = serde_json::from_str(r#"{"deadline": ""}"#).unwrap();
        assert!(form.deadline.is_none());

        let form: Form = serde_json::from_str(r#"{"deadline": "2025-03-01"}"#).unwrap();
        assert_eq!(form.deadline, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(serde_json::from_str::<Form>(r#"{"deadline": "soon"}"#).is_err());
    }

    #[test]
    fn test_amount_accepts_numbers_and_strings() {
        let form: Form = serde_json::from_str(r#"{"cost": 250.5}"#).unwrap();
        assert_eq!(form.cost, Some(250.5));

        let form: Form = serde_json::from_str(r#"{"cost": "$1,234.56abc"}"#).unwrap();
        assert_eq!(form.cost, Some(1234.56));

        let form: Form = serde_json::from_str(r#"{"cost": "n/a"}"#).unwrap();
        assert_eq!(form.cost, Some(0.0));

        let form: Form = serde_json::from_str("{}").unwrap();
        assert_eq!(form.cost, None);
    }
    #[test]
    fn test_nullable_tells_missing_from_cleared() {
        let changes: Changes = serde_json::from_str("{}").unwrap();
        assert_eq!(changes.notes, None);
        assert_eq!(changes.deadline, None);
        assert_eq!(changes.cost, None);

        let changes: Changes =
            serde_json::from_str(r#"{"notes": null, "deadline": "", "cost": null}"#).unwrap();
        assert_eq!(changes.notes, Some(None));
        assert_eq!(changes.deadline, Some(None));
        assert_eq!(changes.cost, Some(None));

        let changes: Changes =
            serde_json::from_str(r#"{"notes": "Paid in cash", "deadline": "2025-04-30", "cost": "1,500"}"#)
                .unwrap();
        assert_eq!(changes.notes, Some(Some("Paid in cash".to_string())));
        assert_eq!(changes.deadline, Some(NaiveDate::from_ymd_opt(2025, 4, 30)));
        assert_eq!(changes.cost, Some(Some(1500.0)));
    }
}
