//! Entity records listed by the dataset API.
//!
//! Every record keeps the fields the front end shows and carries the rest
//! of the server's object in `extra`, so new server fields never break
//! decoding.

mod records;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::types::EntityKind;

pub use records::{Article, Locality, Mineral, Photo};

/// A record type served by one collection.
pub trait Entity: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// The collection this record type is listed from.
    const KIND: EntityKind;

    /// Server identifier.
    fn id(&self) -> &str;

    /// Human readable label (the primary field).
    fn label(&self) -> &str;

    /// Optional one-line detail shown next to the label.
    fn detail(&self) -> Option<String> {
        None
    }
}

/// Accepts identifiers the server sends either as strings or as numbers.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// Optional display fields: a value of the wrong shape reads as absent
/// instead of rejecting the record.
pub(crate) fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    use serde::Deserialize;

    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// RFC 3339 timestamps, or bare `YYYY-MM-DD` dates read as midnight UTC.
/// Anything else reads as absent.
pub(crate) fn deserialize_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use serde::Deserialize;

    let serde_json::Value::String(raw) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    Ok(NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| Utc.from_utc_datetime(&at)))
}
