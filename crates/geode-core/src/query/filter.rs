//! Structured filter values.

use serde_json::{Value, json};

/// One structured constraint on a listing.
///
/// Each variant knows when it is "active". Inactive filters are never sent:
/// the API reads an absent key as "no constraint", which is not the same as
/// a key carrying the default value.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Free text on a field. Active when non-blank.
    Text(String),
    /// Numeric range. Active when `value` differs from `default` and at
    /// least one bound is finite.
    Range {
        value: (f64, f64),
        default: (f64, f64),
    },
    /// Multi-select. Active when at least one choice is selected.
    Choices(Vec<String>),
    /// Geographic radius around a point. Active when `km > 0`.
    Radius {
        latitude: f64,
        longitude: f64,
        km: f64,
    },
}

impl FilterValue {
    /// Text filter.
    pub fn text(s: impl Into<String>) -> Self {
        FilterValue::Text(s.into())
    }

    /// Range filter whose default is the open range `(-inf, +inf)`,
    /// so it is active as soon as it is set.
    pub fn range(min: f64, max: f64) -> Self {
        FilterValue::Range {
            value: (min, max),
            default: (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    /// Range filter bounded by a slider's default position.
    pub fn bounded_range(value: (f64, f64), default: (f64, f64)) -> Self {
        FilterValue::Range { value, default }
    }

    /// Multi-select filter.
    pub fn choices<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterValue::Choices(choices.into_iter().map(Into::into).collect())
    }

    /// Radius filter.
    pub fn radius(latitude: f64, longitude: f64, km: f64) -> Self {
        FilterValue::Radius {
            latitude,
            longitude,
            km,
        }
    }

    /// Returns true if this filter constrains the listing.
    pub fn is_active(&self) -> bool {
        match self {
            FilterValue::Text(s) => !s.trim().is_empty(),
            FilterValue::Range { value, default } => {
                value != default && (value.0.is_finite() || value.1.is_finite())
            }
            FilterValue::Choices(choices) => !choices.is_empty(),
            FilterValue::Radius { km, .. } => *km > 0.0,
        }
    }

    /// JSON encoding used inside the `filter` parameter.
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Text(s) => Value::String(s.trim().to_string()),
            FilterValue::Range { value, .. } => json!([bound(value.0), bound(value.1)]),
            FilterValue::Choices(choices) => json!(choices),
            FilterValue::Radius {
                latitude,
                longitude,
                km,
            } => json!({ "lat": latitude, "lng": longitude, "km": km }),
        }
    }
}

/// Open (infinite) range bounds are sent as `null`.
fn bound(v: f64) -> Value {
    if v.is_finite() { json!(v) } else { Value::Null }
}
