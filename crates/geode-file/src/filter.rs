//! Filter and sort evaluation over JSON records.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use geode_core::error::{Error, InvalidInputError};
use geode_core::{Sort, SortDirection};

/// Mean Earth radius used for radius filters.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// `[min, max]` where either bound may be `null` (open).
fn is_range(items: &[Value]) -> bool {
    items.len() == 2
        && items.iter().all(|v| v.is_number() || v.is_null())
        && items.iter().any(Value::is_number)
}

/// One compiled constraint from the `filter` object.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Predicate {
    /// Case-insensitive substring match.
    Contains { field: String, needle: String },
    /// Numeric field within `[min, max]`.
    Between { field: String, min: f64, max: f64 },
    /// Field value (or any element of an array field) is one of `choices`.
    AnyOf { field: String, choices: Vec<String> },
    /// `latitude`/`longitude` within `km` of a point.
    Within { lat: f64, lng: f64, km: f64 },
}

impl Predicate {
    /// Compile a decoded filter object.
    pub(crate) fn compile(filter: &Map<String, Value>) -> Result<Vec<Predicate>, Error> {
        filter
            .iter()
            .map(|(field, value)| Self::compile_one(field, value))
            .collect()
    }

    fn compile_one(field: &str, value: &Value) -> Result<Predicate, Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::Filter {
                value: format!("{}={}", field, value),
                reason: reason.to_string(),
            }
            .into()
        };

        match value {
            Value::String(needle) => Ok(Predicate::Contains {
                field: field.to_string(),
                needle: needle.to_lowercase(),
            }),
            Value::Array(items) if is_range(items) => {
                let min = items[0].as_f64().unwrap_or(f64::NEG_INFINITY);
                let max = items[1].as_f64().unwrap_or(f64::INFINITY);
                Ok(Predicate::Between {
                    field: field.to_string(),
                    min,
                    max,
                })
            }
            Value::Array(items) => {
                let choices = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| invalid("choices must be strings"))?;
                Ok(Predicate::AnyOf {
                    field: field.to_string(),
                    choices,
                })
            }
            Value::Object(point) => {
                let coord = |key: &str| point.get(key).and_then(Value::as_f64);
                match (coord("lat"), coord("lng"), coord("km")) {
                    (Some(lat), Some(lng), Some(km)) => Ok(Predicate::Within { lat, lng, km }),
                    _ => Err(invalid("radius needs numeric lat, lng and km")),
                }
            }
            _ => Err(invalid("unsupported filter value")),
        }
    }

    /// Returns true if `record` satisfies this constraint.
    pub(crate) fn matches(&self, record: &Value) -> bool {
        match self {
            Predicate::Contains { field, needle } => record
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(needle.as_str())),
            Predicate::Between { field, min, max } => record
                .get(field)
                .and_then(Value::as_f64)
                .is_some_and(|v| v >= *min && v <= *max),
            Predicate::AnyOf { field, choices } => match record.get(field) {
                Some(Value::String(s)) => choices.iter().any(|c| c == s),
                Some(Value::Array(values)) => values
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|s| choices.iter().any(|c| c == s)),
                _ => false,
            },
            Predicate::Within { lat, lng, km } => {
                let coord = |key: &str| record.get(key).and_then(Value::as_f64);
                match (coord("latitude"), coord("longitude")) {
                    (Some(rlat), Some(rlng)) => haversine_km(*lat, *lng, rlat, rlng) <= *km,
                    _ => false,
                }
            }
        }
    }
}

/// Great-circle distance between two points in kilometres.
pub(crate) fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Order records by `sort`. Records missing the property go last in
/// either direction.
pub(crate) fn sort_records(records: &mut [Value], sort: &Sort) {
    records.sort_by(|a, b| {
        match (a.get(&sort.property), b.get(&sort.property)) {
            (Some(x), Some(y)) if !x.is_null() && !y.is_null() => {
                let ordering = compare_values(x, y);
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
            (Some(x), _) if !x.is_null() => Ordering::Less,
            (_, Some(y)) if !y.is_null() => Ordering::Greater,
            _ => Ordering::Equal,
        }
    });
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => value_key(a).cmp(&value_key(b)),
    }
}

fn value_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    }
}
