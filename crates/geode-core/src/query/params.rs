//! Transport-level query parameters.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};
use crate::types::{Cursor, Sort};

/// Page size parameter.
pub const PARAM_LIMIT: &str = "limit";
/// Continuation cursor parameter.
pub const PARAM_CURSOR: &str = "cursor";
/// JSON-encoded filter object parameter.
pub const PARAM_FILTER: &str = "filter";
/// Sort property parameter.
pub const PARAM_SORT_BY: &str = "sortBy";
/// Sort direction parameter.
pub const PARAM_SORT: &str = "sort";

/// Parameter name to string value, in a stable order.
///
/// Serializes as a flat map so it can be handed straight to an HTTP
/// client's query-string encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    /// An empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Returns the value of a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns true if the parameter is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy of these parameters continuing from `cursor`.
    pub fn with_cursor(&self, cursor: &Cursor) -> Self {
        let mut params = self.clone();
        params.insert(PARAM_CURSOR, cursor.as_str());
        params
    }

    /// The requested page size.
    pub fn limit(&self) -> Result<Option<usize>, Error> {
        self.get(PARAM_LIMIT)
            .map(|raw| {
                raw.parse::<usize>().map_err(|e| {
                    InvalidInputError::Other {
                        message: format!("invalid limit '{}': {}", raw, e),
                    }
                    .into()
                })
            })
            .transpose()
    }

    /// The continuation cursor, if any.
    pub fn cursor(&self) -> Option<&str> {
        self.get(PARAM_CURSOR)
    }

    /// Decodes the `filter` parameter into its JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is present but is not a JSON object.
    pub fn filter_object(&self) -> Result<Option<Map<String, Value>>, Error> {
        let Some(raw) = self.get(PARAM_FILTER) else {
            return Ok(None);
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Err(InvalidInputError::Filter {
                value: raw.to_string(),
                reason: "must be a JSON object".to_string(),
            }
            .into()),
            Err(e) => Err(InvalidInputError::Filter {
                value: raw.to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    /// The requested sort, if any.
    pub fn sort(&self) -> Result<Option<Sort>, Error> {
        let Some(property) = self.get(PARAM_SORT_BY) else {
            return Ok(None);
        };
        let direction = self.get(PARAM_SORT).unwrap_or("asc").parse()?;
        Ok(Some(Sort::new(property, direction)))
    }
}
