//! Sort specification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Property name that stands for "server default order".
pub(crate) const DEFAULT_SORT_PROPERTY: &str = "default";

/// Ordering direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// Wire representation (`asc` / `desc`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(InvalidInputError::Sort {
                value: s.to_string(),
                reason: "direction must be 'asc' or 'desc'".to_string(),
            }
            .into()),
        }
    }
}

/// A sort property and direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    /// The property to order by.
    pub property: String,
    /// Ordering direction.
    pub direction: SortDirection,
}

impl Sort {
    /// Create a new sort.
    pub fn new(property: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }

    /// Ascending sort on `property`.
    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, SortDirection::Asc)
    }

    /// Descending sort on `property`.
    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, SortDirection::Desc)
    }

    /// Returns true if this sort means "server default order".
    pub fn is_default(&self) -> bool {
        self.property.is_empty() || self.property == DEFAULT_SORT_PROPERTY
    }
}

/// Parses `property` or `property:direction`.
impl FromStr for Sort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (property, direction) = match s.split_once(':') {
            Some((property, direction)) => (property, direction.parse()?),
            None => (s, SortDirection::Asc),
        };

        let property = property.trim();
        if property.is_empty() {
            return Err(InvalidInputError::Sort {
                value: s.to_string(),
                reason: "missing property".to_string(),
            }
            .into());
        }

        Ok(Sort::new(property, direction))
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.direction)
    }
}
