//! Entity kinds served by the dataset API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// The listed record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Mineral,
    Locality,
    Photo,
    Article,
}

impl EntityKind {
    /// All kinds, in display order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Mineral,
        EntityKind::Locality,
        EntityKind::Photo,
        EntityKind::Article,
    ];

    /// Collection path on the API (`GET <base>/<collection>`).
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Mineral => "minerals",
            EntityKind::Locality => "localities",
            EntityKind::Photo => "photos",
            EntityKind::Article => "articles",
        }
    }

    /// Singular name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Mineral => "mineral",
            EntityKind::Locality => "locality",
            EntityKind::Photo => "photo",
            EntityKind::Article => "article",
        }
    }

    /// Field that free-text search applies to.
    pub fn primary_field(&self) -> &'static str {
        match self {
            EntityKind::Mineral | EntityKind::Locality => "name",
            EntityKind::Photo | EntityKind::Article => "title",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Accepts the singular or the collection name.
impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.collection() == lower || kind.name() == lower)
            .ok_or_else(|| InvalidInputError::Kind { value: s.to_string() }.into())
    }
}
