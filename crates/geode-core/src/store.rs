//! Result pages and the result store.

use serde::{Deserialize, Deserializer, Serialize};

use crate::Result;
use crate::entity::Entity;
use crate::error::Error;
use crate::types::Cursor;

/// One page as returned by a source: `{ "results": [...], "next": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in server order.
    pub results: Vec<T>,

    /// Cursor for the next page; `None` once the list is exhausted.
    #[serde(default, deserialize_with = "deserialize_next")]
    pub next: Option<Cursor>,
}

/// A page whose items have not been decoded yet.
pub type RawPage = Page<serde_json::Value>;

impl<T> Page<T> {
    /// A page with no further pages after it.
    pub fn last(results: Vec<T>) -> Self {
        Self {
            results,
            next: None,
        }
    }
}

impl RawPage {
    /// Decode every item into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if any item does not match `T`; a page is
    /// accepted whole or not at all.
    pub fn decode<T: Entity>(self) -> Result<Page<T>> {
        let results = self
            .results
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<T>(value).map_err(|e| {
                    Error::Decode(format!("{} #{}: {}", T::KIND.name(), index, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            results,
            next: self.next,
        })
    }
}

/// Servers signal the end with `null`, a missing key or an empty string.
fn deserialize_next<'de, D>(deserializer: D) -> std::result::Result<Option<Cursor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| Cursor::new(s).ok()))
}

/// The materialized view a listing renders.
///
/// The store itself has no behavior beyond its transitions; the list
/// controller decides when each one happens.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultStore<T> {
    /// Items in server order; never deduplicated.
    pub items: Vec<T>,
    /// Where the next append continues from.
    pub cursor: Option<Cursor>,
    /// A replace fetch is pending or in flight.
    pub is_initial_loading: bool,
    /// An append fetch is in flight.
    pub is_loading_more: bool,
}

impl<T> Default for ResultStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            is_initial_loading: false,
            is_loading_more: false,
        }
    }
}

impl<T> ResultStore<T> {
    /// An empty, idle store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if neither fetch phase is active.
    pub fn is_idle(&self) -> bool {
        !self.is_initial_loading && !self.is_loading_more
    }

    /// Returns true if an append may be issued now.
    pub fn can_load_more(&self) -> bool {
        self.cursor.is_some() && self.is_idle()
    }

    /// Returns true if the listing finished loading with nothing to show.
    ///
    /// A failed fetch and a genuinely empty result look the same here.
    pub fn is_empty_result(&self) -> bool {
        !self.is_initial_loading && self.items.is_empty()
    }

    /// Start over for a new query.
    pub fn begin_replace(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.is_initial_loading = true;
        self.is_loading_more = false;
    }

    /// Mark an append as in flight.
    pub fn begin_append(&mut self) {
        self.is_loading_more = true;
    }

    /// A replace fetch succeeded.
    pub fn apply_replace(&mut self, page: Page<T>) {
        self.items = page.results;
        self.cursor = page.next;
        self.is_initial_loading = false;
    }

    /// A replace fetch failed: show nothing rather than stale items.
    pub fn fail_replace(&mut self) {
        self.items.clear();
        self.cursor = None;
        self.is_initial_loading = false;
    }

    /// An append fetch succeeded.
    pub fn apply_append(&mut self, page: Page<T>) {
        self.items.extend(page.results);
        self.cursor = page.next;
        self.is_loading_more = false;
    }

    /// An append fetch failed: keep what is visible, pagination stalls.
    pub fn fail_append(&mut self) {
        self.is_loading_more = false;
    }
}
