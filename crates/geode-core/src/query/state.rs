//! Query state.

use std::collections::BTreeMap;

use super::FilterValue;
use crate::types::Sort;

/// The parameters that decide which results a listing shows.
///
/// A query state determines the first page only; pagination cursors live in
/// the result store and never here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    /// Free text matched against the kind's primary field.
    pub search_text: String,
    /// Structured constraints keyed by field.
    pub filters: BTreeMap<String, FilterValue>,
    /// Ordering; `None` means server default order.
    pub sort: Option<Sort>,
}

impl QueryState {
    /// An unconstrained query in server default order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style search text.
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Builder-style filter.
    pub fn with_filter(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.filters.insert(key.into(), value);
        self
    }

    /// Builder-style sort.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// The sort to send, if any. A "default" sort counts as none.
    pub fn effective_sort(&self) -> Option<&Sort> {
        self.sort.as_ref().filter(|s| !s.is_default())
    }

    /// Structured filters that constrain the listing.
    pub fn active_filters(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.filters.iter().filter(|(_, value)| value.is_active())
    }

    /// Returns true if search text or any filter narrows the listing.
    pub fn is_constrained(&self) -> bool {
        !self.search_text.trim().is_empty() || self.active_filters().next().is_some()
    }
}
