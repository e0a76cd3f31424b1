//! Query Builder: query state to transport parameters.

use serde_json::{Map, Value};

use super::params::{PARAM_CURSOR, PARAM_FILTER, PARAM_LIMIT, PARAM_SORT, PARAM_SORT_BY};
use super::{QueryParams, QueryState};
use crate::types::{Cursor, EntityKind};

/// Build the transport parameters for one page of `kind`.
///
/// Only constraints that are active are emitted. Search text goes into the
/// filter object under the kind's primary field and wins over a structured
/// filter on the same key. Sort emits `sortBy` and `sort` together or not
/// at all.
pub fn build_params(
    state: &QueryState,
    kind: EntityKind,
    page_size: u32,
    cursor: Option<&Cursor>,
) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert(PARAM_LIMIT, page_size.to_string());

    if let Some(cursor) = cursor {
        params.insert(PARAM_CURSOR, cursor.as_str());
    }

    let mut filter = Map::new();
    for (key, value) in state.active_filters() {
        filter.insert(key.clone(), value.to_json());
    }

    let search = state.search_text.trim();
    if !search.is_empty() {
        filter.insert(
            kind.primary_field().to_string(),
            Value::String(search.to_string()),
        );
    }

    if !filter.is_empty() {
        params.insert(PARAM_FILTER, Value::Object(filter).to_string());
    }

    if let Some(sort) = state.effective_sort() {
        params.insert(PARAM_SORT_BY, sort.property.as_str());
        params.insert(PARAM_SORT, sort.direction.as_str());
    }

    params
}
