//! Query state and its translation into transport parameters.

mod builder;
mod filter;
mod params;
mod state;

pub use builder::build_params;
pub use filter::FilterValue;
pub use params::{PARAM_CURSOR, PARAM_FILTER, PARAM_LIMIT, PARAM_SORT, PARAM_SORT_BY, QueryParams};
pub use state::QueryState;
