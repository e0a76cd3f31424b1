//! Core geode types.
//!
//! These types enforce their invariants at construction time,
//! so an invalid URL, cursor or sort cannot reach a source.

mod api_url;
mod cursor;
mod kind;
mod sort;

pub use api_url::ApiUrl;
pub use cursor::Cursor;
pub use kind::EntityKind;
pub use sort::{Sort, SortDirection};
