//! geode-core - Core types for browsing the mineral reference dataset.
//!
//! This crate holds everything that does no I/O: the entity records, the
//! query state and its translation into transport parameters, the result
//! store and the [`ListSource`] trait that network and file backends
//! implement.

pub mod entity;
pub mod error;
pub mod query;
pub mod store;
pub mod traits;
pub mod types;

pub use entity::{Article, Entity, Locality, Mineral, Photo};
pub use error::Error;
pub use query::{FilterValue, QueryParams, QueryState, build_params};
pub use store::{Page, RawPage, ResultStore};
pub use traits::ListSource;
pub use types::{ApiUrl, Cursor, EntityKind, Sort, SortDirection};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
