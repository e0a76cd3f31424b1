//! geode-file - Filesystem-backed list source.
//!
//! Serves `<root>/<collection>.json` (a JSON array of objects) and applies
//! the same filter, sort and cursor parameters the remote API accepts.
//! Used for local development against fixture data and in tests.

mod filter;
mod source;

pub use source::{DEFAULT_LIMIT, FileSource};
