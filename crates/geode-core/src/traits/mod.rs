//! Core traits for list sources.

mod source;

pub use source::ListSource;
