//! geode-http - HTTP-backed list source.

mod client;
mod proxy;
mod source;

pub use client::{ApiClient, DEFAULT_TIMEOUT};
pub use proxy::Proxy;
pub use source::HttpSource;
