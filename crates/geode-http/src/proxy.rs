//! Outgoing URL relay.

use std::fmt;
use std::str::FromStr;

use url::Url;
use url::form_urlencoded::byte_serialize;

use geode_core::Error;
use geode_core::error::InvalidInputError;

/// A relay (typically a CORS proxy) that outgoing requests are routed
/// through.
///
/// The complete target URL, query string included, is percent-encoded and
/// appended to the prefix:
///
/// ```
/// use geode_http::Proxy;
/// use url::Url;
///
/// let proxy = Proxy::new("https://relay.example.org/?url=").unwrap();
/// let target = Url::parse("https://api.example.org/minerals?limit=10").unwrap();
/// assert_eq!(
///     proxy.wrap(&target),
///     "https://relay.example.org/?url=https%3A%2F%2Fapi.example.org%2Fminerals%3Flimit%3D10"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proxy {
    prefix: String,
}

impl Proxy {
    /// Create a proxy from its URL prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is not an absolute http(s) URL.
    pub fn new(prefix: impl Into<String>) -> Result<Self, Error> {
        let prefix = prefix.into();
        let url = Url::parse(&prefix).map_err(|e| InvalidInputError::Other {
            message: format!("invalid proxy prefix '{}': {}", prefix, e),
        })?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(InvalidInputError::Other {
                message: format!("proxy prefix '{}' must be an http(s) URL", prefix),
            }
            .into());
        }

        Ok(Self { prefix })
    }

    /// Returns the configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Route `target` through this proxy.
    pub fn wrap(&self, target: &Url) -> String {
        let encoded: String = byte_serialize(target.as_str().as_bytes()).collect();
        format!("{}{}", self.prefix, encoded)
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)
    }
}

impl FromStr for Proxy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
