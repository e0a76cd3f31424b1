//! HTTP-backed list source.

use std::time::Duration;

use async_trait::async_trait;

use geode_core::{ApiUrl, EntityKind, ListSource, QueryParams, RawPage, Result};

use crate::client::{ApiClient, DEFAULT_TIMEOUT};
use crate::proxy::Proxy;

/// A network-backed list source for the dataset API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: ApiClient,
}

impl HttpSource {
    /// Create a source for `api` with no proxy and the default timeout.
    pub fn new(api: ApiUrl) -> Result<Self> {
        Self::with_options(api, None, DEFAULT_TIMEOUT)
    }

    /// Create a source routing requests through `proxy`, if given.
    pub fn with_options(api: ApiUrl, proxy: Option<Proxy>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(api, proxy, timeout)?,
        })
    }

    /// Access the underlying client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl ListSource for HttpSource {
    fn url(&self) -> &ApiUrl {
        self.client.api()
    }

    async fn list(&self, kind: EntityKind, params: &QueryParams) -> Result<RawPage> {
        self.client.get_page(kind, params).await
    }
}
