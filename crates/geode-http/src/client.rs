//! HTTP client for collection endpoints.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderValue};
use tracing::{debug, instrument, trace};
use url::Url;

use geode_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use geode_core::{ApiUrl, EntityKind, QueryParams, RawPage};

use crate::proxy::Proxy;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for `GET <base>/<collection>` requests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api: ApiUrl,
    proxy: Option<Proxy>,
}

impl ApiClient {
    /// Create a new client for the given API.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api: ApiUrl, proxy: Option<Proxy>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("geode/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self { client, api, proxy })
    }

    /// Returns the API URL this client is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// Returns the relay requests go through, if any.
    pub fn proxy(&self) -> Option<&Proxy> {
        self.proxy.as_ref()
    }

    /// The URL actually requested for `kind` and `params`, after the
    /// proxy step.
    pub fn request_url(&self, kind: EntityKind, params: &QueryParams) -> Result<String, Error> {
        let raw = self.api.collection_url(kind.collection());
        let mut url = Url::parse(&raw).map_err(|e| InvalidInputError::ApiUrl {
            value: raw.clone(),
            reason: e.to_string(),
        })?;

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params.iter() {
                pairs.append_pair(key, value);
            }
        }

        Ok(match &self.proxy {
            Some(proxy) => proxy.wrap(&url),
            None => url.into(),
        })
    }

    /// Fetch one page of a collection.
    #[instrument(skip(self, params), fields(api = %self.api, %kind))]
    pub async fn get_page(&self, kind: EntityKind, params: &QueryParams) -> Result<RawPage, Error> {
        let url = self.request_url(kind, params)?;
        debug!(proxied = self.proxy.is_some(), "GET collection page");
        trace!(?params, "query parameters");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    /// Handle a response, parsing the page or the failure.
    async fn handle_response(&self, response: reqwest::Response) -> Result<RawPage, Error> {
        let status = response.status();
        trace!(status = %status, "HTTP response");

        let body = response.text().await.map_err(transport_error)?;

        if status.is_success() {
            let page = serde_json::from_str::<RawPage>(&body)?;
            debug!(
                results = page.results.len(),
                has_next = page.next.is_some(),
                "page received"
            );
            Ok(page)
        } else {
            let message = Some(body.trim().to_string()).filter(|m| !m.is_empty());
            Err(Error::Protocol(ProtocolError::new(status.as_u16(), message)))
        }
    }
}

/// Classify a reqwest failure.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}
