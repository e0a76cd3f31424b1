//! List source trait.

use async_trait::async_trait;

use crate::Result;
use crate::query::QueryParams;
use crate::store::RawPage;
use crate::types::{ApiUrl, EntityKind};

/// Something that serves pages of a collection.
///
/// Implementations issue exactly one request per call and do not retry.
/// Cancellation is the caller's business: dropping the returned future
/// abandons the request.
#[async_trait]
pub trait ListSource: Send + Sync {
    /// Returns the base URL this source serves.
    fn url(&self) -> &ApiUrl;

    /// Fetch one page of `kind` for the given parameters.
    async fn list(&self, kind: EntityKind, params: &QueryParams) -> Result<RawPage>;
}
