//! Runs a single fetch and resolves it into a tagged outcome.

use tokio_util::sync::CancellationToken;
use tracing::trace;

use geode_core::error::Error;
use geode_core::{Entity, ListSource, Page, QueryParams};

/// Whether a fetch starts a new result set or extends the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// New query: results replace the list.
    Replace,
    /// Pagination continuation: results are appended.
    Append,
}

/// How a fetch ended.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// The source answered with a page that decoded cleanly.
    Success(Page<T>),
    /// Transport failure, non-success status or malformed body.
    Failed(Error),
    /// The token fired before the source answered.
    Cancelled,
}

impl<T> FetchOutcome<T> {
    /// Returns true for [`FetchOutcome::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchOutcome::Cancelled)
    }
}

/// Issue one request for `T` under `token`.
///
/// Cancellation wins ties: if the token has fired by the time the request
/// completes, the answer is discarded as [`FetchOutcome::Cancelled`].
pub async fn run<T: Entity>(
    source: &dyn ListSource,
    params: &QueryParams,
    token: &CancellationToken,
) -> FetchOutcome<T> {
    let kind = T::KIND;
    trace!(%kind, ?params, "issuing fetch");

    tokio::select! {
        biased;
        _ = token.cancelled() => FetchOutcome::Cancelled,
        result = source.list(kind, params) => {
            match result.and_then(|page| page.decode::<T>()) {
                Ok(page) => FetchOutcome::Success(page),
                Err(e) => FetchOutcome::Failed(e),
            }
        }
    }
}
