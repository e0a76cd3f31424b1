//! The list controller: query triggers, fetch scheduling and the store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use geode_core::{
    Entity, FilterValue, ListSource, QueryParams, QueryState, ResultStore, Sort, build_params,
};

use crate::config::ControllerConfig;
use crate::orchestrator::{self, FetchMode, FetchOutcome};

/// The list controller behind one screen.
///
/// Query changes reset the store at once and schedule a debounced replace
/// fetch; `end_reached` issues an append fetch immediately. Readers observe
/// the store through [`snapshot`](Self::snapshot),
/// [`subscribe`](Self::subscribe) or [`updates`](Self::updates) and never see
/// an error: failed fetches resolve to an empty list (replace) or leave the
/// list untouched (append).
///
/// Triggers spawn onto the current Tokio runtime and must be called from
/// within one. Dropping the controller unmounts it.
pub struct ListController<T: Entity> {
    shared: Arc<Shared<T>>,
}

struct Shared<T: Entity> {
    source: Arc<dyn ListSource>,
    config: ControllerConfig,
    /// Fires on unmount; every fetch token is a child of it.
    screen: CancellationToken,
    control: Mutex<Control>,
    store: watch::Sender<ResultStore<T>>,
}

#[derive(Debug, Default)]
struct Control {
    query: QueryState,
    /// Bumped on every replace; responses from older generations are dropped.
    generation: u64,
    replace_token: Option<CancellationToken>,
    mounted: bool,
}

impl<T: Entity> ListController<T> {
    /// Create an unmounted controller with an empty query.
    pub fn new(source: Arc<dyn ListSource>, config: ControllerConfig) -> Self {
        Self::with_query(source, config, QueryState::new())
    }

    /// Create an unmounted controller starting from `query`.
    pub fn with_query(
        source: Arc<dyn ListSource>,
        config: ControllerConfig,
        query: QueryState,
    ) -> Self {
        let (store, _) = watch::channel(ResultStore::new());
        Self {
            shared: Arc::new(Shared {
                source,
                config,
                screen: CancellationToken::new(),
                control: Mutex::new(Control {
                    query,
                    ..Control::default()
                }),
                store,
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.shared.config
    }

    /// Show the screen: reset the store and schedule the first page.
    ///
    /// Mounting twice, or after unmount, does nothing.
    #[instrument(skip(self), fields(kind = %T::KIND))]
    pub fn mount(&self) {
        let mut control = self.shared.control();
        if control.mounted || self.shared.screen.is_cancelled() {
            debug!("mount ignored");
            return;
        }
        control.mounted = true;
        self.shared.schedule_replace(&mut control);
    }

    /// Tear the screen down: abandon pending and in-flight fetches.
    ///
    /// Triggers after this are ignored.
    pub fn unmount(&self) {
        if self.shared.screen.is_cancelled() {
            return;
        }
        debug!(kind = %T::KIND, "unmounting list");
        let mut control = self.shared.control();
        control.mounted = false;
        control.replace_token = None;
        self.shared.screen.cancel();
    }

    /// Returns true between `mount` and `unmount`.
    pub fn is_mounted(&self) -> bool {
        self.shared.control().mounted
    }

    /// Set the free-text search. Returns true if the query changed.
    pub fn set_search_text(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update(|query| query.search_text = text)
    }

    /// Set or replace a structured filter. Returns true if the query changed.
    pub fn set_filter(&self, key: impl Into<String>, value: FilterValue) -> bool {
        let key = key.into();
        self.update(|query| {
            query.filters.insert(key, value);
        })
    }

    /// Remove a structured filter. Returns true if the query changed.
    pub fn remove_filter(&self, key: &str) -> bool {
        self.update(|query| {
            query.filters.remove(key);
        })
    }

    /// Set the sort; `None` restores server default order.
    /// Returns true if the query changed.
    pub fn set_sort(&self, sort: Option<Sort>) -> bool {
        self.update(|query| query.sort = sort)
    }

    /// Replace the whole query. Returns true if it changed.
    pub fn set_query(&self, next: QueryState) -> bool {
        self.update(|query| *query = next)
    }

    /// Clear search, filters and sort. Returns true if the query changed.
    pub fn reset(&self) -> bool {
        self.set_query(QueryState::new())
    }

    /// The user scrolled to the end of the visible list.
    ///
    /// Issues an append fetch right away if there is a next page and no
    /// fetch is running. Returns true if a fetch was issued.
    pub fn end_reached(&self) -> bool {
        let control = self.shared.control();
        if !control.mounted || self.shared.screen.is_cancelled() {
            return false;
        }

        let cursor = {
            let store = self.shared.store.borrow();
            match &store.cursor {
                Some(cursor) if store.is_idle() => cursor.clone(),
                _ => return false,
            }
        };

        let generation = control.generation;
        let params = build_params(
            &control.query,
            T::KIND,
            self.shared.config.page_size,
            Some(&cursor),
        );
        self.shared.store.send_modify(ResultStore::begin_append);

        debug!(kind = %T::KIND, generation, %cursor, "end of list reached, loading more");

        // Appends outlive query changes; the generation check drops them.
        let token = self.shared.screen.child_token();
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let outcome = orchestrator::run::<T>(shared.source.as_ref(), &params, &token).await;
            shared.resolve(generation, FetchMode::Append, outcome);
        });

        true
    }

    /// The current query.
    pub fn query(&self) -> QueryState {
        self.shared.control().query.clone()
    }

    /// The current query generation.
    pub fn generation(&self) -> u64 {
        self.shared.control().generation
    }

    /// A copy of the current store.
    pub fn snapshot(&self) -> ResultStore<T> {
        self.shared.store.borrow().clone()
    }

    /// A receiver that is notified on every store transition.
    pub fn subscribe(&self) -> watch::Receiver<ResultStore<T>> {
        self.shared.store.subscribe()
    }

    /// Store snapshots as a stream, starting with the current one.
    pub fn updates(&self) -> WatchStream<ResultStore<T>> {
        WatchStream::new(self.subscribe())
    }

    /// Wait until neither fetch phase is active (or the screen is gone) and
    /// return the store at that point.
    pub async fn wait_idle(&self) -> ResultStore<T> {
        let mut rx = self.subscribe();
        tokio::select! {
            biased;
            _ = self.shared.screen.cancelled() => self.snapshot(),
            result = rx.wait_for(ResultStore::is_idle) => match result {
                Ok(store) => store.clone(),
                Err(_) => self.snapshot(),
            },
        }
    }

    fn update(&self, change: impl FnOnce(&mut QueryState)) -> bool {
        let mut control = self.shared.control();
        if self.shared.screen.is_cancelled() {
            debug!(kind = %T::KIND, "query change after unmount ignored");
            return false;
        }

        let mut next = control.query.clone();
        change(&mut next);
        if next == control.query {
            return false;
        }
        control.query = next;

        if control.mounted {
            self.shared.schedule_replace(&mut control);
        }
        true
    }
}

impl<T: Entity> Drop for ListController<T> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<T: Entity> std::fmt::Debug for ListController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let control = self.shared.control();
        f.debug_struct("ListController")
            .field("kind", &T::KIND)
            .field("query", &control.query)
            .field("generation", &control.generation)
            .field("mounted", &control.mounted)
            .finish()
    }
}

impl<T: Entity> Shared<T> {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new generation: supersede the running replace, show the
    /// loading state now and fetch after the quiet period.
    fn schedule_replace(self: &Arc<Self>, control: &mut Control) {
        control.generation += 1;
        let generation = control.generation;

        if let Some(previous) = control.replace_token.take() {
            previous.cancel();
        }
        let token = self.screen.child_token();
        control.replace_token = Some(token.clone());

        let params: QueryParams =
            build_params(&control.query, T::KIND, self.config.page_size, None);
        self.store.send_modify(ResultStore::begin_replace);

        debug!(kind = %T::KIND, generation, "replace scheduled");

        let shared = Arc::clone(self);
        let debounce = self.config.debounce;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(kind = %T::KIND, generation, "replace superseded before it was sent");
                    return;
                }
                _ = tokio::time::sleep(debounce) => {}
            }

            let outcome = orchestrator::run::<T>(shared.source.as_ref(), &params, &token).await;
            shared.resolve(generation, FetchMode::Replace, outcome);
        });
    }

    /// Fold a finished fetch into the store if it is still current.
    fn resolve(&self, generation: u64, mode: FetchMode, outcome: FetchOutcome<T>) {
        let control = self.control();

        if outcome.is_cancelled() {
            debug!(kind = %T::KIND, generation, ?mode, "fetch cancelled");
            return;
        }
        if generation != control.generation || self.screen.is_cancelled() {
            debug!(
                kind = %T::KIND,
                generation,
                current = control.generation,
                ?mode,
                "dropping stale response"
            );
            return;
        }

        match (mode, outcome) {
            (FetchMode::Replace, FetchOutcome::Success(page)) => {
                debug!(
                    kind = %T::KIND,
                    generation,
                    results = page.results.len(),
                    "replace applied"
                );
                self.store.send_modify(|store| store.apply_replace(page));
            }
            (FetchMode::Replace, FetchOutcome::Failed(e)) => {
                warn!(
                    kind = %T::KIND,
                    generation,
                    error = %e,
                    "replace fetch failed, showing empty list"
                );
                self.store.send_modify(ResultStore::fail_replace);
            }
            (FetchMode::Append, FetchOutcome::Success(page)) => {
                debug!(
                    kind = %T::KIND,
                    generation,
                    results = page.results.len(),
                    "append applied"
                );
                self.store.send_modify(|store| store.apply_append(page));
            }
            (FetchMode::Append, FetchOutcome::Failed(e)) => {
                warn!(
                    kind = %T::KIND,
                    generation,
                    error = %e,
                    "append fetch failed, keeping current items"
                );
                self.store.send_modify(ResultStore::fail_append);
            }
            (_, FetchOutcome::Cancelled) => {}
        }
    }
}
