//! List controller tests against a scripted source.
//!
//! Time is paused: the runtime advances the clock whenever every task is
//! idle, so debounce windows elapse instantly and deterministically. Each
//! request the controller makes is handed to the test, which decides when
//! and how it resolves.

use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use geode_core::error::{Error, TransportError};
use geode_core::{
    ApiUrl, Article, Cursor, EntityKind, FilterValue, ListSource, Mineral, QueryParams, RawPage,
    Result, ResultStore, Sort,
};
use geode_list::{ControllerConfig, ListController, Screen};
use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot};

// ============================================================================
// Scripted source
// ============================================================================

/// One request waiting for the test to answer it.
struct Request {
    kind: EntityKind,
    params: QueryParams,
    respond: oneshot::Sender<Result<RawPage>>,
}

impl Request {
    fn filter(&self) -> Option<Value> {
        self.params
            .get("filter")
            .map(|raw| serde_json::from_str(raw).unwrap())
    }

    fn reply(self, results: Vec<Value>, next: Option<&str>) {
        let page = RawPage {
            results,
            next: next.map(|c| Cursor::new(c).unwrap()),
        };
        // The controller may have abandoned the request already.
        let _ = self.respond.send(Ok(page));
    }

    fn fail(self) {
        let _ = self.respond.send(Err(connection_reset()));
    }
}

struct ScriptedSource {
    url: ApiUrl,
    requests: mpsc::UnboundedSender<Request>,
    count: AtomicUsize,
}

impl ScriptedSource {
    fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Request>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Arc::new(Self {
            url: ApiUrl::new("https://api.example.org").unwrap(),
            requests: tx,
            count: AtomicUsize::new(0),
        });
        (source, rx)
    }

    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

fn connection_reset() -> Error {
    Error::Transport(TransportError::Connection {
        message: "connection reset".to_string(),
    })
}

#[async_trait]
impl ListSource for ScriptedSource {
    fn url(&self) -> &ApiUrl {
        &self.url
    }

    async fn list(&self, kind: EntityKind, params: &QueryParams) -> Result<RawPage> {
        self.count.fetch_add(1, Ordering::SeqCst);
        let (respond, answer) = oneshot::channel();
        self.requests
            .send(Request {
                kind,
                params: params.clone(),
                respond,
            })
            .map_err(|_| connection_reset())?;
        answer.await.unwrap_or_else(|_| Err(connection_reset()))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn minerals(prefix: &str, ids: Range<usize>) -> Vec<Value> {
    ids.map(|i| json!({ "id": i, "name": format!("{}-{}", prefix, i) }))
        .collect()
}

fn names(store: &ResultStore<Mineral>) -> Vec<String> {
    store.items.iter().map(|m| m.name.clone()).collect()
}

fn expected(prefix: &str, ids: Range<usize>) -> Vec<String> {
    ids.map(|i| format!("{}-{}", prefix, i)).collect()
}

fn controller(source: &Arc<ScriptedSource>) -> ListController<Mineral> {
    ListController::new(source.clone(), ControllerConfig::default())
}

/// Let every timer and spawned task run to quiescence.
async fn settle() {
    tokio::time::sleep(Duration::from_secs(5)).await;
}

// ============================================================================
// Debounce and replace
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_burst_of_changes_issues_one_fetch_with_final_query() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();

    for text in ["g", "ga", "gar", "garn", "garnet"] {
        assert!(list.set_search_text(text));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let request = requests.recv().await.unwrap();
    assert_eq!(request.filter(), Some(json!({ "name": "garnet" })));
    request.reply(minerals("garnet", 0..3), None);

    settle().await;
    assert_eq!(source.count(), 1);
    assert!(requests.try_recv().is_err());
    assert_eq!(names(&list.snapshot()), expected("garnet", 0..3));
}

#[tokio::test(start_paused = true)]
async fn test_fetch_waits_for_quiet_period() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();

    tokio::time::sleep(Duration::from_millis(299)).await;
    assert_eq!(source.count(), 0);
    assert!(list.snapshot().is_initial_loading);

    let request = requests.recv().await.unwrap();
    assert_eq!(source.count(), 1);
    request.reply(Vec::new(), None);
}

#[tokio::test(start_paused = true)]
async fn test_query_change_resets_store_before_debounce() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();
    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("m", 0..10), Some("abc"));
    assert_eq!(list.wait_idle().await.items.len(), 10);

    assert!(list.set_search_text("quartz"));

    let store = list.snapshot();
    assert!(store.items.is_empty());
    assert!(store.cursor.is_none());
    assert!(store.is_initial_loading);
    assert_eq!(source.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_replace_is_never_visible() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();

    let first = requests.recv().await.unwrap();
    assert!(list.set_search_text("beryl"));
    let second = requests.recv().await.unwrap();
    assert_eq!(second.filter(), Some(json!({ "name": "beryl" })));

    second.reply(minerals("beryl", 0..2), None);
    let store = list.wait_idle().await;
    assert_eq!(names(&store), expected("beryl", 0..2));

    // The older response arrives last.
    first.reply(minerals("stale", 0..5), Some("zzz"));
    settle().await;

    let store = list.snapshot();
    assert_eq!(names(&store), expected("beryl", 0..2));
    assert!(store.cursor.is_none());
    assert!(store.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_query_is_a_no_op() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();
    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("m", 0..2), None);
    list.wait_idle().await;
    let generation = list.generation();

    assert!(!list.set_search_text(""));
    assert!(!list.set_sort(None));
    assert!(!list.remove_filter("hardness"));
    assert!(!list.reset());

    settle().await;
    assert_eq!(source.count(), 1);
    assert_eq!(list.generation(), generation);
    assert_eq!(list.snapshot().items.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_filters_and_sort_reach_the_request() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();
    requests.recv().await.unwrap().reply(Vec::new(), None);
    list.wait_idle().await;

    list.set_filter("hardness", FilterValue::range(6.0, 8.0));
    list.set_filter("crystal_system", FilterValue::choices(["cubic"]));
    list.set_sort(Some(Sort::desc("hardness")));

    let request = requests.recv().await.unwrap();
    assert_eq!(
        request.filter(),
        Some(json!({ "hardness": [6.0, 8.0], "crystal_system": ["cubic"] }))
    );
    assert_eq!(request.params.get("sortBy"), Some("hardness"));
    assert_eq!(request.params.get("sort"), Some("desc"));
    request.reply(Vec::new(), None);
    list.wait_idle().await;

    assert!(list.reset());
    let request = requests.recv().await.unwrap();
    assert!(request.filter().is_none());
    assert!(!request.params.contains("sortBy"));
    request.reply(Vec::new(), None);

    settle().await;
    assert_eq!(source.count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_changes_before_mount_only_shape_the_first_fetch() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);

    assert!(list.set_search_text("spinel"));
    settle().await;
    assert_eq!(source.count(), 0);
    assert!(!list.snapshot().is_initial_loading);

    list.mount();
    let request = requests.recv().await.unwrap();
    assert_eq!(request.filter(), Some(json!({ "name": "spinel" })));
    request.reply(Vec::new(), None);
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_appends_grow_in_order_until_cursor_ends() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();
    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("m", 0..10), Some("c1"));
    list.wait_idle().await;

    for (cursor, ids, next) in [("c1", 10..20, Some("c2")), ("c2", 20..25, None)] {
        assert!(list.end_reached());
        let request = requests.recv().await.unwrap();
        assert_eq!(request.params.get("cursor"), Some(cursor));
        request.reply(minerals("m", ids), next);
        list.wait_idle().await;
    }

    let store = list.snapshot();
    assert_eq!(names(&store), expected("m", 0..25));
    assert!(store.cursor.is_none());

    assert!(!list.end_reached());
    assert!(!list.end_reached());
    settle().await;
    assert_eq!(source.count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_end_reached_is_gated_while_loading() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();

    // Still loading the first page.
    assert!(!list.end_reached());

    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("m", 0..10), Some("c1"));
    list.wait_idle().await;

    assert!(list.end_reached());
    assert!(!list.end_reached());
    let request = requests.recv().await.unwrap();
    request.reply(minerals("m", 10..12), None);

    settle().await;
    assert_eq!(source.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_appends_are_not_debounced() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();
    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("m", 0..10), Some("c1"));
    list.wait_idle().await;

    let before = tokio::time::Instant::now();
    assert!(list.end_reached());
    let request = requests.recv().await.unwrap();
    assert!(before.elapsed() < Duration::from_millis(300));
    request.reply(Vec::new(), None);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_replace_failure_shows_empty_list() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();
    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("m", 0..10), Some("c1"));
    list.wait_idle().await;

    list.set_search_text("olivine");
    requests.recv().await.unwrap().fail();

    let store = list.wait_idle().await;
    assert!(store.items.is_empty());
    assert!(store.cursor.is_none());
    assert!(store.is_empty_result());
    assert_eq!(source.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_page_fails_closed() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();

    requests
        .recv()
        .await
        .unwrap()
        .reply(vec![json!({ "id": 1 })], Some("c1"));

    let store = list.wait_idle().await;
    assert!(store.items.is_empty());
    assert!(store.cursor.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_append_failure_keeps_items_and_cursor() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();
    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("m", 0..10), Some("c1"));
    list.wait_idle().await;

    assert!(list.end_reached());
    requests.recv().await.unwrap().fail();

    let store = list.wait_idle().await;
    assert_eq!(names(&store), expected("m", 0..10));
    assert_eq!(store.cursor, Some(Cursor::new("c1").unwrap()));
    assert!(!store.is_loading_more);

    // Pagination resumes from the same cursor.
    assert!(list.end_reached());
    let retry = requests.recv().await.unwrap();
    assert_eq!(retry.params.get("cursor"), Some("c1"));
    retry.reply(minerals("m", 10..15), None);
    assert_eq!(list.wait_idle().await.items.len(), 15);
}

// ============================================================================
// Generations
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_stale_append_after_replace_is_dropped() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();
    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("m", 0..10), Some("c1"));
    list.wait_idle().await;

    assert!(list.end_reached());
    let append = requests.recv().await.unwrap();

    assert!(list.set_search_text("topaz"));
    let store = list.snapshot();
    assert!(store.items.is_empty());
    assert!(store.is_initial_loading);
    assert!(!store.is_loading_more);

    let replace = requests.recv().await.unwrap();
    assert_eq!(replace.filter(), Some(json!({ "name": "topaz" })));
    replace.reply(minerals("topaz", 0..2), None);
    list.wait_idle().await;

    append.reply(minerals("stale", 10..20), Some("c2"));
    settle().await;

    let store = list.snapshot();
    assert_eq!(names(&store), expected("topaz", 0..2));
    assert!(store.cursor.is_none());
    assert!(store.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_stale_append_before_replace_is_dropped() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();
    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("m", 0..10), Some("c1"));
    list.wait_idle().await;

    assert!(list.end_reached());
    let append = requests.recv().await.unwrap();
    assert!(list.set_search_text("zircon"));

    append.reply(minerals("stale", 10..20), Some("c2"));
    tokio::time::sleep(Duration::from_millis(10)).await;

    let store = list.snapshot();
    assert!(store.items.is_empty());
    assert!(store.is_initial_loading);
    assert!(!store.is_loading_more);

    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("zircon", 0..1), None);
    assert_eq!(names(&list.wait_idle().await), expected("zircon", 0..1));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_end_to_end_two_pages() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();

    let store = list.snapshot();
    assert!(store.is_initial_loading);
    assert!(store.items.is_empty());

    let request = requests.recv().await.unwrap();
    assert_eq!(request.kind, EntityKind::Mineral);
    assert_eq!(request.params.get("limit"), Some("10"));
    assert!(!request.params.contains("filter"));
    assert!(!request.params.contains("cursor"));
    request.reply(minerals("m", 0..10), Some("abc"));

    let store = list.wait_idle().await;
    assert!(!store.is_initial_loading);
    assert_eq!(store.items.len(), 10);
    assert_eq!(store.cursor, Some(Cursor::new("abc").unwrap()));

    assert!(list.end_reached());
    assert!(list.snapshot().is_loading_more);

    let request = requests.recv().await.unwrap();
    assert_eq!(request.params.get("cursor"), Some("abc"));
    request.reply(minerals("m", 10..20), None);

    let store = list.wait_idle().await;
    assert_eq!(store.items.len(), 20);
    assert!(store.cursor.is_none());
    assert!(!store.is_loading_more);

    assert!(!list.end_reached());
    settle().await;
    assert_eq!(source.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unmount_cancels_pending_fetch() {
    let (source, _requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();
    list.unmount();

    settle().await;
    assert_eq!(source.count(), 0);
    assert!(!list.is_mounted());
    assert!(!list.set_search_text("ignored"));
    assert!(!list.end_reached());

    // Already unmounted; returns at once.
    list.wait_idle().await;
}

#[tokio::test(start_paused = true)]
async fn test_dropping_controller_abandons_in_flight_fetch() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    list.mount();

    let request = requests.recv().await.unwrap();
    drop(list);

    request.reply(minerals("m", 0..10), Some("c1"));
    settle().await;
    assert_eq!(source.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_loading_then_results() {
    let (source, mut requests) = ScriptedSource::new();
    let list = controller(&source);
    let mut rx = list.subscribe();

    list.mount();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_initial_loading);

    requests
        .recv()
        .await
        .unwrap()
        .reply(minerals("m", 0..3), None);
    rx.changed().await.unwrap();

    let store = rx.borrow_and_update().clone();
    assert!(!store.is_initial_loading);
    assert_eq!(store.items.len(), 3);
}

// ============================================================================
// Screens
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_mineral_screen_sorts_by_name() {
    let (source, mut requests) = ScriptedSource::new();
    let list: ListController<Mineral> = Screen::Minerals
        .controller(source.clone(), ControllerConfig::default())
        .unwrap();
    list.mount();

    let request = requests.recv().await.unwrap();
    assert_eq!(request.params.get("sortBy"), Some("name"));
    assert_eq!(request.params.get("sort"), Some("asc"));
    request.reply(Vec::new(), None);
}

#[tokio::test(start_paused = true)]
async fn test_screen_rejects_wrong_record_type() {
    let (source, _requests) = ScriptedSource::new();
    let result =
        Screen::Articles.controller::<Mineral>(source.clone(), ControllerConfig::default());
    assert!(result.is_err());

    let articles = Screen::Articles.controller::<Article>(source, ControllerConfig::default());
    assert!(articles.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_page_size_is_configurable() {
    let (source, mut requests) = ScriptedSource::new();
    let list: ListController<Mineral> = ListController::new(
        source.clone(),
        ControllerConfig::default()
            .with_page_size(25)
            .with_debounce(Duration::from_millis(50)),
    );
    list.mount();

    let before = tokio::time::Instant::now();
    let request = requests.recv().await.unwrap();
    assert!(before.elapsed() >= Duration::from_millis(50));
    assert!(before.elapsed() < Duration::from_millis(300));
    assert_eq!(request.params.get("limit"), Some("25"));
    request.reply(Vec::new(), None);
}
