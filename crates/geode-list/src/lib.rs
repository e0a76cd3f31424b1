//! geode-list - Incremental query list controller.
//!
//! One [`ListController`] backs one listing screen. It turns search, filter
//! and sort changes into debounced replace fetches, turns "end of list
//! reached" into immediate append fetches, and publishes a
//! [`ResultStore`](geode_core::ResultStore) that readers render.
//!
//! Every fetch carries the query generation it was issued under. A response
//! from an older generation is dropped, whether it belongs to a superseded
//! replace or to an append that was still in flight when the query changed.

mod config;
mod controller;
mod orchestrator;
mod screen;

pub use config::{ControllerConfig, DEFAULT_DEBOUNCE, DEFAULT_PAGE_SIZE};
pub use controller::ListController;
pub use orchestrator::{FetchMode, FetchOutcome, run};
pub use screen::Screen;
