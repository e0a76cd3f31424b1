//! Controller configuration.

use std::time::Duration;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Quiet period before a replace fetch is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Tunables for a [`ListController`](crate::ListController).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Items requested per page (`limit`).
    pub page_size: u32,
    /// Quiet period applied to replace fetches. Appends are never delayed.
    pub debounce: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl ControllerConfig {
    /// Override the page size. Zero is raised to one.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Override the debounce period.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}
