//! Configuration for builders and versioned stores.

/// Configuration for the store.
///
/// Controls history retention, listener notification, and cascade limits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of previous snapshots a `VersionedStore` retains (0 disables history).
    pub history_size: usize,

    /// Whether listeners are called for commits that changed nothing.
    pub notify_empty_commits: bool,

    /// Maximum ownership depth followed by cascade removal.
    pub max_cascade_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_size: 16,
            notify_empty_commits: false,
            max_cascade_depth: 1024,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration that keeps no history.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            history_size: 0,
            ..Self::default()
        }
    }

    /// Creates a configuration for debugging: deep history, every commit notified.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            history_size: 256,
            notify_empty_commits: true,
            max_cascade_depth: 1024,
        }
    }

    /// Builder method to set history size.
    #[must_use]
    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    /// Builder method to enable/disable notification of empty commits.
    #[must_use]
    pub fn with_notify_empty_commits(mut self, notify: bool) -> Self {
        self.notify_empty_commits = notify;
        self
    }

    /// Builder method to set the cascade depth limit.
    #[must_use]
    pub fn with_max_cascade_depth(mut self, depth: usize) -> Self {
        self.max_cascade_depth = depth;
        self
    }
}
