//! A versioned holder for the current snapshot.
//!
//! [`VersionedStore`] owns the head of one lineage. Each successful update
//! installs a new snapshot, keeps a bounded history of previous ones, and
//! tells registered listeners what changed.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use arbor_foundation::{Error, ErrorContext, Result};
use tracing::debug;

use crate::builder::Builder;
use crate::changelog::ChangeLog;
use crate::config::StoreConfig;
use crate::registry::TypeRegistry;
use crate::snapshot::Snapshot;

/// What a listener receives after a commit.
#[derive(Clone, Debug)]
pub struct ChangeEvent {
    /// Snapshot the commit started from.
    pub before: Snapshot,
    /// Snapshot the commit produced.
    pub after: Snapshot,
    /// Ordered diff between the two.
    pub log: ChangeLog,
}

/// Receives change notifications from a [`VersionedStore`].
pub trait ChangeListener: Send + Sync {
    /// Called once per installed commit.
    fn changed(&self, event: &ChangeEvent);
}

impl<F> ChangeListener for F
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    fn changed(&self, event: &ChangeEvent) {
        self(event);
    }
}

/// Handle returned by [`VersionedStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The current snapshot of a lineage plus its recent history.
pub struct VersionedStore {
    current: Snapshot,
    history: VecDeque<Snapshot>,
    config: StoreConfig,
    listeners: Vec<(ListenerId, Arc<dyn ChangeListener>)>,
    next_listener: u64,
}

impl VersionedStore {
    /// Creates a store holding an empty snapshot of a new lineage.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>, config: StoreConfig) -> Self {
        Self::from_snapshot(Snapshot::empty(registry), config)
    }

    /// Creates a store whose head is an existing snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot, config: StoreConfig) -> Self {
        Self {
            current: snapshot,
            history: VecDeque::new(),
            config,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Returns the current snapshot. Cloning it is O(1).
    #[must_use]
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Iterates retained previous snapshots, newest first.
    pub fn history(&self) -> impl Iterator<Item = &Snapshot> + '_ {
        self.history.iter()
    }

    /// Opens a builder on the current snapshot.
    #[must_use]
    pub fn open(&self) -> Builder {
        self.current.open_with(self.config.clone())
    }

    /// Commits a builder opened on the current snapshot and installs the result.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the builder was opened on a different lineage
    /// or an older version, or any commit rejection. The current snapshot is
    /// unchanged on error.
    pub fn commit(&mut self, builder: Builder) -> Result<ChangeLog> {
        let base = builder.base();
        if base.lineage() != self.current.lineage() || base.version() != self.current.version() {
            return Err(Error::internal(format!(
                "builder opened on lineage {} v{}, store is at lineage {} v{}",
                base.lineage(),
                base.version(),
                self.current.lineage(),
                self.current.version()
            ))
            .with_context(ErrorContext::new().with_operation("commit")));
        }
        let (snapshot, log) = builder.commit()?;
        self.install(snapshot, log.clone());
        Ok(log)
    }

    /// Opens a builder, applies `edit`, and commits.
    ///
    /// # Errors
    ///
    /// Returns the closure's error or any commit rejection. The current
    /// snapshot is unchanged and no listener is called on error.
    pub fn update<F>(&mut self, edit: F) -> Result<ChangeLog>
    where
        F: FnOnce(&mut Builder) -> Result<()>,
    {
        let mut builder = self.open();
        edit(&mut builder)?;
        self.commit(builder)
    }

    /// Registers a listener.
    pub fn subscribe(&mut self, listener: impl ChangeListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    fn install(&mut self, snapshot: Snapshot, log: ChangeLog) {
        let before = std::mem::replace(&mut self.current, snapshot);
        if self.config.history_size > 0 {
            self.history.push_front(before.clone());
            self.history.truncate(self.config.history_size);
        }

        if log.is_empty() && !self.config.notify_empty_commits {
            return;
        }
        debug!(
            version = self.current.version(),
            listeners = self.listeners.len(),
            "notify"
        );
        let event = ChangeEvent {
            before,
            after: self.current.clone(),
            log,
        };
        for (_, listener) in &self.listeners {
            listener.changed(&event);
        }
    }
}

impl fmt::Debug for VersionedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedStore")
            .field("current", &self.current)
            .field("history", &self.history.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
