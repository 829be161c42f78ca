//! Symbolic ids and the index that keeps them unique.
//!
//! A symbolic id is a business key derived from an entity's fields, scoped to
//! a namespace. Keys are never stored on the entity; the index is refreshed on
//! every commit by re-deriving the key of each touched entity.

use std::fmt;

use arbor_foundation::{EntityId, Error, KeywordId, LtVec, Result, Value};

/// A derived business key, unique within its namespace.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SymbolicId {
    namespace: KeywordId,
    key: LtVec<Value>,
}

impl SymbolicId {
    /// Creates a symbolic id from its namespace and key components.
    pub fn new(namespace: KeywordId, key: impl IntoIterator<Item = Value>) -> Self {
        Self {
            namespace,
            key: key.into_iter().collect(),
        }
    }

    /// Returns the uniqueness namespace.
    #[must_use]
    pub fn namespace(&self) -> KeywordId {
        self.namespace
    }

    /// Returns the key components, in rule order.
    #[must_use]
    pub fn key(&self) -> &LtVec<Value> {
        &self.key
    }
}

impl fmt::Debug for SymbolicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolicId({:?}, {:?})", self.namespace, self.key)
    }
}

/// Unique mapping from symbolic id to entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymbolicIndex {
    by_key: im::HashMap<SymbolicId, EntityId>,
    by_entity: im::HashMap<EntityId, SymbolicId>,
}

impl SymbolicIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entity holding a key.
    #[must_use]
    pub fn lookup(&self, key: &SymbolicId) -> Option<EntityId> {
        self.by_key.get(key).copied()
    }

    /// Returns the key currently indexed for an entity.
    #[must_use]
    pub fn key_of(&self, id: EntityId) -> Option<&SymbolicId> {
        self.by_entity.get(&id)
    }

    /// Returns the number of indexed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns true if no keys are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Drops the entry for an entity, returning its old key.
    pub fn remove(&mut self, id: EntityId) -> Option<SymbolicId> {
        let key = self.by_entity.remove(&id)?;
        if self.by_key.get(&key) == Some(&id) {
            self.by_key.remove(&key);
        }
        Some(key)
    }

    /// Re-indexes a batch of touched entities.
    ///
    /// Each entry carries the freshly derived key, or `None` when the entity
    /// was removed or has no symbolic id. All stale entries are dropped before
    /// any new key is inserted, so two entities may swap keys in one batch.
    ///
    /// # Errors
    ///
    /// Returns `SymbolicIdConflict` when a new key is already held by another
    /// entity. The index is left partially updated; callers apply this to a
    /// scratch copy and discard it on failure.
    pub fn reindex(
        &mut self,
        touched: &[(EntityId, Option<SymbolicId>)],
        describe: impl Fn(&SymbolicId) -> String,
    ) -> Result<()> {
        for (id, _) in touched {
            self.remove(*id);
        }
        for (id, key) in touched {
            let Some(key) = key else { continue };
            if let Some(existing) = self.lookup(key) {
                return Err(Error::symbolic_id_conflict(describe(key), existing, *id));
            }
            self.by_key.insert(key.clone(), *id);
            self.by_entity.insert(*id, key.clone());
        }
        Ok(())
    }
}
