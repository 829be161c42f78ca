//! Change logs produced by commits.
//!
//! A [`ChangeLog`] is the ordered diff between a base snapshot and the
//! snapshot a commit produced. Records appear in the order the transaction
//! first touched each entity; cascade removals follow the explicit edits.

use std::sync::Arc;

use arbor_foundation::{EntityId, KeywordId};

use crate::entity::Entity;

/// One entry of a change log.
#[derive(Clone, Debug, PartialEq)]
pub enum Change {
    /// Entity did not exist in the base snapshot.
    Added(Arc<Entity>),
    /// Entity existed in the base snapshot and is gone now.
    Removed {
        /// Removed entity id.
        id: EntityId,
        /// State of the entity in the base snapshot.
        last: Arc<Entity>,
    },
    /// Entity exists in both snapshots with different contents.
    Modified {
        /// Modified entity id.
        id: EntityId,
        /// State in the base snapshot.
        old: Arc<Entity>,
        /// State in the new snapshot.
        new: Arc<Entity>,
    },
}

impl Change {
    /// Returns the id of the affected entity.
    #[must_use]
    pub fn id(&self) -> EntityId {
        match self {
            Self::Added(entity) => entity.id(),
            Self::Removed { id, .. } | Self::Modified { id, .. } => *id,
        }
    }

    /// Returns the type tag of the affected entity.
    #[must_use]
    pub fn entity_type(&self) -> KeywordId {
        match self {
            Self::Added(entity) | Self::Removed { last: entity, .. } => entity.entity_type(),
            Self::Modified { new, .. } => new.entity_type(),
        }
    }

    /// Returns the entity as it is after the change, if it still exists.
    #[must_use]
    pub fn current(&self) -> Option<&Arc<Entity>> {
        match self {
            Self::Added(entity) | Self::Modified { new: entity, .. } => Some(entity),
            Self::Removed { .. } => None,
        }
    }
}

/// Ordered changes between two snapshot versions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeLog {
    from_version: u64,
    to_version: u64,
    changes: Vec<Change>,
}

impl ChangeLog {
    pub(crate) fn new(from_version: u64, to_version: u64, changes: Vec<Change>) -> Self {
        Self {
            from_version,
            to_version,
            changes,
        }
    }

    /// Version of the base snapshot.
    #[must_use]
    pub fn from_version(&self) -> u64 {
        self.from_version
    }

    /// Version of the committed snapshot.
    #[must_use]
    pub fn to_version(&self) -> u64 {
        self.to_version
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns true if the commit changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterates records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Returns the records as a slice.
    #[must_use]
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Iterates added entities.
    pub fn added(&self) -> impl Iterator<Item = &Arc<Entity>> + '_ {
        self.changes.iter().filter_map(|change| match change {
            Change::Added(entity) => Some(entity),
            _ => None,
        })
    }

    /// Iterates removed entities with their last known state.
    pub fn removed(&self) -> impl Iterator<Item = (EntityId, &Arc<Entity>)> + '_ {
        self.changes.iter().filter_map(|change| match change {
            Change::Removed { id, last } => Some((*id, last)),
            _ => None,
        })
    }

    /// Iterates modified entities as (id, old, new).
    pub fn modified(&self) -> impl Iterator<Item = (EntityId, &Arc<Entity>, &Arc<Entity>)> + '_ {
        self.changes.iter().filter_map(|change| match change {
            Change::Modified { id, old, new } => Some((*id, old, new)),
            _ => None,
        })
    }

    /// Iterates records affecting one entity type.
    pub fn of_type(&self, entity_type: KeywordId) -> impl Iterator<Item = &Change> + '_ {
        self.changes
            .iter()
            .filter(move |change| change.entity_type() == entity_type)
    }

    /// Returns the record for an entity, if it changed.
    #[must_use]
    pub fn change_for(&self, id: EntityId) -> Option<&Change> {
        self.changes.iter().find(|change| change.id() == id)
    }
}

impl<'a> IntoIterator for &'a ChangeLog {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}
