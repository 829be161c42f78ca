//! Weak, named extension links.
//!
//! A link points from one entity to another under a registered relation name.
//! Links carry no ownership: they never cascade and are never part of cycle
//! checks. When either endpoint is removed the link simply disappears.

use std::hash::Hash;

use arbor_foundation::{EntityId, KeywordId, LtVec};

/// Stored links for extensions resolved with `ExtensionResolution::Link`.
///
/// - Forward: (relation, from) -> to
/// - Reverse: to -> [(relation, from)]
/// - Outgoing: from -> [relation]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtensionLinks {
    forward: im::HashMap<(KeywordId, EntityId), EntityId>,
    reverse: im::HashMap<EntityId, LtVec<(KeywordId, EntityId)>>,
    outgoing: im::HashMap<EntityId, LtVec<KeywordId>>,
}

impl ExtensionLinks {
    /// Creates an empty link table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the link target for a relation, if one is stored.
    #[must_use]
    pub fn target(&self, relation: KeywordId, from: EntityId) -> Option<EntityId> {
        self.forward.get(&(relation, from)).copied()
    }

    /// Iterates the (relation, source) pairs that point at an entity.
    pub fn sources(&self, to: EntityId) -> impl Iterator<Item = (KeywordId, EntityId)> + '_ {
        self.reverse
            .get(&to)
            .into_iter()
            .flat_map(|links| links.iter().copied())
    }

    /// Returns the number of stored links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns true if no links are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Stores a link, replacing any previous target for the same source.
    pub fn link(&mut self, relation: KeywordId, from: EntityId, to: EntityId) {
        self.unlink(relation, from);
        self.forward.insert((relation, from), to);
        push_entry(&mut self.reverse, to, (relation, from));
        push_entry(&mut self.outgoing, from, relation);
    }

    /// Removes a link, returning its old target.
    pub fn unlink(&mut self, relation: KeywordId, from: EntityId) -> Option<EntityId> {
        let to = self.forward.remove(&(relation, from))?;
        retain_entries(&mut self.reverse, to, |entry| *entry != (relation, from));
        retain_entries(&mut self.outgoing, from, |r| *r != relation);
        Some(to)
    }

    /// Removes every link that starts or ends at an entity.
    ///
    /// Only the entity's own links are visited.
    pub fn drop_entity(&mut self, id: EntityId) {
        if let Some(relations) = self.outgoing.get(&id).cloned() {
            for relation in &relations {
                self.unlink(*relation, id);
            }
        }
        if let Some(incoming) = self.reverse.get(&id).cloned() {
            for (relation, from) in &incoming {
                self.unlink(*relation, *from);
            }
        }
    }
}

fn push_entry<K, T>(index: &mut im::HashMap<K, LtVec<T>>, key: K, entry: T)
where
    K: Clone + Eq + Hash,
    T: Clone,
{
    let entries = index.get(&key).cloned().unwrap_or_default();
    index.insert(key, entries.push_back(entry));
}

fn retain_entries<K, T>(index: &mut im::HashMap<K, LtVec<T>>, key: K, keep: impl FnMut(&T) -> bool)
where
    K: Clone + Eq + Hash,
    T: Clone,
{
    let Some(entries) = index.get(&key) else {
        return;
    };
    let remaining = entries.retain(keep);
    if remaining.is_empty() {
        index.remove(&key);
    } else {
        index.insert(key, remaining);
    }
}
