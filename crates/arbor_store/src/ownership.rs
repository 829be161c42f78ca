//! Parent/child ownership edges.
//!
//! Ownership edges form a forest: every child has at most one parent and no
//! entity is its own ancestor. Children keep their attachment order.

use arbor_foundation::{EntityId, Error, LtVec, Result};

/// Ownership forest with forward and reverse indices.
///
/// - Forward: parent -> ordered children
/// - Reverse: child -> parent
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnershipGraph {
    parents: im::HashMap<EntityId, EntityId>,
    children: im::HashMap<EntityId, LtVec<EntityId>>,
}

impl OwnershipGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the owner of a child.
    #[must_use]
    pub fn parent_of(&self, child: EntityId) -> Option<EntityId> {
        self.parents.get(&child).copied()
    }

    /// Iterates the children of a parent in attachment order.
    pub fn children_of(&self, parent: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.children
            .get(&parent)
            .into_iter()
            .flat_map(|kids| kids.iter().copied())
    }

    /// Returns the number of ownership edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.parents.len()
    }

    /// Returns true if `ancestor` owns `id`, directly or transitively.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent_of(parent);
        }
        false
    }

    /// Adds an ownership edge.
    ///
    /// Attaching a child to the parent it already has is a no-op.
    ///
    /// # Errors
    ///
    /// - `MultipleOwnersViolation` if the child already has another parent
    /// - `OwnershipCycle` if the parent is the child or one of its descendants
    pub fn attach(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        if let Some(existing) = self.parent_of(child) {
            if existing == parent {
                return Ok(());
            }
            return Err(Error::multiple_owners(child, existing, parent));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::ownership_cycle(child));
        }

        self.parents.insert(child, parent);
        let kids = self.children.get(&parent).cloned().unwrap_or_default();
        self.children.insert(parent, kids.push_back(child));
        Ok(())
    }

    /// Collects an entity and everything it owns, parents before children.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the ownership chain is deeper than `max_depth`.
    pub fn subtree(&self, root: EntityId, max_depth: usize) -> Result<Vec<EntityId>> {
        let mut out = Vec::new();
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            if depth > max_depth {
                return Err(Error::internal(format!(
                    "ownership depth under {root:?} exceeds {max_depth}"
                )));
            }
            out.push(id);
            let kids: Vec<_> = self.children_of(id).collect();
            // Reverse so the first child is visited first.
            stack.extend(kids.into_iter().rev().map(|kid| (kid, depth + 1)));
        }
        Ok(out)
    }

    /// Removes every edge touching an entity.
    ///
    /// The entity is detached from its parent and its children become roots.
    pub fn detach(&mut self, id: EntityId) {
        if let Some(parent) = self.parents.remove(&id) {
            if let Some(siblings) = self.children.get(&parent).cloned() {
                let remaining = siblings.retain(|kid| *kid != id);
                if remaining.is_empty() {
                    self.children.remove(&parent);
                } else {
                    self.children.insert(parent, remaining);
                }
            }
        }
        if let Some(kids) = self.children.remove(&id) {
            for kid in &kids {
                self.parents.remove(kid);
            }
        }
    }
}
