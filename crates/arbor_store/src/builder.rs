//! Single-writer transactions over a snapshot.
//!
//! A [`Builder`] keeps a private working copy of its base snapshot. Field
//! edits are validated at the call site; cross-entity invariants (symbolic
//! id uniqueness, ownership consistency) are checked once, in [`Builder::commit`].
//! Dropping a builder without committing leaves the base snapshot untouched.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use arbor_foundation::{EntityId, Error, ErrorContext, KeywordId, Result, Value};
use tracing::{debug, trace, warn};

use crate::changelog::{Change, ChangeLog};
use crate::config::StoreConfig;
use crate::entity::{Entity, EntityMut, EntitySource};
use crate::schema::{EntitySchema, ExtensionResolution};
use crate::snapshot::Snapshot;

/// A mutable transaction over one base snapshot.
pub struct Builder {
    base: Snapshot,
    working: Snapshot,
    config: StoreConfig,
    /// Entities in the order the transaction first touched them.
    touched: Vec<EntityId>,
    touched_set: HashSet<EntityId>,
    /// Every id removed during this transaction, explicitly or by cascade.
    removed: HashSet<EntityId>,
    /// Ownership edges (parent, child) validated at commit.
    pending_edges: Vec<(EntityId, EntityId)>,
    links_changed: bool,
}

impl Builder {
    /// Opens a builder with the default configuration.
    #[must_use]
    pub fn open(base: &Snapshot) -> Self {
        Self::open_with(base, StoreConfig::default())
    }

    /// Opens a builder.
    #[must_use]
    pub fn open_with(base: &Snapshot, config: StoreConfig) -> Self {
        Self {
            base: base.clone(),
            working: base.clone(),
            config,
            touched: Vec::new(),
            touched_set: HashSet::new(),
            removed: HashSet::new(),
            pending_edges: Vec::new(),
            links_changed: false,
        }
    }

    /// Returns the snapshot this builder was opened on.
    #[must_use]
    pub fn base(&self) -> &Snapshot {
        &self.base
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Reads an entity from the working state.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.working.get(id)
    }

    /// Returns true if the entity exists in the working state.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.working.contains(id)
    }

    /// Iterates entities of one type in the working state.
    pub fn all_of_type(&self, entity_type: KeywordId) -> impl Iterator<Item = &Entity> + '_ {
        self.working.all_of_type(entity_type)
    }

    /// Returns the committed owner of an entity, if any.
    ///
    /// Edges attached in this transaction become visible after commit.
    #[must_use]
    pub fn parent_of(&self, child: EntityId) -> Option<EntityId> {
        self.working.ownership.parent_of(child)
    }

    /// Iterates the children of a parent, committed edges first, then edges
    /// attached in this transaction.
    pub fn children_of(&self, parent: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        let pending = self
            .pending_edges
            .iter()
            .filter(move |(p, child)| *p == parent && self.working.contains(*child))
            .map(|(_, child)| *child);
        self.working.ownership.children_of(parent).chain(pending)
    }

    /// Returns true if anything was created, modified, removed, attached, or linked.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.touched.is_empty() || !self.pending_edges.is_empty() || self.links_changed
    }

    /// Creates an entity.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` for an unregistered type, or `SchemaViolation`
    /// if a required field is missing, a field is undeclared, or a value has
    /// the wrong type. Nothing is created on error.
    pub fn create_entity(
        &mut self,
        entity_type: KeywordId,
        fields: impl IntoIterator<Item = (KeywordId, Value)>,
        source: EntitySource,
    ) -> Result<EntityId> {
        let fields = self.working.registry.create_fields(entity_type, fields)?;
        let id = self.working.allocate();
        self.working
            .put(Arc::new(Entity::new(id, entity_type, source, fields)));
        self.touch(id);
        Ok(id)
    }

    /// Creates an entity owned by `parent`.
    ///
    /// # Errors
    ///
    /// As [`Builder::create_entity`], plus `SchemaViolation` if the parent
    /// exists and its type may not own `entity_type`.
    pub fn create_child(
        &mut self,
        parent: EntityId,
        entity_type: KeywordId,
        fields: impl IntoIterator<Item = (KeywordId, Value)>,
        source: EntitySource,
    ) -> Result<EntityId> {
        self.check_owner_type(parent, entity_type)?;
        let child = self.create_entity(entity_type, fields, source)?;
        self.pending_edges.push((parent, child));
        Ok(child)
    }

    /// Edits an entity through a validated write handle.
    ///
    /// If the closure fails, none of its writes are kept.
    ///
    /// # Errors
    ///
    /// Returns `StaleHandle` if the entity is not in the working state, or
    /// whatever error the closure returns.
    pub fn modify_entity<F>(&mut self, id: EntityId, edit: F) -> Result<Arc<Entity>>
    where
        F: FnOnce(&mut EntityMut<'_>) -> Result<()>,
    {
        let current = self
            .working
            .get_shared(id)
            .cloned()
            .ok_or_else(|| self.stale(id, "modify_entity"))?;
        let registry = Arc::clone(&self.working.registry);
        let schema = registry.require_schema(current.entity_type())?;

        let mut handle = EntityMut::new(&registry, schema, Entity::clone(&current));
        edit(&mut handle)?;
        let updated = handle.into_entity();

        if updated == *current {
            return Ok(current);
        }
        let updated = Arc::new(updated);
        self.working.put(Arc::clone(&updated));
        self.touch(id);
        Ok(updated)
    }

    /// Removes an entity and everything it owns.
    ///
    /// Returns the removed ids, the entity itself first.
    ///
    /// # Errors
    ///
    /// Returns `StaleHandle` if the entity is not in the working state, or
    /// `Internal` if the ownership chain exceeds the configured depth.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Vec<EntityId>> {
        if !self.working.contains(id) {
            return Err(self.stale(id, "remove_entity"));
        }
        let victims = self
            .working
            .ownership
            .subtree(id, self.config.max_cascade_depth)?;
        for victim in &victims {
            if *victim != id {
                trace!(?victim, root = ?id, "cascade remove");
            }
            self.drop_entity(*victim);
        }
        Ok(victims)
    }

    /// Makes `parent` the owner of `child`.
    ///
    /// The edge is checked for dangling parents, cycles, and second owners
    /// at commit.
    ///
    /// # Errors
    ///
    /// Returns `StaleHandle` if the child is not in the working state, or
    /// `SchemaViolation` if the parent exists and its type may not own the child.
    pub fn attach_child(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        let Some(entity) = self.working.get(child) else {
            return Err(self.stale(child, "attach_child"));
        };
        self.check_owner_type(parent, entity.entity_type())?;
        self.pending_edges.push((parent, child));
        Ok(())
    }

    /// Stores a weak link for an extension declared with link resolution.
    ///
    /// # Errors
    ///
    /// - `UnknownExtension` if the relation is not registered
    /// - `SchemaViolation` if the relation resolves through ownership or an
    ///   endpoint has the wrong type
    /// - `StaleHandle` if an endpoint is not in the working state
    pub fn link_extension(&mut self, name: KeywordId, from: EntityId, to: EntityId) -> Result<()> {
        let registry = Arc::clone(&self.working.registry);
        let extension = registry.require_extension(name)?;
        if extension.resolution != ExtensionResolution::Link {
            return Err(Error::schema_violation(
                registry.name_of(extension.from_type),
                format!(
                    "extension `{}` resolves through ownership and cannot be linked",
                    registry.name_of(name)
                ),
            ));
        }
        for (endpoint, expected) in [(from, extension.from_type), (to, extension.to_type)] {
            let Some(entity) = self.working.get(endpoint) else {
                return Err(self.stale(endpoint, "link_extension"));
            };
            if entity.entity_type() != expected {
                return Err(Error::schema_violation(
                    registry.name_of(entity.entity_type()),
                    format!(
                        "extension `{}` expects `{}` at {endpoint}",
                        registry.name_of(name),
                        registry.name_of(expected)
                    ),
                ));
            }
        }
        self.working.links.link(name, from, to);
        self.links_changed = true;
        Ok(())
    }

    /// Removes a weak link, returning its old target.
    ///
    /// # Errors
    ///
    /// Returns `UnknownExtension` if the relation is not registered.
    pub fn unlink_extension(&mut self, name: KeywordId, from: EntityId) -> Result<Option<EntityId>> {
        self.working.registry.require_extension(name)?;
        let old = self.working.links.unlink(name, from);
        self.links_changed |= old.is_some();
        Ok(old)
    }

    /// Validates the transaction and produces the next snapshot.
    ///
    /// Steps, in order:
    /// 1. re-derive symbolic ids of touched entities and check uniqueness
    /// 2. resolve ownership edges attached in this transaction
    /// 3. cascade-remove children whose new parent was removed
    /// 4. check required owners and per-parent limits
    /// 5. build the snapshot and its change log
    ///
    /// # Errors
    ///
    /// Returns `SymbolicIdConflict`, `DanglingParentReference`,
    /// `OwnershipCycle`, `MultipleOwnersViolation`, or `SchemaViolation`.
    /// On error nothing is applied.
    pub fn commit(self) -> Result<(Snapshot, ChangeLog)> {
        let base_version = self.base.version;
        match self.finish() {
            Ok((snapshot, log)) => {
                debug!(
                    version = snapshot.version,
                    added = log.added().count(),
                    removed = log.removed().count(),
                    modified = log.modified().count(),
                    "commit"
                );
                Ok((snapshot, log))
            }
            Err(err) => {
                warn!(kind = %err.kind, base_version, "commit rejected");
                Err(err.with_context(
                    ErrorContext::new()
                        .with_operation("commit")
                        .with_version(base_version),
                ))
            }
        }
    }

    fn finish(mut self) -> Result<(Snapshot, ChangeLog)> {
        let registry = Arc::clone(&self.working.registry);

        let mut symbolic = self.base.symbolic.clone();
        let derived: Vec<_> = self
            .touched
            .iter()
            .map(|id| {
                let key = self
                    .working
                    .get(*id)
                    .and_then(|entity| registry.symbolic_id(entity));
                (*id, key)
            })
            .collect();
        symbolic.reindex(&derived, |key| registry.describe_symbolic_id(key))?;

        let mut removed_parents = Vec::new();
        let mut attached = Vec::new();
        for (parent, child) in std::mem::take(&mut self.pending_edges) {
            if !self.working.contains(child) {
                continue;
            }
            if self.working.contains(parent) {
                let child_type = self.working.get(child).map(Entity::entity_type);
                if let Some(child_type) = child_type {
                    self.check_owner_type(parent, child_type)?;
                }
                self.working.ownership.attach(parent, child)?;
                attached.push(child);
            } else if parent.belongs_to(self.working.lineage) && self.removed.contains(&parent) {
                removed_parents.push((parent, child));
            } else {
                return Err(Error::dangling_parent(parent, child));
            }
        }

        // Only children with no live owner follow a removed parent.
        let mut orphans = Vec::new();
        for (parent, child) in removed_parents {
            if let Some(existing) = self.working.ownership.parent_of(child) {
                return Err(Error::multiple_owners(child, existing, parent));
            }
            orphans.push(child);
        }

        for orphan in orphans {
            if !self.working.contains(orphan) {
                continue;
            }
            let victims = self
                .working
                .ownership
                .subtree(orphan, self.config.max_cascade_depth)?;
            for victim in victims {
                trace!(?victim, "cascade remove: owner removed in same transaction");
                symbolic.remove(victim);
                self.drop_entity(victim);
            }
        }

        for id in &self.touched {
            let Some(entity) = self.working.get(*id) else {
                continue;
            };
            let requires_owner = registry
                .schema(entity.entity_type())
                .is_some_and(|schema| schema.requires_owner());
            if requires_owner && self.working.ownership.parent_of(*id).is_none() {
                return Err(Error::dangling_parent(EntityId::null(), *id));
            }
        }

        for id in self.touched.iter().chain(&attached) {
            self.check_owner_capacity(*id)?;
        }

        let mut changes = Vec::new();
        for id in &self.touched {
            let change = match (self.base.get_shared(*id), self.working.get_shared(*id)) {
                (None, Some(new)) => Change::Added(Arc::clone(new)),
                (Some(old), None) => Change::Removed {
                    id: *id,
                    last: Arc::clone(old),
                },
                (Some(old), Some(new)) if old != new => Change::Modified {
                    id: *id,
                    old: Arc::clone(old),
                    new: Arc::clone(new),
                },
                _ => continue,
            };
            changes.push(change);
        }

        let mut snapshot = self.working;
        snapshot.symbolic = symbolic;
        snapshot.version = self.base.version + 1;
        let log = ChangeLog::new(self.base.version, snapshot.version, changes);
        Ok((snapshot, log))
    }

    fn touch(&mut self, id: EntityId) {
        if self.touched_set.insert(id) {
            self.touched.push(id);
        }
    }

    fn drop_entity(&mut self, id: EntityId) {
        if self.working.take(id).is_some() {
            self.working.ownership.detach(id);
            self.working.links.drop_entity(id);
            self.removed.insert(id);
            self.touch(id);
        }
    }

    fn check_owner_type(&self, parent: EntityId, child_type: KeywordId) -> Result<()> {
        let Some(parent) = self.working.get(parent) else {
            return Ok(());
        };
        let registry = &self.working.registry;
        let schema = registry.require_schema(child_type)?;
        if schema.accepts_owner(parent.entity_type()) {
            Ok(())
        } else {
            Err(Error::schema_violation(
                registry.name_of(child_type),
                format!(
                    "cannot be owned by `{}`",
                    registry.name_of(parent.entity_type())
                ),
            ))
        }
    }

    fn check_owner_capacity(&self, child: EntityId) -> Result<()> {
        let Some(entity) = self.working.get(child) else {
            return Ok(());
        };
        let Some(parent) = self.working.ownership.parent_of(child) else {
            return Ok(());
        };
        let registry = &self.working.registry;
        let child_type = entity.entity_type();
        let Some(max) = registry
            .schema(child_type)
            .and_then(EntitySchema::max_per_parent)
        else {
            return Ok(());
        };
        let count = self
            .working
            .ownership
            .children_of(parent)
            .filter(|sibling| {
                self.working
                    .get(*sibling)
                    .is_some_and(|sibling| sibling.entity_type() == child_type)
            })
            .count();
        if count > max {
            return Err(Error::schema_violation(
                registry.name_of(child_type),
                format!("{parent} already has {max}, cannot own {child}"),
            ));
        }
        Ok(())
    }

    fn stale(&self, id: EntityId, operation: &str) -> Error {
        Error::stale_handle(id).with_context(
            ErrorContext::new()
                .with_operation(operation)
                .with_version(self.base.version)
                .with_entity(id),
        )
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("base_version", &self.base.version)
            .field("touched", &self.touched.len())
            .field("pending_edges", &self.pending_edges.len())
            .finish_non_exhaustive()
    }
}
