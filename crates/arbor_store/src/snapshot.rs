//! Immutable, versioned views of the entity graph.
//!
//! A [`Snapshot`] is built from persistent collections, so cloning one is
//! O(1) and every snapshot produced by later commits shares structure with
//! its ancestors. Snapshots are never edited in place; open a [`Builder`]
//! to produce the next one.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use arbor_foundation::{EntityId, KeywordId, Result};

use crate::builder::Builder;
use crate::config::StoreConfig;
use crate::entity::{Entity, EntitySource};
use crate::extension::ExtensionLinks;
use crate::ownership::OwnershipGraph;
use crate::registry::TypeRegistry;
use crate::schema::ExtensionResolution;
use crate::symbolic::{SymbolicId, SymbolicIndex};

/// Lineage 0 is reserved for the null entity id.
static NEXT_LINEAGE: AtomicU32 = AtomicU32::new(1);

/// A read-only, versioned view of every entity in a lineage.
#[derive(Clone)]
pub struct Snapshot {
    pub(crate) registry: Arc<TypeRegistry>,
    pub(crate) lineage: u32,
    pub(crate) version: u64,
    pub(crate) next_index: u64,
    /// Ids are allocated monotonically, so key order is insertion order.
    pub(crate) entities: im::OrdMap<EntityId, Arc<Entity>>,
    pub(crate) by_type: im::HashMap<KeywordId, im::OrdSet<EntityId>>,
    pub(crate) symbolic: SymbolicIndex,
    pub(crate) ownership: OwnershipGraph,
    pub(crate) links: ExtensionLinks,
}

impl Snapshot {
    /// Creates the empty root snapshot of a new lineage.
    #[must_use]
    pub fn empty(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            lineage: NEXT_LINEAGE.fetch_add(1, Ordering::Relaxed),
            version: 0,
            next_index: 0,
            entities: im::OrdMap::new(),
            by_type: im::HashMap::new(),
            symbolic: SymbolicIndex::new(),
            ownership: OwnershipGraph::new(),
            links: ExtensionLinks::new(),
        }
    }

    /// Returns the registry entities are validated against.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Returns the lineage tag shared by every id this snapshot allocates.
    #[must_use]
    pub fn lineage(&self) -> u32 {
        self.lineage
    }

    /// Returns the number of commits since the lineage root.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the snapshot holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Gets an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id).map(AsRef::as_ref)
    }

    /// Gets the shared record of an entity.
    #[must_use]
    pub fn get_shared(&self, id: EntityId) -> Option<&Arc<Entity>> {
        self.entities.get(&id)
    }

    /// Returns true if the entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Iterates all entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values().map(AsRef::as_ref)
    }

    /// Iterates entities of one type in insertion order.
    ///
    /// The iterator borrows the snapshot, so it can be restarted by calling
    /// this method again.
    pub fn all_of_type(&self, entity_type: KeywordId) -> impl Iterator<Item = &Entity> + '_ {
        self.by_type
            .get(&entity_type)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.get(*id))
    }

    /// Returns the number of entities of one type.
    #[must_use]
    pub fn count_of_type(&self, entity_type: KeywordId) -> usize {
        self.by_type.get(&entity_type).map_or(0, im::OrdSet::len)
    }

    /// Resolves a symbolic id to the entity holding it.
    #[must_use]
    pub fn resolve_symbolic_id(&self, key: &SymbolicId) -> Option<&Entity> {
        self.symbolic.lookup(key).and_then(|id| self.get(id))
    }

    /// Returns the symbolic id an entity is indexed under.
    #[must_use]
    pub fn symbolic_id_of(&self, id: EntityId) -> Option<&SymbolicId> {
        self.symbolic.key_of(id)
    }

    /// Iterates the owned children of an entity in attachment order.
    pub fn children(&self, parent: EntityId) -> impl Iterator<Item = &Entity> + '_ {
        self.ownership
            .children_of(parent)
            .filter_map(|id| self.get(id))
    }

    /// Returns the owning parent of an entity.
    #[must_use]
    pub fn parent(&self, child: EntityId) -> Option<&Entity> {
        self.ownership.parent_of(child).and_then(|id| self.get(id))
    }

    /// Resolves a named extension relation from an entity.
    ///
    /// Absence is a normal result: an entity with no counterpart, an entity
    /// of the wrong type, or an unknown `from` id all resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownExtension` if no relation with that name is registered.
    pub fn resolve_extension(&self, name: KeywordId, from: EntityId) -> Result<Option<&Entity>> {
        let extension = self.registry.require_extension(name)?;
        let Some(source) = self.get(from) else {
            return Ok(None);
        };
        if source.entity_type() != extension.from_type {
            return Ok(None);
        }

        let target = match extension.resolution {
            ExtensionResolution::Owner => self.ownership.parent_of(from),
            ExtensionResolution::Link => self.links.target(name, from),
        };
        Ok(target
            .and_then(|id| self.get(id))
            .filter(|entity| entity.entity_type() == extension.to_type))
    }

    /// Iterates entities created with the given provenance, in insertion order.
    pub fn entities_by_source<'a>(
        &'a self,
        source: &'a EntitySource,
    ) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities().filter(move |entity| entity.source() == source)
    }

    /// Returns the symbolic index.
    #[must_use]
    pub fn symbolic_index(&self) -> &SymbolicIndex {
        &self.symbolic
    }

    /// Returns the ownership graph.
    #[must_use]
    pub fn ownership(&self) -> &OwnershipGraph {
        &self.ownership
    }

    /// Returns the stored extension links.
    #[must_use]
    pub fn links(&self) -> &ExtensionLinks {
        &self.links
    }

    /// Opens a builder on this snapshot with the default configuration.
    #[must_use]
    pub fn open(&self) -> Builder {
        Builder::open(self)
    }

    /// Opens a builder on this snapshot.
    #[must_use]
    pub fn open_with(&self, config: StoreConfig) -> Builder {
        Builder::open_with(self, config)
    }

    /// Inserts or replaces an entity record.
    pub(crate) fn put(&mut self, entity: Arc<Entity>) {
        let id = entity.id();
        let entity_type = entity.entity_type();
        if self.entities.insert(id, entity).is_none() {
            let ids = self.by_type.get(&entity_type).cloned().unwrap_or_default();
            self.by_type.insert(entity_type, ids.update(id));
        }
    }

    /// Removes an entity record, leaving its edges alone.
    pub(crate) fn take(&mut self, id: EntityId) -> Option<Arc<Entity>> {
        let entity = self.entities.remove(&id)?;
        if let Some(ids) = self.by_type.get(&entity.entity_type()).cloned() {
            let ids = ids.without(&id);
            if ids.is_empty() {
                self.by_type.remove(&entity.entity_type());
            } else {
                self.by_type.insert(entity.entity_type(), ids);
            }
        }
        Some(entity)
    }

    /// Allocates the next id of this lineage.
    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.lineage, self.next_index);
        self.next_index += 1;
        id
    }
}

/// Observational equality: same entities, symbolic index, ownership edges,
/// and extension links. Versions are not compared.
impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.entities == other.entities
            && self.symbolic == other.symbolic
            && self.ownership == other.ownership
            && self.links == other.links
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("lineage", &self.lineage)
            .field("version", &self.version)
            .field("entities", &self.entities.len())
            .field("symbolic", &self.symbolic.len())
            .field("ownership_edges", &self.ownership.edge_count())
            .field("links", &self.links.len())
            .finish()
    }
}
