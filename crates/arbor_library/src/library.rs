//! `LibraryEntity`: a named library with its roots.

use std::fmt;
use std::sync::Arc;

use arbor_foundation::{EntityId, Error, Result, Value};
use arbor_store::{Builder, Entity, EntityMut, EntitySource, Snapshot};

use crate::exclude::ExcludeUrlEntity;
use crate::model::LibraryModel;
use crate::properties::LibraryPropertiesEntity;
use crate::root::LibraryRoot;
use crate::table::{LibraryId, LibraryTableId};

/// Read-only view of a library in a snapshot.
#[derive(Clone, Copy)]
pub struct LibraryEntity<'a> {
    model: &'a LibraryModel,
    entity: &'a Entity,
}

impl<'a> LibraryEntity<'a> {
    /// Wraps an entity if it is a library.
    #[must_use]
    pub fn wrap(model: &'a LibraryModel, entity: &'a Entity) -> Option<Self> {
        (entity.entity_type() == model.library).then_some(Self { model, entity })
    }

    /// Looks up a library by id.
    #[must_use]
    pub fn get(model: &'a LibraryModel, snapshot: &'a Snapshot, id: EntityId) -> Option<Self> {
        snapshot.get(id).and_then(|entity| Self::wrap(model, entity))
    }

    /// Iterates all libraries in insertion order.
    pub fn all(model: &'a LibraryModel, snapshot: &'a Snapshot) -> impl Iterator<Item = Self> + 'a {
        snapshot
            .all_of_type(model.library)
            .map(move |entity| Self { model, entity })
    }

    /// Finds a library by its symbolic id.
    #[must_use]
    pub fn resolve(model: &'a LibraryModel, snapshot: &'a Snapshot, id: &LibraryId) -> Option<Self> {
        snapshot
            .resolve_symbolic_id(&id.to_symbolic(model))
            .and_then(|entity| Self::wrap(model, entity))
    }

    /// Returns the entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    /// Returns the underlying record.
    #[must_use]
    pub fn entity(&self) -> &'a Entity {
        self.entity
    }

    /// Returns the provenance tag.
    #[must_use]
    pub fn entity_source(&self) -> &'a EntitySource {
        self.entity.source()
    }

    /// Returns the library name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.entity.str_field(self.model.name).unwrap_or_default()
    }

    /// Returns the table the library is declared in.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the stored value is malformed.
    pub fn table_id(&self) -> Result<LibraryTableId> {
        LibraryTableId::from_value(self.entity.field(self.model.table_id).unwrap_or(&Value::Nil))
    }

    /// Returns the library roots.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if a stored root is malformed.
    pub fn roots(&self) -> Result<Vec<LibraryRoot>> {
        LibraryRoot::list_from_value(self.entity.field(self.model.roots).unwrap_or(&Value::Nil))
    }

    /// Returns the symbolic id.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the stored table id is malformed.
    pub fn symbolic_id(&self) -> Result<LibraryId> {
        Ok(LibraryId::new(self.name(), self.table_id()?))
    }

    /// Iterates the owned excluded roots.
    pub fn excluded_roots(&self, snapshot: &'a Snapshot) -> impl Iterator<Item = ExcludeUrlEntity<'a>> + 'a {
        let model = self.model;
        snapshot
            .children(self.id())
            .filter_map(move |entity| ExcludeUrlEntity::wrap(model, entity))
    }

    /// Returns the owned properties, if any.
    #[must_use]
    pub fn library_properties(&self, snapshot: &'a Snapshot) -> Option<LibraryPropertiesEntity<'a>> {
        let model = self.model;
        snapshot
            .children(self.id())
            .find_map(|entity| LibraryPropertiesEntity::wrap(model, entity))
    }

    /// Creates a library.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if a field is rejected. Uniqueness of the
    /// library id is checked at commit.
    pub fn create(
        model: &LibraryModel,
        builder: &mut Builder,
        name: &str,
        table_id: &LibraryTableId,
        roots: &[LibraryRoot],
        source: EntitySource,
    ) -> Result<EntityId> {
        Self::create_with(model, builder, name, table_id, roots, source, |_| Ok(()))
    }

    /// Creates a library and runs an initializer on it.
    ///
    /// If the initializer fails, the library is removed again.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if a field is rejected, or the initializer's error.
    pub fn create_with<F>(
        model: &LibraryModel,
        builder: &mut Builder,
        name: &str,
        table_id: &LibraryTableId,
        roots: &[LibraryRoot],
        source: EntitySource,
        init: F,
    ) -> Result<EntityId>
    where
        F: FnOnce(&mut LibraryEntityMut<'_, '_>) -> Result<()>,
    {
        let id = builder.create_entity(
            model.library,
            [
                (model.name, Value::from(name)),
                (model.table_id, table_id.to_value()),
                (model.roots, LibraryRoot::list_to_value(roots)),
            ],
            source,
        )?;
        if let Err(err) = Self::modify(model, builder, id, init) {
            builder.remove_entity(id)?;
            return Err(err);
        }
        Ok(id)
    }

    /// Edits a library.
    ///
    /// # Errors
    ///
    /// Returns `StaleHandle` if the library is gone, `SchemaViolation` if `id`
    /// is not a library or a write is rejected, or the closure's error.
    pub fn modify<F>(
        model: &LibraryModel,
        builder: &mut Builder,
        id: EntityId,
        edit: F,
    ) -> Result<Arc<Entity>>
    where
        F: FnOnce(&mut LibraryEntityMut<'_, '_>) -> Result<()>,
    {
        model.expect_type(builder, id, model.library)?;
        builder.modify_entity(id, |inner| edit(&mut LibraryEntityMut { model, inner }))
    }

    /// Creates an excluded root owned by a library.
    ///
    /// # Errors
    ///
    /// See [`ExcludeUrlEntity::create_in`].
    pub fn add_excluded_root(
        model: &LibraryModel,
        builder: &mut Builder,
        library: EntityId,
        url: &str,
        source: EntitySource,
    ) -> Result<EntityId> {
        ExcludeUrlEntity::create_in(model, builder, library, url, source)
    }
}

impl fmt::Debug for LibraryEntity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryEntity")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Write handle for a library inside a builder.
pub struct LibraryEntityMut<'h, 'r> {
    model: &'h LibraryModel,
    inner: &'h mut EntityMut<'r>,
}

impl LibraryEntityMut<'_, '_> {
    /// Returns the entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.inner.id()
    }

    /// Returns the library name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.get(self.model.name).as_str().unwrap_or_default()
    }

    /// Renames the library.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the write is rejected.
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.inner.set(self.model.name, name)
    }

    /// Returns the library table.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the stored value is malformed.
    pub fn table_id(&self) -> Result<LibraryTableId> {
        LibraryTableId::from_value(self.inner.get(self.model.table_id))
    }

    /// Moves the library to another table.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the write is rejected.
    pub fn set_table_id(&mut self, table_id: &LibraryTableId) -> Result<()> {
        self.inner.set(self.model.table_id, table_id.to_value())
    }

    /// Returns the library roots.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if a stored root is malformed.
    pub fn roots(&self) -> Result<Vec<LibraryRoot>> {
        LibraryRoot::list_from_value(self.inner.get(self.model.roots))
    }

    /// Replaces the library roots.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the write is rejected.
    pub fn set_roots(&mut self, roots: &[LibraryRoot]) -> Result<()> {
        self.inner.set(self.model.roots, LibraryRoot::list_to_value(roots))
    }

    /// Appends a root.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the stored roots are malformed or the
    /// write is rejected.
    pub fn add_root(&mut self, root: &LibraryRoot) -> Result<()> {
        let roots = match self.inner.get(self.model.roots) {
            Value::Vec(roots) => roots.push_back(root.to_value()),
            Value::Nil => std::iter::once(root.to_value()).collect(),
            other => {
                return Err(Error::schema_violation(
                    "LibraryEntity",
                    format!("roots must be a list, got {other}"),
                ));
            }
        };
        self.inner.set(self.model.roots, Value::Vec(roots))
    }

    /// Returns the provenance tag.
    #[must_use]
    pub fn entity_source(&self) -> &EntitySource {
        self.inner.source()
    }

    /// Replaces the provenance tag.
    pub fn set_entity_source(&mut self, source: EntitySource) {
        self.inner.set_source(source);
    }
}

impl fmt::Debug for LibraryEntityMut<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryEntityMut")
            .field("id", &self.id())
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}
