//! `LibraryPropertiesEntity`: custom properties owned by a library.

use std::fmt;
use std::sync::Arc;

use arbor_foundation::{EntityId, Error, Result, Value};
use arbor_store::{Builder, Entity, EntityMut, EntitySource, Snapshot};

use crate::library::LibraryEntity;
use crate::model::LibraryModel;

/// Read-only view of library properties in a snapshot.
#[derive(Clone, Copy)]
pub struct LibraryPropertiesEntity<'a> {
    model: &'a LibraryModel,
    entity: &'a Entity,
}

impl<'a> LibraryPropertiesEntity<'a> {
    /// Wraps an entity if it is a properties record.
    #[must_use]
    pub fn wrap(model: &'a LibraryModel, entity: &'a Entity) -> Option<Self> {
        (entity.entity_type() == model.library_properties).then_some(Self { model, entity })
    }

    /// Looks up properties by id.
    #[must_use]
    pub fn get(model: &'a LibraryModel, snapshot: &'a Snapshot, id: EntityId) -> Option<Self> {
        snapshot.get(id).and_then(|entity| Self::wrap(model, entity))
    }

    /// Returns the entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.entity.id()
    }

    /// Returns the provenance tag.
    #[must_use]
    pub fn entity_source(&self) -> &'a EntitySource {
        self.entity.source()
    }

    /// Returns the properties type.
    #[must_use]
    pub fn library_type(&self) -> &'a str {
        self.entity
            .str_field(self.model.library_type)
            .unwrap_or_default()
    }

    /// Returns the serialized properties payload, if any.
    #[must_use]
    pub fn properties_xml_tag(&self) -> Option<&'a str> {
        self.entity.str_field(self.model.properties_xml_tag)
    }

    /// Returns the owning library.
    #[must_use]
    pub fn library(&self, snapshot: &'a Snapshot) -> Option<LibraryEntity<'a>> {
        snapshot
            .parent(self.id())
            .and_then(|entity| LibraryEntity::wrap(self.model, entity))
    }

    /// Creates the properties of a library.
    ///
    /// # Errors
    ///
    /// Returns `StaleHandle` if the library is gone, or `SchemaViolation` if
    /// `library` is not a library, already has properties, or a field is rejected.
    pub fn create(
        model: &LibraryModel,
        builder: &mut Builder,
        library: EntityId,
        library_type: &str,
        source: EntitySource,
    ) -> Result<EntityId> {
        Self::create_with(model, builder, library, library_type, source, |_| Ok(()))
    }

    /// Creates the properties of a library and runs an initializer on them.
    ///
    /// If the initializer fails, the properties are removed again.
    ///
    /// # Errors
    ///
    /// As [`LibraryPropertiesEntity::create`], or the initializer's error.
    pub fn create_with<F>(
        model: &LibraryModel,
        builder: &mut Builder,
        library: EntityId,
        library_type: &str,
        source: EntitySource,
        init: F,
    ) -> Result<EntityId>
    where
        F: FnOnce(&mut LibraryPropertiesEntityMut<'_, '_>) -> Result<()>,
    {
        model.expect_type(builder, library, model.library)?;
        let existing = builder.children_of(library).find(|child| {
            builder
                .get(*child)
                .is_some_and(|entity| entity.entity_type() == model.library_properties)
        });
        if let Some(existing) = existing {
            return Err(Error::schema_violation(
                "LibraryEntity",
                format!("{library} already has library properties {existing}"),
            ));
        }

        let id = builder.create_child(
            library,
            model.library_properties,
            [(model.library_type, Value::from(library_type))],
            source,
        )?;
        if let Err(err) = Self::modify(model, builder, id, init) {
            builder.remove_entity(id)?;
            return Err(err);
        }
        Ok(id)
    }

    /// Edits library properties.
    ///
    /// # Errors
    ///
    /// Returns `StaleHandle` if the entity is gone, `SchemaViolation` if `id`
    /// is not a properties record or a write is rejected, or the closure's error.
    pub fn modify<F>(
        model: &LibraryModel,
        builder: &mut Builder,
        id: EntityId,
        edit: F,
    ) -> Result<Arc<Entity>>
    where
        F: FnOnce(&mut LibraryPropertiesEntityMut<'_, '_>) -> Result<()>,
    {
        model.expect_type(builder, id, model.library_properties)?;
        builder.modify_entity(id, |inner| {
            edit(&mut LibraryPropertiesEntityMut { model, inner })
        })
    }
}

impl fmt::Debug for LibraryPropertiesEntity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryPropertiesEntity")
            .field("id", &self.id())
            .field("library_type", &self.library_type())
            .finish_non_exhaustive()
    }
}

/// Write handle for library properties inside a builder.
pub struct LibraryPropertiesEntityMut<'h, 'r> {
    model: &'h LibraryModel,
    inner: &'h mut EntityMut<'r>,
}

impl LibraryPropertiesEntityMut<'_, '_> {
    /// Returns the entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.inner.id()
    }

    /// Returns the properties type.
    #[must_use]
    pub fn library_type(&self) -> &str {
        self.inner
            .get(self.model.library_type)
            .as_str()
            .unwrap_or_default()
    }

    /// Sets the properties type.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the write is rejected.
    pub fn set_library_type(&mut self, library_type: &str) -> Result<()> {
        self.inner.set(self.model.library_type, library_type)
    }

    /// Returns the serialized properties payload, if any.
    #[must_use]
    pub fn properties_xml_tag(&self) -> Option<&str> {
        self.inner.get(self.model.properties_xml_tag).as_str()
    }

    /// Sets or clears the serialized properties payload.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the write is rejected.
    pub fn set_properties_xml_tag(&mut self, tag: Option<&str>) -> Result<()> {
        self.inner.set(self.model.properties_xml_tag, tag)
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

impl fmt::Debug for LibraryPropertiesEntityMut<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryPropertiesEntityMut")
            .field("id", &self.id())
            .field("library_type", &self.library_type())
            .finish_non_exhaustive()
    }
}
