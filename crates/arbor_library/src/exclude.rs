//! `ExcludeUrlEntity`: a URL excluded from a library or other owner.

use std::fmt;
use std::sync::Arc;

use arbor_foundation::{EntityId, Result, Value};
use arbor_store::{Builder, Entity, EntityMut, EntitySource, Snapshot};

use crate::library::LibraryEntity;
use crate::model::LibraryModel;

/// Read-only view of an excluded URL in a snapshot.
#[derive(Clone, Copy)]
pub struct ExcludeUrlEntity<'a> {
    model: &'a LibraryModel,
    entity: &'a Entity,
}

impl<'a> ExcludeUrlEntity<'a> {
    /// Wraps an entity if it is an excluded URL.
    #[must_use]
    pub fn wrap(model: &'a LibraryModel, entity: &'a Entity) -> Option<Self> {
        (entity.entity_type() == model.exclude_url).then_some(Self { model, entity })
    }

    /// Looks up an excluded URL by id.
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

    /// Returns the excluded URL.
    #[must_use]
    pub fn url(&self) -> &'a str {
        self.entity.str_field(self.model.url).unwrap_or_default()
    }

    /// Resolves the `library` extension: the library that owns this URL.
    ///
    /// Returns `None` when the URL is not owned by a library.
    ///
    /// # Errors
    ///
    /// Returns `UnknownExtension` if the snapshot's registry was not set up
    /// with [`LibraryModel::register`].
    pub fn library(&self, snapshot: &'a Snapshot) -> Result<Option<LibraryEntity<'a>>> {
        let model = self.model;
        Ok(snapshot
            .resolve_extension(model.library_extension, self.id())?
            .and_then(|entity| LibraryEntity::wrap(model, entity)))
    }

    /// Creates an excluded URL with no owner.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the field is rejected.
    pub fn create(model: &LibraryModel, builder: &mut Builder, url: &str, source: EntitySource) -> Result<EntityId> {
        builder.create_entity(model.exclude_url, [(model.url, Value::from(url))], source)
    }

    /// Creates an excluded URL owned by a library.
    ///
    /// # Errors
    ///
    /// Returns `StaleHandle` if the library is gone, or `SchemaViolation` if
    /// `library` is not a library or the field is rejected.
    pub fn create_in(
        model: &LibraryModel,
        builder: &mut Builder,
        library: EntityId,
        url: &str,
        source: EntitySource,
    ) -> Result<EntityId> {
        model.expect_type(builder, library, model.library)?;
        builder.create_child(library, model.exclude_url, [(model.url, Value::from(url))], source)
    }

    /// Edits an excluded URL.
    ///
    /// # Errors
    ///
    /// Returns `StaleHandle` if the entity is gone, `SchemaViolation` if `id`
    /// is not an excluded URL or a write is rejected, or the closure's error.
    pub fn modify<F>(model: &LibraryModel, builder: &mut Builder, id: EntityId, edit: F) -> Result<Arc<Entity>>
    where
        F: FnOnce(&mut ExcludeUrlEntityMut<'_, '_>) -> Result<()>,
    {
        model.expect_type(builder, id, model.exclude_url)?;
        builder.modify_entity(id, |inner| edit(&mut ExcludeUrlEntityMut { model, inner }))
    }
}

impl fmt::Debug for ExcludeUrlEntity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeUrlEntity")
            .field("id", &self.id())
            .field("url", &self.url())
            .finish_non_exhaustive()
    }
}

/// Write handle for an excluded URL inside a builder.
pub struct ExcludeUrlEntityMut<'h, 'r> {
    model: &'h LibraryModel,
    inner: &'h mut EntityMut<'r>,
}

impl ExcludeUrlEntityMut<'_, '_> {
    /// Returns the entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.inner.id()
    }

    /// Returns the excluded URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.inner.get(self.model.url).as_str().unwrap_or_default()
    }

    /// Sets the excluded URL.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the write is rejected.
    pub fn set_url(&mut self, url: &str) -> Result<()> {
        self.inner.set(self.model.url, url)
    }
}

impl fmt::Debug for ExcludeUrlEntityMut<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeUrlEntityMut")
            .field("id", &self.id())
            .field("url", &self.url())
            .finish_non_exhaustive()
    }
}
