//! Entity records and their mutation handles.
//!
//! An [`Entity`] is an immutable record owned by a snapshot. Inside a
//! builder, edits go through an [`EntityMut`], which validates every write
//! against the registered schema as it happens.

use std::fmt;
use std::sync::Arc;

use arbor_foundation::{EntityId, Error, KeywordId, LtMap, Result, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::registry::TypeRegistry;
use crate::schema::EntitySchema;

/// Provenance tag recorded when an entity is created.
///
/// Sources are compared by value. Merge logic never edits a source; it can
/// only be replaced wholesale through [`EntityMut::set_source`].
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntitySource(Arc<str>);

impl EntitySource {
    /// Creates a source with the given description.
    #[must_use]
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self(description.into())
    }

    /// Returns the source description.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EntitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntitySource({})", self.0)
    }
}

impl fmt::Display for EntitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A typed, identified record.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    id: EntityId,
    entity_type: KeywordId,
    source: EntitySource,
    fields: LtMap<KeywordId, Value>,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        entity_type: KeywordId,
        source: EntitySource,
        fields: LtMap<KeywordId, Value>,
    ) -> Self {
        Self {
            id,
            entity_type,
            source,
            fields,
        }
    }

    /// Returns the entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity type tag.
    #[must_use]
    pub fn entity_type(&self) -> KeywordId {
        self.entity_type
    }

    /// Returns the provenance tag.
    #[must_use]
    pub fn source(&self) -> &EntitySource {
        &self.source
    }

    /// Returns a field value, or `None` if the field is not declared.
    #[must_use]
    pub fn field(&self, name: KeywordId) -> Option<&Value> {
        self.fields.get(&name)
    }

    /// Returns a string field.
    #[must_use]
    pub fn str_field(&self, name: KeywordId) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Returns the full field set.
    ///
    /// Cloning the returned map is O(1).
    #[must_use]
    pub fn fields(&self) -> &LtMap<KeywordId, Value> {
        &self.fields
    }
}

/// Write handle for one entity inside an open builder.
///
/// Every write is validated immediately; a rejected write leaves the handle
/// unchanged and returns a `SchemaViolation`.
pub struct EntityMut<'a> {
    registry: &'a TypeRegistry,
    schema: &'a EntitySchema,
    entity: Entity,
}

impl<'a> EntityMut<'a> {
    pub(crate) fn new(registry: &'a TypeRegistry, schema: &'a EntitySchema, entity: Entity) -> Self {
        Self {
            registry,
            schema,
            entity,
        }
    }

    /// Returns the id of the entity being edited.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.entity.id
    }

    /// Returns the entity type tag.
    #[must_use]
    pub fn entity_type(&self) -> KeywordId {
        self.entity.entity_type
    }

    /// Returns the current provenance tag.
    #[must_use]
    pub fn source(&self) -> &EntitySource {
        &self.entity.source
    }

    /// Returns the current value of a field (nil if undeclared).
    #[must_use]
    pub fn get(&self, field: KeywordId) -> &Value {
        self.entity.fields.get(&field).unwrap_or(&Value::Nil)
    }

    /// Sets a field after checking it against the schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the field is not declared, the value has
    /// the wrong type, or a required field would become nil.
    pub fn set(&mut self, field: KeywordId, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.registry.validate_field(self.schema, field, &value)?;
        self.entity.fields = self.entity.fields.insert(field, value);
        Ok(())
    }

    /// Replaces the provenance tag.
    pub fn set_source(&mut self, source: EntitySource) {
        self.entity.source = source;
    }

    /// Returns the registry the handle validates against.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    pub(crate) fn into_entity(self) -> Entity {
        self.entity
    }
}

impl fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMut")
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}

/// Builds the error for writing an undeclared field.
pub(crate) fn unknown_field(registry: &TypeRegistry, schema: &EntitySchema, field: KeywordId) -> Error {
    Error::schema_violation(
        registry.name_of(schema.name),
        format!("unknown field `{}`", registry.name_of(field)),
    )
}
