//! The type registry: entity schemas, extension relations, and keyword names.
//!
//! A registry is populated once at startup and then frozen into an
//! `Arc<TypeRegistry>`, which snapshots and builders hold as their schema
//! source. Nothing can register into a frozen registry.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

use arbor_foundation::{Error, ErrorKind, Interner, KeywordId, LtMap, Result, Value};

use crate::entity::{Entity, unknown_field};
use crate::schema::{EntitySchema, ExtensionSchema};
use crate::symbolic::SymbolicId;

/// Maps each entity type to its schema.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    interner: Interner,
    schemas: HashMap<KeywordId, EntitySchema>,
    /// Registration order, used for deterministic iteration.
    order: Vec<KeywordId>,
    extensions: HashMap<KeywordId, ExtensionSchema>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a type, field, namespace, or relation name.
    pub fn keyword(&mut self, name: &str) -> KeywordId {
        self.interner.intern_keyword(name)
    }

    /// Looks up a previously interned name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<KeywordId> {
        self.interner.lookup_keyword(name)
    }

    /// Returns the name behind a keyword, or `"?"` for foreign ids.
    #[must_use]
    pub fn name_of(&self, id: KeywordId) -> &str {
        self.interner.get_keyword(id).unwrap_or("?")
    }

    /// Registers an entity schema.
    ///
    /// # Errors
    ///
    /// - `DuplicateRegistration` if the type or one of its fields is declared twice
    /// - `SchemaViolation` if the symbolic id rule names an undeclared field, a
    ///   default value does not match its field type, or an owner type is not
    ///   registered
    pub fn register(&mut self, schema: EntitySchema) -> Result<()> {
        let type_name = self.name_of(schema.name).to_string();
        if self.schemas.contains_key(&schema.name) {
            return Err(Error::new(ErrorKind::DuplicateRegistration(type_name)));
        }

        let mut seen = HashSet::new();
        for field in &schema.fields {
            if !seen.insert(field.name) {
                return Err(Error::new(ErrorKind::DuplicateRegistration(format!(
                    "{type_name}.{}",
                    self.name_of(field.name)
                ))));
            }
            if let Some(default) = &field.default {
                if !field.ty.accepts(&default.value_type()) {
                    return Err(Error::field_type_mismatch(
                        type_name,
                        self.name_of(field.name),
                        &field.ty,
                        &default.value_type(),
                    ));
                }
            }
        }

        if let Some(rule) = &schema.symbolic_id {
            if let Some(missing) = rule.fields.iter().find(|f| !seen.contains(*f)) {
                return Err(Error::schema_violation(
                    type_name,
                    format!(
                        "symbolic id uses undeclared field `{}`",
                        self.name_of(*missing)
                    ),
                ));
            }
        }

        if let Some(rule) = &schema.owner {
            for parent in &rule.parent_types {
                if *parent != schema.name && !self.schemas.contains_key(parent) {
                    return Err(Error::schema_violation(
                        type_name,
                        format!("owner type `{}` is not registered", self.name_of(*parent)),
                    ));
                }
            }
        }

        self.order.push(schema.name);
        self.schemas.insert(schema.name, schema);
        Ok(())
    }

    /// Registers a named extension relation between two registered types.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRegistration` if the name is taken, or `UnknownType`
    /// if either endpoint type is not registered.
    pub fn register_extension(&mut self, extension: ExtensionSchema) -> Result<()> {
        if self.extensions.contains_key(&extension.name) {
            return Err(Error::new(ErrorKind::DuplicateRegistration(
                self.name_of(extension.name).to_string(),
            )));
        }
        for endpoint in [extension.from_type, extension.to_type] {
            if !self.schemas.contains_key(&endpoint) {
                return Err(Error::unknown_type(self.name_of(endpoint)));
            }
        }
        self.extensions.insert(extension.name, extension);
        Ok(())
    }

    /// Freezes the registry for sharing with snapshots.
    #[must_use]
    pub fn freeze(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Gets the schema for an entity type.
    #[must_use]
    pub fn schema(&self, entity_type: KeywordId) -> Option<&EntitySchema> {
        self.schemas.get(&entity_type)
    }

    /// Gets the schema for an entity type, failing with `UnknownType`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` if the type is not registered.
    pub fn require_schema(&self, entity_type: KeywordId) -> Result<&EntitySchema> {
        self.schema(entity_type)
            .ok_or_else(|| Error::unknown_type(self.name_of(entity_type)))
    }

    /// Iterates registered schemas in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &EntitySchema> + '_ {
        self.order.iter().filter_map(|name| self.schemas.get(name))
    }

    /// Gets an extension relation by name.
    #[must_use]
    pub fn extension(&self, name: KeywordId) -> Option<&ExtensionSchema> {
        self.extensions.get(&name)
    }

    /// Gets an extension relation by name, failing with `UnknownExtension`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownExtension` if no relation has that name.
    pub fn require_extension(&self, name: KeywordId) -> Result<&ExtensionSchema> {
        self.extension(name).ok_or_else(|| {
            Error::new(ErrorKind::UnknownExtension(self.name_of(name).to_string()))
        })
    }

    /// Validates initial field values and fills in defaults.
    ///
    /// # Errors
    ///
    /// Returns `UnknownType` for an unregistered type and `SchemaViolation` for
    /// an undeclared field, a type mismatch, or a missing required field.
    pub fn create_fields(
        &self,
        entity_type: KeywordId,
        initial: impl IntoIterator<Item = (KeywordId, Value)>,
    ) -> Result<LtMap<KeywordId, Value>> {
        let schema = self.require_schema(entity_type)?;

        let mut supplied: HashMap<KeywordId, Value> = HashMap::new();
        for (field, value) in initial {
            self.validate_field(schema, field, &value)?;
            supplied.insert(field, value);
        }

        let mut fields = LtMap::new();
        for field in &schema.fields {
            let value = match supplied.remove(&field.name) {
                Some(value) => value,
                None if field.required => {
                    return Err(Error::schema_violation(
                        self.name_of(schema.name),
                        format!("missing required field `{}`", self.name_of(field.name)),
                    ));
                }
                None => field.initial_value(),
            };
            fields = fields.insert(field.name, value);
        }
        Ok(fields)
    }

    /// Checks one field write against a schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the field is undeclared, the value type is
    /// not accepted, or a required non-nullable field would be nil.
    pub fn validate_field(
        &self,
        schema: &EntitySchema,
        field: KeywordId,
        value: &Value,
    ) -> Result<()> {
        let Some(field_schema) = schema.field(field) else {
            return Err(unknown_field(self, schema, field));
        };
        if value.is_nil() && field_schema.required && !field_schema.ty.is_nullable() {
            return Err(Error::schema_violation(
                self.name_of(schema.name),
                format!("required field `{}` cannot be nil", self.name_of(field)),
            ));
        }
        let actual = value.value_type();
        if !value.is_nil() && !field_schema.ty.accepts(&actual) {
            return Err(Error::field_type_mismatch(
                self.name_of(schema.name),
                self.name_of(field),
                &field_schema.ty,
                &actual,
            ));
        }
        Ok(())
    }

    /// Derives the symbolic id of an entity from its current fields.
    ///
    /// Returns `None` for types without a symbolic id rule.
    #[must_use]
    pub fn symbolic_id(&self, entity: &Entity) -> Option<SymbolicId> {
        let rule = self.schema(entity.entity_type())?.symbolic_id.as_ref()?;
        let key = rule
            .fields
            .iter()
            .map(|f| entity.field(*f).cloned().unwrap_or(Value::Nil));
        Some(SymbolicId::new(rule.namespace, key))
    }

    /// Renders a symbolic id with resolved names, e.g. `LibraryId(guava, ...)`.
    #[must_use]
    pub fn describe_symbolic_id(&self, id: &SymbolicId) -> String {
        let mut out = String::from(self.name_of(id.namespace()));
        out.push('(');
        for (i, value) in id.key().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{value}");
        }
        out.push(')');
        out
    }
}
