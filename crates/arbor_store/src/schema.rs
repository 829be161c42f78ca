//! Schema definitions for entity types and extension relations.
//!
//! Schemas define the field layout, symbolic id rule, and ownership
//! constraints of each entity type.

use arbor_foundation::{KeywordId, Type, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Schema definition for an entity type.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySchema {
    /// Type tag (e.g., `library`, `library-properties`).
    pub name: KeywordId,
    /// Field definitions, in declaration order.
    pub fields: Vec<FieldSchema>,
    /// How the symbolic id is derived, if the type has one.
    pub symbolic_id: Option<SymbolicIdRule>,
    /// Which entity types may own this one.
    pub owner: Option<OwnerRule>,
}

impl EntitySchema {
    /// Creates a new entity schema with no fields.
    #[must_use]
    pub fn new(name: KeywordId) -> Self {
        Self {
            name,
            fields: Vec::new(),
            symbolic_id: None,
            owner: None,
        }
    }

    /// Adds a field to the schema.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares the symbolic id rule.
    #[must_use]
    pub fn with_symbolic_id(mut self, rule: SymbolicIdRule) -> Self {
        self.symbolic_id = Some(rule);
        self
    }

    /// Declares the ownership rule.
    #[must_use]
    pub fn with_owner(mut self, rule: OwnerRule) -> Self {
        self.owner = Some(rule);
        self
    }

    /// Returns the field schema by name.
    #[must_use]
    pub fn field(&self, name: KeywordId) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if an entity of `parent_type` may own entities of this type.
    #[must_use]
    pub fn accepts_owner(&self, parent_type: KeywordId) -> bool {
        self.owner
            .as_ref()
            .is_some_and(|rule| rule.parent_types.contains(&parent_type))
    }

    /// Returns true if entities of this type must have an owning parent.
    #[must_use]
    pub fn requires_owner(&self) -> bool {
        self.owner.as_ref().is_some_and(|rule| rule.required)
    }

    /// Returns the per-parent limit on entities of this type, if any.
    #[must_use]
    pub fn max_per_parent(&self) -> Option<usize> {
        self.owner.as_ref().and_then(|rule| rule.max_per_parent)
    }
}

/// Schema definition for an entity field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    /// Field name.
    pub name: KeywordId,
    /// Field type.
    pub ty: Type,
    /// Default value if not provided.
    pub default: Option<Value>,
    /// Whether the field must be supplied at creation.
    pub required: bool,
}

impl FieldSchema {
    /// Creates a required field with no default.
    #[must_use]
    pub fn required(name: KeywordId, ty: Type) -> Self {
        Self {
            name,
            ty,
            default: None,
            required: true,
        }
    }

    /// Creates an optional field with a default value.
    #[must_use]
    pub fn optional(name: KeywordId, ty: Type, default: Value) -> Self {
        Self {
            name,
            ty,
            default: Some(default),
            required: false,
        }
    }

    /// Creates an optional field with no default (will be nil).
    #[must_use]
    pub fn optional_nil(name: KeywordId, ty: Type) -> Self {
        Self {
            name,
            ty: if ty.is_nullable() { ty } else { Type::option(ty) },
            default: None,
            required: false,
        }
    }

    /// Returns the value an omitted field starts with.
    #[must_use]
    pub fn initial_value(&self) -> Value {
        self.default.clone().unwrap_or(Value::Nil)
    }
}

/// Derivation rule for a symbolic id.
///
/// The key is the tuple of the listed field values, in order. Every type that
/// names the same namespace shares one uniqueness domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolicIdRule {
    /// Uniqueness namespace (e.g., `LibraryId`).
    pub namespace: KeywordId,
    /// Fields forming the key, in order.
    pub fields: Vec<KeywordId>,
}

impl SymbolicIdRule {
    /// Creates a rule keyed on the given fields.
    #[must_use]
    pub fn new(namespace: KeywordId, fields: Vec<KeywordId>) -> Self {
        Self { namespace, fields }
    }
}

/// Ownership rule for a child entity type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerRule {
    /// Entity types allowed to own this type.
    pub parent_types: Vec<KeywordId>,
    /// If true, every committed entity of this type must have an owner.
    pub required: bool,
    /// Upper bound on entities of this type under one parent.
    pub max_per_parent: Option<usize>,
}

impl OwnerRule {
    /// Owner is optional; the entity may also live at the top level.
    #[must_use]
    pub fn optional(parent_types: Vec<KeywordId>) -> Self {
        Self {
            parent_types,
            required: false,
            max_per_parent: None,
        }
    }

    /// Owner is mandatory at commit time.
    #[must_use]
    pub fn required(parent_types: Vec<KeywordId>) -> Self {
        Self {
            parent_types,
            required: true,
            max_per_parent: None,
        }
    }

    /// Limits how many entities of this type one parent may own.
    #[must_use]
    pub fn with_max_per_parent(mut self, max: usize) -> Self {
        self.max_per_parent = Some(max);
        self
    }
}

/// Schema definition for a named extension relation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionSchema {
    /// Relation name (e.g., `library`).
    pub name: KeywordId,
    /// Entity type the relation is queried from.
    pub from_type: KeywordId,
    /// Entity type the relation resolves to.
    pub to_type: KeywordId,
    /// How the counterpart is found.
    pub resolution: ExtensionResolution,
}

impl ExtensionSchema {
    /// Creates an extension resolved through the ownership graph.
    #[must_use]
    pub fn via_owner(name: KeywordId, from_type: KeywordId, to_type: KeywordId) -> Self {
        Self {
            name,
            from_type,
            to_type,
            resolution: ExtensionResolution::Owner,
        }
    }

    /// Creates an extension resolved through explicit weak links.
    #[must_use]
    pub fn via_link(name: KeywordId, from_type: KeywordId, to_type: KeywordId) -> Self {
        Self {
            name,
            from_type,
            to_type,
            resolution: ExtensionResolution::Link,
        }
    }
}

/// How an extension relation finds its counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExtensionResolution {
    /// The owning parent, when it has the target type.
    Owner,
    /// A weak link stored with `Builder::link_extension`.
    Link,
}
