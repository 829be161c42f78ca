//! Error types for the Arbor store.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::entity::EntityId;
use crate::types::Type;

/// Result alias used throughout Arbor.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Arbor operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a schema violation error.
    #[must_use]
    pub fn schema_violation(entity_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaViolation {
            entity_type: entity_type.into(),
            message: message.into(),
        })
    }

    /// Creates a schema violation for a field whose value has the wrong type.
    #[must_use]
    pub fn field_type_mismatch(
        entity_type: impl Into<String>,
        field: &str,
        expected: &Type,
        actual: &Type,
    ) -> Self {
        Self::schema_violation(
            entity_type,
            format!("field `{field}` expects {expected}, got {actual}"),
        )
    }

    /// Creates a stale handle error.
    #[must_use]
    pub fn stale_handle(id: EntityId) -> Self {
        Self::new(ErrorKind::StaleHandle(id))
    }

    /// Creates a symbolic id conflict error.
    #[must_use]
    pub fn symbolic_id_conflict(key: String, existing: EntityId, incoming: EntityId) -> Self {
        Self::new(ErrorKind::SymbolicIdConflict {
            key,
            existing,
            incoming,
        })
    }

    /// Creates a dangling parent reference error.
    #[must_use]
    pub fn dangling_parent(parent: EntityId, child: EntityId) -> Self {
        Self::new(ErrorKind::DanglingParentReference { parent, child })
    }

    /// Creates an ownership cycle error.
    #[must_use]
    pub fn ownership_cycle(id: EntityId) -> Self {
        Self::new(ErrorKind::OwnershipCycle(id))
    }

    /// Creates a multiple owners error.
    #[must_use]
    pub fn multiple_owners(child: EntityId, existing: EntityId, incoming: EntityId) -> Self {
        Self::new(ErrorKind::MultipleOwnersViolation {
            child,
            existing,
            incoming,
        })
    }

    /// Creates an unknown entity type error.
    #[must_use]
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownType(name.into()))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this error was raised while validating a commit.
    ///
    /// Commit-time errors reject the whole transaction; call-site errors only
    /// reject the single operation that raised them.
    #[must_use]
    pub fn is_commit_rejection(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::SymbolicIdConflict { .. }
                | ErrorKind::DanglingParentReference { .. }
                | ErrorKind::OwnershipCycle(_)
                | ErrorKind::MultipleOwnersViolation { .. }
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Field values do not match the registered schema.
    #[error("schema violation on {entity_type}: {message}")]
    SchemaViolation {
        /// Name of the entity type being created or modified.
        entity_type: String,
        /// Description of the violation.
        message: String,
    },

    /// Entity type was never registered.
    #[error("unknown entity type: {0}")]
    UnknownType(String),

    /// A type, field, or extension name was registered twice.
    #[error("duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// Entity id is not present in the working state.
    #[error("stale handle: {0:?}")]
    StaleHandle(EntityId),

    /// Two entities would share one symbolic id.
    #[error("symbolic id conflict on {key}: {incoming:?} collides with {existing:?}")]
    SymbolicIdConflict {
        /// Rendered symbolic key.
        key: String,
        /// Entity already holding the key.
        existing: EntityId,
        /// Entity that tried to claim the key.
        incoming: EntityId,
    },

    /// Child refers to a parent that is missing or belongs to another lineage.
    #[error("dangling parent reference: {child:?} -> {parent:?}")]
    DanglingParentReference {
        /// Missing parent.
        parent: EntityId,
        /// Child that referenced it.
        child: EntityId,
    },

    /// Ownership edges would form a cycle through this entity.
    #[error("ownership cycle through {0:?}")]
    OwnershipCycle(EntityId),

    /// Child would end up with two owning parents.
    #[error("multiple owners for {child:?}: already owned by {existing:?}, attached to {incoming:?}")]
    MultipleOwnersViolation {
        /// The child entity.
        child: EntityId,
        /// Parent that already owns it.
        existing: EntityId,
        /// Parent that tried to claim it.
        incoming: EntityId,
    },

    /// Extension name was never registered.
    #[error("unknown extension: {0}")]
    UnknownExtension(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation that raised the error (e.g. `commit`, `modify_entity`).
    pub operation: Option<String>,
    /// Snapshot version the operation ran against.
    pub version: Option<u64>,
    /// Entities involved, outermost first.
    pub entities: Vec<EntityId>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Sets the snapshot version.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Adds an involved entity.
    #[must_use]
    pub fn with_entity(mut self, id: EntityId) -> Self {
        self.entities.push(id);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(operation) = &self.operation {
            write!(f, "in {operation}")?;
            if let Some(version) = self.version {
                write!(f, " at v{version}")?;
            }
        }
        if !self.entities.is_empty() {
            writeln!(f)?;
            for id in &self.entities {
                writeln!(f, "  involving {id:?}")?;
            }
        }
        Ok(())
    }
}
