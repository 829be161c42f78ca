//! Library tables and library identities.

use std::fmt;

use arbor_foundation::{Error, LtMap, Result, Type, Value};
use arbor_store::SymbolicId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::LibraryModel;

const KIND: &str = "kind";
const LEVEL: &str = "level";
const MODULE: &str = "module";

/// The table a library is declared in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LibraryTableId {
    /// The project library table.
    Project,
    /// An application-level table, identified by its level name.
    Global(String),
    /// A module's private library table, identified by module name.
    Module(String),
}

impl LibraryTableId {
    /// Field type used to store a table id on an entity.
    #[must_use]
    pub fn field_type() -> Type {
        Type::map(Type::String, Type::String)
    }

    /// Encodes the table id as a field value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map = match self {
            Self::Project => LtMap::new().insert(Value::from(KIND), Value::from("project")),
            Self::Global(level) => LtMap::new()
                .insert(Value::from(KIND), Value::from("global"))
                .insert(Value::from(LEVEL), Value::from(level.as_str())),
            Self::Module(module) => LtMap::new()
                .insert(Value::from(KIND), Value::from("module"))
                .insert(Value::from(MODULE), Value::from(module.as_str())),
        };
        Value::Map(map)
    }

    /// Decodes a table id from a field value.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the value is not an encoded table id.
    pub fn from_value(value: &Value) -> Result<Self> {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let invalid = || {
            Error::schema_violation("LibraryEntity", format!("invalid library table id: {value}"))
        };

        match value.get(KIND).and_then(Value::as_str) {
            Some("project") => Ok(Self::Project),
            Some("global") => text(LEVEL).map(Self::Global).ok_or_else(invalid),
            Some("module") => text(MODULE).map(Self::Module).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for LibraryTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Global(level) => write!(f, "global:{level}"),
            Self::Module(module) => write!(f, "module:{module}"),
        }
    }
}

/// Symbolic id of a library: its name within its table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LibraryId {
    /// Library name.
    pub name: String,
    /// Table the library belongs to.
    pub table_id: LibraryTableId,
}

impl LibraryId {
    /// Creates a library id.
    #[must_use]
    pub fn new(name: impl Into<String>, table_id: LibraryTableId) -> Self {
        Self {
            name: name.into(),
            table_id,
        }
    }

    /// Converts to the key the store indexes libraries under.
    #[must_use]
    pub fn to_symbolic(&self, model: &LibraryModel) -> SymbolicId {
        SymbolicId::new(
            model.library_id,
            [Value::from(self.name.as_str()), self.table_id.to_value()],
        )
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LibraryId({}, {})", self.name, self.table_id)
    }
}
