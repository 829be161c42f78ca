//! Library roots: value objects embedded in a library's field list.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use arbor_foundation::{Error, LtMap, Result, Type, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const URL: &str = "url";
const TYPE: &str = "type";
const INCLUSION: &str = "inclusion";

/// Kind of files a library root contributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LibraryRootTypeId(Cow<'static, str>);

impl LibraryRootTypeId {
    /// Compiled classes.
    pub const COMPILED: Self = Self(Cow::Borrowed("CLASSES"));
    /// Source files.
    pub const SOURCES: Self = Self(Cow::Borrowed("SOURCES"));

    /// Creates a root type with a custom name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LibraryRootTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which files under a root are included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InclusionOptions {
    /// The root itself.
    #[default]
    RootItself,
    /// Every archive directly under the root.
    ArchivesUnderRoot,
    /// Every archive under the root, recursively.
    ArchivesUnderRootRecursively,
}

impl InclusionOptions {
    /// Returns the stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RootItself => "ROOT_ITSELF",
            Self::ArchivesUnderRoot => "ARCHIVES_UNDER_ROOT",
            Self::ArchivesUnderRootRecursively => "ARCHIVES_UNDER_ROOT_RECURSIVELY",
        }
    }
}

impl FromStr for InclusionOptions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ROOT_ITSELF" => Ok(Self::RootItself),
            "ARCHIVES_UNDER_ROOT" => Ok(Self::ArchivesUnderRoot),
            "ARCHIVES_UNDER_ROOT_RECURSIVELY" => Ok(Self::ArchivesUnderRootRecursively),
            other => Err(Error::schema_violation(
                "LibraryEntity",
                format!("unknown inclusion option `{other}`"),
            )),
        }
    }
}

impl fmt::Display for InclusionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A root of a library.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LibraryRoot {
    /// Location of the root.
    pub url: String,
    /// Kind of files the root contributes.
    pub root_type: LibraryRootTypeId,
    /// Which files under the root are included.
    pub inclusion_options: InclusionOptions,
}

impl LibraryRoot {
    /// Creates a root that includes only itself.
    #[must_use]
    pub fn new(url: impl Into<String>, root_type: LibraryRootTypeId) -> Self {
        Self {
            url: url.into(),
            root_type,
            inclusion_options: InclusionOptions::default(),
        }
    }

    /// Sets the inclusion options.
    #[must_use]
    pub fn with_inclusion_options(mut self, options: InclusionOptions) -> Self {
        self.inclusion_options = options;
        self
    }

    /// Field type used to store a list of roots on an entity.
    #[must_use]
    pub fn list_type() -> Type {
        Type::vec(Type::map(Type::String, Type::String))
    }

    /// Encodes the root as a field value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Map(
            LtMap::new()
                .insert(Value::from(URL), Value::from(self.url.as_str()))
                .insert(Value::from(TYPE), Value::from(self.root_type.name()))
                .insert(
                    Value::from(INCLUSION),
                    Value::from(self.inclusion_options.as_str()),
                ),
        )
    }

    /// Decodes a root from a field value.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the value is not an encoded root.
    pub fn from_value(value: &Value) -> Result<Self> {
        let text = |key: &str| {
            value.get(key).and_then(Value::as_str).ok_or_else(|| {
                Error::schema_violation(
                    "LibraryEntity",
                    format!("library root is missing `{key}`: {value}"),
                )
            })
        };
        Ok(Self {
            url: text(URL)?.to_string(),
            root_type: LibraryRootTypeId::new(text(TYPE)?),
            inclusion_options: text(INCLUSION)?.parse()?,
        })
    }

    /// Encodes a list of roots.
    #[must_use]
    pub fn list_to_value(roots: &[LibraryRoot]) -> Value {
        Value::Vec(roots.iter().map(LibraryRoot::to_value).collect())
    }

    /// Decodes a list of roots.
    ///
    /// # Errors
    ///
    /// Returns `SchemaViolation` if the value is not a list of encoded roots.
    pub fn list_from_value(value: &Value) -> Result<Vec<LibraryRoot>> {
        match value {
            Value::Nil => Ok(Vec::new()),
            Value::Vec(items) => items.iter().map(LibraryRoot::from_value).collect(),
            other => Err(Error::schema_violation(
                "LibraryEntity",
                format!("roots must be a list, got {other}"),
            )),
        }
    }
}
