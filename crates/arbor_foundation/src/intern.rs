//! Keyword interning for type tags and field names.
//!
//! Every entity type and every declared field is named by a keyword. Interning
//! turns those names into small copyable ids so entity field maps stay compact
//! and comparisons are integer compares.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interned keyword identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeywordId(pub(crate) u32);

impl KeywordId {
    /// Returns the raw index of this keyword.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for KeywordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeywordId({})", self.0)
    }
}

/// Interner mapping keyword strings to ids and back.
///
/// Not thread-safe for writes; the type registry interns everything while it
/// is being built and only reads afterwards.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interner {
    /// Keyword storage indexed by id.
    keywords: Vec<Arc<str>>,
    /// Map from keyword string to `KeywordId`.
    keyword_map: HashMap<Arc<str>, KeywordId>,
}

impl Interner {
    /// Creates a new empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a keyword, returning its [`KeywordId`].
    ///
    /// # Panics
    ///
    /// Panics if the number of interned keywords exceeds `u32::MAX`.
    pub fn intern_keyword(&mut self, s: &str) -> KeywordId {
        if let Some(&id) = self.keyword_map.get(s) {
            return id;
        }

        let idx = u32::try_from(self.keywords.len()).expect("too many keywords");
        let arc: Arc<str> = s.into();
        self.keywords.push(arc.clone());

        let id = KeywordId(idx);
        self.keyword_map.insert(arc, id);
        id
    }

    /// Looks up an already-interned keyword without interning it.
    #[must_use]
    pub fn lookup_keyword(&self, s: &str) -> Option<KeywordId> {
        self.keyword_map.get(s).copied()
    }

    /// Gets the string for a keyword.
    #[must_use]
    pub fn get_keyword(&self, id: KeywordId) -> Option<&str> {
        self.keywords.get(id.0 as usize).map(AsRef::as_ref)
    }

    /// Returns the number of interned keywords.
    #[must_use]
    pub fn keyword_count(&self) -> usize {
        self.keywords.len()
    }
}
