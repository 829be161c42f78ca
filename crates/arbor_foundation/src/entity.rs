//! Entity identifiers scoped to a snapshot lineage.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Entity identifier, unique within one snapshot lineage.
///
/// Indices are handed out monotonically and never reused, so an id that
/// survives a removal can never alias a later entity. The lineage tag lets the
/// store recognize ids minted by an unrelated store.
///
/// # Layout
/// - `index`: 64-bit allocation counter within the lineage
/// - `lineage`: 32-bit identifier of the lineage that allocated the id
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityId {
    /// Lineage that allocated this id.
    pub lineage: u32,
    /// Allocation index within the lineage.
    pub index: u64,
}

impl EntityId {
    /// Creates a new entity ID with the given lineage and index.
    #[must_use]
    pub const fn new(lineage: u32, index: u64) -> Self {
        Self { lineage, index }
    }

    /// Returns a sentinel value representing "no entity".
    ///
    /// This uses `u64::MAX` as the index, which is never allocated.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            lineage: 0,
            index: u64::MAX,
        }
    }

    /// Returns true if this is the null sentinel value.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.index == u64::MAX
    }

    /// Returns true if this id was allocated by the given lineage.
    #[must_use]
    pub const fn belongs_to(self, lineage: u32) -> bool {
        !self.is_null() && self.lineage == lineage
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(null)")
        } else {
            write!(f, "EntityId({}@{})", self.index, self.lineage)
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({})", self.index)
        }
    }
}
