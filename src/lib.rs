//! Arbor - Versioned entity store with immutable snapshots
//!
//! This crate re-exports all layers of the Arbor system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: arbor_library    - Library, properties, and excluded-root entities
//! Layer 1: arbor_store      - Registry, snapshots, builders, symbolic ids, ownership
//! Layer 0: arbor_foundation - Core types (Value, EntityId, Error)
//! ```

pub use arbor_foundation as foundation;
pub use arbor_library as library;
pub use arbor_store as store;
