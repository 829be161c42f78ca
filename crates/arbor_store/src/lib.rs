//! Typed entity storage with immutable snapshots for Arbor.
//!
//! This crate provides:
//! - [`TypeRegistry`] - Entity schemas and extension relations
//! - [`Snapshot`] - Immutable, versioned views with structural sharing
//! - [`Builder`] - Single-writer transactions that commit new snapshots
//! - [`SymbolicIndex`] - Unique business keys derived from entity fields
//! - [`OwnershipGraph`] - Parent/child containment with cascade removal
//! - [`ChangeLog`] - Ordered diffs produced by each commit
//! - [`VersionedStore`] - The current snapshot, its history, and listeners

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod changelog;
pub mod config;
pub mod entity;
pub mod extension;
pub mod ownership;
pub mod registry;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod symbolic;

pub use builder::Builder;
pub use changelog::{Change, ChangeLog};
pub use config::StoreConfig;
pub use entity::{Entity, EntityMut, EntitySource};
pub use extension::ExtensionLinks;
pub use ownership::OwnershipGraph;
pub use registry::TypeRegistry;
pub use schema::{
    EntitySchema, ExtensionResolution, ExtensionSchema, FieldSchema, OwnerRule, SymbolicIdRule,
};
pub use snapshot::Snapshot;
pub use store::{ChangeEvent, ChangeListener, ListenerId, VersionedStore};
pub use symbolic::{SymbolicId, SymbolicIndex};
