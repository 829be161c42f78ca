//! Core types, values, and persistent collections for Arbor.
//!
//! This crate provides:
//! - [`Value`] - Field values stored on entities
//! - [`EntityId`] - Lineage-scoped entity identifiers
//! - [`Type`] - Type descriptors for schema validation
//! - [`Error`] - Rich error types with context
//! - [`Interner`] - Keyword interning for type tags and field names
//! - Persistent collections ([`LtVec`], [`LtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod entity;
pub mod error;
pub mod intern;
pub mod types;
pub mod value;

pub use collections::{LtMap, LtVec};
pub use entity::EntityId;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use intern::{Interner, KeywordId};
pub use types::Type;
pub use value::Value;
