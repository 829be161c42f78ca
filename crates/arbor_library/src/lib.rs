//! Library entities for Arbor.
//!
//! This crate declares the library part of a project model on top of
//! `arbor_store`:
//! - [`LibraryEntity`] - A named library in a library table, keyed by [`LibraryId`]
//! - [`LibraryPropertiesEntity`] - Custom properties owned by a library
//! - [`ExcludeUrlEntity`] - Excluded URLs, with a weak `library` back-reference
//! - [`LibraryRoot`] - Root value objects embedded in a library
//!
//! Call [`LibraryModel::register`] once while building the type registry,
//! then pass the returned model to the views and factories.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod exclude;
pub mod library;
pub mod model;
pub mod properties;
pub mod root;
pub mod table;

pub use exclude::{ExcludeUrlEntity, ExcludeUrlEntityMut};
pub use library::{LibraryEntity, LibraryEntityMut};
pub use model::LibraryModel;
pub use properties::{LibraryPropertiesEntity, LibraryPropertiesEntityMut};
pub use root::{InclusionOptions, LibraryRoot, LibraryRootTypeId};
pub use table::{LibraryId, LibraryTableId};
