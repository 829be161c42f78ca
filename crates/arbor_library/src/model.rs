//! Registration of the library entity types.

use arbor_foundation::{EntityId, Error, KeywordId, Result, Type};
use arbor_store::{
    Builder, EntitySchema, ExtensionSchema, FieldSchema, OwnerRule, SymbolicIdRule, TypeRegistry,
};

use crate::root::LibraryRoot;
use crate::table::LibraryTableId;

/// Interned names of the library types, fields, and relations.
///
/// Obtained from [`LibraryModel::register`]; every view and factory in this
/// crate takes the model to find its fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryModel {
    /// `LibraryEntity` type tag.
    pub library: KeywordId,
    /// `LibraryPropertiesEntity` type tag.
    pub library_properties: KeywordId,
    /// `ExcludeUrlEntity` type tag.
    pub exclude_url: KeywordId,
    /// Library name field.
    pub name: KeywordId,
    /// Library table field.
    pub table_id: KeywordId,
    /// Library roots field.
    pub roots: KeywordId,
    /// Properties type field.
    pub library_type: KeywordId,
    /// Properties XML payload field.
    pub properties_xml_tag: KeywordId,
    /// Excluded URL field.
    pub url: KeywordId,
    /// Symbolic id namespace of libraries.
    pub library_id: KeywordId,
    /// Extension from an excluded root to its library.
    pub library_extension: KeywordId,
}

impl LibraryModel {
    /// Registers the library types and the `library` extension.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRegistration` if any of the types is already registered.
    pub fn register(registry: &mut TypeRegistry) -> Result<Self> {
        let model = Self {
            library: registry.keyword("LibraryEntity"),
            library_properties: registry.keyword("LibraryPropertiesEntity"),
            exclude_url: registry.keyword("ExcludeUrlEntity"),
            name: registry.keyword("name"),
            table_id: registry.keyword("tableId"),
            roots: registry.keyword("roots"),
            library_type: registry.keyword("libraryType"),
            properties_xml_tag: registry.keyword("propertiesXmlTag"),
            url: registry.keyword("url"),
            library_id: registry.keyword("LibraryId"),
            library_extension: registry.keyword("library"),
        };

        registry.register(
            EntitySchema::new(model.library)
                .with_field(FieldSchema::required(model.name, Type::String))
                .with_field(FieldSchema::required(model.table_id, LibraryTableId::field_type()))
                .with_field(FieldSchema::required(model.roots, LibraryRoot::list_type()))
                .with_symbolic_id(SymbolicIdRule::new(
                    model.library_id,
                    vec![model.name, model.table_id],
                )),
        )?;
        registry.register(
            EntitySchema::new(model.library_properties)
                .with_field(FieldSchema::required(model.library_type, Type::String))
                .with_field(FieldSchema::optional_nil(model.properties_xml_tag, Type::String))
                .with_owner(OwnerRule::required(vec![model.library]).with_max_per_parent(1)),
        )?;
        registry.register(
            EntitySchema::new(model.exclude_url)
                .with_field(FieldSchema::required(model.url, Type::String))
                .with_owner(OwnerRule::optional(vec![model.library])),
        )?;
        registry.register_extension(ExtensionSchema::via_owner(
            model.library_extension,
            model.exclude_url,
            model.library,
        ))?;

        Ok(model)
    }

    /// Fails unless `id` is in the builder's working state with type `expected`.
    pub(crate) fn expect_type(
        &self,
        builder: &Builder,
        id: EntityId,
        expected: KeywordId,
    ) -> Result<()> {
        let Some(entity) = builder.get(id) else {
            return Err(Error::stale_handle(id));
        };
        if entity.entity_type() == expected {
            return Ok(());
        }
        let registry = builder.base().registry();
        Err(Error::schema_violation(
            registry.name_of(expected),
            format!(
                "{id} is a `{}`",
                registry.name_of(entity.entity_type())
            ),
        ))
    }
}
