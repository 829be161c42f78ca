//! Integration tests for Layer 1: Store
//!
//! Tests snapshots, builders, ownership cascades, extension relations,
//! and the versioned store against a small module/content-root model.

mod extensions;
mod ownership;
mod transactions;

use arbor_foundation::{KeywordId, Type, Value};
use arbor_store::{
    EntitySchema, EntitySource, ExtensionSchema, FieldSchema, OwnerRule, Snapshot, SymbolicId,
    SymbolicIdRule, TypeRegistry,
};

/// Keywords of the test model plus an empty snapshot over it.
pub struct Model {
    pub base: Snapshot,
    pub module: KeywordId,
    pub content_root: KeywordId,
    pub source_folder: KeywordId,
    pub facet: KeywordId,
    pub name: KeywordId,
    pub url: KeywordId,
    pub module_id: KeywordId,
    pub owning_module: KeywordId,
    pub depends_on: KeywordId,
}

impl Model {
    pub fn new() -> Self {
        let mut registry = TypeRegistry::new();
        let module = registry.keyword("ModuleEntity");
        let content_root = registry.keyword("ContentRootEntity");
        let source_folder = registry.keyword("SourceFolderEntity");
        let facet = registry.keyword("FacetEntity");
        let name = registry.keyword("name");
        let url = registry.keyword("url");
        let module_id = registry.keyword("ModuleId");
        let owning_module = registry.keyword("module");
        let depends_on = registry.keyword("dependsOn");

        registry
            .register(
                EntitySchema::new(module)
                    .with_field(FieldSchema::required(name, Type::String))
                    .with_symbolic_id(SymbolicIdRule::new(module_id, vec![name])),
            )
            .unwrap();
        registry
            .register(
                EntitySchema::new(content_root)
                    .with_field(FieldSchema::required(url, Type::String))
                    .with_owner(OwnerRule::required(vec![module])),
            )
            .unwrap();
        registry
            .register(
                EntitySchema::new(source_folder)
                    .with_field(FieldSchema::required(url, Type::String))
                    .with_owner(OwnerRule::required(vec![content_root])),
            )
            .unwrap();
        registry
            .register(
                EntitySchema::new(facet)
                    .with_field(FieldSchema::required(name, Type::String))
                    .with_owner(OwnerRule::optional(vec![module])),
            )
            .unwrap();
        registry
            .register_extension(ExtensionSchema::via_owner(owning_module, content_root, module))
            .unwrap();
        registry
            .register_extension(ExtensionSchema::via_link(depends_on, module, module))
            .unwrap();

        Self {
            base: Snapshot::empty(registry.freeze()),
            module,
            content_root,
            source_folder,
            facet,
            name,
            url,
            module_id,
            owning_module,
            depends_on,
        }
    }

    pub fn key(&self, name: &str) -> SymbolicId {
        SymbolicId::new(self.module_id, [Value::from(name)])
    }

    pub fn named(&self, name: &str) -> [(KeywordId, Value); 1] {
        [(self.name, Value::from(name))]
    }

    pub fn at(&self, url: &str) -> [(KeywordId, Value); 1] {
        [(self.url, Value::from(url))]
    }
}

pub fn src() -> EntitySource {
    EntitySource::new("test")
}
