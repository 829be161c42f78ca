//! Integration tests for extension relations
//!
//! Tests owner-based and link-based resolution across commits.

use crate::{Model, src};
use arbor_foundation::{EntityId, ErrorKind};
use arbor_store::Entity;

// =============================================================================
// Owner Resolution
// =============================================================================

#[test]
fn owner_extension_survives_unrelated_commits() {
    let m = Model::new();
    let mut builder = m.base.open();
    let module = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let root = builder.create_child(module, m.content_root, m.at("file://core"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open();
    builder.create_entity(m.module, m.named("ui"), src()).unwrap();
    let (v2, _) = builder.commit().unwrap();

    for snapshot in [&v1, &v2] {
        let owner = snapshot.resolve_extension(m.owning_module, root).unwrap();
        assert_eq!(owner.map(Entity::id), Some(module));
    }
}

#[test]
fn owner_extension_is_absent_for_other_sources() {
    let m = Model::new();
    let mut builder = m.base.open();
    let module = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    assert!(v1.resolve_extension(m.owning_module, module).unwrap().is_none());
    assert!(v1
        .resolve_extension(m.owning_module, EntityId::new(v1.lineage(), 99))
        .unwrap()
        .is_none());
}

#[test]
fn unknown_extension_is_an_error() {
    let m = Model::new();
    let err = m.base.resolve_extension(m.name, EntityId::null()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownExtension(_)));
}

// =============================================================================
// Link Resolution
// =============================================================================

#[test]
fn links_resolve_until_unlinked() {
    let m = Model::new();
    let mut builder = m.base.open();
    let app = builder.create_entity(m.module, m.named("app"), src()).unwrap();
    let core = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    builder.link_extension(m.depends_on, app, core).unwrap();
    let (v1, log) = builder.commit().unwrap();
    assert_eq!(log.added().count(), 2);
    assert_eq!(
        v1.resolve_extension(m.depends_on, app).unwrap().map(Entity::id),
        Some(core)
    );
    assert!(v1.resolve_extension(m.depends_on, core).unwrap().is_none());

    let mut builder = v1.open();
    assert_eq!(builder.unlink_extension(m.depends_on, app).unwrap(), Some(core));
    let (v2, _) = builder.commit().unwrap();
    assert!(v2.resolve_extension(m.depends_on, app).unwrap().is_none());
    assert_ne!(v2, v1);
}

#[test]
fn removing_the_target_drops_the_link() {
    let m = Model::new();
    let mut builder = m.base.open();
    let app = builder.create_entity(m.module, m.named("app"), src()).unwrap();
    let core = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    builder.link_extension(m.depends_on, app, core).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open();
    builder.remove_entity(core).unwrap();
    let (v2, _) = builder.commit().unwrap();

    assert!(v2.get(app).is_some());
    assert!(v2.resolve_extension(m.depends_on, app).unwrap().is_none());
    assert!(v2.links().is_empty());
}

#[test]
fn owner_extensions_cannot_be_linked() {
    let m = Model::new();
    let mut builder = m.base.open();
    let module = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let root = builder.create_child(module, m.content_root, m.at("file://core"), src()).unwrap();

    let err = builder.link_extension(m.owning_module, root, module).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SchemaViolation { .. }));

    let err = builder.link_extension(m.depends_on, root, module).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SchemaViolation { .. }));
}
