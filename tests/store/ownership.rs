//! Integration tests for the ownership graph
//!
//! Tests cascade deletion, required owners, and commit-time edge checks.

use crate::{Model, src};
use arbor_foundation::{EntityId, ErrorKind};
use arbor_store::{Entity, StoreConfig};

// =============================================================================
// Cascade Delete
// =============================================================================

#[test]
fn removing_an_owner_removes_its_subtree() {
    let m = Model::new();
    let mut builder = m.base.open();
    let module = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let root = builder.create_child(module, m.content_root, m.at("file://core"), src()).unwrap();
    let main = builder.create_child(root, m.source_folder, m.at("file://core/src"), src()).unwrap();
    let test = builder.create_child(root, m.source_folder, m.at("file://core/test"), src()).unwrap();
    let other = builder.create_entity(m.module, m.named("ui"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();
    assert_eq!(v1.children(root).map(Entity::id).collect::<Vec<_>>(), vec![main, test]);

    let mut builder = v1.open();
    let removed = builder.remove_entity(module).unwrap();
    assert_eq!(removed[0], module);
    assert_eq!(removed.len(), 4);
    let (v2, log) = builder.commit().unwrap();

    for id in [module, root, main, test] {
        assert!(v2.get(id).is_none());
        assert!(v1.get(id).is_some());
    }
    assert!(v2.get(other).is_some());
    assert_eq!(log.removed().count(), 4);
    assert!(v2.ownership().parent_of(main).is_none());
    assert_eq!(v2.ownership().edge_count(), 0);
}

#[test]
fn removing_a_child_keeps_the_owner() {
    let m = Model::new();
    let mut builder = m.base.open();
    let module = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let root = builder.create_child(module, m.content_root, m.at("file://core"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open();
    builder.remove_entity(root).unwrap();
    let (v2, _) = builder.commit().unwrap();

    assert!(v2.get(module).is_some());
    assert_eq!(v2.children(module).count(), 0);
}

#[test]
fn cascade_depth_is_bounded() {
    let m = Model::new();
    let mut builder = m.base.open();
    let module = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let root = builder.create_child(module, m.content_root, m.at("file://core"), src()).unwrap();
    builder.create_child(root, m.source_folder, m.at("file://core/src"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open_with(StoreConfig::default().with_max_cascade_depth(1));
    let err = builder.remove_entity(module).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Internal(_)));
    assert!(builder.contains(module));
}

// =============================================================================
// Commit-Time Edge Checks
// =============================================================================

#[test]
fn child_of_owner_removed_in_same_transaction_is_cascaded() {
    let m = Model::new();
    let mut builder = m.base.open();
    let module = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open();
    builder.remove_entity(module).unwrap();
    let late = builder.create_child(module, m.content_root, m.at("file://core"), src()).unwrap();
    let (v2, log) = builder.commit().unwrap();

    assert!(v2.get(late).is_none());
    assert!(v2.is_empty());
    assert_eq!(log.len(), 1);
    assert_eq!(log.removed().next().map(|(id, _)| id), Some(module));
}

#[test]
fn parent_from_another_lineage_is_dangling() {
    let m = Model::new();
    let foreign = Model::new();
    let mut builder = foreign.base.open();
    let elsewhere = builder.create_entity(foreign.module, foreign.named("core"), src()).unwrap();
    builder.commit().unwrap();

    let mut builder = m.base.open();
    let root = builder.create_child(elsewhere, m.content_root, m.at("file://core"), src()).unwrap();
    let err = builder.commit().unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::DanglingParentReference { parent, child } if parent == elsewhere && child == root
    ));
}

#[test]
fn missing_required_owner_is_rejected() {
    let m = Model::new();
    let mut builder = m.base.open();
    let root = builder.create_entity(m.content_root, m.at("file://loose"), src()).unwrap();
    let err = builder.commit().unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::DanglingParentReference { parent, child } if parent == EntityId::null() && child == root
    ));
}

#[test]
fn optional_owner_may_be_absent_or_attached_later() {
    let m = Model::new();
    let mut builder = m.base.open();
    let module = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let facet = builder.create_entity(m.facet, m.named("kotlin"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();
    assert!(v1.parent(facet).is_none());

    let mut builder = v1.open();
    builder.attach_child(module, facet).unwrap();
    assert_eq!(builder.children_of(module).collect::<Vec<_>>(), vec![facet]);
    let (v2, log) = builder.commit().unwrap();
    assert_eq!(v2.parent(facet).map(Entity::id), Some(module));
    assert!(log.is_empty());
}

#[test]
fn second_owner_is_rejected() {
    let m = Model::new();
    let mut builder = m.base.open();
    let core = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let ui = builder.create_entity(m.module, m.named("ui"), src()).unwrap();
    let facet = builder.create_child(core, m.facet, m.named("kotlin"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open();
    builder.attach_child(ui, facet).unwrap();
    let err = builder.commit().unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::MultipleOwnersViolation { child, existing, incoming }
            if child == facet && existing == core && incoming == ui
    ));
}

#[test]
fn owner_type_is_checked_at_the_call_site() {
    let m = Model::new();
    let mut builder = m.base.open();
    let module = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let err = builder
        .create_child(module, m.source_folder, m.at("file://core/src"), src())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SchemaViolation { .. }));
    assert_eq!(builder.all_of_type(m.source_folder).count(), 0);
}
