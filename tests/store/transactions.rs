//! Integration tests for builders and commits
//!
//! Tests symbolic id uniqueness, discarded transactions, and change logs.

use crate::{Model, src};
use arbor_foundation::{Error, ErrorKind, Value};
use arbor_store::{Change, Entity};

// =============================================================================
// Symbolic Ids
// =============================================================================

#[test]
fn conflicting_symbolic_id_rejects_the_commit() {
    let m = Model::new();
    let mut builder = m.base.open();
    let existing = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open();
    builder.create_entity(m.module, m.named("ui"), src()).unwrap();
    builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let err = builder.commit().unwrap_err();

    match err.kind {
        ErrorKind::SymbolicIdConflict { ref key, existing: owner, .. } => {
            assert_eq!(owner, existing);
            assert!(key.contains("core"));
        }
        ref other => panic!("expected SymbolicIdConflict, got {other:?}"),
    }
    assert!(err.is_commit_rejection());
    assert_eq!(v1.len(), 1);
    assert!(v1.resolve_symbolic_id(&m.key("ui")).is_none());
}

#[test]
fn swapping_names_in_one_transaction_is_allowed() {
    let m = Model::new();
    let mut builder = m.base.open();
    let a = builder.create_entity(m.module, m.named("a"), src()).unwrap();
    let b = builder.create_entity(m.module, m.named("b"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open();
    builder.modify_entity(a, |e| e.set(m.name, "b")).unwrap();
    builder.modify_entity(b, |e| e.set(m.name, "a")).unwrap();
    let (v2, log) = builder.commit().unwrap();

    assert_eq!(v2.resolve_symbolic_id(&m.key("a")).map(Entity::id), Some(b));
    assert_eq!(v2.resolve_symbolic_id(&m.key("b")).map(Entity::id), Some(a));
    assert_eq!(log.modified().count(), 2);
}

#[test]
fn removing_frees_the_symbolic_id() {
    let m = Model::new();
    let mut builder = m.base.open();
    let old = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open();
    builder.remove_entity(old).unwrap();
    let new = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let (v2, _) = builder.commit().unwrap();
    assert_eq!(v2.resolve_symbolic_id(&m.key("core")).map(Entity::id), Some(new));
}

// =============================================================================
// Discarded Transactions
// =============================================================================

#[test]
fn dropped_builder_changes_nothing() {
    let m = Model::new();
    let mut builder = m.base.open();
    let id = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();
    let before = v1.clone();

    {
        let mut builder = v1.open();
        builder.modify_entity(id, |e| e.set(m.name, "renamed")).unwrap();
        builder.create_entity(m.module, m.named("ui"), src()).unwrap();
        builder.remove_entity(id).unwrap();
    }

    assert_eq!(v1, before);
    assert_eq!(v1.get(id).unwrap().str_field(m.name), Some("core"));
}

#[test]
fn failed_edit_keeps_no_writes() {
    let m = Model::new();
    let mut builder = m.base.open();
    let id = builder.create_entity(m.module, m.named("core"), src()).unwrap();

    let err = builder
        .modify_entity(id, |e| {
            e.set(m.name, "renamed")?;
            Err(Error::internal("abort"))
        })
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Internal(_)));
    assert_eq!(builder.get(id).unwrap().str_field(m.name), Some("core"));
}

#[test]
fn bad_write_is_rejected_at_the_call_site() {
    let m = Model::new();
    let mut builder = m.base.open();
    let id = builder.create_entity(m.module, m.named("core"), src()).unwrap();

    let err = builder
        .modify_entity(id, |e| e.set(m.name, Value::Int(3)))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SchemaViolation { .. }));
    assert!(!err.is_commit_rejection());

    let err = builder
        .create_entity(m.module, [(m.url, Value::from("file://x"))], src())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SchemaViolation { .. }));
}

// =============================================================================
// Change Logs
// =============================================================================

#[test]
fn empty_commit_yields_an_equal_snapshot() {
    let m = Model::new();
    let mut builder = m.base.open();
    builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let (v2, log) = v1.open().commit().unwrap();
    assert!(log.is_empty());
    assert_eq!(v2, v1);
    assert_eq!(v2.version(), v1.version() + 1);
    assert_eq!(log.from_version(), 1);
    assert_eq!(log.to_version(), 2);
}

#[test]
fn log_records_first_touch_order() {
    let m = Model::new();
    let mut builder = m.base.open();
    let a = builder.create_entity(m.module, m.named("a"), src()).unwrap();
    let b = builder.create_entity(m.module, m.named("b"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open();
    builder.remove_entity(b).unwrap();
    let c = builder.create_entity(m.module, m.named("c"), src()).unwrap();
    builder.modify_entity(a, |e| e.set(m.name, "a2")).unwrap();
    let (_, log) = builder.commit().unwrap();

    let order: Vec<_> = log.iter().map(Change::id).collect();
    assert_eq!(order, vec![b, c, a]);
    assert!(matches!(log.changes()[0], Change::Removed { .. }));
    assert!(matches!(log.changes()[1], Change::Added(_)));
    let (id, old, new) = log.modified().next().unwrap();
    assert_eq!(id, a);
    assert_eq!(old.str_field(m.name), Some("a"));
    assert_eq!(new.str_field(m.name), Some("a2"));
}

#[test]
fn transient_and_noop_edits_are_not_logged() {
    let m = Model::new();
    let mut builder = m.base.open();
    let id = builder.create_entity(m.module, m.named("core"), src()).unwrap();
    let (v1, _) = builder.commit().unwrap();

    let mut builder = v1.open();
    let scratch = builder.create_entity(m.module, m.named("scratch"), src()).unwrap();
    builder.remove_entity(scratch).unwrap();
    builder.modify_entity(id, |e| e.set(m.name, "core")).unwrap();
    builder
        .modify_entity(id, |e| {
            e.set(m.name, "tmp")?;
            e.set(m.name, "core")
        })
        .unwrap();
    let (v2, log) = builder.commit().unwrap();

    assert!(log.is_empty(), "unexpected changes: {log:?}");
    assert_eq!(v2, v1);
}
