//! Integration tests for library lifecycles
//!
//! Tests creation, conflicts, cascades, renames, and the `library` extension.

use crate::{setup, src};
use arbor_foundation::ErrorKind;
use arbor_library::{
    ExcludeUrlEntity, LibraryEntity, LibraryId, LibraryPropertiesEntity, LibraryRoot,
    LibraryRootTypeId, LibraryTableId,
};

// =============================================================================
// Symbolic Ids
// =============================================================================

#[test]
fn library_resolves_by_library_id() {
    let (model, base) = setup();
    let mut builder = base.open();
    let guava = LibraryEntity::create(&model, &mut builder, "guava", &LibraryTableId::Project, &[], src())
        .unwrap();
    let (s1, _) = builder.commit().unwrap();

    assert_eq!(LibraryEntity::all(&model, &s1).count(), 1);
    let key = LibraryId::new("guava", LibraryTableId::Project);
    let found = LibraryEntity::resolve(&model, &s1, &key).unwrap();
    assert_eq!(found.id(), guava);
    assert_eq!(found.symbolic_id().unwrap(), key);
}

#[test]
fn duplicate_library_id_fails_and_leaves_s1_alone() {
    let (model, base) = setup();
    let mut builder = base.open();
    LibraryEntity::create(&model, &mut builder, "guava", &LibraryTableId::Project, &[], src()).unwrap();
    let (s1, _) = builder.commit().unwrap();

    let mut builder = s1.open();
    LibraryEntity::create(&model, &mut builder, "guava", &LibraryTableId::Project, &[], src()).unwrap();
    let err = builder.commit().unwrap_err();
    match err.kind {
        ErrorKind::SymbolicIdConflict { ref key, .. } => assert!(key.contains("guava")),
        ref other => panic!("expected SymbolicIdConflict, got {other:?}"),
    }

    assert_eq!(LibraryEntity::all(&model, &s1).count(), 1);
    assert_eq!(s1.version(), 1);
}

#[test]
fn two_new_libraries_with_one_id_conflict() {
    let (model, base) = setup();
    let mut builder = base.open();
    LibraryEntity::create(&model, &mut builder, "guava", &LibraryTableId::Project, &[], src()).unwrap();
    LibraryEntity::create(&model, &mut builder, "guava", &LibraryTableId::Project, &[], src()).unwrap();
    let err = builder.commit().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SymbolicIdConflict { .. }));
    assert!(base.is_empty());
}

#[test]
fn same_name_in_different_tables_is_fine() {
    let (model, base) = setup();
    let mut builder = base.open();
    for table in [
        LibraryTableId::Project,
        LibraryTableId::Global("application".into()),
        LibraryTableId::Module("core".into()),
    ] {
        LibraryEntity::create(&model, &mut builder, "guava", &table, &[], src()).unwrap();
    }
    let (snapshot, log) = builder.commit().unwrap();
    assert_eq!(log.added().count(), 3);

    let global = LibraryId::new("guava", LibraryTableId::Global("application".into()));
    let found = LibraryEntity::resolve(&model, &snapshot, &global).unwrap();
    assert_eq!(found.table_id().unwrap(), LibraryTableId::Global("application".into()));
}

#[test]
fn rename_moves_the_library_id() {
    let (model, base) = setup();
    let mut builder = base.open();
    let lib = LibraryEntity::create(&model, &mut builder, "guava", &LibraryTableId::Project, &[], src())
        .unwrap();
    let (s1, _) = builder.commit().unwrap();

    let mut builder = s1.open();
    LibraryEntity::modify(&model, &mut builder, lib, |l| l.set_name("guava-jre")).unwrap();
    let (s2, log) = builder.commit().unwrap();

    let old = LibraryId::new("guava", LibraryTableId::Project);
    let new = LibraryId::new("guava-jre", LibraryTableId::Project);
    assert!(LibraryEntity::resolve(&model, &s2, &old).is_none());
    assert_eq!(LibraryEntity::resolve(&model, &s2, &new).map(|l| l.id()), Some(lib));
    assert_eq!(LibraryEntity::resolve(&model, &s1, &old).map(|l| l.id()), Some(lib));
    assert_eq!(log.modified().count(), 1);
}

#[test]
fn moving_between_tables_moves_the_library_id() {
    let (model, base) = setup();
    let mut builder = base.open();
    let lib = LibraryEntity::create(&model, &mut builder, "junit", &LibraryTableId::Project, &[], src())
        .unwrap();
    let (s1, _) = builder.commit().unwrap();

    let mut builder = s1.open();
    let table = LibraryTableId::Module("core".into());
    LibraryEntity::modify(&model, &mut builder, lib, |l| l.set_table_id(&table)).unwrap();
    let (s2, _) = builder.commit().unwrap();

    assert!(LibraryEntity::resolve(&model, &s2, &LibraryId::new("junit", LibraryTableId::Project)).is_none());
    assert!(LibraryEntity::resolve(&model, &s2, &LibraryId::new("junit", table)).is_some());
}

// =============================================================================
// Cascade
// =============================================================================

#[test]
fn removing_a_library_removes_what_it_owns() {
    let (model, base) = setup();
    let mut builder = base.open();
    let lib = LibraryEntity::create(&model, &mut builder, "guava", &LibraryTableId::Project, &[], src())
        .unwrap();
    let props = LibraryPropertiesEntity::create(&model, &mut builder, lib, "maven", src()).unwrap();
    let excluded = LibraryEntity::add_excluded_root(&model, &mut builder, lib, "file://guava/docs", src())
        .unwrap();
    let loose = ExcludeUrlEntity::create(&model, &mut builder, "file://tmp", src()).unwrap();
    let (s2, _) = builder.commit().unwrap();
    assert!(s2.get(props).is_some());

    let mut builder = s2.open();
    builder.remove_entity(lib).unwrap();
    let (s3, log) = builder.commit().unwrap();

    assert!(s3.get(lib).is_none());
    assert!(s3.get(props).is_none());
    assert!(s3.get(excluded).is_none());
    assert!(s3.get(loose).is_some());
    assert_eq!(log.removed().count(), 3);
    assert_eq!(s3.ownership().edge_count(), 0);
}

// =============================================================================
// Extension
// =============================================================================

#[test]
fn library_extension_before_and_after_unrelated_commit() {
    let (model, base) = setup();
    let mut builder = base.open();
    let lib = LibraryEntity::create(&model, &mut builder, "guava", &LibraryTableId::Project, &[], src())
        .unwrap();
    let loose = ExcludeUrlEntity::create(&model, &mut builder, "file://guava/docs", src()).unwrap();
    let (s1, _) = builder.commit().unwrap();

    let view = ExcludeUrlEntity::get(&model, &s1, loose).unwrap();
    assert!(view.library(&s1).unwrap().is_none());

    let mut builder = s1.open();
    builder.attach_child(lib, loose).unwrap();
    let (s2, _) = builder.commit().unwrap();
    let view = ExcludeUrlEntity::get(&model, &s2, loose).unwrap();
    assert_eq!(view.library(&s2).unwrap().map(|l| l.id()), Some(lib));

    let mut builder = s2.open();
    LibraryEntity::create(&model, &mut builder, "junit", &LibraryTableId::Project, &[], src()).unwrap();
    let (s3, _) = builder.commit().unwrap();
    let view = ExcludeUrlEntity::get(&model, &s3, loose).unwrap();
    assert_eq!(view.library(&s3).unwrap().map(|l| l.name()), Some("guava"));
}

// =============================================================================
// Roots
// =============================================================================

#[test]
fn roots_survive_a_commit() {
    let (model, base) = setup();
    let roots = vec![
        LibraryRoot::new("jar://guava.jar!/", LibraryRootTypeId::COMPILED),
        LibraryRoot::new("jar://guava-sources.jar!/", LibraryRootTypeId::SOURCES),
    ];
    let mut builder = base.open();
    let lib = LibraryEntity::create(&model, &mut builder, "guava", &LibraryTableId::Project, &roots, src())
        .unwrap();
    let (snapshot, _) = builder.commit().unwrap();

    let view = LibraryEntity::get(&model, &snapshot, lib).unwrap();
    assert_eq!(view.roots().unwrap(), roots);
}
