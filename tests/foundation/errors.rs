//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use arbor_foundation::{EntityId, Error, ErrorContext, ErrorKind, Type};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_schema_violation() {
    let err = Error::schema_violation("LibraryEntity", "missing required field `name`");
    assert!(matches!(err.kind, ErrorKind::SchemaViolation { .. }));
    let msg = format!("{err}");
    assert!(msg.contains("LibraryEntity"));
    assert!(msg.contains("name"));
}

#[test]
fn error_field_type_mismatch() {
    let err = Error::field_type_mismatch("LibraryEntity", "roots", &Type::vec(Type::String), &Type::Int);
    let msg = format!("{err}");
    assert!(msg.contains("roots"));
    assert!(msg.contains("vec<string>"));
}

#[test]
fn error_stale_handle() {
    let id = EntityId::new(1, 42);
    let err = Error::stale_handle(id);
    assert!(matches!(err.kind, ErrorKind::StaleHandle(stale) if stale == id));
    assert!(format!("{err}").contains("42"));
}

#[test]
fn error_dangling_parent() {
    let parent = EntityId::new(2, 0);
    let child = EntityId::new(1, 3);
    let err = Error::dangling_parent(parent, child);
    assert!(matches!(
        err.kind,
        ErrorKind::DanglingParentReference { parent: p, child: c } if p == parent && c == child
    ));
}

#[test]
fn error_unknown_type() {
    let err = Error::unknown_type("ModuleEntity");
    assert!(format!("{err}").contains("ModuleEntity"));
}

// =============================================================================
// Error Classification
// =============================================================================

#[test]
fn only_commit_checks_are_rejections() {
    let a = EntityId::new(1, 0);
    let b = EntityId::new(1, 1);
    assert!(Error::ownership_cycle(a).is_commit_rejection());
    assert!(Error::multiple_owners(a, b, b).is_commit_rejection());
    assert!(!Error::internal("boom").is_commit_rejection());
    assert!(!Error::unknown_type("x").is_commit_rejection());
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_renders_operation_and_entities() {
    let id = EntityId::new(1, 7);
    let ctx = ErrorContext::new()
        .with_operation("commit")
        .with_version(4)
        .with_entity(id);
    let rendered = format!("{ctx}");
    assert!(rendered.contains("in commit at v4"));
    assert!(rendered.contains("involving EntityId(7@1)"));
}

#[test]
fn context_is_optional() {
    let err = Error::internal("boom");
    assert!(err.context.is_none());
    let err = err.with_context(ErrorContext::new().with_operation("remove_entity"));
    assert_eq!(err.context.unwrap().operation.as_deref(), Some("remove_entity"));
}
