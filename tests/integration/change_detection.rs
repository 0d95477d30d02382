//! Integration tests for change scans across registrations and mutations

use super::test_utils::{Document, Label};
use change_registry::{shared, Fingerprint, Registry};
use std::sync::Arc;

#[test]
fn test_no_changes_until_fingerprint_moves() {
    let mut registry = Registry::new();
    let doc = shared(Document::new("readme", "hello"));
    registry.register("a", doc.clone());

    assert!(registry.scan_changes().is_empty());
    assert!(registry.scan_changes().is_empty());

    // bookkeeping-only change leaves the fingerprint alone
    doc.lock().revision += 1;
    assert!(registry.scan_changes().is_empty());

    doc.lock().edit("hello, world");
    assert_eq!(registry.scan_changes().len(), 1);
}

#[test]
fn test_change_back_to_original_is_reported() {
    let mut registry = Registry::new();
    let e = shared(Label("A1".to_string()));
    registry.register("a", e.clone());

    e.lock().0 = "A2".to_string();
    let changed = registry.scan_changes();
    assert_eq!(changed.len(), 1);
    assert!(Arc::ptr_eq(&changed[0], &e));

    assert!(registry.scan_changes().is_empty());

    e.lock().0 = "A1".to_string();
    let changed = registry.scan_changes();
    assert_eq!(changed.len(), 1);
    assert!(Arc::ptr_eq(&changed[0], &e));
    assert_eq!(registry.last_fingerprint("a"), Some(Fingerprint::from("A1")));
}

#[test]
fn test_results_follow_registration_order() {
    let mut registry = Registry::new();
    let docs: Vec<_> = ["zeta", "alpha", "mid"]
        .iter()
        .map(|name| shared(Document::new(name, "v0")))
        .collect();
    for (doc, name) in docs.iter().zip(["zeta", "alpha", "mid"]) {
        registry.register(name, doc.clone());
    }

    // mutate in reverse order; scan order must still be registration order
    for doc in docs.iter().rev() {
        doc.lock().edit("v1");
    }

    let changes = registry.scan_changed_names();
    let names: Vec<&str> = changes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_only_changed_subset_reported() {
    let mut registry = Registry::new();
    let a = shared(Label("a0".to_string()));
    let b = shared(Label("b0".to_string()));
    let c = shared(Label("c0".to_string()));
    registry.register("a", a.clone());
    registry.register("b", b.clone());
    registry.register("c", c.clone());

    b.lock().0 = "b1".to_string();
    let changed = registry.scan_changes();
    assert_eq!(changed.len(), 1);
    assert!(Arc::ptr_eq(&changed[0], &b));

    a.lock().0 = "a1".to_string();
    c.lock().0 = "c1".to_string();
    let changes = registry.scan_changed_names();
    let names: Vec<&str> = changes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(changes[1].previous, Fingerprint::from("c0"));
    assert_eq!(changes[1].fingerprint, Fingerprint::from("c1"));
}

#[test]
fn test_mixed_entity_types() {
    let mut registry: Registry = Registry::new();
    let doc = shared(Document::new("notes", "draft"));
    let label = shared(Label("tag".to_string()));
    registry.register("doc", doc.clone());
    registry.register("label", label.clone());

    doc.lock().edit("final");
    label.lock().0 = "tag2".to_string();

    let changed = registry.scan_changes();
    assert_eq!(changed.len(), 2);
    assert_eq!(changed[1].lock().hash(), Fingerprint::from("tag2"));
}
