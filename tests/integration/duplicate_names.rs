//! Integration tests for registering the same name more than once

use super::test_utils::Label;
use change_registry::{shared, DuplicateNamePolicy, Registry, RegistryConfig, RegistryError};
use std::sync::Arc;

#[test]
fn test_checkout_resolves_to_latest_registration() {
    let mut registry = Registry::new();
    let first = shared(Label("first".to_string()));
    let second = shared(Label("second".to_string()));
    registry.register("a", first.clone());
    registry.register("a", second.clone());

    let checkout = registry.checkout("a").unwrap();
    assert!(Arc::ptr_eq(checkout.entity(), &second));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.names(), vec!["a", "a"]);
}

#[test]
fn test_shadowed_entry_still_scanned() {
    let mut registry = Registry::new();
    let first = shared(Label("first".to_string()));
    let second = shared(Label("second".to_string()));
    registry.register("a", first.clone());
    registry.register("a", second.clone());

    first.lock().0 = "first-2".to_string();
    second.lock().0 = "second-2".to_string();

    let changed = registry.scan_changes();
    assert_eq!(changed.len(), 2);
    assert!(Arc::ptr_eq(&changed[0], &first));
    assert!(Arc::ptr_eq(&changed[1], &second));

    // only the shadowed entry changes this time
    first.lock().0 = "first-3".to_string();
    let changed = registry.scan_changes();
    assert_eq!(changed.len(), 1);
    assert!(Arc::ptr_eq(&changed[0], &first));
}

#[test]
fn test_reject_policy_from_config() {
    let mut config = RegistryConfig::default();
    config.registry.duplicate_names = DuplicateNamePolicy::Reject;
    let mut registry = Registry::with_config(&config);

    let first = shared(Label("first".to_string()));
    registry.try_register("a", first.clone()).unwrap();
    let err = registry
        .try_register("a", shared(Label("second".to_string())))
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateName(ref name) if name == "a"));

    assert_eq!(registry.len(), 1);
    assert!(Arc::ptr_eq(registry.checkout("a").unwrap().entity(), &first));
}
