//! Dependency hygiene for the workspace manifests

use std::path::PathBuf;

fn manifest(relative: &str) -> toml::Table {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative);
    let source = std::fs::read_to_string(&path).unwrap();
    source.parse().unwrap()
}

fn table<'a>(manifest: &'a toml::Table, key: &str) -> &'a toml::Table {
    manifest
        .get(key)
        .and_then(|v| v.as_table())
        .unwrap_or_else(|| panic!("missing [{key}]"))
}

#[test]
fn test_json_is_a_test_only_dependency_of_the_binary() {
    let root = manifest("Cargo.toml");
    assert!(!table(&root, "dependencies").contains_key("serde_json"));
    assert!(table(&root, "dev-dependencies").contains_key("serde_json"));
}

#[test]
fn test_no_unused_async_test_helpers() {
    let root = manifest("Cargo.toml");
    let workspace = table(table(&root, "workspace"), "dependencies");
    assert!(!workspace.contains_key("tokio-test"));
    assert!(!table(&root, "dev-dependencies").contains_key("tokio-test"));

    let core = manifest("crates/scholia-core/Cargo.toml");
    assert!(!table(&core, "dev-dependencies").contains_key("tokio-test"));
}
