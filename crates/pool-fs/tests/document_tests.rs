//! Tests for reading pool documents from a directory tree

use pool_fs::{DocumentStore, Error};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_yaml::Value;
use std::fs;
use tempfile::TempDir;

#[test]
fn load_pool_reads_mapping_by_id() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("pool1.yml"),
        "name: Pool One\ncloud: aws\ntasks: 3\n",
    )
    .unwrap();

    let store = DocumentStore::new(dir.path());
    let doc = store.load_pool("pool1").unwrap();

    assert_eq!(doc.len(), 3);
    assert_eq!(doc.get("name"), Some(&Value::from("Pool One")));
    assert_eq!(doc.get("tasks"), Some(&Value::from(3)));
}

#[test]
fn load_pool_missing_document_reports_path() {
    let dir = TempDir::new().unwrap();
    let store = DocumentStore::new(dir.path());

    let err = store.load_pool("absent").unwrap_err();
    let display = err.to_string();
    assert!(display.contains("absent.yml"), "got: {display}");
}

#[rstest]
#[case("name: [unclosed\n")]
#[case("name: a\n- item\n")]
fn malformed_yaml_is_parse_error(#[case] content: &str) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.yml"), content).unwrap();

    let err = DocumentStore::new(dir.path()).load_pool("broken").unwrap_err();
    assert!(matches!(err, Error::DocumentParse { .. }), "got: {err:?}");
}

#[test]
fn mapping_keeps_declaration_order() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ordered.yml"), "zeta: 1\nalpha: 2\nmid: 3\n").unwrap();

    let doc = DocumentStore::new(dir.path()).load_pool("ordered").unwrap();
    let keys: Vec<&str> = doc.keys().filter_map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
}
