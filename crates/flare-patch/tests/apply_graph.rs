//! Patch application against derived record graphs.

use flare_patch::{apply, NodeError, Patch, PatchOp};
use flare_patch_derive::PatchTarget;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize, PatchTarget)]
struct Database {
    company: Option<Company>,
    items: Vec<String>,
    #[serde(rename = "labels")]
    #[flare(rename = "labels")]
    tags: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize, PatchTarget)]
struct Company {
    name: String,
    address: Option<Address>,
    headcount: u32,
}

#[derive(Debug, Default, Deserialize, PatchTarget)]
struct Address {
    street: String,
    lines: Vec<String>,
}

fn replace(path: &str, data: &str) -> Patch {
    Patch::new(PatchOp::Replace, path, Some(data.to_owned()))
}

fn add(path: &str, data: &str) -> Patch {
    Patch::new(PatchOp::Add, path, Some(data.to_owned()))
}

#[test]
fn missing_intermediates_materialize_on_first_write() {
    let mut db = Database::default();

    apply(&mut db, &replace("/company/name", "\"ACME\"")).unwrap();

    let company = db.company.as_ref().unwrap();
    assert_eq!(company.name, "ACME");
    assert_eq!(company.headcount, 0);
}

#[test]
fn deep_paths_materialize_every_level() {
    let mut db = Database::default();

    apply(&mut db, &replace("/company/address/street", "\"Main St 1\"")).unwrap();

    let address = db.company.unwrap().address.unwrap();
    assert_eq!(address.street, "Main St 1");
    assert!(address.lines.is_empty());
}

#[test]
fn sequential_appends_keep_arrival_order() {
    let mut db = Database::default();

    apply(&mut db, &add("/items/-", "\"first\"")).unwrap();
    apply(&mut db, &add("/items/-", "\"second\"")).unwrap();

    assert_eq!(db.items, vec!["first", "second"]);
}

#[test]
fn replace_at_length_appends_beyond_errors() {
    let mut db = Database::default();
    db.items = vec!["a".into()];

    apply(&mut db, &replace("/items/1", "\"b\"")).unwrap();
    assert_eq!(db.items, vec!["a", "b"]);

    let err = apply(&mut db, &replace("/items/5", "\"x\"")).unwrap_err();
    assert!(matches!(err.source, NodeError::OutOfRange { .. }));
    assert_eq!(err.path, "/items/5");
}

#[test]
fn remove_at_index_deletes_element() {
    let mut db = Database::default();
    db.items = vec!["a".into(), "b".into()];

    apply(&mut db, &Patch::remove("/items/0")).unwrap();
    assert_eq!(db.items, vec!["b"]);
}

#[test]
fn dictionary_entry_patch_merges_into_existing_map() {
    let mut db = Database::default();
    db.tags.insert("k0".into(), "v0".into());

    apply(&mut db, &replace("/labels/k1", "\"v1\"")).unwrap();

    assert_eq!(db.tags.len(), 2);
    assert_eq!(db.tags["k0"], "v0");
    assert_eq!(db.tags["k1"], "v1");
}

#[test]
fn dictionary_field_replace_clears_then_merges() {
    let mut db = Database::default();
    db.tags.insert("k0".into(), "v0".into());

    apply(&mut db, &replace("/labels", r#"{"k1":"v1"}"#)).unwrap();

    assert_eq!(db.tags.len(), 1);
    assert_eq!(db.tags["k1"], "v1");
}

#[test]
fn remove_resets_record_fields() {
    let mut db = Database::default();
    db.items = vec!["a".into()];
    apply(&mut db, &replace("/company/name", "\"ACME\"")).unwrap();

    apply(&mut db, &Patch::remove("/items")).unwrap();
    apply(&mut db, &Patch::remove("/company")).unwrap();

    assert!(db.items.is_empty());
    assert!(db.company.is_none());
}

#[test]
fn root_replace_decodes_whole_document() {
    let mut db = Database::default();

    apply(
        &mut db,
        &replace(
            "/",
            r#"{"company":{"name":"ACME","address":null,"headcount":12},"items":["x"],"labels":{}}"#,
        ),
    )
    .unwrap();

    assert_eq!(db.company.as_ref().unwrap().headcount, 12);
    assert_eq!(db.items, vec!["x"]);

    apply(&mut db, &Patch::remove("/")).unwrap();
    assert!(db.company.is_none());
    assert!(db.items.is_empty());
}

#[test]
fn unknown_fields_fail_resolution() {
    let mut db = Database::default();

    let err = apply(&mut db, &replace("/nosuch", "1")).unwrap_err();
    assert!(matches!(err.source, NodeError::UnknownField { .. }));
    assert!(err.to_string().contains("Database"));
}

#[test]
fn descending_into_a_scalar_fails_resolution() {
    let mut db = Database::default();

    let err = apply(&mut db, &replace("/company/name/x", "1")).unwrap_err();
    assert!(matches!(err.source, NodeError::UnknownField { .. }));
}
