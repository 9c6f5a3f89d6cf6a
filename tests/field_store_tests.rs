//! Field store persistence against a real temporary directory.

use dialogue_forge::fields::{
    load_fields, AddOutcome, EditOutcome, FieldKind, FieldMapping, FieldStore, FieldStoreError,
    RemoveOutcome,
};
use dialogue_forge::fs::StandardFileSystem;
use proptest::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn fields_path(dir: &TempDir) -> String {
    dir.path().join("fields_data.json").to_string_lossy().into_owned()
}

fn read_json(path: &str) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_missing_file_loads_defaults_without_creating_it() {
    let dir = TempDir::new().unwrap();
    let path = fields_path(&dir);

    let store = FieldStore::open(&path).await.unwrap();

    assert_eq!(store.fields(), &FieldMapping::defaults());
    assert!(!std::path::Path::new(&path).exists());
}

#[tokio::test]
async fn test_add_writes_persisted_form() {
    let dir = TempDir::new().unwrap();
    let path = fields_path(&dir);
    let mut store = FieldStore::open(&path).await.unwrap();

    let outcome = store.add("mood", FieldKind::Text, "e.g., grumpy").await.unwrap();
    assert_eq!(outcome, AddOutcome::Added);

    assert_eq!(
        read_json(&path),
        json!({
            "background": {"type": "text", "value": "", "example": "e.g., Forest"},
            "faction": {"type": "choice", "value": "vlandian, roman", "example": "e.g., vlandian, roman"},
            "mood": {"type": "text", "value": "", "example": "e.g., grumpy"}
        })
    );
    assert!(!dir.path().join("fields_data.json.tmp").exists());
}

#[tokio::test]
async fn test_key_order_survives_reload() {
    let dir = TempDir::new().unwrap();
    let path = fields_path(&dir);
    std::fs::write(
        &path,
        r#"{"zeta": {"type": "text", "value": "z"}, "alpha": {"type": "choice", "value": "a, b", "example": ""}}"#,
    )
    .unwrap();

    let store = FieldStore::open(&path).await.unwrap();

    let names: Vec<&str> = store.fields().names().collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert_eq!(store.fields().get("zeta").unwrap().example, "");
}

#[tokio::test]
async fn test_malformed_file_is_reported_not_replaced() {
    let dir = TempDir::new().unwrap();
    let path = fields_path(&dir);
    std::fs::write(&path, r#"{"background": {"type": "number", "value": ""}}"#).unwrap();

    let err = FieldStore::open(&path).await.err().unwrap();

    assert!(matches!(err, FieldStoreError::Malformed { .. }));
    assert!(err.to_string().contains("fields_data.json"));
    assert!(std::fs::read_to_string(&path).unwrap().contains("number"));
}

#[tokio::test]
async fn test_remove_and_edit_persist() {
    let dir = TempDir::new().unwrap();
    let path = fields_path(&dir);
    let mut store = FieldStore::open(&path).await.unwrap();

    assert_eq!(
        store.set_value("faction", "vlandian, roman, sturgian").await.unwrap(),
        EditOutcome::Updated
    );
    assert!(matches!(
        store.remove("background").await.unwrap(),
        RemoveOutcome::Removed(_)
    ));
    assert_eq!(store.remove("background").await.unwrap(), RemoveOutcome::NothingRemoved);

    let reloaded = load_fields(&StandardFileSystem, &path).await.unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(
        reloaded.get("faction").unwrap().choices(),
        vec!["vlandian", "roman", "sturgian"]
    );
}

#[tokio::test]
async fn test_empty_store_is_valid() {
    let dir = TempDir::new().unwrap();
    let path = fields_path(&dir);
    std::fs::write(&path, "{}").unwrap();

    let store = FieldStore::open(&path).await.unwrap();
    assert!(store.fields().is_empty());
}

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,12}".prop_filter("reserved name", |name| name != "debug")
}

fn field_kind() -> impl Strategy<Value = FieldKind> {
    prop_oneof![Just(FieldKind::Text), Just(FieldKind::Choice)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_added_field_round_trips(
        name in field_name(),
        kind in field_kind(),
        example in "[ -~]{0,24}",
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let dir = TempDir::new().unwrap();
            let path = fields_path(&dir);
            std::fs::write(&path, "{}").unwrap();

            let mut store = FieldStore::open(&path).await.unwrap();
            prop_assert_eq!(store.add(&name, kind, &example).await.unwrap(), AddOutcome::Added);

            let reloaded = FieldStore::open(&path).await.unwrap();
            prop_assert_eq!(reloaded.fields(), store.fields());
            let field = reloaded.fields().get(&name).unwrap();
            prop_assert_eq!(field.kind, kind);
            prop_assert_eq!(&field.example, &example);
            prop_assert_eq!(field.value.as_str(), "");
            Ok(())
        })?;
    }

    #[test]
    fn prop_duplicate_add_leaves_store_unchanged(
        name in field_name(),
        first in field_kind(),
        second in field_kind(),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let dir = TempDir::new().unwrap();
            let path = fields_path(&dir);
            std::fs::write(&path, "{}").unwrap();

            let mut store = FieldStore::open(&path).await.unwrap();
            store.add(&name, first, "").await.unwrap();
            let on_disk = std::fs::read_to_string(&path).unwrap();
            let in_memory = store.fields().clone();

            prop_assert_eq!(store.add(&name, second, "other").await.unwrap(), AddOutcome::Duplicate);
            prop_assert_eq!(store.fields(), &in_memory);
            prop_assert_eq!(std::fs::read_to_string(&path).unwrap(), on_disk);
            Ok(())
        })?;
    }
}
