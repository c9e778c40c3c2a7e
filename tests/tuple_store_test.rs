/*!
Persistence of the tuple store across handles
*/

use php_modernity::{LanguageLevel, LanguageLevelTuple, LanguageLevelTupleStore};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_store_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache").join("store.json");

    let mut tuple = LanguageLevelTuple::new();
    tuple[LanguageLevel::Php7_4] = 0.75;

    {
        let mut store = LanguageLevelTupleStore::open(&path);
        store.set("laravel/8.0", tuple).unwrap();
        store.set("symfony/5.4", LanguageLevelTuple::filled(1.0)).unwrap();
    }

    let store = LanguageLevelTupleStore::open(&path);
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("laravel/8.0"), Some(&tuple));
    assert_eq!(
        store.keys().collect::<Vec<_>>(),
        vec!["laravel/8.0", "symfony/5.4"]
    );
}

#[test]
fn test_store_file_is_json_arrays() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");

    let mut store = LanguageLevelTupleStore::open(&path);
    store.set("pkg/1.0", LanguageLevelTuple::filled(0.5)).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entry = value["pkg/1.0"].as_array().unwrap();
    assert_eq!(entry.len(), LanguageLevel::COUNT);
    assert_eq!(entry[0], 0.5);
}

#[test]
fn test_corrupt_store_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = LanguageLevelTupleStore::open(&path);
    assert!(store.is_empty());
}
