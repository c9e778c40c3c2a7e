//! Персистентное хранилище кортежей
//!
//! JSON объект `ключ → [f64; 13]` на диске. Поврежденный или отсутствующий
//! файл считается пустым хранилищем; записи неверной длины отбрасываются.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::metrics::LanguageLevelTuple;

#[derive(Debug)]
pub struct LanguageLevelTupleStore {
    path: PathBuf,
    entries: BTreeMap<String, LanguageLevelTuple>,
}

impl LanguageLevelTupleStore {
    /// Открывает хранилище; ошибки чтения не фатальны
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => parse_entries(&content, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Cannot read tuple store {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        tracing::debug!("Tuple store {} opened with {} entries", path.display(), entries.len());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&LanguageLevelTuple> {
        self.entries.get(key)
    }

    /// Сохраняет кортеж и сразу записывает файл
    pub fn set(&mut self, key: impl Into<String>, tuple: LanguageLevelTuple) -> Result<()> {
        self.entries.insert(key.into(), tuple);
        self.save()
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<LanguageLevelTuple>> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    /// Ключи в алфавитном порядке
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LanguageLevelTuple)> {
        self.entries.iter().map(|(key, tuple)| (key.as_str(), tuple))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&self.entries)
            .context("Failed to serialize tuple store")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write tuple store {}", self.path.display()))?;
        Ok(())
    }
}

fn parse_entries(content: &str, path: &Path) -> BTreeMap<String, LanguageLevelTuple> {
    let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(content) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Tuple store {} is corrupt, starting empty: {}", path.display(), e);
            return BTreeMap::new();
        }
    };

    raw.into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<LanguageLevelTuple>(value) {
            Ok(tuple) => Some((key, tuple)),
            Err(e) => {
                tracing::warn!("Dropping invalid tuple store entry '{}': {}", key, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language_level::LanguageLevel;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LanguageLevelTupleStore::open(dir.path().join("store.json"));
        assert!(store.is_empty());
        assert!(!store.has("anything"));
    }

    #[test]
    fn test_set_persists_immediately() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested/store.json");

        let mut tuple = LanguageLevelTuple::new();
        tuple[LanguageLevel::Php7_4] = 0.25;

        let mut store = LanguageLevelTupleStore::open(&path);
        store.set("laravel/8.0", tuple)?;

        let reopened = LanguageLevelTupleStore::open(&path);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get("laravel/8.0"), Some(&tuple));
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json")?;

        assert!(LanguageLevelTupleStore::open(&path).is_empty());
        Ok(())
    }

    #[test]
    fn test_wrong_length_entry_is_dropped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");
        let good = serde_json::to_string(&LanguageLevelTuple::filled(1.0))?;
        std::fs::write(&path, format!("{{\"good\": {}, \"short\": [1.0, 2.0]}}", good))?;

        let store = LanguageLevelTupleStore::open(&path);
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["good"]);
        Ok(())
    }

    #[test]
    fn test_remove_and_clear() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");

        let mut store = LanguageLevelTupleStore::open(&path);
        store.set("a", LanguageLevelTuple::filled(1.0))?;
        store.set("b", LanguageLevelTuple::filled(0.5))?;

        assert!(store.remove("a")?.is_some());
        assert!(store.remove("a")?.is_none());
        assert_eq!(LanguageLevelTupleStore::open(&path).len(), 1);

        store.clear()?;
        assert!(LanguageLevelTupleStore::open(&path).is_empty());
        Ok(())
    }
}
