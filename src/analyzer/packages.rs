//! Анализ набора пакетов
//!
//! Корень содержит каталоги `<пакет>/<версия>/`; каждая версия оценивается
//! как директория. Результаты кешируются в хранилище кортежей под ключом
//! `<пакет>/<версия>`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cache::LanguageLevelTupleStore;
use crate::core::errors::ModernityError;
use crate::metrics::LanguageLevelTuple;

use super::engine::Modernity;

/// Версия пакета на диске
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    pub package: String,
    pub version: String,
    pub path: PathBuf,
}

impl PackageVersion {
    /// Ключ в хранилище кортежей
    pub fn key(&self) -> String {
        format!("{}/{}", self.package, self.version)
    }
}

/// Итог оценки одной версии пакета
#[derive(Debug)]
pub struct PackageResult {
    pub package: PackageVersion,
    pub result: std::result::Result<LanguageLevelTuple, ModernityError>,
    /// Кортеж взят из хранилища
    pub cached: bool,
}

/// Находит все каталоги `<пакет>/<версия>` в порядке имен
pub fn discover_packages(root: &Path) -> Result<Vec<PackageVersion>> {
    let mut packages = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let version = entry.file_name().to_string_lossy().to_string();
        let package = path
            .parent()
            .and_then(|parent| parent.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        packages.push(PackageVersion {
            package,
            version,
            path: path.to_path_buf(),
        });
    }

    tracing::debug!("Found {} package versions in {}", packages.len(), root.display());
    Ok(packages)
}

/// Оценивает версии пакетов, используя и пополняя хранилище
///
/// Пакеты с синтаксическими ошибками или нечитаемыми файлами попадают в
/// результат с ошибкой; ошибки таксономии прерывают обработку.
pub fn score_packages<F>(
    engine: &Modernity,
    packages: &[PackageVersion],
    mut store: Option<&mut LanguageLevelTupleStore>,
    mut on_package: F,
) -> Result<Vec<PackageResult>>
where
    F: FnMut(&PackageVersion, bool),
{
    let mut results = Vec::with_capacity(packages.len());

    for package in packages {
        let key = package.key();

        if let Some(tuple) = store.as_deref().and_then(|store| store.get(&key)) {
            tracing::debug!("Using cached tuple for {}", key);
            on_package(package, true);
            results.push(PackageResult {
                package: package.clone(),
                result: Ok(*tuple),
                cached: true,
            });
            continue;
        }

        let result = match engine.get_tuple_for_directory(&package.path) {
            Ok(tuple) => {
                if let Some(store) = store.as_deref_mut() {
                    store
                        .set(key.clone(), tuple)
                        .with_context(|| format!("Failed to store tuple for {}", key))?;
                }
                Ok(tuple)
            }
            Err(error) if error.is_recoverable() => {
                tracing::warn!("Skipping package {}: {}", key, error);
                Err(error)
            }
            Err(error) => {
                return Err(error).with_context(|| format!("Failed to analyze package {}", key))
            }
        };

        on_package(package, false);
        results.push(PackageResult {
            package: package.clone(),
            result,
            cached: false,
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModernityConfig;
    use pretty_assertions::assert_eq;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_packages_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "zeta/1.0/a.php", "<?php echo 1;");
        write(dir.path(), "alpha/2.0/a.php", "<?php echo 1;");
        write(dir.path(), "alpha/1.0/a.php", "<?php echo 1;");
        write(dir.path(), "README", "not a package");

        let keys: Vec<_> = discover_packages(dir.path())
            .unwrap()
            .iter()
            .map(PackageVersion::key)
            .collect();
        assert_eq!(keys, vec!["alpha/1.0", "alpha/2.0", "zeta/1.0"]);
    }

    #[test]
    fn test_score_packages_uses_store() {
        let dir = tempfile::tempdir().unwrap();
        let packages_root = dir.path().join("packages");
        write(&packages_root, "lib/1.0/index.php", "<?php echo 'hello';");

        let engine = Modernity::with_config(ModernityConfig::default()).unwrap();
        let packages = discover_packages(&packages_root).unwrap();
        let mut store = LanguageLevelTupleStore::open(dir.path().join("store.json"));

        let first = score_packages(&engine, &packages, Some(&mut store), |_, _| {}).unwrap();
        assert!(!first[0].cached);
        assert!(store.has("lib/1.0"));

        let mut seen = Vec::new();
        let second = score_packages(&engine, &packages, Some(&mut store), |package, cached| {
            seen.push((package.key(), cached))
        })
        .unwrap();
        assert!(second[0].cached);
        assert_eq!(seen, vec![("lib/1.0".to_string(), true)]);
        assert_eq!(
            second[0].result.as_ref().unwrap(),
            first[0].result.as_ref().unwrap()
        );
    }

    #[test]
    fn test_broken_package_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken/1.0/index.php", "<?php $a = ;");

        let config = ModernityConfig {
            skip_parse_errors: false,
            ..ModernityConfig::default()
        };
        let engine = Modernity::with_config(config).unwrap();
        let packages = discover_packages(dir.path()).unwrap();

        let results = score_packages(&engine, &packages, None, |_, _| {}).unwrap();
        assert!(results[0].result.is_err());
        assert!(!results[0].cached);
    }
}
