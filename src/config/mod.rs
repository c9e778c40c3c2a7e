/*!
# Modernity Configuration

Configuration of the directory walk, the worker pool and the tuple store.
Supports TOML and YAML configuration files; the format is picked by the file
extension (`.yaml` / `.yml` are YAML, everything else is TOML).
*/

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::php_parser::SUPPORTED_EXTENSIONS;

/// Настройки анализа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModernityConfig {
    /// Расширения PHP файлов (без точки, без учета регистра)
    pub extensions: Vec<String>,

    /// Имена директорий, пропускаемых при обходе
    pub exclude_dirs: Vec<String>,

    /// Пропускать файлы с синтаксическими ошибками вместо остановки
    pub skip_parse_errors: bool,

    /// Количество рабочих потоков; по умолчанию число CPU
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Путь к файлу хранилища кортежей
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,

    /// Следовать символическим ссылкам при обходе
    pub follow_links: bool,
}

impl Default for ModernityConfig {
    fn default() -> Self {
        Self {
            extensions: SUPPORTED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            exclude_dirs: Vec::new(),
            skip_parse_errors: true,
            workers: None,
            cache_path: None,
            follow_links: false,
        }
    }
}

impl ModernityConfig {
    /// Alias for load_from_file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_from_file(path)
    }

    /// Load configuration from a TOML or YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config from {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config from {}", path.display()))?
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Export configuration to a TOML or YAML file
    pub fn export_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(self).context("Failed to serialize config to YAML")?
        } else {
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            bail!("At least one file extension must be configured");
        }
        if self.workers == Some(0) {
            bail!("Worker count must be greater than zero");
        }
        Ok(())
    }

    /// Фактическое число рабочих потоков
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Путь хранилища: из конфигурации или `~/.php_modernity/store.json`
    pub fn store_path(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(default_store_path)
    }
}

/// Путь хранилища кортежей по умолчанию
pub fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".php_modernity")
        .join("store.json")
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ModernityConfig::default();
        assert_eq!(config.extensions, vec!["php".to_string(), "php5".to_string()]);
        assert!(config.skip_parse_errors);
        assert!(!config.follow_links);
        assert!(config.worker_count() >= 1);
        assert!(config.store_path().ends_with(".php_modernity/store.json"));
    }

    #[test]
    fn test_toml_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("modernity.toml");

        let config = ModernityConfig {
            exclude_dirs: vec!["vendor".to_string()],
            workers: Some(2),
            ..ModernityConfig::default()
        };
        config.export_to_file(&path)?;

        assert_eq!(ModernityConfig::from_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_yaml_partial_file_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("modernity.yaml");
        std::fs::write(&path, "skip_parse_errors: false\n")?;

        let config = ModernityConfig::load_from_file(&path)?;
        assert!(!config.skip_parse_errors);
        assert_eq!(config.extensions, ModernityConfig::default().extensions);
        Ok(())
    }

    #[test]
    fn test_zero_workers_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("modernity.toml");
        std::fs::write(&path, "workers = 0\n")?;

        assert!(ModernityConfig::load_from_file(&path).is_err());
        Ok(())
    }
}
