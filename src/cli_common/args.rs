//! Общие аргументы командной строки

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::ModernityConfig;

/// Общие аргументы для всех команд
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file (TOML or YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Аргументы для работы с выводом
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format (text, json, csv, table)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommonArgs {
    /// Определяет уровень логирования на основе флагов
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::WARN
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Проверяет, нужно ли выводить информацию
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Загружает конфигурацию из `--config` или настройки по умолчанию
    pub fn load_config(&self) -> Result<ModernityConfig> {
        let config = match &self.config {
            Some(path) => ModernityConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ModernityConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let mut args = CommonArgs::default();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::WARN);
        assert!(!args.should_print());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modernity.toml");
        std::fs::write(&path, "skip_parse_errors = false\nworkers = 2\n").unwrap();

        let args = CommonArgs {
            config: Some(path),
            ..CommonArgs::default()
        };
        let config = args.load_config().unwrap();
        assert!(!config.skip_parse_errors);
        assert_eq!(config.workers, Some(2));
    }
}
