//! Общий модуль для CLI
//!
//! Содержит общую функциональность бинарника `php-modernity`:
//! - Инициализация логирования
//! - Общие аргументы и загрузка конфигурации
//! - Индикаторы прогресса
//! - Форматирование вывода

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub mod args;
pub mod progress;

pub use args::{CommonArgs, OutputArgs};
pub use progress::{package_bar, spinner};

fn install_subscriber(default_level: tracing::Level) -> Result<()> {
    // RUST_LOG имеет приоритет над флагами
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Инициализирует систему логирования с настройками по умолчанию
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    install_subscriber(level)
}

/// Инициализирует минимальное логирование (только WARN и ERROR)
pub fn init_minimal_logging() -> Result<()> {
    install_subscriber(tracing::Level::WARN)
}

/// Выводит успешное завершение операции
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✅".green(), message.green());
}

/// Выводит предупреждение
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠️".yellow(), message.yellow());
}

/// Выводит ошибку
pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red());
}

/// Проверяет существование файла или директории
pub fn validate_path(path: &Path, description: &str) -> Result<()> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "{} does not exist: {}",
            description,
            path.display()
        ));
    }
    Ok(())
}

/// Записывает результат в файл или на stdout
pub fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            print_success(&format!("Results written to {}", path.display()));
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Если `output` указывает на существующую директорию, в ней создается
/// файл с отметкой времени: `modernity_20240131_235959.csv`
pub fn resolve_output(output: Option<PathBuf>, extension: &str) -> Option<PathBuf> {
    output.map(|path| {
        if path.is_dir() {
            let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            path.join(format!("modernity_{}.{}", stamp, extension))
        } else {
            path
        }
    })
}

/// Форматирует размер файла в человекочитаемый вид
pub fn format_file_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Форматирует продолжительность в человекочитаемый вид
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{:03}s", secs, millis)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}
