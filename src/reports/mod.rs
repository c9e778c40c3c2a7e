/*!
# Reports Module

Модуль для генерации отчетов анализа в различных форматах.

## Поддерживаемые форматы:
- **Text** - по строке `метка: [5.2: 1.00, ...]` на файл
- **Table** - выровненная таблица с двумя знаками после запятой
- **CSV** - заголовок `File,5.2,...,8.2`, значения с полной точностью
- **JSON** - структурированный отчет для API интеграции
*/

pub mod csv;
pub mod json;
pub mod text;

pub use self::csv::CsvReporter;
pub use self::json::JsonReporter;
pub use self::text::TextReporter;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analyzer::{DirectoryAnalysis, PackageResult};
use crate::metrics::LanguageLevelTuple;

/// Формат отчета
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Текстовый отчет для консоли
    Text,
    /// JSON для API интеграции
    Json,
    /// CSV для таблиц
    Csv,
    /// Выровненная таблица для консоли
    Table,
}

impl std::str::FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "table" => Ok(ReportFormat::Table),
            _ => Err(anyhow::anyhow!("Unknown report format: {}", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Table => write!(f, "table"),
        }
    }
}

impl ReportFormat {
    /// Расширение файла отчета
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text | ReportFormat::Table => "txt",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        }
    }
}

/// Строка отчета: метки (файл или пакет и версия) и кортеж
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub labels: Vec<String>,
    pub tuple: LanguageLevelTuple,
}

/// Пропущенный элемент с причиной
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub label: String,
    pub reason: String,
}

/// Данные отчета, общие для всех форматов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModernityReport {
    /// Заголовки меточных колонок (`File` или `Package`, `Version`)
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
    pub total: Option<LanguageLevelTuple>,
    pub skipped: Vec<SkippedEntry>,
}

impl ModernityReport {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
            total: None,
            skipped: Vec::new(),
        }
    }

    pub fn add_row(&mut self, labels: Vec<String>, tuple: LanguageLevelTuple) {
        self.rows.push(ReportRow { labels, tuple });
    }

    pub fn add_skipped(&mut self, label: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedEntry {
            label: label.into(),
            reason: reason.into(),
        });
    }

    /// Отчет для одного файла или фрагмента
    pub fn single(label: impl Into<String>, tuple: LanguageLevelTuple) -> Self {
        let mut report = Self::new(&["File"]);
        report.add_row(vec![label.into()], tuple);
        report
    }

    /// Отчет по директории: строка на файл (путь относительно корня) и итог
    pub fn from_directory(analysis: &DirectoryAnalysis) -> Self {
        let mut report = Self::new(&["File"]);
        for entry in &analysis.files {
            let label = relative_label(&analysis.root, &entry.path);
            match &entry.result {
                Ok(tuple) => report.add_row(vec![label], *tuple),
                Err(error) => report.add_skipped(label, error.to_string()),
            }
        }
        report.total = Some(analysis.total);
        report
    }

    /// Отчет по пакетам: строка на версию пакета, без итога
    pub fn from_packages(results: &[PackageResult]) -> Self {
        let mut report = Self::new(&["Package", "Version"]);
        for entry in results {
            match &entry.result {
                Ok(tuple) => report.add_row(
                    vec![entry.package.package.clone(), entry.package.version.clone()],
                    *tuple,
                ),
                Err(error) => report.add_skipped(entry.package.key(), error.to_string()),
            }
        }
        report
    }
}

fn relative_label(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Трейт для генерации отчетов
pub trait ReportGenerator {
    /// Генерирует отчет
    fn generate_report(&self, report: &ModernityReport) -> Result<String>;

    /// Возвращает поддерживаемый формат отчета
    fn supported_format() -> ReportFormat;
}

/// Генерирует отчет в указанном формате
pub fn generate(format: ReportFormat, report: &ModernityReport) -> Result<String> {
    match format {
        ReportFormat::Text => TextReporter::new().generate_report(report),
        ReportFormat::Table => TextReporter::table().generate_report(report),
        ReportFormat::Csv => CsvReporter::new().generate_report(report),
        ReportFormat::Json => JsonReporter::new().generate_report(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("CSV".parse::<ReportFormat>().unwrap(), ReportFormat::Csv);
        assert_eq!("table".parse::<ReportFormat>().unwrap(), ReportFormat::Table);
        assert!("sarif".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_relative_label() {
        assert_eq!(
            relative_label(Path::new("/src"), Path::new("/src/app/Index.php")),
            "app/Index.php"
        );
        assert_eq!(relative_label(Path::new("/other"), Path::new("a.php")), "a.php");
    }

    #[test]
    fn test_single_report() {
        let report = ModernityReport::single("<code>", LanguageLevelTuple::filled(1.0));
        assert_eq!(report.columns, vec!["File".to_string()]);
        assert_eq!(report.rows.len(), 1);
        assert!(report.total.is_none());
    }
}
