/*!
# Text Reporter

Консольные отчеты: построчный (`метка: [5.2: 1.00, ...]`) и табличный.
Цвета включаются только для терминала.
*/

use anyhow::Result;
use colored::Colorize;

use super::{ModernityReport, ReportFormat, ReportGenerator};
use crate::language_level::LanguageLevel;

/// Текстовый репортер для консольного вывода
pub struct TextReporter {
    /// Использовать цветной вывод
    use_colors: bool,
    /// Выводить выровненную таблицу вместо строк
    table: bool,
}

impl TextReporter {
    /// Создает новый текстовый репортер
    pub fn new() -> Self {
        Self {
            use_colors: false,
            table: false,
        }
    }

    /// Табличный репортер
    pub fn table() -> Self {
        Self {
            use_colors: false,
            table: true,
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn label(row: &[String]) -> String {
        row.join(" ")
    }

    fn render_lines(&self, report: &ModernityReport) -> String {
        let mut output = String::new();

        for row in &report.rows {
            output.push_str(&format!("{}: {}\n", Self::label(&row.labels), row.tuple));
        }

        if let Some(total) = &report.total {
            let label = if self.use_colors {
                "TOTAL".bold().to_string()
            } else {
                "TOTAL".to_string()
            };
            output.push_str(&format!("{}: {}\n", label, total));
        }

        output
    }

    fn render_table(&self, report: &ModernityReport) -> String {
        let label_width = report
            .rows
            .iter()
            .map(|row| Self::label(&row.labels).len())
            .chain(std::iter::once(Self::label(&report.columns).len()))
            .chain(std::iter::once("TOTAL".len()))
            .max()
            .unwrap_or(5);

        let mut output = format!("{:<width$}", Self::label(&report.columns), width = label_width);
        for level in LanguageLevel::ALL {
            output.push_str(&format!(" {:>5}", level));
        }
        output.push('\n');
        output.push_str(&"-".repeat(label_width + LanguageLevel::COUNT * 6));
        output.push('\n');

        let mut push_row = |label: &str, values: &crate::metrics::LanguageLevelTuple| {
            output.push_str(&format!("{:<width$}", label, width = label_width));
            for (_, value) in values.iter() {
                output.push_str(&format!(" {:>5.2}", value));
            }
            output.push('\n');
        };

        for row in &report.rows {
            push_row(&Self::label(&row.labels), &row.tuple);
        }
        if let Some(total) = &report.total {
            push_row("TOTAL", total);
        }

        output
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for TextReporter {
    fn generate_report(&self, report: &ModernityReport) -> Result<String> {
        let mut output = if self.table {
            self.render_table(report)
        } else {
            self.render_lines(report)
        };

        if !report.skipped.is_empty() {
            let header = format!("Skipped {} file(s):", report.skipped.len());
            if self.use_colors {
                output.push_str(&format!("\n{}\n", header.yellow()));
            } else {
                output.push_str(&format!("\n{}\n", header));
            }
            for skipped in &report.skipped {
                output.push_str(&format!("  {}: {}\n", skipped.label, skipped.reason));
            }
        }

        Ok(output)
    }

    fn supported_format() -> ReportFormat {
        ReportFormat::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::LanguageLevelTuple;

    #[test]
    fn test_lines_use_tuple_display() {
        let mut report = ModernityReport::single("index.php", LanguageLevelTuple::filled(1.0));
        report.total = Some(LanguageLevelTuple::filled(1.0));

        let output = TextReporter::new().generate_report(&report).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("index.php: [5.2: 1.00, 5.3: 1.00"));
        assert!(lines[1].starts_with("TOTAL: [5.2: 1.00"));
    }

    #[test]
    fn test_table_has_header_and_rows() {
        let report = ModernityReport::single("a.php", LanguageLevelTuple::filled(0.5));
        let output = TextReporter::table().generate_report(&report).unwrap();
        let lines: Vec<_> = output.lines().collect();

        assert!(lines[0].starts_with("File"));
        assert!(lines[0].trim_end().ends_with("8.2"));
        assert!(lines[2].starts_with("a.php"));
        assert!(lines[2].contains(" 0.50"));
    }

    #[test]
    fn test_skipped_files_are_listed() {
        let mut report = ModernityReport::new(&["File"]);
        report.add_skipped("broken.php", "Parse error");
        let output = TextReporter::new().generate_report(&report).unwrap();
        assert!(output.contains("Skipped 1 file(s):"));
        assert!(output.contains("broken.php: Parse error"));
    }
}
