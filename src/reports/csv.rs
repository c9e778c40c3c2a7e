//! CSV отчет: `File,5.2,...,8.2`, строка на файл и итоговая строка `TOTAL`

use anyhow::Result;

use super::{ModernityReport, ReportFormat, ReportGenerator};
use crate::language_level::LanguageLevel;
use crate::metrics::LanguageLevelTuple;

pub struct CsvReporter;

impl CsvReporter {
    pub fn new() -> Self {
        Self
    }

    fn row(labels: &[String], tuple: &LanguageLevelTuple) -> String {
        let mut fields: Vec<String> = labels.iter().map(|label| escape(label)).collect();
        fields.extend(tuple.iter().map(|(_, value)| value.to_string()));
        fields.join(",")
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for CsvReporter {
    fn generate_report(&self, report: &ModernityReport) -> Result<String> {
        let mut header: Vec<String> = report.columns.iter().map(|column| escape(column)).collect();
        header.extend(LanguageLevel::ALL.iter().map(|level| level.to_string()));

        let mut output = header.join(",");
        output.push('\n');

        for row in &report.rows {
            output.push_str(&Self::row(&row.labels, &row.tuple));
            output.push('\n');
        }

        if let Some(total) = &report.total {
            let mut labels = vec!["TOTAL".to_string()];
            labels.resize(report.columns.len().max(1), String::new());
            output.push_str(&Self::row(&labels, total));
            output.push('\n');
        }

        Ok(output)
    }

    fn supported_format() -> ReportFormat {
        ReportFormat::Csv
    }
}

/// Экранирует поле, содержащее разделитель, кавычку или перевод строки
pub fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_and_total() {
        let mut tuple = LanguageLevelTuple::new();
        tuple[LanguageLevel::Php5_2] = 0.125;

        let mut report = ModernityReport::single("a.php", tuple);
        report.total = Some(tuple);

        let output = CsvReporter::new().generate_report(&report).unwrap();
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines[0], "File,5.2,5.3,5.4,5.5,5.6,7.0,7.1,7.2,7.3,7.4,8.0,8.1,8.2");
        assert_eq!(lines[1], "a.php,0.125,0,0,0,0,0,0,0,0,0,0,0,0");
        assert_eq!(lines[2], "TOTAL,0.125,0,0,0,0,0,0,0,0,0,0,0,0");
    }

    #[test]
    fn test_package_columns() {
        let mut report = ModernityReport::new(&["Package", "Version"]);
        report.add_row(
            vec!["laravel".to_string(), "8.0".to_string()],
            LanguageLevelTuple::filled(1.0),
        );

        let output = CsvReporter::new().generate_report(&report).unwrap();
        assert!(output.starts_with("Package,Version,5.2,"));
        assert!(output.lines().nth(1).unwrap().starts_with("laravel,8.0,1,1,"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain.php"), "plain.php");
        assert_eq!(escape("a,b.php"), "\"a,b.php\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
