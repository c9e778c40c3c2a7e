//! JSON отчет: строки с кортежами в виде `{"5.2": ..., "8.2": ...}`

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{ModernityReport, ReportFormat, ReportGenerator, SkippedEntry};

pub struct JsonReporter {
    pretty: bool,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    #[serde(flatten)]
    labels: BTreeMap<String, &'a str>,
    levels: BTreeMap<String, f64>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    rows: Vec<JsonRow<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<BTreeMap<String, f64>>,
    skipped: &'a [SkippedEntry],
}

impl JsonReporter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate_report(&self, report: &ModernityReport) -> Result<String> {
        let rows = report
            .rows
            .iter()
            .map(|row| JsonRow {
                labels: report
                    .columns
                    .iter()
                    .map(|column| column.to_lowercase())
                    .zip(row.labels.iter())
                    .map(|(column, label)| (column, label.as_str()))
                    .collect(),
                levels: row.tuple.to_map(),
            })
            .collect();

        let json = JsonReport {
            rows,
            total: report.total.as_ref().map(|total| total.to_map()),
            skipped: &report.skipped,
        };

        let output = if self.pretty {
            serde_json::to_string_pretty(&json)
        } else {
            serde_json::to_string(&json)
        };
        output.context("Failed to serialize JSON report")
    }

    fn supported_format() -> ReportFormat {
        ReportFormat::Json
    }
}
