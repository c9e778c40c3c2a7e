/*!
Reports built from real directory analysis
*/

use php_modernity::reports::{self, CsvReporter, JsonReporter};
use php_modernity::{Modernity, ModernityReport, ReportFormat, ReportGenerator};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn sample_directory() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("index.php"), "<?php echo 'Hello';").unwrap();
    fs::write(temp_dir.path().join("broken.php"), "<?php $a = ;").unwrap();
    temp_dir
}

#[test]
fn test_csv_report_for_directory() {
    let temp_dir = sample_directory();
    let analysis = Modernity::new()
        .unwrap()
        .analyze_directory(temp_dir.path())
        .unwrap();

    let report = ModernityReport::from_directory(&analysis);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].label, "broken.php");

    let csv = CsvReporter::new().generate_report(&report).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "File,5.2,5.3,5.4,5.5,5.6,7.0,7.1,7.2,7.3,7.4,8.0,8.1,8.2",
            "index.php,1,1,1,1,1,1,1,1,1,1,1,1,1",
            "TOTAL,1,1,1,1,1,1,1,1,1,1,1,1,1",
        ]
    );
}

#[test]
fn test_json_report_for_directory() {
    let temp_dir = sample_directory();
    let analysis = Modernity::new()
        .unwrap()
        .analyze_directory(temp_dir.path())
        .unwrap();

    let json = JsonReporter::new()
        .generate_report(&ModernityReport::from_directory(&analysis))
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["rows"][0]["file"], "index.php");
    assert_eq!(value["total"]["8.2"], 1.0);
    assert_eq!(value["skipped"][0]["label"], "broken.php");
}

#[test]
fn test_generate_dispatches_by_format() {
    let report = ModernityReport::new(&["File"]);
    for format in ["text", "json", "csv", "table"] {
        let format: ReportFormat = format.parse().unwrap();
        assert!(reports::generate(format, &report).is_ok());
    }
}
