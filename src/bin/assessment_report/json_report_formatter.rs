use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use pronounce_rs::alignment::report::Report;

pub fn write_report(path: &Path, report: &Report) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| format!("Cannot create directory '{}': {err}", parent.display()))?;
    }

    let file = File::create(path)
        .map_err(|err| format!("Cannot create report '{}': {err}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|err| format!("Cannot serialize report '{}': {err}", path.display()))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|err| format!("Cannot write report '{}': {err}", path.display()))
}

/// One-line tier breakdown for the terminal.
pub fn summary_line(report: &Report) -> String {
    let counts = &report.aggregates.counts;
    let mean = report
        .aggregates
        .accuracy
        .as_ref()
        .map(|d| format!("{:.1}", d.mean))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "cases: {} | excellent: {} | acceptable: {} | insufficient: {} | failed: {} | mean accuracy: {mean}",
        counts.total, counts.excellent, counts.acceptable, counts.insufficient, counts.failed
    )
}
