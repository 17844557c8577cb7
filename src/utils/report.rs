use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::interfaces::AnalysisReport;

pub const CSV_HEADER: &str = "Target Address,Suspect Address,Score,Count,Total Analyzed";

/// One row per suspect across all reports, in report order.
pub fn render_csv(reports: &[AnalysisReport]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for suspect in reports.iter().flat_map(|r| r.suspects.iter()) {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            suspect.target_address, suspect.suspect_address, suspect.score, suspect.count, suspect.total_analyzed
        ));
    }
    out
}

pub fn report_paths(base: &Path) -> (PathBuf, PathBuf) {
    (base.with_extension("json"), base.with_extension("csv"))
}

/// Writes `<base>.json` and `<base>.csv`. Returns `None` without touching
/// the filesystem when no report has suspects.
pub async fn write_reports(base: &Path, reports: &[AnalysisReport]) -> Result<Option<(PathBuf, PathBuf)>> {
    if reports.iter().all(|r| r.suspects.is_empty()) {
        return Ok(None);
    }

    let (json_path, csv_path) = report_paths(base);
    if let Some(parent) = json_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(reports).context("Failed to serialize report")?;
    tokio::fs::write(&json_path, json)
        .await
        .with_context(|| format!("Failed to write {}", json_path.display()))?;
    tokio::fs::write(&csv_path, render_csv(reports))
        .await
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;

    Ok(Some((json_path, csv_path)))
}
