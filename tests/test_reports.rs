//! Report files and the help binary

use okx_bundle_finder::interfaces::{AnalysisReport, RunStatus, SuspectScore};
use okx_bundle_finder::utils::report::CSV_HEADER;
use okx_bundle_finder::utils::write_reports;
use std::process::Command;
use tempfile::TempDir;

fn report(target: &str, suspects: &[(&str, u32)], total: u32) -> AnalysisReport {
    AnalysisReport {
        target_address: target.to_string(),
        chain_id: "56".to_string(),
        status: RunStatus::Completed,
        steps: Vec::new(),
        tokens_fetched: total as usize,
        valid_token_count: total,
        failed_calls: 0,
        suspects: suspects
            .iter()
            .map(|(addr, count)| SuspectScore {
                target_address: target.to_string(),
                suspect_address: addr.to_string(),
                count: *count,
                total_analyzed: total,
                score: f64::from(*count) / f64::from(total),
            })
            .collect(),
        has_bundle: true,
        persistence: None,
    }
}

#[tokio::test]
async fn test_writes_json_and_csv() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let base = dir.path().join("reports").join("sock_puppet_report");
    let reports = vec![report("0xt1", &[("0xa", 2), ("0xb", 1)], 2), report("0xt2", &[("0xc", 1)], 4)];

    let (json_path, csv_path) = write_reports(&base, &reports)
        .await
        .expect("write succeeds")
        .expect("paths returned");

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[3], "0xt2,0xc,0.25,1,4");

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json.as_array().map(|a| a.len()), Some(2));
    assert_eq!(json[0]["suspects"][0]["suspectAddress"], "0xa");
    assert_eq!(json[0]["suspects"][0]["score"], 1.0);
}

#[tokio::test]
async fn test_nothing_written_without_suspects() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let base = dir.path().join("sock_puppet_report");
    let written = write_reports(&base, &[report("0xt1", &[], 3)]).await.unwrap();

    assert!(written.is_none());
    assert!(!base.with_extension("json").exists());
    assert!(!base.with_extension("csv").exists());
}

#[test]
fn test_help_binary() {
    let output = Command::new(env!("CARGO_BIN_EXE_help"))
        .output()
        .expect("Failed to execute help binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("COMMANDS"));
    assert!(stdout.contains("TARGET_ADDRESSES"));
}
