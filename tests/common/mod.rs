// Shared test helpers for integration tests
#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use pipeline_runner::core::history::HistoryEntry;
use pipeline_runner::core::models::{RunOutcome, RunSummary};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

pub fn setup_project() -> TempDir {
    tempdir().expect("Failed to create temporary directory")
}

/// Writes `<uuid>-result.json` with the given status into `dir`.
pub fn write_result(dir: &Path, uuid: &str, status: &str) -> PathBuf {
    write_result_with_history(dir, uuid, status, uuid)
}

pub fn write_result_with_history(dir: &Path, uuid: &str, status: &str, history_id: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{}-result.json", uuid));
    let content = format!(
        r#"{{"uuid":"{uuid}","historyId":"{history_id}","name":"test_{uuid}","fullName":"tests.test_{uuid}","status":"{status}","start":1700000000000,"stop":1700000000250}}"#
    );
    fs::write(&path, content).unwrap();
    path
}

/// Writes `pipeline.toml` into the project and returns its path.
pub fn write_config(project: &Path, body: &str) -> PathBuf {
    let path = project.join("pipeline.toml");
    fs::write(&path, body).unwrap();
    path
}

/// Writes a shell script that stands in for the test framework.
pub fn write_script(project: &Path, name: &str, body: &str) -> PathBuf {
    let path = project.join(name);
    fs::write(&path, body).unwrap();
    path
}

/// A history entry for a run with the given counts.
pub fn history_entry(build_order: u64, passed: usize, failed: usize) -> HistoryEntry {
    HistoryEntry {
        build_order,
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
            + chrono::Duration::minutes(build_order as i64),
        outcome: if failed == 0 {
            RunOutcome::Passed
        } else {
            RunOutcome::TestsFailed
        },
        summary: RunSummary {
            total: passed + failed,
            passed,
            failed,
            duration_ms: 100 * build_order,
            ..RunSummary::default()
        },
        wall_duration_ms: 1000 * build_order,
    }
}
