//! # Result Aggregation Module / 结果汇总模块
//!
//! Reads every per-test result file in a results directory and folds them
//! into a [`RunSummary`]. Unreadable or malformed files are skipped.
//!
//! 读取结果目录中的每个测试结果文件并汇总为 [`RunSummary`]。无法读取或格式错误的文件会被跳过。

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::core::models::{RunSummary, StatusTally, TestResultRecord};
use crate::infra::fs::result_files;

/// Aggregates the result files in `results_dir` into a run summary.
///
/// A missing directory yields an empty summary. Records repeating an
/// already-seen `uuid` are ignored so identifiers stay unique within a run.
/// Retries are counted as records sharing a `historyId` with an earlier one.
///
/// 将 `results_dir` 中的结果文件汇总为运行摘要。目录不存在时返回空摘要。
/// 重复 `uuid` 的记录会被忽略；与之前记录共享 `historyId` 的记录计为重试。
pub fn aggregate_results(results_dir: &Path) -> RunSummary {
    let files = match result_files(results_dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(dir = %results_dir.display(), error = %e, "cannot list result files");
            return RunSummary::default();
        }
    };

    let tally = StatusTally::new();
    let mut seen_uuids = HashSet::new();
    let mut seen_history = HashSet::new();
    let mut retries = 0;

    for path in files {
        let record = match read_record(&path) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(file = %path.display(), error = %format!("{:#}", e), "skipping result file");
                continue;
            }
        };
        if !seen_uuids.insert(record.uuid.clone()) {
            tracing::warn!(uuid = %record.uuid, "duplicate result record ignored");
            continue;
        }
        if let Some(history_id) = &record.history_id {
            if !seen_history.insert(history_id.clone()) {
                retries += 1;
            }
        }
        tally.record(&record);
    }

    RunSummary {
        retries,
        ..tally.snapshot()
    }
}

/// Reads a single result file.
pub fn read_record(path: &Path) -> Result<TestResultRecord> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read result file: {}", path.display()))?;
    let record = serde_json::from_str(&content)
        .with_context(|| format!("Malformed result file: {}", path.display()))?;
    Ok(record)
}
