//! # Run History Module / 运行历史模块
//!
//! An append-only JSON-lines log of past run summaries, compacted to the
//! most recent `limit` entries. Trend widgets are built from it.
//!
//! 过去运行摘要的仅追加 JSON 行日志，压缩保留最近 `limit` 条记录。趋势组件基于它生成。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::models::{RunOutcome, RunSummary};
use crate::infra::fs::write_atomic;

/// One completed run.
/// 一次已完成的运行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Monotonic, 1-based run number / 单调递增的运行序号（从 1 开始）
    pub build_order: u64,
    pub timestamp: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub summary: RunSummary,
    /// Wall-clock duration of the test command in milliseconds.
    pub wall_duration_ms: u64,
}

/// Handle to the history log on disk.
/// 磁盘上历史日志的句柄。
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
    limit: usize,
}

impl HistoryLog {
    /// Creates a handle; a `limit` of 0 is treated as 1.
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit: limit.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Loads all entries, oldest first. A missing log is empty;
    /// malformed lines are skipped.
    ///
    /// 加载所有记录（从旧到新）。日志不存在时为空；格式错误的行会被跳过。
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history log: {}", self.path.display()))?;

        let entries = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<HistoryEntry>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed history line");
                    None
                }
            })
            .collect();
        Ok(entries)
    }

    /// The build order the next run will get.
    pub fn next_build_order(&self) -> Result<u64> {
        Ok(self
            .load()?
            .iter()
            .map(|entry| entry.build_order)
            .max()
            .unwrap_or(0)
            + 1)
    }

    /// Appends an entry, then compacts the log if it exceeds the limit.
    ///
    /// # Returns
    /// The retained entries, oldest first.
    pub fn append(&self, entry: &HistoryEntry) -> Result<Vec<HistoryEntry>> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create history directory: {}", parent.display()))?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open history log: {}", self.path.display()))?;
        file.write_all(line.as_bytes())?;
        drop(file);

        let mut entries = self.load()?;
        if entries.len() > self.limit {
            entries.drain(..entries.len() - self.limit);
            let mut compacted = String::new();
            for kept in &entries {
                compacted.push_str(&serde_json::to_string(kept)?);
                compacted.push('\n');
            }
            write_atomic(&self.path, compacted.as_bytes())?;
        }
        Ok(entries)
    }
}
