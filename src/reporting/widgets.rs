//! # Trend Widgets Module / 趋势组件模块
//!
//! Builds the reporting tool's widget JSON from the run history.
//! Every trend lists the newest run first.
//!
//! 根据运行历史生成报告工具的组件 JSON。所有趋势均按最新运行在前排列。

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::history::HistoryEntry;
use crate::reporting::artifacts::ExecutorDescriptor;

/// Directory inside the report that holds widget files.
pub const WIDGETS_DIR: &str = "widgets";

/// One point of a trend chart.
/// 趋势图中的一个数据点。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub build_order: u64,
    pub report_url: String,
    pub report_name: String,
    pub data: Value,
}

fn trend(entries: &[HistoryEntry], data: impl Fn(&HistoryEntry) -> Value) -> Vec<TrendPoint> {
    let latest = entries.iter().map(|e| e.build_order).max();
    let mut points: Vec<TrendPoint> = entries
        .iter()
        .map(|entry| TrendPoint {
            build_order: entry.build_order,
            report_url: ".".to_string(),
            report_name: if Some(entry.build_order) == latest {
                "QA Report - Current".to_string()
            } else {
                format!("QA Report - Run {}", entry.build_order)
            },
            data: data(entry),
        })
        .collect();
    points.sort_by(|a, b| b.build_order.cmp(&a.build_order));
    points
}

/// `history-trend.json`: status counts per run.
pub fn history_trend(entries: &[HistoryEntry]) -> Vec<TrendPoint> {
    trend(entries, |e| {
        json!({
            "failed": e.summary.failed,
            "broken": e.summary.broken,
            "skipped": e.summary.skipped,
            "passed": e.summary.passed,
            "unknown": e.summary.unknown,
            "total": e.summary.total,
        })
    })
}

/// `duration-trend.json`: wall-clock duration per run, in milliseconds.
pub fn duration_trend(entries: &[HistoryEntry]) -> Vec<TrendPoint> {
    trend(entries, |e| json!({ "duration": e.wall_duration_ms }))
}

/// `categories-trend.json`: failed tests count as product defects,
/// broken tests as test defects.
pub fn categories_trend(entries: &[HistoryEntry]) -> Vec<TrendPoint> {
    trend(entries, |e| {
        json!({
            "Product defects": e.summary.failed,
            "Test defects": e.summary.broken,
        })
    })
}

/// `retry-trend.json`: retried records against records run.
pub fn retry_trend(entries: &[HistoryEntry]) -> Vec<TrendPoint> {
    trend(entries, |e| {
        json!({
            "retry": e.summary.retries,
            "run": e.summary.total,
        })
    })
}

/// `environment.json`: one `{name, values}` item per fact.
pub fn environment_widget(facts: &BTreeMap<String, String>) -> Value {
    Value::Array(
        facts
            .iter()
            .map(|(name, value)| json!({ "name": name, "values": [value] }))
            .collect(),
    )
}

/// Writes all widgets into `<report_dir>/widgets`, replacing whatever the
/// reporting tool produced.
///
/// # Returns
/// The widget directory.
pub fn write_widgets(
    report_dir: &Path,
    entries: &[HistoryEntry],
    executor: &ExecutorDescriptor,
    facts: &BTreeMap<String, String>,
) -> Result<PathBuf> {
    let dir = report_dir.join(WIDGETS_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create widget directory: {}", dir.display()))?;

    let files: [(&str, Value); 6] = [
        ("executors.json", json!([executor])),
        ("environment.json", environment_widget(facts)),
        ("history-trend.json", serde_json::to_value(history_trend(entries))?),
        ("duration-trend.json", serde_json::to_value(duration_trend(entries))?),
        ("categories-trend.json", serde_json::to_value(categories_trend(entries))?),
        ("retry-trend.json", serde_json::to_value(retry_trend(entries))?),
    ];

    for (name, value) in files {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string(&value)?)
            .with_context(|| format!("Failed to write widget: {}", path.display()))?;
    }
    Ok(dir)
}
