//! Descriptors written into the results directory before the tests run.
//! 测试运行前写入结果目录的描述文件。

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::PipelineConfig;

pub const ENVIRONMENT_FILE: &str = "environment.properties";
pub const EXECUTOR_FILE: &str = "executor.json";

/// Executor descriptor in the reporting tool's `executor.json` schema.
/// 报告工具 `executor.json` 格式的执行者描述。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub build_order: u64,
    pub build_name: String,
    pub build_url: String,
    pub report_name: String,
    pub report_url: String,
}

impl ExecutorDescriptor {
    pub fn new(config: &PipelineConfig, build_order: u64, report_url: String) -> Self {
        Self {
            name: config.executor.clone(),
            kind: "pipeline-runner".to_string(),
            build_order,
            build_name: config.build_name.clone(),
            build_url: config.build_url.clone(),
            report_name: format!("QA Report - {}", config.executor),
            report_url,
        }
    }
}

/// Renders facts as `key=value` lines.
///
/// Line breaks inside a value would start a new property, so they are
/// flattened to spaces.
pub fn render_properties(facts: &BTreeMap<String, String>) -> String {
    facts
        .iter()
        .map(|(key, value)| {
            let value = value.replace(['\r', '\n'], " ");
            format!("{}={}\n", key.trim(), value.trim())
        })
        .collect()
}

/// Writes `environment.properties` into `results_dir`.
pub fn write_environment_descriptor(
    results_dir: &Path,
    facts: &BTreeMap<String, String>,
) -> Result<PathBuf> {
    let path = results_dir.join(ENVIRONMENT_FILE);
    fs::write(&path, render_properties(facts))
        .with_context(|| format!("Failed to write environment descriptor: {}", path.display()))?;
    Ok(path)
}

/// Writes `executor.json` into `results_dir`.
pub fn write_executor_descriptor(
    results_dir: &Path,
    executor: &ExecutorDescriptor,
) -> Result<PathBuf> {
    let path = results_dir.join(EXECUTOR_FILE);
    let json = serde_json::to_string_pretty(executor)?;
    fs::write(&path, json)
        .with_context(|| format!("Failed to write executor descriptor: {}", path.display()))?;
    Ok(path)
}
