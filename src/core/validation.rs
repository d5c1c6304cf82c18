//! # Pipeline Validation Module / 流水线验证模块
//!
//! Runs a fixed series of validation stages against the test framework and
//! collects them into a [`ValidationReport`]. Each stage is isolated: an
//! error inside one is recorded and the next stage still runs.
//!
//! 针对测试框架运行一系列固定的验证阶段，并汇总为 [`ValidationReport`]。
//! 各阶段相互隔离：某个阶段内的错误会被记录，下一个阶段仍会运行。

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::PipelineConfig,
        execution::execute_argv,
        models::TestCount,
        summary::{count_verbose_outcomes, parse_outcome_line, shows_collection, summarize_collected},
    },
    infra::{
        command::split_command,
        fs::{count_json_files, reset_dir},
    },
};

/// Stored stdout is cut to this many characters.
const STDOUT_LIMIT: usize = 5000;
/// Stored stderr is cut to this many characters.
const STDERR_LIMIT: usize = 2000;

/// The validation stages, in the order they run.
/// 验证阶段，按运行顺序排列。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TestCollection,
    ResultsIntegration,
    RegressionSuite,
    BugDiscovery,
    CompletePipeline,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::TestCollection,
        Stage::ResultsIntegration,
        Stage::RegressionSuite,
        Stage::BugDiscovery,
        Stage::CompletePipeline,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::TestCollection => "test_collection",
            Stage::ResultsIntegration => "results_integration",
            Stage::RegressionSuite => "regression_suite",
            Stage::BugDiscovery => "bug_discovery",
            Stage::CompletePipeline => "complete_pipeline",
        }
    }
}

/// What a stage concluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub details: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub name: String,
    pub record: StageRecord,
}

/// Result of a whole validation run.
/// 整个验证运行的结果。
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub timestamp: DateTime<Local>,
    pub project_root: PathBuf,
    pub stages: Vec<StageReport>,
    pub overall_success: bool,
}

impl ValidationReport {
    /// JSON form: `{timestamp, project_root, validations: {name: record}, overall_success}`.
    pub fn to_json(&self) -> Value {
        let mut validations = Map::new();
        for stage in &self.stages {
            validations.insert(
                stage.name.clone(),
                serde_json::to_value(&stage.record).unwrap_or(Value::Null),
            );
        }
        json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "project_root": self.project_root.display().to_string(),
            "validations": validations,
            "overall_success": self.overall_success,
        })
    }

    pub fn stage(&self, name: &str) -> Option<&StageRecord> {
        self.stages
            .iter()
            .find(|stage| stage.name == name)
            .map(|stage| &stage.record)
    }
}

/// Captured framework invocation. Execution errors and timeouts are folded
/// into `success = false` with the error message as stderr.
#[derive(Debug, Clone, Default)]
struct FrameworkRun {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Collected-count status of one suite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    Collected,
    Unparsed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteCollection {
    pub status: CollectionStatus,
    pub count: TestCount,
}

pub struct Validator<'a> {
    config: &'a PipelineConfig,
    project_root: PathBuf,
    results_dir: PathBuf,
    cancel: CancellationToken,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a PipelineConfig, project_root: &Path, cancel: CancellationToken) -> Self {
        Self {
            config,
            project_root: project_root.to_path_buf(),
            results_dir: config.resolve(project_root, &config.results_dir),
            cancel,
        }
    }

    /// Runs every stage in order and builds the report.
    ///
    /// 按顺序运行所有阶段并生成报告。
    pub async fn run_all(&self) -> ValidationReport {
        let mut stages = Vec::with_capacity(Stage::ALL.len());
        for stage in Stage::ALL {
            tracing::info!("--- Running {} validation ---", stage.name());
            let record = match self.run_stage(stage).await {
                Ok(record) => {
                    if record.passed {
                        tracing::info!("[PASS] {} validation PASSED", stage.name());
                    } else {
                        tracing::error!("[FAIL] {} validation FAILED", stage.name());
                    }
                    record
                }
                Err(e) => {
                    tracing::error!("[ERROR] {} validation ERROR: {:#}", stage.name(), e);
                    StageRecord {
                        passed: false,
                        error: Some(format!("{:#}", e)),
                        details: json!({}),
                    }
                }
            };
            stages.push(StageReport {
                name: stage.name().to_string(),
                record,
            });
        }

        let overall_success = stages.iter().all(|stage| stage.record.passed);
        ValidationReport {
            timestamp: Local::now(),
            project_root: self.project_root.clone(),
            stages,
            overall_success,
        }
    }

    /// Writes the report as pretty JSON to the configured report file.
    pub fn write_report(&self, report: &ValidationReport) -> Result<PathBuf> {
        let path = self
            .config
            .resolve(&self.project_root, &self.config.validation.report_file);
        let json = serde_json::to_string_pretty(&report.to_json())?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write validation report: {}", path.display()))?;
        Ok(path)
    }

    pub async fn run_stage(&self, stage: Stage) -> Result<StageRecord> {
        match stage {
            Stage::TestCollection => self.validate_test_collection().await,
            Stage::ResultsIntegration => self.validate_results_integration().await,
            Stage::RegressionSuite => self.validate_regression_suite().await,
            Stage::BugDiscovery => self.validate_bug_discovery().await,
            Stage::CompletePipeline => self.validate_complete_pipeline().await,
        }
    }

    /// Checks that every configured suite collects, and that the required
    /// suite collects at least one test.
    async fn validate_test_collection(&self) -> Result<StageRecord> {
        let mut collections = Map::new();
        let mut required_count = TestCount::Unknown;

        for suite in &self.config.validation.suites {
            let mut args = selector_args(&suite.selector)?;
            args.extend(["--collect-only".to_string(), "-q".to_string()]);
            let run = self.run_framework(&args).await?;

            let collection = if run.success {
                let count = summarize_collected(&run.stdout);
                match count {
                    TestCount::Known(n) => {
                        tracing::info!("[PASS] {}: {} tests collected", suite.name, n);
                        SuiteCollection { status: CollectionStatus::Collected, count }
                    }
                    TestCount::Unknown => {
                        tracing::warn!("[WARN] {}: could not parse test count", suite.name);
                        SuiteCollection { status: CollectionStatus::Unparsed, count }
                    }
                }
            } else {
                tracing::error!("[FAIL] {}: collection failed - {}", suite.name, run.stderr.trim());
                SuiteCollection {
                    status: CollectionStatus::Failed,
                    count: TestCount::Unknown,
                }
            };

            if suite.name == self.config.validation.required_suite {
                required_count = collection.count;
            }
            collections.insert(suite.name.clone(), serde_json::to_value(&collection)?);
        }

        let passed = required_count.known().is_some_and(|n| n > 0);
        if passed {
            tracing::info!(
                "[PASS] {} tests are collected: {}",
                self.config.validation.required_suite,
                required_count
            );
        } else {
            tracing::error!(
                "[FAIL] no {} tests found",
                self.config.validation.required_suite
            );
        }

        Ok(StageRecord {
            passed,
            error: None,
            details: Value::Object(collections),
        })
    }

    /// Checks that result-producing runs leave result files behind.
    async fn validate_results_integration(&self) -> Result<StageRecord> {
        reset_dir(&self.results_dir)?;

        let mut runs = Map::new();
        // Files accumulate across runs; each run is credited with what it added.
        let mut present = 0;
        for run_spec in &self.config.validation.integration_runs {
            let mut args = selector_args(&run_spec.selector)?;
            args.push(self.results_arg());
            let run = self.run_framework(&args).await?;

            let now_present = count_json_files(&self.results_dir);
            let files = now_present.saturating_sub(present);
            present = now_present;
            if files > 0 {
                tracing::info!("[PASS] {}: {} result files", run_spec.name, files);
            } else {
                tracing::error!("[FAIL] {}: no result files generated", run_spec.name);
            }
            runs.insert(
                run_spec.name.clone(),
                json!({
                    "command_success": run.success,
                    "result_files": files,
                    "has_results": files > 0,
                }),
            );
        }

        if present > 0 {
            tracing::info!("[PASS] results integration: {} total result files", present);
        }
        Ok(StageRecord {
            passed: present > 0,
            error: None,
            details: json!({
                "runs": runs,
                "total_result_files": present,
            }),
        })
    }

    /// Runs the regression selector and counts verbose outcomes. Failing
    /// tests do not fail the stage; not getting as far as collection does.
    async fn validate_regression_suite(&self) -> Result<StageRecord> {
        let mut args = selector_args(&self.config.validation.regression_selector)?;
        args.extend([self.results_arg(), "-v".to_string(), "--tb=short".to_string()]);
        let run = self.run_framework(&args).await?;

        let outcomes = if run.success {
            count_verbose_outcomes(&run.stdout)
        } else {
            Default::default()
        };
        if run.success {
            tracing::info!(
                "[PASS] regression suite executed: {} passed, {} failed",
                outcomes.passed.len(),
                outcomes.failed.len()
            );
        } else {
            tracing::warn!("[WARN] regression suite exited with failures");
        }

        Ok(StageRecord {
            passed: run.success || shows_collection(&run.stdout),
            error: None,
            details: json!({
                "execution_success": run.success,
                "passed_count": outcomes.passed.len(),
                "failed_count": outcomes.failed.len(),
                "passed_tests": outcomes.passed,
                "failed_tests": outcomes.failed,
                "stdout": truncate(&run.stdout, STDOUT_LIMIT),
                "stderr": truncate(&run.stderr, STDERR_LIMIT),
            }),
        })
    }

    /// Checks that bug-discovery tests are discoverable and executable.
    async fn validate_bug_discovery(&self) -> Result<StageRecord> {
        let mut args = selector_args(&self.config.validation.bug_discovery_selector)?;
        args.extend([self.results_arg(), "-v".to_string(), "--maxfail=5".to_string()]);
        let run = self.run_framework(&args).await?;

        let tests_found = shows_collection(&run.stdout);
        if tests_found {
            tracing::info!("[PASS] bug discovery tests are discoverable and executable");
        } else {
            tracing::error!("[FAIL] bug discovery tests not found or not executable");
        }

        Ok(StageRecord {
            passed: tests_found,
            error: None,
            details: json!({
                "execution_success": run.success,
                "tests_found": tests_found,
                "collected": summarize_collected(&run.stdout),
                "stdout": truncate(&run.stdout, STDOUT_LIMIT),
                "stderr": truncate(&run.stderr, STDERR_LIMIT),
            }),
        })
    }

    /// Runs the whole suite and records its final outcome line.
    async fn validate_complete_pipeline(&self) -> Result<StageRecord> {
        let mut args = vec![self.results_arg()];
        args.extend(selector_args(&self.config.validation.complete_args)?);
        let run = self.run_framework(&args).await?;

        let collected = shows_collection(&run.stdout);
        let (summary, counts) = if !collected {
            tracing::error!("[FAIL] complete pipeline failed to collect tests");
            ("Pipeline failed to collect tests".to_string(), None)
        } else if let Some((line, counts)) = parse_outcome_line(&run.stdout) {
            tracing::info!("[PASS] complete pipeline executed: {}", line);
            (line, Some(counts))
        } else {
            tracing::warn!("[WARN] pipeline executed but results unclear");
            ("Could not parse results".to_string(), None)
        };

        Ok(StageRecord {
            passed: collected,
            error: None,
            details: json!({
                "execution_success": run.success,
                "summary": summary,
                "counts": counts,
                "stdout": truncate(&run.stdout, STDOUT_LIMIT),
                "stderr": truncate(&run.stderr, STDERR_LIMIT),
            }),
        })
    }

    fn results_arg(&self) -> String {
        format!(
            "{}{}",
            self.config.validation.results_arg,
            self.results_dir.display()
        )
    }

    /// Runs the configured framework with extra arguments.
    ///
    /// # Errors
    /// Only when the framework command line itself cannot be parsed; a
    /// failing, missing or hanging framework is reported through the run.
    async fn run_framework(&self, extra: &[String]) -> Result<FrameworkRun> {
        let mut parts = split_command(&self.config.validation.framework)?;
        let program = parts.remove(0);
        parts.extend(extra.iter().cloned());

        let timeout = Duration::from_secs(self.config.validation.timeout_secs);
        let run = match execute_argv(&program, &parts, &self.project_root, timeout, &self.cancel).await {
            Ok(output) => FrameworkRun {
                success: output.success,
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Err(e) => FrameworkRun {
                success: false,
                stdout: String::new(),
                stderr: e.to_string(),
            },
        };
        Ok(run)
    }
}

/// Splits a selector such as `-m regression` into arguments. Empty is fine.
fn selector_args(selector: &str) -> Result<Vec<String>> {
    shlex::split(selector).ok_or_else(|| anyhow!("Failed to parse selector: {}", selector))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ééé", 2), "éé");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn selectors_split_like_a_shell() {
        assert_eq!(selector_args("-m 'not slow'").unwrap(), vec!["-m", "not slow"]);
        assert!(selector_args("").unwrap().is_empty());
    }
}
