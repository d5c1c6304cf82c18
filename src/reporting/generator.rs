//! # Report Generation Module / 报告生成模块
//!
//! Delegates to the rich reporting tool when one of its candidate
//! executables works, and otherwise renders the fallback HTML page.
//!
//! 当某个候选可执行文件可用时委托给完整报告工具，否则渲染后备 HTML 页面。

use chrono::Local;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::PipelineConfig, error::PipelineError, execution::execute_argv,
        history::HistoryEntry, models::RunSummary,
    },
    infra::command::expand_program,
    reporting::{
        artifacts::ExecutorDescriptor,
        html::{FallbackReport, write_fallback_report},
        widgets::write_widgets,
    },
};

/// Which kind of report was produced.
/// 生成了哪种报告。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    /// The rich tool generated the report; `tool` is the candidate that worked.
    Rich { tool: String },
    /// The fallback page was written to `path`.
    Fallback { path: PathBuf },
}

/// Inputs for [`generate_report`].
pub struct ReportRequest<'a> {
    pub config: &'a PipelineConfig,
    pub summary: &'a RunSummary,
    /// Retained history including the current run, oldest first.
    pub history: &'a [HistoryEntry],
    pub executor: &'a ExecutorDescriptor,
    pub facts: &'a BTreeMap<String, String>,
    pub results_dir: &'a Path,
    pub report_dir: &'a Path,
    pub working_dir: &'a Path,
    /// Bound for each reporting tool invocation.
    pub timeout: Duration,
    pub cancel: &'a CancellationToken,
}

/// Generates the report for a finished run.
///
/// Tries every configured reporting tool in order; the first that succeeds
/// gets its widgets overwritten with history-derived trends. If none works
/// the fallback page is written instead.
///
/// # Errors
/// [`PipelineError::ReportGeneration`] when the fallback page cannot be
/// written either. Callers log it and carry on.
pub async fn generate_report(request: &ReportRequest<'_>) -> Result<ReportKind, PipelineError> {
    if let Some(tool) = try_reporting_tools(request).await {
        if let Err(e) = write_widgets(
            request.report_dir,
            request.history,
            request.executor,
            request.facts,
        ) {
            tracing::warn!(error = %format!("{:#}", e), "failed to write trend widgets");
        }
        return Ok(ReportKind::Rich { tool });
    }

    let newest_first: Vec<HistoryEntry> = request.history.iter().rev().cloned().collect();
    let report = FallbackReport {
        executor: &request.config.executor,
        environment: &request.config.environment,
        generated_at: Local::now(),
        summary: request.summary,
        categories: &request.config.categories,
        facts: request.facts,
        history: &newest_first,
    };

    write_fallback_report(request.report_dir, &report)
        .map(|path| ReportKind::Fallback { path })
        .map_err(|e| PipelineError::ReportGeneration(format!("{:#}", e)))
}

/// Runs `<tool> generate <results> --clean -o <report>` for each candidate.
///
/// # Returns
/// The first candidate that exits successfully.
async fn try_reporting_tools(request: &ReportRequest<'_>) -> Option<String> {
    let args = [
        "generate".to_string(),
        request.results_dir.to_string_lossy().into_owned(),
        "--clean".to_string(),
        "-o".to_string(),
        request.report_dir.to_string_lossy().into_owned(),
    ];

    for candidate in &request.config.reporter_commands {
        let program = expand_program(candidate);
        match execute_argv(
            &program,
            &args,
            request.working_dir,
            request.timeout,
            request.cancel,
        )
        .await
        {
            Ok(output) if output.success => return Some(candidate.clone()),
            Ok(output) => {
                tracing::debug!(tool = %candidate, code = ?output.code, stderr = %output.stderr.trim(), "reporting tool failed");
            }
            Err(e) => {
                tracing::debug!(tool = %candidate, error = %e, "reporting tool unavailable");
            }
        }
    }
    None
}
