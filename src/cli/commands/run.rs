//! # Run Command Module / 运行命令模块
//!
//! Implements the `run` command: prepares the results and report
//! directories, writes the report descriptors, executes the test command,
//! aggregates the result files, records the run in the history log and
//! produces the report.
//!
//! 实现 `run` 命令：准备结果和报告目录，写入报告描述文件，执行测试命令，
//! 汇总结果文件，在历史日志中记录本次运行并生成报告。
//!
//! ## Workflow / 工作流程
//!
//! 1. Reset the results directory, remove the previous report
//! 2. Write `environment.properties` and `executor.json`
//! 3. Execute the test command under its timeout
//! 4. Parse the collected count and aggregate the result files
//! 5. Append the run to the history log
//! 6. Generate the rich report or the fallback page
//! 7. Print the summary and map the outcome to an exit code
//!
//! A timeout or execution error ends the run after step 3: no results are
//! read, no report is produced and nothing is recorded.

use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        aggregate::aggregate_results,
        config::PipelineConfig,
        error::PipelineError,
        execution::{execute as execute_command, execute_argv},
        history::{HistoryEntry, HistoryLog},
        models::{RunOutcome, RunSummary, TestCount},
        summary::{parse_outcome_line, summarize_collected},
    },
    infra::{
        command::expand_program,
        fs::{find_available_port, remove_dir, reset_dir},
        logging::init_logging,
        t,
    },
    reporting::{
        artifacts::{ExecutorDescriptor, write_environment_descriptor, write_executor_descriptor},
        console::{print_outcome, print_run_summary},
        generator::{ReportKind, ReportRequest, generate_report},
    },
};

/// Bound for each reporting tool invocation.
const REPORT_TIMEOUT: Duration = Duration::from_secs(300);

/// Serving runs until Ctrl-C; this only caps a forgotten server.
const SERVE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Options of the `run` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Serve the rich report after the run until Ctrl-C.
    pub serve: bool,
}

/// Everything one pipeline run produced.
/// 一次流水线运行的全部产出。
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub outcome: RunOutcome,
    /// `None` when the test command never completed.
    pub summary: Option<RunSummary>,
    pub collected: TestCount,
    /// `None` when no report could be produced or the command never completed.
    pub report: Option<ReportKind>,
    pub results_dir: PathBuf,
    pub report_dir: PathBuf,
    pub port: u16,
}

/// Executes the `run` command.
///
/// # Returns
/// `SUCCESS` when the outcome counts as a success under the configuration,
/// `FAILURE` otherwise.
pub async fn execute(
    config: &PipelineConfig,
    project_dir: &Path,
    options: RunOptions,
    cancel: CancellationToken,
) -> Result<ExitCode> {
    init_logging("warn", None)?;

    let project_root = project_dir
        .canonicalize()
        .with_context(|| t!("run.project_dir_missing", path = project_dir.display()).to_string())?;

    let run = run_pipeline(config, &project_root, &cancel).await?;
    print_outcome(run.outcome, config.allow_test_failures);

    if options.serve {
        if let Some(ReportKind::Rich { tool }) = &run.report {
            serve_report(tool, &run.report_dir, run.port, &project_root, &cancel).await;
        }
    }

    Ok(if run.outcome.is_success(config.allow_test_failures) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs the pipeline once inside `project_root`.
///
/// Only failures to prepare the directories or descriptors are returned as
/// errors; a failed test command becomes the outcome and a failed report is
/// logged and absorbed.
///
/// 在 `project_root` 中运行一次流水线。只有准备目录或描述文件失败时才返回错误；
/// 测试命令失败会成为运行结果，报告失败会被记录并吸收。
pub async fn run_pipeline(
    config: &PipelineConfig,
    project_root: &Path,
    cancel: &CancellationToken,
) -> Result<PipelineRun> {
    println!("{}", t!("run.banner").cyan().bold());

    let results_dir = config.resolve(project_root, &config.results_dir);
    let report_dir = config.resolve(project_root, &config.report_dir);
    let history = HistoryLog::new(
        config.resolve(project_root, &config.history_file),
        config.history_limit,
    );

    let port = find_available_port(config.report_port);
    let report_url = config.report_url(port);
    println!("{}", t!("run.using_port", port = port));

    // Step 1: fresh results, no stale report.
    println!("{}", t!("run.cleaning").cyan());
    reset_dir(&results_dir)?;
    reset_dir(&results_dir.join("history"))?;
    remove_dir(&report_dir)?;

    // Step 2: descriptors read by the reporting tool.
    let build_order = history.next_build_order().unwrap_or_else(|e| {
        tracing::warn!(error = %format!("{:#}", e), "history log unreadable, starting at build 1");
        1
    });
    let facts = config.environment_facts();
    let executor = ExecutorDescriptor::new(config, build_order, report_url.clone());
    write_environment_descriptor(&results_dir, &facts)?;
    write_executor_descriptor(&results_dir, &executor)?;

    // Step 3: the test command.
    println!("{}", t!("run.executing", command = &config.command).cyan());
    let timeout = Duration::from_secs(config.timeout_secs);
    let output = match execute_command(&config.command, project_root, timeout, cancel).await {
        Ok(output) => output,
        Err(e) => {
            let outcome = match e {
                PipelineError::Timeout { .. } => RunOutcome::Timeout,
                _ => RunOutcome::ExecutionError,
            };
            tracing::error!(error = %e, "test command did not complete");
            eprintln!("{}", e.to_string().red());
            return Ok(PipelineRun {
                outcome,
                summary: None,
                collected: TestCount::Unknown,
                report: None,
                results_dir,
                report_dir,
                port,
            });
        }
    };
    tracing::debug!(stdout = %output.stdout, stderr = %output.stderr, "test command output");
    if let Some((line, _)) = parse_outcome_line(&output.stdout) {
        println!("{}", line.dimmed());
    }

    // Step 4: counts.
    let collected = summarize_collected(&output.stdout);
    let summary = aggregate_results(&results_dir);
    let outcome = RunOutcome::from_completed(&output, &summary);

    // Step 5: history.
    let entry = HistoryEntry {
        build_order,
        timestamp: Utc::now(),
        outcome,
        summary,
        wall_duration_ms: u64::try_from(output.duration.as_millis()).unwrap_or(u64::MAX),
    };
    let retained = match history.append(&entry) {
        Ok(retained) => retained,
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "failed to record run history");
            vec![entry]
        }
    };

    // Step 6: report.
    println!("{}", t!("run.generating_report").cyan());
    let request = ReportRequest {
        config,
        summary: &summary,
        history: &retained,
        executor: &executor,
        facts: &facts,
        results_dir: &results_dir,
        report_dir: &report_dir,
        working_dir: project_root,
        timeout: REPORT_TIMEOUT,
        cancel,
    };
    let report = match generate_report(&request).await {
        Ok(kind) => Some(kind),
        Err(e) => {
            tracing::error!(error = %e, "no report produced");
            eprintln!("{}", e.to_string().yellow());
            None
        }
    };

    print_run_summary(&summary, collected, report.as_ref(), &report_dir, &report_url);

    Ok(PipelineRun {
        outcome,
        summary: Some(summary),
        collected,
        report,
        results_dir,
        report_dir,
        port,
    })
}

/// Serves the rich report with `<tool> open <report> --port <port>` until
/// the server exits or Ctrl-C cancels it.
async fn serve_report(
    tool: &str,
    report_dir: &Path,
    port: u16,
    working_dir: &Path,
    cancel: &CancellationToken,
) {
    println!("{}", t!("run.serving", port = port).cyan());
    let program = expand_program(tool);
    let args = [
        "open".to_string(),
        report_dir.to_string_lossy().into_owned(),
        "--port".to_string(),
        port.to_string(),
    ];
    match execute_argv(&program, &args, working_dir, SERVE_TIMEOUT, cancel).await {
        Ok(_) => {}
        Err(_) if cancel.is_cancelled() => println!("{}", t!("run.serve_stopped")),
        Err(e) => tracing::warn!(error = %e, "report server stopped"),
    }
}
