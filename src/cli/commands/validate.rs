//! # Validate Command Module / 验证命令模块
//!
//! Runs the staged end-to-end validation of the test project, writes the
//! JSON report and the log file, and prints the per-stage summary.
//!
//! 对测试项目运行分阶段的端到端验证，写入 JSON 报告和日志文件，并打印每个阶段的摘要。

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{config::PipelineConfig, validation::Validator},
    infra::{logging::init_logging, t},
    reporting::console::print_validation_summary,
};

/// Executes the `validate` command.
///
/// # Returns
/// `SUCCESS` only when every stage passed.
pub async fn execute(
    config: &PipelineConfig,
    project_dir: &Path,
    cancel: CancellationToken,
) -> Result<ExitCode> {
    let project_root = project_dir
        .canonicalize()
        .with_context(|| t!("run.project_dir_missing", path = project_dir.display()).to_string())?;
    let log_file = config.resolve(&project_root, &config.validation.log_file);
    init_logging("info", Some(&log_file))?;

    println!("{}", t!("validate.banner").cyan().bold());
    tracing::info!(project = %project_root.display(), "starting validation");

    let validator = Validator::new(config, &project_root, cancel);
    let report = validator.run_all().await;

    match validator.write_report(&report) {
        Ok(path) => println!("{}", t!("validate.report_written", path = path.display())),
        Err(e) => tracing::error!(error = %format!("{:#}", e), "failed to write validation report"),
    }
    print_validation_summary(&report);

    Ok(if report.overall_success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
