//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints colorful, localised summaries of pipeline runs and
//! validation runs to the console.
//!
//! 此模块在控制台打印流水线运行和验证运行的彩色本地化摘要。

use colored::*;
use std::path::Path;

use crate::core::models::{RunOutcome, RunSummary, TestCount};
use crate::core::validation::ValidationReport;
use crate::infra::t;
use crate::reporting::generator::ReportKind;

/// Prints the end-of-run summary.
///
/// # Output Format / 输出格式
/// ```text
/// --- Test Results Summary ---
///   • Collected:  12
///   • Total:      12
///   • Passed:     10
///   • Failed:     2
///   • Pass rate:  83.3%
/// ```
pub fn print_run_summary(
    summary: &RunSummary,
    collected: TestCount,
    report: Option<&ReportKind>,
    report_dir: &Path,
    report_url: &str,
) {
    println!("\n{}", t!("summary.banner").bold());
    println!("  • {:<12} {}", t!("summary.collected"), collected);
    println!("  • {:<12} {}", t!("summary.total"), summary.total);
    println!(
        "  • {:<12} {}",
        t!("summary.passed"),
        summary.passed.to_string().green()
    );
    let failed = summary.failed_or_broken().to_string();
    println!(
        "  • {:<12} {}",
        t!("summary.failed"),
        if summary.has_failures() { failed.red() } else { failed.normal() }
    );
    println!("  • {:<12} {}", t!("summary.skipped"), summary.skipped);
    println!("  • {:<12} {}", t!("summary.pass_rate"), summary.pass_rate());

    let index = report_dir.join("index.html");
    match report {
        Some(ReportKind::Rich { .. }) => {
            println!("\n{}", t!("summary.rich_report", url = report_url).cyan());
            println!("{}", t!("summary.local_path", path = index.display()));
        }
        Some(ReportKind::Fallback { path }) => {
            println!("\n{}", t!("summary.fallback_report", path = path.display()).cyan());
            println!("{}", t!("summary.install_hint").dimmed());
        }
        None => {
            println!("\n{}", t!("summary.no_report").yellow());
        }
    }
}

/// Prints the final line of a run.
pub fn print_outcome(outcome: RunOutcome, allow_test_failures: bool) {
    let line = match outcome {
        RunOutcome::Passed => t!("outcome.passed").green().bold(),
        RunOutcome::TestsFailed if allow_test_failures => {
            t!("outcome.tests_failed_allowed").yellow().bold()
        }
        RunOutcome::TestsFailed => t!("outcome.tests_failed").red().bold(),
        RunOutcome::Timeout => t!("outcome.timeout").red().bold(),
        RunOutcome::ExecutionError => t!("outcome.execution_error").red().bold(),
    };
    println!("\n{}", line);
}

/// Prints one `STAGE : PASS|FAIL` line per validation stage in run order.
///
/// 按运行顺序为每个验证阶段打印一行 `STAGE : PASS|FAIL`。
pub fn print_validation_summary(report: &ValidationReport) {
    let rule = "=".repeat(80);
    println!("\n{}", rule);
    println!("{}", t!("validate.summary_banner").bold());
    println!("{}", rule);

    for stage in &report.stages {
        let status = if stage.record.passed {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        println!("{:<20} : {}", stage.name.to_uppercase(), status);
    }

    println!("{}", rule);
    let overall = if report.overall_success {
        "SUCCESS".green().bold()
    } else {
        "FAILURE".red().bold()
    };
    println!("{} {}", t!("validate.overall"), overall);
    println!("{}", rule);
}
