//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders the self-contained fallback report used when the rich
//! reporting tool is unavailable. The page carries the run's counts, pass and
//! failure rates, descriptive fields from configuration, and a table of recent
//! runs from the history log.
//!
//! 此模块渲染在完整报告工具不可用时使用的独立后备报告。
//! 页面包含本次运行的计数、通过率和失败率、来自配置的描述字段，以及来自历史日志的最近运行表格。

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{history::HistoryEntry, models::RunSummary};
use crate::infra::t;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

/// Everything the fallback page shows.
/// 后备页面展示的全部内容。
#[derive(Debug, Clone)]
pub struct FallbackReport<'a> {
    pub executor: &'a str,
    pub environment: &'a str,
    pub generated_at: DateTime<Local>,
    pub summary: &'a RunSummary,
    pub categories: &'a [String],
    pub facts: &'a BTreeMap<String, String>,
    /// Recent runs, newest first.
    pub history: &'a [HistoryEntry],
}

/// Renders the fallback report page.
///
/// All dynamic text is escaped by `maud`. With no tests run, both rates
/// read "no data".
///
/// 渲染后备报告页面。所有动态文本由 `maud` 转义。未运行任何测试时，两个比率都显示 "no data"。
pub fn render_fallback_report(report: &FallbackReport<'_>) -> Markup {
    let summary = report.summary;
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (t!("html_report.title", executor = report.executor)) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                div class="container" {
                    div class="header" {
                        h1 { (t!("html_report.main_header")) }
                        p {
                            strong { (t!("html_report.executor")) } " " (report.executor)
                            " | "
                            strong { (t!("html_report.environment")) } " " (report.environment)
                        }
                        p {
                            strong { (t!("html_report.date")) } " "
                            (report.generated_at.format("%Y-%m-%d %H:%M:%S").to_string())
                        }
                    }

                    div class="metrics" {
                        div class="metric total" id="metric-total" {
                            h3 { (summary.total) }
                            p { (t!("html_report.summary.total")) }
                        }
                        div class="metric success" id="metric-passed" {
                            h3 { (summary.passed) }
                            p { (t!("html_report.summary.passed")) }
                        }
                        div class="metric failed" id="metric-failed" {
                            h3 { (summary.failed_or_broken()) }
                            p { (t!("html_report.summary.failed")) }
                        }
                    }

                    div class="info-grid" {
                        div class="info-card" {
                            h3 { (t!("html_report.rates")) }
                            ul {
                                li id="pass-rate" { (t!("html_report.pass_rate")) ": " (summary.pass_rate().to_string()) }
                                li id="failure-rate" { (t!("html_report.failure_rate")) ": " (summary.failure_rate().to_string()) }
                                li { (t!("html_report.skipped")) ": " (summary.skipped) }
                                li { (t!("html_report.retries")) ": " (summary.retries) }
                            }
                        }
                        @if !report.categories.is_empty() {
                            div class="info-card" {
                                h3 { (t!("html_report.categories")) }
                                ul {
                                    @for category in report.categories {
                                        li { (category) }
                                    }
                                }
                            }
                        }
                        div class="info-card" {
                            h3 { (t!("html_report.environment_facts")) }
                            ul {
                                @for (name, value) in report.facts {
                                    li { (name) ": " (value) }
                                }
                            }
                        }
                    }

                    @if !report.history.is_empty() {
                        h2 { (t!("html_report.history")) }
                        table {
                            thead {
                                tr {
                                    th { "#" }
                                    th { (t!("html_report.table.date")) }
                                    th { (t!("html_report.table.outcome")) }
                                    th { (t!("html_report.summary.total")) }
                                    th { (t!("html_report.summary.passed")) }
                                    th { (t!("html_report.summary.failed")) }
                                    th { (t!("html_report.pass_rate")) }
                                }
                            }
                            tbody {
                                @for entry in report.history {
                                    tr {
                                        td { (entry.build_order) }
                                        td { (entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()) }
                                        td { (entry.outcome.to_string()) }
                                        td { (entry.summary.total) }
                                        td { (entry.summary.passed) }
                                        td { (entry.summary.failed_or_broken()) }
                                        td { (entry.summary.pass_rate().to_string()) }
                                    }
                                }
                            }
                        }
                    }

                    div class="footer" {
                        p { (t!("html_report.footer")) }
                    }
                }
            }
        }
    }
}

/// Writes the fallback report to `<report_dir>/index.html`.
///
/// # Errors
/// This function will return an error if the directory cannot be created or
/// the file cannot be written.
pub fn write_fallback_report(report_dir: &Path, report: &FallbackReport<'_>) -> Result<PathBuf> {
    fs::create_dir_all(report_dir)
        .with_context(|| format!("Failed to create report directory: {}", report_dir.display()))?;
    let path = report_dir.join("index.html");
    fs::write(&path, render_fallback_report(report).into_string())
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(path)
}
