//! # Reporting Module / 报告模块
//!
//! This module writes the report artifact set of a run: the environment and
//! executor descriptors, trend widgets built from run history, the report
//! itself (delegated to a rich reporting tool or rendered as a fallback HTML
//! page) and colorful console summaries.
//!
//! 此模块写入一次运行的报告产物集：环境和执行者描述文件、基于运行历史的趋势组件、
//! 报告本身（委托给完整报告工具或渲染为后备 HTML 页面）以及彩色控制台摘要。

pub mod artifacts;
pub mod console;
pub mod generator;
pub mod html;
pub mod widgets;

// Re-export common reporting functions
pub use console::{print_run_summary, print_validation_summary};
pub use generator::{ReportKind, ReportRequest, generate_report};
pub use html::write_fallback_report;
