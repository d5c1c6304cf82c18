//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Pipeline Runner,
//! including data models, configuration, command execution, output
//! parsing, result aggregation and run history.
//!
//! 此模块包含 Pipeline Runner 的核心功能，
//! 包括数据模型、配置、命令执行、输出解析、结果汇总和运行历史。

pub mod aggregate;
pub mod config;
pub mod error;
pub mod execution;
pub mod history;
pub mod models;
pub mod summary;
pub mod validation;

// Re-exports
pub use aggregate::aggregate_results;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use execution::execute;
pub use models::{RunOutcome, RunSummary, TestCount};
pub use summary::parse_collected_count;
