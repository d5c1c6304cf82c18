//! # Pipeline Error Taxonomy / 流水线错误分类
//!
//! Only `Execution` and `Timeout` ever become the outcome of a run.
//! `Parse` and `ReportGeneration` are logged by their callers and absorbed.
//!
//! 只有 `Execution` 和 `Timeout` 会成为运行结果；
//! `Parse` 和 `ReportGeneration` 由调用方记录日志后吸收。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The command could not be started or waited on.
    /// 命令无法启动或等待。
    #[error("failed to execute `{command}`: {reason}")]
    Execution { command: String, reason: String },

    /// The command did not finish within its bound and was killed.
    /// 命令未在限定时间内完成并被终止。
    #[error("`{command}` did not finish within {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },

    /// The output did not contain any recognised test-count token.
    /// 输出中不包含可识别的测试数量标记。
    #[error("no recognised test count in command output")]
    Parse,

    /// Neither the rich reporting tool nor the fallback page could be produced.
    /// 既无法生成完整报告，也无法生成后备页面。
    #[error("report generation failed: {0}")]
    ReportGeneration(String),
}

impl PipelineError {
    /// Whether this error decides the outcome of a run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Execution { .. } | Self::Timeout { .. })
    }
}
