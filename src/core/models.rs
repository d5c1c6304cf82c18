//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the pipeline runner.
//! It includes models for per-test result records, run summaries, counts parsed
//! from command output, and the outcome of a whole run.
//!
//! 此模块定义了整个流水线运行器中使用的核心数据结构。
//! 它包括单个测试结果记录、运行摘要、从命令输出中解析的数量以及整个运行结果的模型。

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Status of a single test case as written by the test framework.
/// Unrecognised status strings deserialize as `Unknown`.
///
/// 测试框架写入的单个测试用例状态。无法识别的状态字符串反序列化为 `Unknown`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Broken,
    Skipped,
    #[serde(other)]
    Unknown,
}

/// One test case's outcome, read from a `*-result.json` file.
/// 单个测试用例的结果，从 `*-result.json` 文件中读取。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultRecord {
    /// Unique identifier of this record within a run / 本次运行中记录的唯一标识
    pub uuid: String,
    /// Stable identifier shared by retries of the same test / 同一测试重试之间共享的稳定标识
    #[serde(default)]
    pub history_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub status: TestStatus,
    /// Start time in epoch milliseconds / 开始时间（毫秒时间戳）
    #[serde(default)]
    pub start: Option<i64>,
    /// Stop time in epoch milliseconds / 结束时间（毫秒时间戳）
    #[serde(default)]
    pub stop: Option<i64>,
}

impl TestResultRecord {
    /// Duration between `start` and `stop`, if both are present and ordered.
    ///
    /// Timestamps come from external files, so a span that does not fit in
    /// an `i64` is treated as missing.
    pub fn duration(&self) -> Option<Duration> {
        let (start, stop) = (self.start?, self.stop?);
        stop.checked_sub(start)
            .and_then(|millis| u64::try_from(millis).ok())
            .map(Duration::from_millis)
    }
}

/// Aggregate counts for one invocation.
///
/// `passed + failed + broken + skipped + unknown` always equals `total`
/// for summaries produced by [`StatusTally`].
///
/// 一次调用的汇总计数。由 [`StatusTally`] 生成的摘要中，各状态之和始终等于 `total`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub broken: usize,
    pub skipped: usize,
    pub unknown: usize,
    /// Sum of per-test durations in milliseconds / 各测试耗时之和（毫秒）
    #[serde(default)]
    pub duration_ms: u64,
    /// Records beyond the first for the same history id / 同一历史标识下超出第一条的记录数
    #[serde(default)]
    pub retries: usize,
}

impl RunSummary {
    /// Failed and broken records together, the "bug discovery" count.
    /// 失败与损坏记录之和，即“缺陷发现”数量。
    pub fn failed_or_broken(&self) -> usize {
        self.failed + self.broken
    }

    pub fn has_failures(&self) -> bool {
        self.failed_or_broken() > 0
    }

    pub fn pass_rate(&self) -> Rate {
        Rate::of(self.passed, self.total)
    }

    pub fn failure_rate(&self) -> Rate {
        Rate::of(self.failed_or_broken(), self.total)
    }

    /// Checks that the status counts partition `total`.
    pub fn is_consistent(&self) -> bool {
        self.passed + self.failed + self.broken + self.skipped + self.unknown == self.total
    }
}

/// Thread-safe status counter.
///
/// Every counter is atomic so a single tally can be shared by reference
/// between workers; `record` never needs a lock or `&mut self`.
///
/// 线程安全的状态计数器。所有计数均为原子操作，因此可以在多个工作线程间按引用共享。
#[derive(Debug, Default)]
pub struct StatusTally {
    total: AtomicUsize,
    passed: AtomicUsize,
    failed: AtomicUsize,
    broken: AtomicUsize,
    skipped: AtomicUsize,
    unknown: AtomicUsize,
    duration_ms: AtomicU64,
}

impl StatusTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one test result.
    /// 记录一条测试结果。
    pub fn record(&self, record: &TestResultRecord) {
        let counter = match record.status {
            TestStatus::Passed => &self.passed,
            TestStatus::Failed => &self.failed,
            TestStatus::Broken => &self.broken,
            TestStatus::Skipped => &self.skipped,
            TestStatus::Unknown => &self.unknown,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
        if let Some(duration) = record.duration() {
            let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
            // Saturates instead of wrapping; the closure never returns `None`.
            let _ = self
                .duration_ms
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                    Some(current.saturating_add(millis))
                });
        }
    }

    /// Takes a snapshot of the current counts.
    ///
    /// Only meaningful once every recording worker has been joined.
    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            total: self.total.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            broken: self.broken.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
            duration_ms: self.duration_ms.load(Ordering::Relaxed),
            retries: 0,
        }
    }
}

/// A percentage that may have no data behind it.
/// 可能没有数据支撑的百分比。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate(Option<f64>);

impl Rate {
    /// `part / total` as a percentage; `total == 0` yields no data.
    pub fn of(part: usize, total: usize) -> Self {
        if total == 0 {
            Rate(None)
        } else {
            Rate(Some(part as f64 / total as f64 * 100.0))
        }
    }

    pub fn percent(&self) -> Option<f64> {
        self.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:.1}%", value),
            None => write!(f, "no data"),
        }
    }
}

/// A test count scraped from command output.
///
/// A parse failure is `Unknown`, which is never the same thing as zero.
///
/// 从命令输出中抓取的测试数量。解析失败为 `Unknown`，与零不同。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestCount {
    Known(usize),
    Unknown,
}

impl TestCount {
    pub fn known(&self) -> Option<usize> {
        match self {
            TestCount::Known(count) => Some(*count),
            TestCount::Unknown => None,
        }
    }
}

impl fmt::Display for TestCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestCount::Known(count) => write!(f, "{}", count),
            TestCount::Unknown => write!(f, "unknown"),
        }
    }
}

impl Serialize for TestCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TestCount::Known(count) => serializer.serialize_u64(*count as u64),
            TestCount::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// Captured result of a finished command.
/// 已完成命令的捕获结果。
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// The outcome of one pipeline run, which decides the exit code.
/// 一次流水线运行的结果，决定退出码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Passed,
    /// The command exited non-zero or result files report failures.
    TestsFailed,
    Timeout,
    ExecutionError,
}

impl RunOutcome {
    /// Derives the outcome of a completed command from its exit status and summary.
    pub fn from_completed(output: &CommandOutput, summary: &RunSummary) -> Self {
        if output.success && !summary.has_failures() {
            RunOutcome::Passed
        } else {
            RunOutcome::TestsFailed
        }
    }

    /// Whether the run counts as successful for the exit code.
    pub fn is_success(&self, allow_test_failures: bool) -> bool {
        match self {
            RunOutcome::Passed => true,
            RunOutcome::TestsFailed => allow_test_failures,
            RunOutcome::Timeout | RunOutcome::ExecutionError => false,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunOutcome::Passed => "passed",
            RunOutcome::TestsFailed => "tests_failed",
            RunOutcome::Timeout => "timeout",
            RunOutcome::ExecutionError => "execution_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uuid: &str, status: TestStatus) -> TestResultRecord {
        TestResultRecord {
            uuid: uuid.to_string(),
            history_id: None,
            name: uuid.to_string(),
            full_name: None,
            status,
            start: Some(1_000),
            stop: Some(1_250),
        }
    }

    #[test]
    fn tally_partitions_total() {
        let tally = StatusTally::new();
        tally.record(&record("a", TestStatus::Passed));
        tally.record(&record("b", TestStatus::Failed));
        tally.record(&record("c", TestStatus::Broken));
        tally.record(&record("d", TestStatus::Unknown));

        let summary = tally.snapshot();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.failed_or_broken(), 2);
        assert_eq!(summary.duration_ms, 1_000);
        assert!(summary.is_consistent());
    }

    #[test]
    fn unordered_timestamps_have_no_duration() {
        let mut rec = record("a", TestStatus::Passed);
        rec.start = Some(5_000);
        rec.stop = Some(4_000);
        assert_eq!(rec.duration(), None);
    }

    #[test]
    fn rate_without_data() {
        assert_eq!(Rate::of(0, 0).to_string(), "no data");
        assert_eq!(Rate::of(1, 3).to_string(), "33.3%");
    }

    #[test]
    fn unknown_count_serializes_as_string() {
        assert_eq!(serde_json::to_string(&TestCount::Unknown).unwrap(), "\"unknown\"");
        assert_eq!(serde_json::to_string(&TestCount::Known(0)).unwrap(), "0");
    }

    #[test]
    fn out_of_range_span_has_no_duration() {
        let mut wide = record("w", TestStatus::Passed);
        wide.start = Some(i64::MIN);
        wide.stop = Some(i64::MAX);
        assert_eq!(wide.duration(), None);

        let mut reversed = record("r", TestStatus::Passed);
        reversed.start = Some(10);
        reversed.stop = Some(5);
        assert_eq!(reversed.duration(), None);
    }
}
