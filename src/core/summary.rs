//! # Output Summary Module / 输出摘要模块
//!
//! Best-effort scraping of the test framework's human-readable output.
//! None of this is a structured protocol: a format change in the framework
//! shows up here as a parse failure, which callers must treat as "unknown".
//!
//! 对测试框架可读输出的尽力抓取。这不是结构化协议：
//! 框架输出格式的变化在这里表现为解析失败，调用方必须将其视为“未知”。

use serde::Serialize;

use crate::core::{error::PipelineError, models::TestCount};

/// Finds the collected-test count in command output.
///
/// Recognised shapes:
/// - `87 tests collected` → 87
/// - `12/87 tests collected` → 87 (the denominator)
/// - `1 test collected` → 1
/// - `no tests collected` → 0
/// - `collected 87 items` → 87
///
/// # Errors
/// Returns [`PipelineError::Parse`] if no line carries a recognisable count.
pub fn parse_collected_count(output: &str) -> Result<usize, PipelineError> {
    output
        .lines()
        .find_map(count_from_line)
        .ok_or(PipelineError::Parse)
}

/// Like [`parse_collected_count`], but downgrades a parse failure to
/// [`TestCount::Unknown`] and logs it.
///
/// 与 [`parse_collected_count`] 相同，但将解析失败降级为 [`TestCount::Unknown`] 并记录日志。
pub fn summarize_collected(output: &str) -> TestCount {
    match parse_collected_count(output) {
        Ok(count) => TestCount::Known(count),
        Err(e) => {
            tracing::warn!("{}", e);
            TestCount::Unknown
        }
    }
}

fn count_from_line(line: &str) -> Option<usize> {
    if !line.contains("collected") {
        return None;
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();

    // "N tests collected ..." / "M/N tests collected ...", possibly inside a "====" banner
    let counted = tokens.windows(3).find_map(|window| match window {
        [count, noun, verb] if noun.starts_with("test") && verb.starts_with("collected") => {
            parse_count_token(count)
        }
        _ => None,
    });
    if counted.is_some() {
        return counted;
    }

    // "collecting ... collected N items"
    let pos = tokens.iter().position(|t| *t == "collected")?;
    match (tokens.get(pos + 1), tokens.get(pos + 2)) {
        (Some(count), Some(noun)) if noun.starts_with("item") => count.parse().ok(),
        _ => None,
    }
}

fn parse_count_token(token: &str) -> Option<usize> {
    if token == "no" {
        return Some(0);
    }
    match token.split_once('/') {
        Some((_, total)) => total.parse().ok(),
        None => token.parse().ok(),
    }
}

/// Per-outcome counts from the framework's final summary line.
/// 来自框架最终摘要行的各结果计数。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub xfailed: usize,
    pub xpassed: usize,
    pub deselected: usize,
    pub warnings: usize,
}

/// Parses the last outcome line, e.g. `=== 3 failed, 10 passed in 2.31s ===`.
///
/// Returns the trimmed line together with its counts, or `None` when the
/// output has no such line.
pub fn parse_outcome_line(output: &str) -> Option<(String, OutcomeCounts)> {
    output.lines().rev().find_map(|line| {
        let body = line.trim().trim_matches('=').trim();
        let head = body.rsplit_once(" in ").map_or(body, |(head, _)| head);

        let mut counts = OutcomeCounts::default();
        let mut recognised = false;
        for part in head.split(',') {
            let mut words = part.split_whitespace();
            let (Some(count), Some(word), None) = (words.next(), words.next(), words.next())
            else {
                continue;
            };
            let Ok(count) = count.parse::<usize>() else {
                continue;
            };
            let slot = match word {
                "passed" => &mut counts.passed,
                "failed" => &mut counts.failed,
                "error" | "errors" => &mut counts.errors,
                "skipped" => &mut counts.skipped,
                "xfailed" => &mut counts.xfailed,
                "xpassed" => &mut counts.xpassed,
                "deselected" => &mut counts.deselected,
                "warning" | "warnings" => &mut counts.warnings,
                _ => continue,
            };
            *slot += count;
            recognised = true;
        }

        recognised.then(|| (body.to_string(), counts))
    })
}

/// Counts verbose per-test lines (`path::test PASSED [ 10%]`).
///
/// Only lines whose first token is a test id are counted, so the short
/// failure summary (`FAILED path::test - ...`) is not double counted.
///
/// 统计详细模式下的逐个测试行。只统计首个标记为测试 ID 的行，避免重复计算失败摘要。
pub fn count_verbose_outcomes(output: &str) -> VerboseOutcomes {
    let mut outcomes = VerboseOutcomes::default();
    for line in output.lines() {
        let mut tokens = line.split_whitespace();
        let (Some(id), Some(status)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        if !id.contains("::") {
            continue;
        }
        match status {
            "PASSED" => outcomes.passed.push(id.to_string()),
            "FAILED" | "ERROR" => outcomes.failed.push(id.to_string()),
            _ => {}
        }
    }
    outcomes
}

/// Test ids seen in verbose output, split by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerboseOutcomes {
    pub passed: Vec<String>,
    pub failed: Vec<String>,
}

/// Whether the output shows that the framework got as far as collecting tests.
pub fn shows_collection(output: &str) -> bool {
    output.contains("collected")
}
