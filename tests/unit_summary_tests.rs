//! # Output Summary Unit Tests / 输出摘要单元测试
//!
//! Scraping of collected counts and outcome lines from framework output.
//!
//! 从测试框架输出中抓取收集数量和结果行。

use pipeline_runner::core::error::PipelineError;
use pipeline_runner::core::models::TestCount;
use pipeline_runner::core::summary::{
    count_verbose_outcomes, parse_collected_count, parse_outcome_line, shows_collection,
    summarize_collected,
};

#[cfg(test)]
mod collected_count_tests {
    use super::*;

    #[test]
    fn test_plain_count() {
        assert_eq!(parse_collected_count("87 tests collected in 0.12s").unwrap(), 87);
    }

    #[test]
    fn test_selected_over_total_uses_denominator() {
        let output = "12/87 tests collected (75 deselected) in 0.10s";
        assert_eq!(parse_collected_count(output).unwrap(), 87);
    }

    #[test]
    fn test_singular() {
        assert_eq!(parse_collected_count("1 test collected in 0.01s").unwrap(), 1);
    }

    #[test]
    fn test_no_tests_is_zero() {
        assert_eq!(parse_collected_count("no tests collected in 0.01s").unwrap(), 0);
    }

    #[test]
    fn test_verbose_header() {
        let output = "============ test session starts ============\ncollecting ... collected 42 items\n";
        assert_eq!(parse_collected_count(output).unwrap(), 42);
    }

    #[test]
    fn test_count_found_after_other_lines() {
        let output = "tests/test_a.py::test_one\ntests/test_a.py::test_two\n\n2 tests collected in 0.02s\n";
        assert_eq!(parse_collected_count(output).unwrap(), 2);
    }

    #[test]
    fn test_count_inside_banner() {
        let output = "========== 87 tests collected in 0.12s ==========";
        assert_eq!(parse_collected_count(output).unwrap(), 87);

        let output = "==== 12/87 tests collected (75 deselected) in 0.10s ====";
        assert_eq!(parse_collected_count(output).unwrap(), 87);
    }

    #[test]
    fn test_unrecognised_output_is_parse_error() {
        let result = parse_collected_count("ERROR: file or directory not found: unit/");
        assert!(matches!(result, Err(PipelineError::Parse)));
    }

    #[test]
    fn test_parse_failure_is_unknown_not_zero() {
        assert_eq!(summarize_collected("garbage"), TestCount::Unknown);
        assert_ne!(summarize_collected("garbage"), TestCount::Known(0));
        assert_eq!(summarize_collected("5 tests collected"), TestCount::Known(5));
    }
}

#[cfg(test)]
mod outcome_line_tests {
    use super::*;

    #[test]
    fn test_mixed_outcome_line() {
        let output = "...\n=========== 3 failed, 10 passed, 2 skipped in 2.31s ===========\n";
        let (line, counts) = parse_outcome_line(output).unwrap();
        assert_eq!(line, "3 failed, 10 passed, 2 skipped in 2.31s");
        assert_eq!(counts.failed, 3);
        assert_eq!(counts.passed, 10);
        assert_eq!(counts.skipped, 2);
        assert_eq!(counts.errors, 0);
    }

    #[test]
    fn test_errors_and_warnings() {
        let (_, counts) = parse_outcome_line("== 1 passed, 2 errors, 1 warning in 0.5s ==").unwrap();
        assert_eq!(counts.passed, 1);
        assert_eq!(counts.errors, 2);
        assert_eq!(counts.warnings, 1);
    }

    #[test]
    fn test_last_outcome_line_wins() {
        let output = "== 1 passed in 0.1s ==\nmore output\n== 4 passed in 0.2s ==\n";
        let (_, counts) = parse_outcome_line(output).unwrap();
        assert_eq!(counts.passed, 4);
    }

    #[test]
    fn test_no_outcome_line() {
        assert!(parse_outcome_line("nothing to see here\n").is_none());
    }
}

#[cfg(test)]
mod verbose_outcome_tests {
    use super::*;

    #[test]
    fn test_counts_per_test_lines_only() {
        let output = "\
tests/test_a.py::test_one PASSED [ 33%]
tests/test_a.py::test_two FAILED [ 66%]
tests/test_a.py::test_three ERROR [100%]
=========== short test summary info ===========
FAILED tests/test_a.py::test_two - assert 1 == 2
";
        let outcomes = count_verbose_outcomes(output);
        assert_eq!(outcomes.passed, vec!["tests/test_a.py::test_one"]);
        assert_eq!(
            outcomes.failed,
            vec!["tests/test_a.py::test_two", "tests/test_a.py::test_three"]
        );
    }

    #[test]
    fn test_shows_collection() {
        assert!(shows_collection("collected 3 items"));
        assert!(!shows_collection("ERROR: usage"));
    }
}
