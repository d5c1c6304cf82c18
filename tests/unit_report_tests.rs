//! # Reporting Unit Tests / 报告单元测试
//!
//! Descriptors, trend widgets, the fallback page and report generation.
//!
//! 描述文件、趋势组件、后备页面和报告生成。

mod common;

use chrono::Local;
use common::{history_entry, setup_project};
use pipeline_runner::config::PipelineConfig;
use pipeline_runner::core::models::RunSummary;
use pipeline_runner::reporting::artifacts::{
    ENVIRONMENT_FILE, EXECUTOR_FILE, ExecutorDescriptor, render_properties,
    write_environment_descriptor, write_executor_descriptor,
};
use pipeline_runner::reporting::generator::{ReportKind, ReportRequest, generate_report};
use pipeline_runner::reporting::html::{FallbackReport, render_fallback_report};
use pipeline_runner::reporting::widgets::{
    categories_trend, duration_trend, environment_widget, history_trend, retry_trend,
    write_widgets,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod artifact_tests {
    use super::*;

    #[test]
    fn test_properties_are_key_value_lines() {
        let facts = BTreeMap::from([
            ("Environment".to_string(), "Stage".to_string()),
            ("Note".to_string(), "two\nlines".to_string()),
        ]);
        assert_eq!(render_properties(&facts), "Environment=Stage\nNote=two lines\n");
    }

    #[test]
    fn test_descriptors_are_written() {
        let temp = setup_project();
        let config = PipelineConfig {
            executor: "Alice".to_string(),
            ..PipelineConfig::default()
        };
        let facts = config.environment_facts();
        let executor = ExecutorDescriptor::new(&config, 7, "http://localhost:1/index.html".to_string());

        write_environment_descriptor(temp.path(), &facts).unwrap();
        write_executor_descriptor(temp.path(), &executor).unwrap();

        let properties = fs::read_to_string(temp.path().join(ENVIRONMENT_FILE)).unwrap();
        assert!(properties.contains("Executor=Alice\n"));
        assert!(properties.contains("Environment=Stage\n"));

        let json: Value =
            serde_json::from_str(&fs::read_to_string(temp.path().join(EXECUTOR_FILE)).unwrap()).unwrap();
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["type"], "pipeline-runner");
        assert_eq!(json["buildOrder"], 7);
        assert_eq!(json["reportName"], "QA Report - Alice");
        assert_eq!(json["reportUrl"], "http://localhost:1/index.html");
    }
}

#[cfg(test)]
mod widget_tests {
    use super::*;

    #[test]
    fn test_trends_are_newest_first() {
        let entries = vec![history_entry(1, 5, 0), history_entry(2, 4, 1), history_entry(3, 3, 2)];

        let trend = history_trend(&entries);
        let orders: Vec<u64> = trend.iter().map(|p| p.build_order).collect();
        assert_eq!(orders, vec![3, 2, 1]);
        assert_eq!(trend[0].report_name, "QA Report - Current");
        assert_eq!(trend[1].report_name, "QA Report - Run 2");
        assert_eq!(trend[0].data["failed"], 2);
        assert_eq!(trend[0].data["passed"], 3);
        assert_eq!(trend[0].data["total"], 5);
    }

    #[test]
    fn test_other_trends_carry_their_metric() {
        let entries = vec![history_entry(1, 5, 0), history_entry(2, 4, 1)];

        assert_eq!(duration_trend(&entries)[0].data["duration"], 2000);
        assert_eq!(categories_trend(&entries)[0].data["Product defects"], 1);
        assert_eq!(retry_trend(&entries)[0].data["run"], 5);
    }

    #[test]
    fn test_environment_widget_lists_every_fact() {
        let facts = BTreeMap::from([("Environment".to_string(), "Stage".to_string())]);
        let widget = environment_widget(&facts);
        assert_eq!(widget[0]["name"], "Environment");
        assert_eq!(widget[0]["values"][0], "Stage");
    }

    #[test]
    fn test_write_widgets_creates_all_files() {
        let temp = setup_project();
        let config = PipelineConfig::default();
        let executor = ExecutorDescriptor::new(&config, 2, "http://localhost:1/index.html".to_string());
        let entries = vec![history_entry(1, 1, 0), history_entry(2, 1, 1)];

        let dir = write_widgets(temp.path(), &entries, &executor, &config.environment_facts()).unwrap();

        for name in [
            "executors.json",
            "environment.json",
            "history-trend.json",
            "duration-trend.json",
            "categories-trend.json",
            "retry-trend.json",
        ] {
            let content = fs::read_to_string(dir.join(name)).unwrap();
            let _: Value = serde_json::from_str(&content).unwrap();
        }
        let executors: Value =
            serde_json::from_str(&fs::read_to_string(dir.join("executors.json")).unwrap()).unwrap();
        assert_eq!(executors[0]["buildOrder"], 2);
    }
}

#[cfg(test)]
mod html_tests {
    use super::*;

    #[test]
    fn test_fallback_page_carries_summary() {
        pipeline_runner::set_language("en");
        let summary = RunSummary {
            total: 4,
            passed: 3,
            failed: 1,
            ..RunSummary::default()
        };
        let facts = BTreeMap::new();
        let categories = vec!["Unit".to_string(), "Regression".to_string()];
        let history = vec![history_entry(2, 3, 1), history_entry(1, 4, 0)];
        let html = render_fallback_report(&FallbackReport {
            executor: "QA Engineer",
            environment: "Stage",
            generated_at: Local::now(),
            summary: &summary,
            categories: &categories,
            facts: &facts,
            history: &history,
        })
        .into_string();

        assert!(html.contains("QA Engineer"));
        assert!(html.contains("Stage"));
        assert!(html.contains("75.0%"));
        assert!(html.contains("25.0%"));
        assert!(html.contains("Regression"));
        assert!(html.contains("tests_failed"));
    }
}

#[cfg(test)]
mod generator_tests {
    use super::*;

    fn config_without_tool() -> PipelineConfig {
        PipelineConfig {
            reporter_commands: vec!["definitely-not-a-report-tool".to_string()],
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_falls_back_to_html_page() {
        let temp = setup_project();
        let config = config_without_tool();
        let summary = RunSummary {
            total: 2,
            passed: 2,
            ..RunSummary::default()
        };
        let facts = config.environment_facts();
        let executor = ExecutorDescriptor::new(&config, 1, "http://localhost:1/index.html".to_string());
        let history = vec![history_entry(1, 2, 0)];
        let report_dir = temp.path().join("report");
        let cancel = CancellationToken::new();

        let kind = generate_report(&ReportRequest {
            config: &config,
            summary: &summary,
            history: &history,
            executor: &executor,
            facts: &facts,
            results_dir: &temp.path().join("results"),
            report_dir: &report_dir,
            working_dir: temp.path(),
            timeout: Duration::from_secs(10),
            cancel: &cancel,
        })
        .await
        .unwrap();

        let index = report_dir.join("index.html");
        assert_eq!(kind, ReportKind::Fallback { path: index.clone() });
        let html = fs::read_to_string(index).unwrap();
        assert!(html.contains("100.0%"));
    }

    #[tokio::test]
    async fn test_unwritable_report_dir_is_report_error() {
        let temp = setup_project();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let config = config_without_tool();
        let summary = RunSummary::default();
        let facts = config.environment_facts();
        let executor = ExecutorDescriptor::new(&config, 1, String::new());
        let cancel = CancellationToken::new();

        let result = generate_report(&ReportRequest {
            config: &config,
            summary: &summary,
            history: &[],
            executor: &executor,
            facts: &facts,
            results_dir: temp.path(),
            report_dir: &blocker.join("report"),
            working_dir: temp.path(),
            timeout: Duration::from_secs(10),
            cancel: &cancel,
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, pipeline_runner::core::error::PipelineError::ReportGeneration(_)));
        assert!(!err.is_fatal());
    }
}
