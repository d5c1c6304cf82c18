//! # Configuration Module / 配置模块
//!
//! Pipeline configuration, loaded from an optional TOML file.
//! Every field has a default, so running without a file is valid.
//!
//! 流水线配置，从可选的 TOML 文件加载。所有字段都有默认值，因此没有配置文件也可以运行。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the project directory.
/// 默认配置文件名，在项目目录中查找。
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.toml";

/// The complete pipeline configuration.
/// 完整的流水线配置。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    pub language: Option<String>,
    /// Name of whoever runs the pipeline, shown in reports.
    /// 运行流水线的执行者名称，显示在报告中。
    pub executor: String,
    /// Target environment label (e.g., "Stage").
    pub environment: String,
    pub build_name: String,
    pub build_url: String,
    /// Directory the test framework writes per-test result files into.
    /// 测试框架写入单个测试结果文件的目录。
    pub results_dir: PathBuf,
    /// Directory the report is generated into.
    /// 报告生成目录。
    pub report_dir: PathBuf,
    /// First port probed for serving the report.
    pub report_port: u16,
    /// The test command, shell-expanded and split with shell-word rules.
    /// 测试命令，经过 shell 展开并按 shell 规则拆分。
    pub command: String,
    /// Bound for the test command, in seconds.
    /// 测试命令的超时时间（秒）。
    pub timeout_secs: u64,
    /// If `true`, failing tests do not fail the run; only timeouts and
    /// execution errors do.
    /// 如果为 `true`，失败的测试不会导致运行失败；只有超时和执行错误会。
    pub allow_test_failures: bool,
    /// Candidate executables for the rich reporting tool, tried in order.
    /// 完整报告工具的候选可执行文件，按顺序尝试。
    pub reporter_commands: Vec<String>,
    /// Append-only run history log; lives outside the regenerated directories.
    /// 仅追加的运行历史日志，位于每次重新生成的目录之外。
    pub history_file: PathBuf,
    /// Number of most recent runs kept in the history log.
    /// 历史日志中保留的最近运行次数。
    pub history_limit: usize,
    /// Test categories listed in the reports.
    pub categories: Vec<String>,
    /// Extra environment facts, written to the environment descriptor.
    /// 额外的环境信息，写入环境描述文件。
    pub properties: BTreeMap<String, String>,
    pub validation: ValidationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language: None,
            executor: "QA Engineer".to_string(),
            environment: "Stage".to_string(),
            build_name: "QA Test Suite".to_string(),
            build_url: String::new(),
            results_dir: PathBuf::from("allure-results"),
            report_dir: PathBuf::from("allure-report"),
            report_port: 64678,
            command: "python -m pytest . --alluredir allure-results --tb=short -v".to_string(),
            timeout_secs: 1800,
            allow_test_failures: false,
            reporter_commands: vec![
                "allure".to_string(),
                "allure.bat".to_string(),
                "allure.cmd".to_string(),
                "~/scoop/apps/allure/current/bin/allure.bat".to_string(),
            ],
            history_file: PathBuf::from(".pipeline-history/history.jsonl"),
            history_limit: 20,
            categories: vec![
                "Unit".to_string(),
                "Integration".to_string(),
                "End-to-End".to_string(),
                "Performance".to_string(),
                "Regression".to_string(),
            ],
            properties: BTreeMap::new(),
            validation: ValidationConfig::default(),
        }
    }
}

/// A named selection of tests passed to the framework (e.g., `unit/` or `-m regression`).
/// 传给测试框架的命名测试选择（例如 `unit/` 或 `-m regression`）。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SuiteSelector {
    pub name: String,
    pub selector: String,
}

impl SuiteSelector {
    pub fn new(name: &str, selector: &str) -> Self {
        Self {
            name: name.to_string(),
            selector: selector.to_string(),
        }
    }
}

/// Settings for the `validate` command.
/// `validate` 命令的设置。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// The framework invocation every stage starts from.
    /// 每个阶段使用的测试框架调用前缀。
    pub framework: String,
    /// The suite that must collect at least one test.
    /// 必须至少收集到一个测试的套件。
    pub required_suite: String,
    /// Prefix of the argument that points the framework at the results directory.
    pub results_arg: String,
    pub regression_selector: String,
    pub bug_discovery_selector: String,
    /// Extra arguments for the complete-suite stage.
    pub complete_args: String,
    pub report_file: PathBuf,
    pub log_file: PathBuf,
    /// Bound for each framework invocation, in seconds.
    pub timeout_secs: u64,
    /// Suites whose collected counts are checked.
    pub suites: Vec<SuiteSelector>,
    /// Runs expected to produce result files, each with extra arguments.
    /// 预期会生成结果文件的运行，每个附带额外参数。
    pub integration_runs: Vec<SuiteSelector>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            framework: "python -m pytest".to_string(),
            required_suite: "regression".to_string(),
            results_arg: "--alluredir=".to_string(),
            regression_selector: "-m regression".to_string(),
            bug_discovery_selector: "-m bug_discovery".to_string(),
            complete_args: "-v --maxfail=10 --tb=line".to_string(),
            report_file: PathBuf::from("final_validation_report.json"),
            log_file: PathBuf::from("final_qa_validation.log"),
            timeout_secs: 300,
            suites: vec![
                SuiteSelector::new("unit", "unit/"),
                SuiteSelector::new("integration", "integration/"),
                SuiteSelector::new("end_to_end", "end_to_end/"),
                SuiteSelector::new("performance", "performance/"),
                SuiteSelector::new("regression", "-m regression"),
                SuiteSelector::new("bug_discovery", "-m bug_discovery"),
            ],
            integration_runs: vec![
                SuiteSelector::new("regression", "-m regression -v"),
                SuiteSelector::new("unit", "unit/ -v --maxfail=3"),
                SuiteSelector::new("integration", "integration/ -v --maxfail=3"),
            ],
        }
    }
}

impl PipelineConfig {
    /// Resolves a configured path against the project root.
    /// 将配置中的路径相对于项目根目录解析。
    pub fn resolve(&self, project_root: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_root.join(path)
        }
    }

    /// URL the report is expected to be served at.
    pub fn report_url(&self, port: u16) -> String {
        format!("http://localhost:{}/index.html", port)
    }

    /// Environment facts for the environment descriptor and widget.
    ///
    /// Fixed keys come first and may be overridden by `properties`.
    pub fn environment_facts(&self) -> BTreeMap<String, String> {
        let mut facts = BTreeMap::new();
        facts.insert("Environment".to_string(), self.environment.clone());
        facts.insert("Executor".to_string(), self.executor.clone());
        facts.insert("Platform".to_string(), std::env::consts::OS.to_string());
        facts.insert("Arch".to_string(), std::env::consts::ARCH.to_string());
        if !self.categories.is_empty() {
            facts.insert("Test.Categories".to_string(), self.categories.join(","));
        }
        for (key, value) in &self.properties {
            facts.insert(key.clone(), value.clone());
        }
        facts
    }
}

/// Loads a pipeline configuration from a TOML file.
/// 从 TOML 文件加载流水线配置。
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: PipelineConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Loads the configuration, or returns the defaults when `path` does not
/// exist and was not given explicitly.
///
/// 加载配置；当 `path` 不存在且不是显式指定时返回默认配置。
pub fn load_or_default(path: &Path, explicit: bool) -> Result<PipelineConfig> {
    if !explicit && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(PipelineConfig::default());
    }
    load_config(path)
}
