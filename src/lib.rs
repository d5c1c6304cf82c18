//! # Pipeline Runner Library / 流水线运行器库
//!
//! This library provides the core functionality for the Pipeline Runner tool,
//! a configuration-driven QA pipeline that runs an external test framework,
//! aggregates its per-test result files and renders trend-aware reports.
//!
//! 此库为 Pipeline Runner 工具提供核心功能，
//! 这是一个配置驱动的 QA 流水线：运行外部测试框架、汇总逐个测试的结果文件并生成带趋势的报告。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration, command execution, output parsing, aggregation and run history
//! - `infra` - Infrastructure services like process spawning, file system operations and logging
//! - `reporting` - Report artifacts, trend widgets, the fallback HTML page and console output
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、配置、命令执行、输出解析、结果汇总和运行历史
//! - `infra` - 基础设施服务，如进程派生、文件系统操作和日志
//! - `reporting` - 报告产物、趋势组件、后备 HTML 页面和控制台输出
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::{config, models};

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for the application's user interface. It attempts to match the full
/// locale (e.g., "zh-CN"), then just the language code (e.g., "en"), and
/// finally falls back to the default language ("en").
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    set_language(&locale);
}

/// Sets the active language, falling back to the language code and then "en".
/// 设置当前语言，依次回退到语言代码和 "en"。
pub fn set_language(locale: &str) {
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale) {
        locale
    } else {
        locale
            .split(['-', '_'])
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
