//! # Init Command Module / 初始化命令模块
//!
//! Creates a `pipeline.toml` either through an interactive wizard or, with
//! `--non-interactive`, from the defaults.
//!
//! 通过交互式向导创建 `pipeline.toml`，或在 `--non-interactive` 模式下使用默认值创建。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::PipelineConfig;
use crate::infra::t;

/// Executes the init command.
///
/// # Arguments
/// * `path` - Where the configuration file is written
/// * `non_interactive` - Write the defaults without prompting
/// * `force` - Overwrite an existing file without asking
pub fn execute(path: &Path, non_interactive: bool, force: bool) -> Result<()> {
    let theme = ColorfulTheme::default();

    if !non_interactive {
        println!("\n{}", t!("init.welcome").cyan().bold());
        println!("{}", t!("init.description"));
    }

    if path.exists() && !force {
        if non_interactive {
            println!("{}", t!("init.file_exists", path = path.display()).red());
            println!("{}", t!("init.use_force").yellow());
            return Ok(());
        }
        let overwrite = Confirm::with_theme(&theme)
            .with_prompt(t!("init.overwrite_prompt", path = path.display()))
            .default(false)
            .interact()
            .context(t!("init.confirmation_failed").to_string())?;
        if !overwrite {
            println!("{}", t!("init.aborted"));
            return Ok(());
        }
    }

    let config = if non_interactive {
        PipelineConfig::default()
    } else {
        prompt_config(&theme)?
    };

    write_config(path, &config)
}

/// Asks for the fields people change most often; the rest keep their defaults.
fn prompt_config(theme: &ColorfulTheme) -> Result<PipelineConfig> {
    let defaults = PipelineConfig::default();

    let executor: String = Input::with_theme(theme)
        .with_prompt(t!("init.executor_prompt"))
        .default(defaults.executor.clone())
        .interact_text()?;
    let environment: String = Input::with_theme(theme)
        .with_prompt(t!("init.environment_prompt"))
        .default(defaults.environment.clone())
        .interact_text()?;
    let command: String = Input::with_theme(theme)
        .with_prompt(t!("init.command_prompt"))
        .default(defaults.command.clone())
        .interact_text()?;
    let timeout_secs: u64 = Input::with_theme(theme)
        .with_prompt(t!("init.timeout_prompt"))
        .default(defaults.timeout_secs)
        .interact_text()?;
    let results_dir: String = Input::with_theme(theme)
        .with_prompt(t!("init.results_dir_prompt"))
        .default(defaults.results_dir.to_string_lossy().into_owned())
        .interact_text()?;
    let allow_test_failures = Confirm::with_theme(theme)
        .with_prompt(t!("init.allow_failures_prompt"))
        .default(defaults.allow_test_failures)
        .interact()?;

    Ok(PipelineConfig {
        executor,
        environment,
        command,
        timeout_secs,
        results_dir: PathBuf::from(results_dir),
        allow_test_failures,
        ..defaults
    })
}

fn write_config(path: &Path, config: &PipelineConfig) -> Result<()> {
    let toml_string = toml::to_string_pretty(config).context(t!("init.serialize_failed").to_string())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| t!("init.create_parent_dir_failed", path = parent.display()).to_string())?;
    }
    fs::write(path, toml_string)
        .with_context(|| t!("init.write_failed", path = path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success", path = path.display()).bold()
    );
    println!("{}", t!("init.next_steps"));
    Ok(())
}
