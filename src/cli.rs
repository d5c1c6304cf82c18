//! # Command-Line Interface / 命令行接口
//!
//! Builds the localised clap command tree and dispatches to the `run`,
//! `validate` and `init` commands. `run` is the default when no subcommand
//! is given.
//!
//! 构建本地化的 clap 命令树，并分派到 `run`、`validate` 和 `init` 命令。
//! 未指定子命令时默认执行 `run`。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use std::{env, path::PathBuf, process::ExitCode};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::core::config::{DEFAULT_CONFIG_FILE, PipelineConfig, load_or_default};
use crate::infra::t;

pub mod commands {
    pub mod init;
    pub mod run;
    pub mod validate;
}

/// Pre-parses the command line to find `--lang <VALUE>` (or `--lang=VALUE`),
/// so help texts are localised before the full CLI is built.
///
/// 预解析命令行以查找 `--lang`，以便在构建完整 CLI 之前本地化帮助文本。
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang=").map(str::to_string))
}

fn build_cli() -> Command {
    Command::new("pipeline-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about").to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help(t!("cli.config").to_string())
                .value_name("CONFIG")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("project-dir")
                .long("project-dir")
                .help(t!("cli.project_dir").to_string())
                .value_name("PROJECT_DIR")
                .default_value(".")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.run_about").to_string())
                .arg(
                    Arg::new("serve")
                        .long("serve")
                        .help(t!("cli.serve").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("validate").about(t!("cli.validate_about").to_string()))
        .subcommand(
            Command::new("init")
                .about(t!("cli.init_about").to_string())
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.non_interactive").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help(t!("cli.force").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Parses the command line and runs the selected command.
///
/// # Returns
/// The process exit code of the command.
pub async fn run() -> Result<ExitCode> {
    let cli_language = pre_parse_language();
    match &cli_language {
        Some(lang) => crate::set_language(lang),
        None => crate::init(),
    }

    let matches = build_cli().get_matches();
    let project_dir = matches
        .get_one::<PathBuf>("project-dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let (config_path, explicit) = match matches.get_one::<PathBuf>("config") {
        Some(path) => (path.clone(), true),
        None => (project_dir.join(DEFAULT_CONFIG_FILE), false),
    };

    match matches.subcommand() {
        Some(("init", init_matches)) => {
            commands::init::execute(
                &config_path,
                init_matches.get_flag("non-interactive"),
                init_matches.get_flag("force"),
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Some(("validate", _)) => {
            let config = load_config(&config_path, explicit, cli_language.is_none())?;
            let cancel = setup_signal_handler();
            commands::validate::execute(&config, &project_dir, cancel).await
        }
        Some(("run", run_matches)) => {
            run_pipeline(run_matches, &config_path, explicit, &project_dir, cli_language.is_none()).await
        }
        _ => run_pipeline(&matches, &config_path, explicit, &project_dir, cli_language.is_none()).await,
    }
}

async fn run_pipeline(
    matches: &ArgMatches,
    config_path: &std::path::Path,
    explicit: bool,
    project_dir: &std::path::Path,
    use_config_language: bool,
) -> Result<ExitCode> {
    let config = load_config(config_path, explicit, use_config_language)?;
    let options = commands::run::RunOptions {
        serve: matches
            .try_get_one::<bool>("serve")
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false),
    };
    let cancel = setup_signal_handler();
    commands::run::execute(&config, project_dir, options, cancel).await
}

/// Loads the configuration; its `language` applies unless `--lang` was given.
fn load_config(
    path: &std::path::Path,
    explicit: bool,
    use_config_language: bool,
) -> Result<PipelineConfig> {
    let config = load_or_default(path, explicit)?;
    if use_config_language {
        if let Some(lang) = &config.language {
            crate::set_language(lang);
        }
    }
    Ok(config)
}

/// Cancels the returned token on Ctrl-C.
///
/// 在 Ctrl-C 时取消返回的令牌。
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{}", t!("shutdown_signal").yellow());
                token_clone.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    });

    token
}
