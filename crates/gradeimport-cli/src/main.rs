//! Exam score import CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use gradeimport_cli::logging::{LogConfig, LogFormat, init_logging};
use serde::Serialize;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{Session, run_fields, run_import, run_resolve, run_validate};
use crate::summary::{print_import, print_resolution, print_validation};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            tracing::error!("command failed: {error:#}");
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    let session = Session::load(cli)?;
    match &cli.command {
        Command::Fields => {
            run_fields(&session)?;
            Ok(0)
        }
        Command::Resolve(args) => {
            let resolution = run_resolve(&session, args)?;
            if args.json {
                print_json(&resolution)?;
            } else {
                print_resolution(&resolution, &session.registry);
            }
            Ok(0)
        }
        Command::Validate(args) => {
            let validated = run_validate(&session, args)?;
            if args.sheet.json {
                print_json(&validated)?;
            } else {
                print_validation(&validated, &session.registry);
            }
            Ok(i32::from(validated.has_errors()))
        }
        Command::Import(args) => {
            let imported = run_import(&session, args)?;
            if args.validate.sheet.json {
                print_json(&imported)?;
            } else {
                print_import(&imported, &session.registry);
            }
            Ok(i32::from(!imported.result.is_success()))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
