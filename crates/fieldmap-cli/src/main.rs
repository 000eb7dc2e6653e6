//! `fieldmap` developer CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use fieldmap_cli::commands::{
    NormalizeRequest, resolve_validation_config, run_diff, run_normalize, run_suggest,
    run_validate, write_json,
};
use fieldmap_cli::logging::{LogConfig, LogFormat, init_logging};

mod cli;
mod summary;

use crate::cli::{
    Cli, Command, DiffArgs, LogFormatArg, LogLevelArg, NormalizeArgs, SuggestArgs, ValidateArgs,
};
use crate::summary::{print_diff, print_structure_tree, print_suggestions, print_validation};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    let outcome = match &cli.command {
        Command::Normalize(args) => normalize(args),
        Command::Validate(args) => validate(args),
        Command::Suggest(args) => suggest(args),
        Command::Diff(args) => diff(args),
    };
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn normalize(args: &NormalizeArgs) -> Result<bool> {
    let request = NormalizeRequest {
        file: args.file.clone(),
        format: args.format.map(Into::into),
        name: args.name.clone(),
    };
    let structure = run_normalize(&request)?;
    if args.tree {
        print_structure_tree(&structure);
    } else if let Some(path) = &args.output {
        write_json(path, &structure)?;
        println!("Wrote {}", path.display());
    } else {
        println!("{}", serde_json::to_string_pretty(&structure)?);
    }
    Ok(true)
}

/// Exits non-zero when the result is not ok.
fn validate(args: &ValidateArgs) -> Result<bool> {
    let config = resolve_validation_config(args.profile.into(), args.config.as_deref())?;
    let result = run_validate(&args.source, &args.target, &args.mappings, &config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_validation(&result);
    }
    Ok(result.ok)
}

fn suggest(args: &SuggestArgs) -> Result<bool> {
    let outcome = run_suggest(&args.source, &args.target, args.min_confidence)?;
    print_suggestions(&outcome.suggestions);
    if let Some(path) = &args.output {
        write_json(path, &outcome.set)?;
        println!("Wrote {} mappings to {}", outcome.set.len(), path.display());
    }
    Ok(true)
}

fn diff(args: &DiffArgs) -> Result<bool> {
    print_diff(&run_diff(&args.old, &args.new)?);
    Ok(true)
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
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
