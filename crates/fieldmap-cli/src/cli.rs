//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use fieldmap_model::StructureFormat;
use fieldmap_validate::Profile;

#[derive(Parser)]
#[command(
    name = "fieldmap",
    version,
    about = "Normalize schemas into field trees and check field mappings",
    long_about = "Normalize JSON samples, JSON Schema, XSD and WSDL into canonical field trees,\n\
                  then suggest, validate and compare field mappings between them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize a schema file into a structure.
    Normalize(NormalizeArgs),

    /// Validate a mapping set against its source and target structures.
    Validate(ValidateArgs),

    /// Suggest mappings between two structures by field name.
    Suggest(SuggestArgs),

    /// Compare two structures path by path.
    Diff(DiffArgs),
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// Schema file (JSON sample, JSON Schema, XSD, WSDL or custom field list).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Input format (default: from the extension, then the content).
    #[arg(long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// Structure name (default: the file stem).
    #[arg(long = "name")]
    pub name: Option<String>,

    /// Write the structure JSON here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "OUT")]
    pub output: Option<PathBuf>,

    /// Print a table of fields instead of JSON.
    #[arg(long = "tree", conflicts_with = "output")]
    pub tree: bool,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Source structure (saved structure JSON or raw schema file).
    #[arg(long = "source", value_name = "S")]
    pub source: PathBuf,

    /// Target structure (saved structure JSON or raw schema file).
    #[arg(long = "target", value_name = "T")]
    pub target: PathBuf,

    /// Mapping set JSON.
    #[arg(long = "mappings", value_name = "M")]
    pub mappings: PathBuf,

    /// Severity preset.
    #[arg(long = "profile", value_enum, default_value = "deploy")]
    pub profile: ProfileArg,

    /// Severity overrides in TOML (takes precedence over --profile).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct SuggestArgs {
    #[arg(long = "source", value_name = "S")]
    pub source: PathBuf,

    #[arg(long = "target", value_name = "T")]
    pub target: PathBuf,

    /// Drop candidates scoring below this (0 to 1).
    #[arg(long = "min-confidence", default_value_t = 0.75)]
    pub min_confidence: f32,

    /// Write a mapping set with the suggestions applied.
    #[arg(long = "output", short = 'o', value_name = "OUT")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DiffArgs {
    #[arg(value_name = "OLD")]
    pub old: PathBuf,

    #[arg(value_name = "NEW")]
    pub new: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Xsd,
    Wsdl,
    Custom,
}

impl From<FormatArg> for StructureFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => Self::Json,
            FormatArg::Xsd => Self::Xsd,
            FormatArg::Wsdl => Self::Wsdl,
            FormatArg::Custom => Self::Custom,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProfileArg {
    Deploy,
    Draft,
}

impl From<ProfileArg> for Profile {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Deploy => Self::Deploy,
            ProfileArg::Draft => Self::Draft,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
