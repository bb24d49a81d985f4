//! CLI argument definitions for the Schematron toolkit.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "schematron",
    version,
    about = "Schematron toolkit - compile rulesets to XSLT and validate XML documents",
    long_about = "Compile Schematron rulesets into SVRL-emitting XSLT 1.0 stylesheets\n\
                  and validate XML documents directly against the rules.\n\n\
                  Both the ISO namespace and the legacy 1.5 namespace are accepted."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
    /// Compile a Schematron ruleset into an XSLT stylesheet.
    Compile(CompileArgs),

    /// Validate XML documents against a Schematron ruleset.
    Validate(ValidateArgs),
}

#[derive(Parser)]
pub struct CompileArgs {
    /// Path to the Schematron ruleset.
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Output path for the stylesheet (default: SCHEMA with .xslt extension).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Compile only the patterns active in this phase.
    #[arg(long = "phase", value_name = "PHASE")]
    pub phase: Option<String>,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Path to the Schematron ruleset.
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// XML documents to validate.
    #[arg(value_name = "XML", required = true)]
    pub documents: Vec<PathBuf>,

    /// Validate only the patterns active in this phase.
    #[arg(long = "phase", value_name = "PHASE")]
    pub phase: Option<String>,

    /// Result format printed to stdout.
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: ResultFormatArg,

    /// Write a JSON report payload to this path in addition to stdout output.
    #[arg(long = "report-file", value_name = "PATH")]
    pub report_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ResultFormatArg {
    /// Summary table plus findings.
    Text,
    /// JSON report payload.
    Json,
    /// SVRL documents, one per input.
    Svrl,
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
