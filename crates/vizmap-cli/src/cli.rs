//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "vizmap",
    version,
    about = "Track, tokenize and remap field references in visualization specs",
    long_about = "Track, tokenize and remap field references in visualization specifications.\n\n\
                  Exports a spec as a portable template with placeholder tokens and applies\n\
                  templates to new datasets by rewriting the tokens into field names."
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

    /// Allow specification text in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Engine configuration file (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Report which dataset fields a spec references.
    Track(TrackArgs),

    /// Export a spec as a template with placeholder tokens.
    Tokenize(TokenizeArgs),

    /// Suggest dataset fields for unassigned template slots.
    Suggest(SuggestArgs),

    /// Apply a template's slot assignments to its spec.
    Remap(RemapArgs),
}

#[derive(Args)]
pub struct TrackArgs {
    /// Specification file.
    #[arg(long = "spec", value_name = "PATH")]
    pub spec: PathBuf,

    /// Dataset fields (JSON array).
    #[arg(long = "fields", value_name = "PATH")]
    pub fields: PathBuf,

    /// Registry from an earlier run, for placeholder continuity.
    #[arg(long = "previous", value_name = "PATH")]
    pub previous: Option<PathBuf>,

    /// Ignore the previous registry and allocate placeholders afresh.
    #[arg(long = "reset")]
    pub reset: bool,

    /// A drill hierarchy is bound in the host.
    #[arg(long = "drilldown")]
    pub drilldown: bool,

    /// Print the registry as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct TokenizeArgs {
    /// Specification file.
    #[arg(long = "spec", value_name = "PATH")]
    pub spec: PathBuf,

    /// Dataset fields (JSON array).
    #[arg(long = "fields", value_name = "PATH")]
    pub fields: PathBuf,

    /// Tokenized spec output (default: stdout).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Template usermeta output.
    #[arg(long = "usermeta", value_name = "PATH")]
    pub usermeta: Option<PathBuf>,

    /// Tracked registry output.
    #[arg(long = "tracked", value_name = "PATH")]
    pub tracked: Option<PathBuf>,

    /// Template name.
    #[arg(long = "name", default_value = "Untitled template")]
    pub name: String,

    #[arg(long = "description", default_value = "")]
    pub description: String,

    #[arg(long = "author", default_value = "")]
    pub author: String,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Template usermeta file.
    #[arg(long = "usermeta", value_name = "PATH")]
    pub usermeta: PathBuf,

    /// Fields of the dataset the template is applied to.
    #[arg(long = "fields", value_name = "PATH")]
    pub fields: PathBuf,

    /// Write the usermeta with suggestions applied.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Minimum confidence (overrides the config file).
    #[arg(long = "min-confidence", value_name = "SCORE")]
    pub min_confidence: Option<f32>,
}

#[derive(Args)]
pub struct RemapArgs {
    /// Tokenized specification file.
    #[arg(long = "spec", value_name = "PATH")]
    pub spec: PathBuf,

    /// Template usermeta with assignments.
    #[arg(long = "assignments", alias = "usermeta", value_name = "PATH")]
    pub assignments: PathBuf,

    /// Fields of the dataset the template is applied to.
    #[arg(long = "fields", value_name = "PATH")]
    pub fields: PathBuf,

    /// Registry the spec was tracked with, when it is not tokenized yet.
    #[arg(long = "tracked", value_name = "PATH")]
    pub tracked: Option<PathBuf>,

    /// Remapped spec output (default: stdout).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// A drill hierarchy is bound in the host.
    #[arg(long = "drilldown")]
    pub drilldown: bool,

    /// Where jobs run.
    #[arg(long = "worker", value_enum, default_value = "inline")]
    pub worker: WorkerArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum WorkerArg {
    Inline,
    Blocking,
    Thread,
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
