//! vizmap CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;
use vizmap_cli::commands::{
    RemapOptions, SuggestOptions, TokenizeOptions, TrackOptions, WorkerMode, run_remap,
    run_suggest, run_tokenize, run_track,
};
use vizmap_cli::config::EngineConfig;
use vizmap_cli::logging::{LogConfig, LogFormat, init_logging};
use vizmap_cli::summary::{completeness_line, slots_table, suggestions_table, tracked_table};
use vizmap_model::TemplateInformation;

mod cli;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, WorkerArg};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let config = match EngineConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };
    let log_config = log_config_from_cli(&cli, &config);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli.command, &config) {
        Ok(code) => code,
        Err(error) => {
            tracing::error!("{error:#}");
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(command: Command, config: &EngineConfig) -> Result<i32> {
    match command {
        Command::Track(args) => {
            let response = run_track(&TrackOptions {
                spec: args.spec,
                fields: args.fields,
                previous: args.previous,
                reset: args.reset,
                has_drilldown: args.drilldown,
            })?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", tracked_table(&response.tracked_fields));
                if response.tracked_drilldown.is_current {
                    println!(
                        "drilldown referenced, mapping required: {}",
                        response.tracked_drilldown.is_mapping_required
                    );
                }
            }
            Ok(0)
        }
        Command::Tokenize(args) => {
            let writes_to_stdout = args.output.is_none();
            let result = run_tokenize(&TokenizeOptions {
                spec: args.spec,
                fields: args.fields,
                output: args.output,
                usermeta: args.usermeta,
                tracked: args.tracked,
                information: TemplateInformation {
                    name: args.name,
                    description: args.description,
                    author: args.author,
                    uuid: Some(uuid::Uuid::new_v4().to_string()),
                },
            })?;
            if !writes_to_stdout {
                println!("{}", slots_table(&result.usermeta.dataset));
            }
            Ok(0)
        }
        Command::Suggest(args) => {
            let result = run_suggest(&SuggestOptions {
                usermeta: args.usermeta,
                fields: args.fields,
                output: args.output,
                min_confidence: args
                    .min_confidence
                    .unwrap_or(config.suggest.min_confidence),
            })?;
            println!("{}", suggestions_table(&result));
            Ok(if result.unassigned_slots.is_empty() { 0 } else { 1 })
        }
        Command::Remap(args) => {
            let outcome = run_remap(
                &RemapOptions {
                    spec: args.spec,
                    usermeta: args.assignments,
                    fields: args.fields,
                    tracked: args.tracked,
                    output: args.output,
                    has_drilldown: args.drilldown,
                    worker: match args.worker {
                        WorkerArg::Inline => WorkerMode::Inline,
                        WorkerArg::Blocking => WorkerMode::Blocking,
                        WorkerArg::Thread => WorkerMode::Thread,
                    },
                },
                &config.worker,
            )?;
            eprintln!(
                "{}",
                completeness_line(&outcome.completeness, &outcome.tracked_drilldown)
            );
            Ok(if outcome.completeness.is_complete() { 0 } else { 1 })
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli, config: &EngineConfig) -> LogConfig {
    let mut log_config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    log_config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        log_config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    log_config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    log_config.log_file = cli.log_file.clone();
    log_config.log_data = cli.log_data || config.logging.log_data;
    log_config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    log_config
}
