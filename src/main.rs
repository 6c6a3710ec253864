// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::app_config::Config;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod fetch;
mod file_utils;
mod input_normalizer;
mod media_resolver;
mod publish;
mod sanitize;
mod subtitle;
mod timeline;
mod writer;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for coze2draft
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// coze2draft - Coze payload to JianYing draft generator
///
/// Reads one Coze JSON payload describing timed media (images, audio clips,
/// captions), downloads every referenced resource with a deterministic
/// fallback chain, and publishes a complete JianYing draft project into the
/// editor's watched draft directory in a single atomic move.
#[derive(Parser, Debug)]
#[command(name = "coze2draft")]
#[command(version = "1.0.0")]
#[command(about = "Coze payload to JianYing draft generator")]
#[command(long_about = "coze2draft assembles a JianYing draft project from a Coze workflow payload.

EXAMPLES:
    coze2draft payload.json                  # Build a draft from a payload file
    cat payload.json | coze2draft            # Read the payload from stdin
    coze2draft --log-level debug payload.json
    coze2draft completions zsh > _coze2draft # Generate zsh completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config. If the config file doesn't exist,
    a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Payload file to read; stdin is read to completion when omitted
    #[arg(value_name = "INPUT_FILE")]
    input_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Override the editor's watched draft root directory
    #[arg(long)]
    draft_root: Option<PathBuf>,

    /// Override the draft template directory
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// Override the staging root directory
    #[arg(long)]
    staging_root: Option<PathBuf>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code and marker for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "✗ "),
            Level::Warn => ("\x1B[1;33m", "! "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "· "),
            Level::Trace => ("\x1B[1;35m", "· "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {}{}\x1B[0m",
                color,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "coze2draft", &mut std::io::stdout());
        return Ok(());
    }

    run_draft(cli).await
}

async fn run_draft(options: CommandLineOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(to_level_filter(&cmd_log_level.clone().into()));
    }

    // Load or create configuration
    let mut config = Config::from_file_or_default(&options.config_path)?;

    // Command line overrides
    if let Some(level) = options.log_level {
        config.log_level = level.into();
    }
    if let Some(root) = options.draft_root {
        config.paths.draft_root = Some(root);
    }
    if let Some(dir) = options.template_dir {
        config.paths.template_dir = Some(dir);
    }
    if let Some(root) = options.staging_root {
        config.paths.staging_root = Some(root);
    }

    log::set_max_level(to_level_filter(&config.log_level));

    let raw = match &options.input_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file: {:?}", path))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read payload from stdin")?;
            buffer
        }
    };

    let controller = Controller::with_config(config)?;
    let final_path = controller.run(&raw).await?;

    println!("{}", final_path.display());
    Ok(())
}

fn to_level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}
