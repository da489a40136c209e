// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use gpxmerge::app_config::{self, Config};
use gpxmerge::file_utils::FileManager;
use gpxmerge::{Controller, MergeError};

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
    /// Generate shell completions for gpxmerge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// gpxmerge - merge GPX files in chronological order
///
/// Combines the track points and waypoints of several GPX files into a single
/// track, sorted by timestamp.
#[derive(Parser, Debug)]
#[command(name = "gpxmerge")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "Merge multiple GPX files in chronological order based on timestamps")]
#[command(long_about = "gpxmerge collects every timestamped track point and waypoint from the given
GPX files and writes them, ordered by time, into one track of a new GPX file.

EXAMPLES:
    gpxmerge track1.gpx track2.gpx -o merged.gpx
    gpxmerge '*.gpx' -o combined_track.gpx
    gpxmerge recordings/ --log-level debug
    gpxmerge completions bash > gpxmerge.bash

Points without a timestamp, or with one that cannot be parsed, are skipped.
The run fails if no input file is found, if an input is not well-formed XML,
or if no usable point remains.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// GPX files, directories or wildcard patterns to merge
    #[arg(value_name = "INPUT_FILES")]
    input_files: Vec<String>,

    /// Output GPX file (default: merged.gpx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path, created with defaults if missing
    #[arg(short, long)]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom stderr logger, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and label for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is adjusted after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "gpxmerge", &mut std::io::stdout());
            Ok(())
        }
        None => run_merge(cli),
    }
}

fn run_merge(options: CommandLineOptions) -> Result<()> {
    // A command line level applies before the config is even read
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = match &options.config_path {
        Some(path) => Config::load_or_create(path)?,
        None => Config::default(),
    };

    match &options.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    if options.input_files.is_empty() {
        return Err(anyhow!("At least one input file is required"));
    }

    let input_files = FileManager::resolve_inputs(&options.input_files)
        .context("Failed to resolve input files")?;

    if input_files.is_empty() {
        return Err(MergeError::NoInputFiles.into());
    }

    info!("Found {} GPX file(s) to merge:", input_files.len());
    for file in &input_files {
        info!("  - {}", file.display());
    }

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.default_output_file));

    let controller = Controller::with_config(config)
        .context("Configuration validation failed")?;

    let summary = controller.run(&input_files, &output)?;
    println!("{}", summary);

    Ok(())
}
