use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::gpx::GPX_NAMESPACE;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Output document settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings for the synthesized output document.
///
/// The namespace is written once on the root element; copied points inherit it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    // @field: Default namespace of the output root
    #[serde(default = "default_namespace")]
    pub namespace: String,

    // @field: GPX version attribute
    #[serde(default = "default_version")]
    pub version: String,

    // @field: Creator attribute (generator identity)
    #[serde(default = "default_creator")]
    pub creator: String,

    // @field: Metadata name used when no input supplies one
    #[serde(default = "default_name")]
    pub default_name: String,

    // @field: Metadata description used when no input supplies one
    #[serde(default = "default_description")]
    pub default_description: String,

    // @field: Name of the combined track
    #[serde(default = "default_track_name")]
    pub track_name: String,

    // @field: Spaces per nesting level, 0 for compact output
    #[serde(default = "default_indent")]
    pub indent: usize,

    // @field: Output file used when none is given on the command line
    #[serde(default = "default_output_file")]
    pub default_output_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            version: default_version(),
            creator: default_creator(),
            default_name: default_name(),
            default_description: default_description(),
            track_name: default_track_name(),
            indent: default_indent(),
            default_output_file: default_output_file(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching `log` filter
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

const MAX_INDENT: usize = 8;

fn default_namespace() -> String {
    GPX_NAMESPACE.to_string()
}

fn default_version() -> String {
    "1.1".to_string()
}

fn default_creator() -> String {
    "gpxmerge".to_string()
}

fn default_name() -> String {
    "Merged GPX Track".to_string()
}

fn default_description() -> String {
    "Merged from multiple GPX files".to_string()
}

fn default_track_name() -> String {
    "Merged Track".to_string()
}

fn default_indent() -> usize {
    2
}

fn default_output_file() -> String {
    "merged.gpx".to_string()
}

impl Config {
    /// Load a configuration file, creating it with defaults when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let output = &self.output;

        if output.namespace.trim().is_empty() {
            return Err(anyhow!("Output namespace must not be empty"));
        }

        if output.version.trim().is_empty() {
            return Err(anyhow!("Output GPX version must not be empty"));
        }

        if output.creator.trim().is_empty() {
            return Err(anyhow!("Output creator must not be empty"));
        }

        if output.default_output_file.trim().is_empty() {
            return Err(anyhow!("Default output file must not be empty"));
        }

        if output.indent > MAX_INDENT {
            return Err(anyhow!(
                "Output indent {} is too large (maximum {})",
                output.indent, MAX_INDENT
            ));
        }

        Ok(())
    }
}
