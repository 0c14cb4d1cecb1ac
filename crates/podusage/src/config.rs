//! Collector configuration

use anyhow::{Context, Result};
use podusage_lib::{CollectionConfig, LogFormat, ReportFormat, RunSettings};
use serde::Deserialize;
use std::path::PathBuf;

/// Collector configuration, read from `POD_USAGE_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Cluster CLI binary
    #[serde(default = "default_kubectl_path")]
    pub kubectl_path: PathBuf,

    /// Report format: `csv` or `text`
    #[serde(default)]
    pub output_format: ReportFormat,

    /// Directory the report is written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of cluster CLI processes running at once
    #[serde(default = "default_max_concurrent_commands")]
    pub max_concurrent_commands: usize,

    /// Print the collected aggregate to stdout
    #[serde(default = "default_print_summary")]
    pub print_summary: bool,

    /// Log line format: `json` or `text`
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_kubectl_path() -> PathBuf {
    PathBuf::from("kubectl")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_concurrent_commands() -> usize {
    16
}

fn default_print_summary() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("POD_USAGE").try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid POD_USAGE_* configuration")
    }

    /// Settings for the library run
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            collection: CollectionConfig::default()
                .with_max_concurrent_commands(self.max_concurrent_commands),
            format: self.output_format,
            output_dir: self.output_dir.clone(),
            print_summary: self.print_summary,
        }
    }
}
