//! Error types for collection and reporting

use std::path::PathBuf;
use thiserror::Error;

/// Failure invoking the cluster CLI
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started at all
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited non-zero
    #[error("`{command}` exited with code {exit_code}: {}", .stderr.trim())]
    Failed {
        command: String,
        exit_code: i32,
        stderr: String,
    },
}

/// Failure decoding cluster CLI output
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed PodMetrics document: {0}")]
    Document(#[from] serde_yaml::Error),

    #[error("malformed row {line:?}: expected at least 3 fields, found {fields}")]
    MalformedRow { line: String, fields: usize },
}

/// Fatal collection failure
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("failed to list namespaces: {0}")]
    NamespaceListing(#[source] CommandError),
}

/// Failure writing the report artifact
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV report {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Any error that aborts a run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
