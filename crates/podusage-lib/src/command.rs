//! Cluster CLI execution
//!
//! All cluster access goes through [`CommandRunner`]. The production
//! implementation shells out to `kubectl`; tests substitute canned output.

use crate::error::CommandError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument, trace};

/// Runs the cluster CLI with an argument vector and returns its stdout
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run with `args`, returning captured stdout verbatim on success
    async fn run(&self, args: &[String]) -> Result<String, CommandError>;
}

/// Argument vectors for the queries the collector issues
pub struct KubectlCommand;

impl KubectlCommand {
    /// All namespace names, one per line
    pub fn list_namespaces() -> Vec<String> {
        to_args(&["get", "ns", "--no-headers", "-o", "custom-columns=:metadata.name"])
    }

    /// All pod names in `namespace`, one per line
    pub fn list_pods(namespace: &str) -> Vec<String> {
        to_args(&[
            "get",
            "pods",
            "-n",
            namespace,
            "--no-headers",
            "-o",
            "custom-columns=:metadata.name",
        ])
    }

    /// Per-container PodMetrics document as YAML
    pub fn pod_metrics_yaml(pod: &str, namespace: &str) -> Vec<String> {
        to_args(&["get", "PodMetrics", pod, "-n", namespace, "-oyaml"])
    }

    /// Single-line pod total summary
    pub fn pod_metrics_summary(pod: &str, namespace: &str) -> Vec<String> {
        to_args(&["get", "PodMetrics", pod, "-n", namespace, "--no-headers"])
    }
}

fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// [`CommandRunner`] backed by a `kubectl` subprocess
#[derive(Debug, Clone)]
pub struct KubectlRunner {
    program: PathBuf,
}

impl Default for KubectlRunner {
    fn default() -> Self {
        Self {
            program: PathBuf::from("kubectl"),
        }
    }
}

impl KubectlRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific binary instead of `kubectl` from PATH
    pub fn with_path(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    fn command_string(&self, args: &[String]) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(args.iter().cloned());
        parts.join(" ")
    }
}

#[async_trait]
impl CommandRunner for KubectlRunner {
    #[instrument(skip(self, args), fields(command = %self.command_string(args)))]
    async fn run(&self, args: &[String]) -> Result<String, CommandError> {
        trace!("Spawning cluster CLI");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                command: self.command_string(args),
                source,
            })?;

        if !output.status.success() {
            let exit_code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            debug!(exit_code, stderr = %stderr.trim(), "Cluster CLI failed");
            return Err(CommandError::Failed {
                command: self.command_string(args),
                exit_code,
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
