//! Report output
//!
//! Writes a [`CollectionOutcome`] either as a hierarchical CSV
//! (namespace row, pod rows, indented container rows) or as an indented
//! plain-text block per pod appended to a running log file.

use crate::error::ReportError;
use crate::models::{CollectionOutcome, SkippedUnit};
use serde::Deserialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// CSV header row
pub const CSV_HEADER: [&str; 5] = [
    "Namespace",
    "PodName",
    "ContainerName",
    "CPU Usage",
    "Memory Usage",
];

/// Placeholder for the columns a row leaves out
const BLANK: &str = " ";

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Hierarchical CSV, truncated on every run (default)
    #[default]
    Csv,
    /// Indented plain text, appended to on every run
    Text,
}

impl ReportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "cpu_mem_usage.csv",
            ReportFormat::Text => "cpu_mem_usage2.txt",
        }
    }
}

/// Write `outcome` into `dir` in the given format and return the file path
pub fn write_report(
    outcome: &CollectionOutcome,
    format: ReportFormat,
    dir: &Path,
) -> Result<PathBuf, ReportError> {
    let path = dir.join(format.file_name());
    let io_err = |source| ReportError::Io {
        path: path.clone(),
        source,
    };

    match format {
        ReportFormat::Csv => {
            let file = File::create(&path).map_err(io_err)?;
            write_csv(outcome, file).map_err(|source| ReportError::Csv {
                path: path.clone(),
                source,
            })?;
        }
        ReportFormat::Text => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(io_err)?;
            let mut writer = BufWriter::new(file);
            write_text(outcome, &mut writer).map_err(io_err)?;
            writer.flush().map_err(io_err)?;
        }
    }

    Ok(path)
}

/// Write the CSV form of `outcome` to `writer`
pub fn write_csv<W: Write>(outcome: &CollectionOutcome, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;

    for (namespace, pods) in &outcome.snapshot {
        wtr.write_record([namespace.as_str()])?;

        for pod in pods {
            wtr.write_record([
                BLANK,
                pod.pod_name.as_str(),
                BLANK,
                pod.total_cpu.as_str(),
                pod.total_memory.as_str(),
            ])?;

            for container in &pod.containers {
                wtr.write_record([
                    BLANK,
                    BLANK,
                    container.name.as_str(),
                    container.cpu.as_str(),
                    container.memory.as_str(),
                ])?;
            }
        }
    }

    if !outcome.skipped.is_empty() {
        let count = outcome.skipped.len().to_string();
        wtr.write_record(["Skipped units", count.as_str()])?;
        for unit in &outcome.skipped {
            wtr.write_record([
                BLANK,
                unit.namespace.as_str(),
                unit.pod.as_deref().unwrap_or(""),
                unit.stage.as_str(),
                unit.reason.trim(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Write the plain-text form of `outcome` to `writer`
pub fn write_text<W: Write>(outcome: &CollectionOutcome, writer: &mut W) -> io::Result<()> {
    writeln!(
        writer,
        "CPU and memory usage collected at {}",
        outcome.started_at.to_rfc3339()
    )?;

    for (namespace, pods) in &outcome.snapshot {
        for pod in pods {
            writeln!(writer, "Namespace: {}  Pod: {}", namespace, pod.pod_name)?;
            for container in &pod.containers {
                writeln!(
                    writer,
                    "    Container: {}  CPU: {}  Memory: {}",
                    container.name, container.cpu, container.memory
                )?;
            }
            writeln!(
                writer,
                "    Total  CPU: {}  Memory: {}",
                pod.total_cpu, pod.total_memory
            )?;
            writeln!(writer)?;
        }
    }

    writeln!(writer, "Skipped units: {}", outcome.skipped.len())?;
    for unit in &outcome.skipped {
        writeln!(writer, "    {}", describe_skip(unit))?;
    }
    writeln!(writer)?;

    Ok(())
}

fn describe_skip(unit: &SkippedUnit) -> String {
    let target = match &unit.pod {
        Some(pod) => format!("{}/{}", unit.namespace, pod),
        None => unit.namespace.clone(),
    };
    format!("{} [{}]: {}", target, unit.stage, unit.reason.trim())
}
