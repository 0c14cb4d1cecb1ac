//! Pod usage collection library
//!
//! This crate provides the pieces of a cluster-wide CPU/memory snapshot:
//! - Cluster CLI execution behind a mockable trait
//! - Parsing of PodMetrics output
//! - Concurrent fan-out over namespaces and pods into a shared aggregate
//! - CSV and plain-text reports

pub mod aggregate;
pub mod collector;
pub mod command;
pub mod error;
pub mod models;
pub mod observability;
pub mod parser;
pub mod pipeline;
pub mod report;

pub use aggregate::NamespaceAggregate;
pub use collector::{CollectionConfig, Collector};
pub use command::{CommandRunner, KubectlCommand, KubectlRunner};
pub use error::{CollectError, CommandError, ParseError, ReportError, RunError};
pub use models::*;
pub use observability::{init_tracing, CollectionLogger, LogFormat};
pub use pipeline::{run, RunSettings, RunSummary};
pub use report::ReportFormat;
