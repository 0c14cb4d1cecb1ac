//! Cluster-wide usage collection
//!
//! Walks every namespace and pod through a [`CommandRunner`] and gathers
//! the results into a [`NamespaceAggregate`]. Concurrency is bounded by
//! the number of cluster CLI processes allowed to run at once.
//!
//! [`CommandRunner`]: crate::command::CommandRunner
//! [`NamespaceAggregate`]: crate::aggregate::NamespaceAggregate

mod orchestrator;


pub use orchestrator::{CollectionConfig, Collector};
