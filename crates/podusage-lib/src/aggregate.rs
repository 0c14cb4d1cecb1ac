//! Shared per-namespace aggregate of pod metrics
//!
//! Workers append concurrently; the map is only ever touched inside
//! [`NamespaceAggregate::append`] and [`NamespaceAggregate::snapshot`].

use crate::models::PodMetric;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Map from namespace to the pods collected in it
#[derive(Debug, Default)]
pub struct NamespaceAggregate {
    pods: Mutex<HashMap<String, Vec<PodMetric>>>,
}

impl NamespaceAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking appender cannot leave a half-written Vec behind, so a
    // poisoned lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<PodMetric>>> {
        self.pods.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `metric` under `namespace`, creating the entry if absent
    pub fn append(&self, namespace: &str, metric: PodMetric) {
        trace!(namespace = %namespace, pod = %metric.pod_name, "Appending pod metric");
        self.lock()
            .entry(namespace.to_string())
            .or_default()
            .push(metric);
    }

    /// Copy of the current contents, namespaces sorted by name
    pub fn snapshot(&self) -> BTreeMap<String, Vec<PodMetric>> {
        self.lock()
            .iter()
            .map(|(ns, pods)| (ns.clone(), pods.clone()))
            .collect()
    }
}
