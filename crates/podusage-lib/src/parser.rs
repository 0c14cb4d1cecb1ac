//! Parsing of cluster CLI output
//!
//! Three shapes are handled:
//! - name listings (`custom-columns=:metadata.name`), one name per line
//! - the PodMetrics YAML document with per-container usage
//! - the `--no-headers` PodMetrics row with pod totals

use crate::error::ParseError;
use crate::models::ContainerMetric;
use serde::{Deserialize, Deserializer};

/// Subset of the PodMetrics resource the collector reads.
/// Everything else in the document is ignored.
#[derive(Debug, Default, Deserialize)]
struct PodMetricsDocument {
    #[serde(default)]
    containers: Vec<ContainerEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ContainerEntry {
    #[serde(default, deserialize_with = "scalar_string")]
    name: String,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default, deserialize_with = "scalar_string")]
    cpu: String,
    #[serde(default, deserialize_with = "scalar_string")]
    memory: String,
}

/// Accept any YAML scalar as text; `cpu: 0` is emitted unquoted by some servers
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a scalar, found {other:?}"
        ))),
    }
}

/// Extract per-container usage from a PodMetrics YAML document
pub fn parse_pod_metrics(document: &str) -> Result<Vec<ContainerMetric>, ParseError> {
    let doc: PodMetricsDocument = serde_yaml::from_str(document)?;

    Ok(doc
        .containers
        .into_iter()
        .map(|c| ContainerMetric {
            name: c.name,
            cpu: c.usage.cpu,
            memory: c.usage.memory,
        })
        .collect())
}

/// Split a table row into columns separated by two or more spaces
pub fn split_columns(line: &str) -> Vec<&str> {
    line.split("  ")
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect()
}

/// Parse a `NAME  CPU  MEMORY  WINDOW` row into `(cpu, memory)`
///
/// Only the first non-blank line of `output` is considered.
pub fn parse_summary_line(output: &str) -> Result<(String, String), ParseError> {
    let line = output
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();

    let fields = split_columns(line);
    match fields.as_slice() {
        [_, cpu, memory, ..] => Ok((cpu.to_string(), memory.to_string())),
        _ => Err(ParseError::MalformedRow {
            line: line.to_string(),
            fields: fields.len(),
        }),
    }
}

/// Names from a header-less single-column listing, blank lines dropped
pub fn parse_name_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POD_METRICS_YAML: &str = r#"apiVersion: metrics.k8s.io/v1beta1
containers:
- name: main
  usage:
    cpu: 5m
    memory: 10Mi
- name: istio-proxy
  usage:
    cpu: 2043n
    memory: 48152Ki
kind: PodMetrics
metadata:
  creationTimestamp: "2023-04-11T09:12:41Z"
  labels:
    app: build-service
  name: pod-a
  namespace: build-service
timestamp: "2023-04-11T09:12:30Z"
window: 15.018s
"#;

    #[test]
    fn test_parse_pod_metrics() {
        let containers = parse_pod_metrics(POD_METRICS_YAML).unwrap();

        assert_eq!(containers.len(), 2);
        assert_eq!(
            containers[0],
            ContainerMetric {
                name: "main".to_string(),
                cpu: "5m".to_string(),
                memory: "10Mi".to_string(),
            }
        );
        assert_eq!(containers[1].name, "istio-proxy");
        assert_eq!(containers[1].cpu, "2043n");
        assert_eq!(containers[1].memory, "48152Ki");
    }

    #[test]
    fn test_parse_pod_metrics_numeric_scalars() {
        let doc = "containers:\n- name: idle\n  usage:\n    cpu: 0\n    memory: 0\n";
        let containers = parse_pod_metrics(doc).unwrap();
        assert_eq!(containers[0].cpu, "0");
        assert_eq!(containers[0].memory, "0");
    }

    #[test]
    fn test_parse_pod_metrics_missing_fields_default_empty() {
        let doc = "kind: PodMetrics\ncontainers:\n- name: sidecar\n";
        let containers = parse_pod_metrics(doc).unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].cpu, "");

        let no_containers = parse_pod_metrics("kind: PodMetrics\n").unwrap();
        assert!(no_containers.is_empty());
    }

    #[test]
    fn test_parse_pod_metrics_malformed() {
        let result = parse_pod_metrics("containers: [name: {");
        assert!(matches!(result, Err(ParseError::Document(_))));

        let wrong_shape = parse_pod_metrics("containers: not-a-list\n");
        assert!(wrong_shape.is_err());
    }

    #[test]
    fn test_parse_summary_line() {
        let (cpu, mem) = parse_summary_line("pod-a   5m           10Mi            15s\n").unwrap();
        assert_eq!(cpu, "5m");
        assert_eq!(mem, "10Mi");
    }

    #[test]
    fn test_parse_summary_line_odd_spacing() {
        // Runs of three spaces leave a leading space after splitting on pairs
        let (cpu, mem) = parse_summary_line("pod-a     12m   340Mi").unwrap();
        assert_eq!(cpu, "12m");
        assert_eq!(mem, "340Mi");
    }

    #[test]
    fn test_parse_summary_line_too_few_fields() {
        match parse_summary_line("pod-a  5m\n") {
            Err(ParseError::MalformedRow { fields, .. }) => assert_eq!(fields, 2),
            other => panic!("expected malformed row, got {other:?}"),
        }

        // Single spaces do not separate columns
        assert!(parse_summary_line("pod-a 5m 10Mi").is_err());
        assert!(parse_summary_line("").is_err());
        assert!(parse_summary_line("\n\n").is_err());
    }

    #[test]
    fn test_parse_name_list_filters_blank_lines() {
        let names = parse_name_list("default\nkube-system\n\n  \nbuild-service\n");
        assert_eq!(names, vec!["default", "kube-system", "build-service"]);

        assert!(parse_name_list("").is_empty());
        assert!(parse_name_list("\n").is_empty());
    }

    #[test]
    fn test_parse_name_list_keeps_duplicates() {
        let names = parse_name_list("a\na\n");
        assert_eq!(names, vec!["a", "a"]);
    }
}
