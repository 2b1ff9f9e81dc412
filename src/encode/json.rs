use std::collections::BTreeMap;

use crate::metrics::{MetricDescriptor, MetricFamily, ValueKind};

#[derive(Debug, serde::Serialize)]
struct JsonFamily<'a> {
    #[serde(flatten)]
    descriptor: &'a MetricDescriptor,
    kind: ValueKind,
    samples: Vec<JsonSample<'a>>,
}

#[derive(Debug, serde::Serialize)]
struct JsonSample<'a> {
    labels: BTreeMap<&'a str, &'a str>,
    value: Option<f64>,
}

/// Renders families as a JSON array, one object per family.
///
/// Non-finite values are rendered as `null`.
pub fn render(families: &[MetricFamily]) -> serde_json::Value {
    let families = families
        .iter()
        .map(|family| JsonFamily {
            descriptor: family.descriptor,
            kind: family.kind,
            samples: family
                .samples
                .iter()
                .map(|sample| JsonSample {
                    labels: sample.labels().collect(),
                    value: Some(sample.value()).filter(|value| value.is_finite()),
                })
                .collect(),
        })
        .collect::<Vec<_>>();

    serde_json::to_value(families).unwrap_or_else(|err| {
        log::error!("failed to serialize metric families: {err}");
        serde_json::Value::Array(Vec::new())
    })
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use serde_json::json;

    use super::*;
    use crate::metrics::{MetricSample, StabilityLevel};

    static LOGS: LazyLock<MetricDescriptor> = LazyLock::new(|| {
        MetricDescriptor::new(
            "kubelet_container_log_filesystem_used_bytes",
            "Bytes used by the container's logs on the filesystem.",
            &["uid", "container"],
            StabilityLevel::Alpha,
        )
    });

    #[test]
    fn test_render_json() {
        let families = vec![MetricFamily {
            descriptor: &LOGS,
            kind: ValueKind::Gauge,
            samples: vec![MetricSample::new(
                &LOGS,
                ValueKind::Gauge,
                4096.0,
                vec!["uid-1".to_owned(), "nginx".to_owned()],
            )],
        }];

        assert_eq!(
            render(&families),
            json!([{
                "name": "kubelet_container_log_filesystem_used_bytes",
                "help": "Bytes used by the container's logs on the filesystem.",
                "label_names": ["uid", "container"],
                "stability": "ALPHA",
                "kind": "gauge",
                "samples": [{
                    "labels": {"uid": "uid-1", "container": "nginx"},
                    "value": 4096.0,
                }],
            }])
        );
    }
}
