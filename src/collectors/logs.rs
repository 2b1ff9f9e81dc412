use std::sync::{Arc, LazyLock};

use crate::container::PodReference;
use crate::error::{ErrorReporter, LogReporter, ResultReportExt};
use crate::metrics::{
    MetricDescriptor, MetricSample, MetricSink, StabilityLevel, StableCollector, ValueKind,
};
use crate::stats::{PodContainerStats, PodStatsSource};

static LOG_FILESYSTEM_USED_BYTES: LazyLock<MetricDescriptor> = LazyLock::new(|| {
    MetricDescriptor::new(
        "kubelet_container_log_filesystem_used_bytes",
        "Bytes used by the container's logs on the filesystem.",
        &["uid", "namespace", "pod", "container"],
        StabilityLevel::Alpha,
    )
});

/// Exports the log volume size of every container of every pod.
pub struct LogMetricsCollector {
    source: Arc<dyn PodStatsSource>,
    reporter: Arc<dyn ErrorReporter>,
}

impl LogMetricsCollector {
    pub fn new(source: Arc<dyn PodStatsSource>) -> Self {
        Self::with_reporter(source, Arc::new(LogReporter))
    }

    pub fn with_reporter(source: Arc<dyn PodStatsSource>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self { source, reporter }
    }
}

impl StableCollector for LogMetricsCollector {
    fn describe(&self, out: &mut Vec<&'static MetricDescriptor>) {
        out.push(&LOG_FILESYSTEM_USED_BYTES);
    }

    fn collect(&self, sink: &mut dyn MetricSink) {
        let Some(pods) = self
            .source
            .list_pod_stats()
            .ok_report(self.reporter.as_ref(), "failed to get pod stats")
        else {
            return;
        };

        for pod in &pods {
            for container in &pod.containers {
                if let Some(sample) = log_used_bytes(&pod.pod_ref, container) {
                    sink.emit(sample);
                }
            }
        }
    }
}

pub fn log_used_bytes(pod: &PodReference, container: &PodContainerStats) -> Option<MetricSample> {
    let used_bytes = container.logs?.used_bytes?;
    Some(MetricSample::new(
        &LOG_FILESYSTEM_USED_BYTES,
        ValueKind::Gauge,
        used_bytes as f64,
        vec![
            pod.uid.clone(),
            pod.namespace.clone(),
            pod.name.clone(),
            container.name.clone(),
        ],
    ))
}
