use std::sync::{Arc, LazyLock};

use crate::error::{ErrorReporter, LogReporter, ResultReportExt};
use crate::metrics::{
    MetricDescriptor, MetricSample, MetricSink, StabilityLevel, StableCollector, ValueKind,
};
use crate::stats::{ContainerStats, ContainerStatsSource, StatsFilter};

/// Value exported for label pairs that carry no number of their own.
pub const PRESENT: f64 = 1.0;

static PASSTHROUGH_METRIC: LazyLock<MetricDescriptor> = LazyLock::new(|| {
    MetricDescriptor::new(
        "container_passthrough_metric",
        "Label pairs the container runtime attaches to a container.",
        &["label_key", "label_value"],
        StabilityLevel::Alpha,
    )
});

/// Exports the label pair a runtime attaches to each container.
pub struct ContainerMetricsCollector {
    source: Arc<dyn ContainerStatsSource>,
    reporter: Arc<dyn ErrorReporter>,
}

impl ContainerMetricsCollector {
    pub fn new(source: Arc<dyn ContainerStatsSource>) -> Self {
        Self::with_reporter(source, Arc::new(LogReporter))
    }

    pub fn with_reporter(
        source: Arc<dyn ContainerStatsSource>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self { source, reporter }
    }
}

impl StableCollector for ContainerMetricsCollector {
    fn describe(&self, out: &mut Vec<&'static MetricDescriptor>) {
        out.push(&PASSTHROUGH_METRIC);
    }

    fn collect(&self, sink: &mut dyn MetricSink) {
        let Some(stats) = self
            .source
            .list_container_stats(&StatsFilter::default())
            .ok_report(self.reporter.as_ref(), "failed to get container stats")
        else {
            return;
        };

        stats
            .iter()
            .filter_map(passthrough_metric)
            .for_each(|sample| sink.emit(sample));
    }
}

/// The attached label pair, valued with the source's number or [`PRESENT`].
pub fn passthrough_metric(stats: &ContainerStats) -> Option<MetricSample> {
    let metric = stats.metric.as_ref()?;
    Some(MetricSample::new(
        &PASSTHROUGH_METRIC,
        ValueKind::Gauge,
        metric.value.unwrap_or(PRESENT),
        vec![metric.label.name.clone(), metric.label.value.clone()],
    ))
}
