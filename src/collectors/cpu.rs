use std::sync::{Arc, LazyLock};

use crate::error::{ErrorReporter, LogReporter, ResultReportExt};
use crate::metrics::{
    MetricDescriptor, MetricSample, MetricSink, StabilityLevel, StableCollector, ValueKind,
};
use crate::stats::{ContainerStats, ContainerStatsSource, StatsFilter};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

static CPU_USAGE_SECONDS: LazyLock<MetricDescriptor> = LazyLock::new(|| {
    MetricDescriptor::new(
        "container_cpu_usage_seconds_total",
        "Cumulative cpu time consumed by the container in core-seconds.",
        &["container"],
        StabilityLevel::Alpha,
    )
});

static CPU_USAGE_NANO_CORES: LazyLock<MetricDescriptor> = LazyLock::new(|| {
    MetricDescriptor::new(
        "container_cpu_usage_nano_cores",
        "Cpu usage rate of the container in nano-cores.",
        &["container"],
        StabilityLevel::Alpha,
    )
});

/// Exports cumulative cpu time and the current cpu rate of every container.
pub struct ContainerCpuCollector {
    source: Arc<dyn ContainerStatsSource>,
    reporter: Arc<dyn ErrorReporter>,
}

impl ContainerCpuCollector {
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

impl StableCollector for ContainerCpuCollector {
    fn describe(&self, out: &mut Vec<&'static MetricDescriptor>) {
        out.push(&CPU_USAGE_SECONDS);
        out.push(&CPU_USAGE_NANO_CORES);
    }

    fn collect(&self, sink: &mut dyn MetricSink) {
        let Some(stats) = self
            .source
            .list_container_stats(&StatsFilter::default())
            .ok_report(self.reporter.as_ref(), "failed to get container stats")
        else {
            return;
        };

        for container in &stats {
            if let Some(sample) = cpu_usage_seconds(container) {
                sink.emit(sample);
            }
            if let Some(sample) = cpu_usage_nano_cores(container) {
                sink.emit(sample);
            }
        }
    }
}

/// Cumulative cpu time, converted from nanoseconds to seconds.
pub fn cpu_usage_seconds(stats: &ContainerStats) -> Option<MetricSample> {
    let nanos = stats.cpu?.usage_core_nano_seconds?;
    Some(MetricSample::new(
        &CPU_USAGE_SECONDS,
        ValueKind::Counter,
        nanos as f64 / NANOS_PER_SECOND,
        vec![stats.id.to_string()],
    ))
}

/// Instantaneous cpu rate, exported unconverted.
pub fn cpu_usage_nano_cores(stats: &ContainerStats) -> Option<MetricSample> {
    let nano_cores = stats.cpu?.usage_nano_cores?;
    Some(MetricSample::new(
        &CPU_USAGE_NANO_CORES,
        ValueKind::Counter,
        nano_cores as f64,
        vec![stats.id.to_string()],
    ))
}
