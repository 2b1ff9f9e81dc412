use super::{MetricDescriptor, MetricSink};

/// The two-phase export protocol.
///
/// `describe` lists every family the collector may ever emit, regardless of
/// whether data is currently available, and must not touch any stats source.
/// `collect` performs one collection pass and emits samples that only
/// reference described families. Neither call may fail: problems during a
/// pass are reported and yield fewer samples.
pub trait StableCollector: Send + Sync {
    fn describe(&self, out: &mut Vec<&'static MetricDescriptor>);

    fn collect(&self, sink: &mut dyn MetricSink);
}
