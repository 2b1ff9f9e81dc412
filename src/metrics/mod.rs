//! Metric families, samples and the describe/collect protocol.
//!
//! - [`MetricDescriptor`] is the immutable schema of a family.
//! - [`MetricSample`] is one observation produced during a scrape.
//! - [`StableCollector`] is implemented by everything that exports samples.
//! - [`Registry`] gathers all registered collectors into [`MetricFamily`]s.
mod collector;
mod desc;
mod registry;
mod sample;

pub use collector::StableCollector;
pub use desc::{MetricDescriptor, StabilityLevel, is_valid_label_name, is_valid_metric_name};
pub use registry::{MetricFamily, Registry, RegistryError};
pub use sample::{MetricSample, MetricSink, ValueKind};
