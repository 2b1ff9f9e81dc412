//! Collectors translating container and pod stats into metric samples.
//!
//! Each collector queries its source once per pass with the default filter.
//! If the query fails the failure is reported and the pass yields no samples;
//! otherwise every extraction rule runs independently for every record, so a
//! record lacking one sub-record still produces the families it has data for.
mod cpu;
mod logs;
mod passthrough;

pub use cpu::{ContainerCpuCollector, cpu_usage_nano_cores, cpu_usage_seconds};
pub use logs::{LogMetricsCollector, log_used_bytes};
pub use passthrough::{ContainerMetricsCollector, PRESENT, passthrough_metric};
