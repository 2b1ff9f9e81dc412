//! Point-in-time container and pod statistics, and the traits that provide them.
//!
//! Every sub-record is optional. A missing record means "no data for this
//! pass" and is never treated as an error by consumers.
use std::path::PathBuf;

use crate::container::{ContainerID, PodReference};

/// Snapshot of one container's resource usage.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerStats {
    pub id: ContainerID,
    pub cpu: Option<CpuUsage>,
    pub metric: Option<PassthroughMetric>,
}

impl ContainerStats {
    pub fn new(id: ContainerID) -> Self {
        Self {
            id,
            cpu: None,
            metric: None,
        }
    }

    pub fn with_cpu(mut self, cpu: CpuUsage) -> Self {
        self.cpu = Some(cpu);
        self
    }

    pub fn with_metric(mut self, metric: PassthroughMetric) -> Self {
        self.metric = Some(metric);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuUsage {
    /// Cumulative cpu time consumed, in nanoseconds.
    pub usage_core_nano_seconds: Option<u64>,
    /// Cpu usage rate averaged over the last sampling window, in nano-cores.
    pub usage_nano_cores: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPair {
    pub name: String,
    pub value: String,
}

/// A label pair a runtime attaches to a container for pass-through export.
#[derive(Debug, Clone, PartialEq)]
pub struct PassthroughMetric {
    pub label: LabelPair,
    pub value: Option<f64>,
}

/// Snapshot of one pod's containers.
#[derive(Debug, Clone, PartialEq)]
pub struct PodStats {
    pub pod_ref: PodReference,
    pub containers: Vec<PodContainerStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PodContainerStats {
    pub name: String,
    pub logs: Option<FsStats>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsStats {
    pub used_bytes: Option<u64>,
}

/// Restricts which containers a query returns. The default matches all containers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsFilter {
    /// Only the container with this id.
    pub id: Option<String>,
}

impl StatsFilter {
    pub fn matches_id(&self, id: &ContainerID) -> bool {
        self.id.as_deref().is_none_or(|wanted| wanted == id.as_ref())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("stats source unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// Provides container stats. Calls may block.
pub trait ContainerStatsSource: Send + Sync {
    fn list_container_stats(&self, filter: &StatsFilter) -> Result<Vec<ContainerStats>>;
}

/// Provides pod-level stats. Calls may block.
pub trait PodStatsSource: Send + Sync {
    fn list_pod_stats(&self) -> Result<Vec<PodStats>>;
}

impl<F> PodStatsSource for F
where
    F: Fn() -> Result<Vec<PodStats>> + Send + Sync,
{
    fn list_pod_stats(&self) -> Result<Vec<PodStats>> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_matches_everything() {
        let id = ContainerID::new("c1").unwrap();
        assert!(StatsFilter::default().matches_id(&id));
    }

    #[test]
    fn test_filter_by_id() {
        let filter = StatsFilter {
            id: Some("c1".to_owned()),
        };
        assert!(filter.matches_id(&ContainerID::new("c1").unwrap()));
        assert!(!filter.matches_id(&ContainerID::new("c2").unwrap()));
    }

    #[test]
    fn test_closure_is_pod_stats_source() {
        let source = || -> Result<Vec<PodStats>> { Err(SourceError::Unavailable("down".into())) };
        let err = source.list_pod_stats().unwrap_err();
        assert_eq!(err.to_string(), "stats source unavailable: down");
    }
}
