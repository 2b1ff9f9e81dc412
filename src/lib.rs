//! Container Stats Exporter: translates point-in-time container and pod
//! resource statistics into metric samples, collected on every scrape.
//!
//! Stats are pulled from [`stats::ContainerStatsSource`] and
//! [`stats::PodStatsSource`] implementations by the collectors in
//! [`collectors`], gathered by a [`metrics::Registry`] and served in the
//! Prometheus text format by the [`api`] server.
use std::sync::Arc;

pub mod api;
pub mod cgroup;
pub mod collectors;
pub mod config;
pub mod container;
pub mod encode;
pub mod error;
pub mod fsutil;
pub mod metrics;
pub mod podlogs;
pub mod stats;

/// Builds the registry served by the exporter, backed by the cgroup and pod
/// log sources configured in `config`.
///
/// Cgroups carry no pass-through label pairs, so
/// [`collectors::ContainerMetricsCollector`] is left to embedders whose
/// source provides them.
///
/// # Errors
///
/// Fails only if two collectors describe the same metric family.
pub fn build_registry(config: &config::Config) -> Result<metrics::Registry, metrics::RegistryError> {
    register_collectors(
        Arc::new(cgroup::CgroupStatsSource::new(&config.cgroup_root)),
        Arc::new(podlogs::PodLogStatsSource::new(&config.pod_log_dir)),
    )
}

/// Each source backs exactly one collector, so a scrape queries it once.
fn register_collectors(
    container_stats: Arc<dyn stats::ContainerStatsSource>,
    pod_stats: Arc<dyn stats::PodStatsSource>,
) -> Result<metrics::Registry, metrics::RegistryError> {
    let mut registry = metrics::Registry::new();
    registry.register(collectors::ContainerCpuCollector::new(container_stats))?;
    registry.register(collectors::LogMetricsCollector::new(pod_stats))?;
    Ok(registry)
}

/// Runs the exporter.
///
/// Reads the configuration from the environment, registers all collectors
/// and serves them over HTTP until the server fails.
///
/// # Errors
///
/// Possible errors include:
/// - An invalid `LISTEN_ADDR`.
/// - Failure to bind the listen address.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;
    log::debug!("Configuration: {:?}", config);

    if !config.cgroup_root.is_dir() {
        log::warn!(
            "cgroup root `{}` is not a directory, container cpu metrics will be missing",
            config.cgroup_root.display()
        );
    }
    if !config.pod_log_dir.is_dir() {
        log::warn!(
            "pod log directory `{}` is not a directory, log metrics will be missing",
            config.pod_log_dir.display()
        );
    }

    let registry = Arc::new(build_registry(&config)?);
    for desc in registry.describe_all() {
        log::debug!("Exporting {} ({})", desc.name(), desc.stability());
    }

    api::APIServer::new(registry)
        .listen(config.listen_addr)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::stats::{ContainerStats, ContainerStatsSource, PodStats, StatsFilter};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl ContainerStatsSource for CountingSource {
        fn list_container_stats(&self, _filter: &StatsFilter) -> stats::Result<Vec<ContainerStats>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_scrape_queries_container_source_once() {
        let source = Arc::new(CountingSource::default());
        let registry = register_collectors(
            Arc::clone(&source) as Arc<dyn ContainerStatsSource>,
            Arc::new(|| -> stats::Result<Vec<PodStats>> { Ok(Vec::new()) }),
        )
        .unwrap();

        registry.gather();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        registry.gather();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_build_registry_describes_all_families() {
        let config = config::Config::from_lookup(|_| None).unwrap();
        let registry = build_registry(&config).unwrap();
        let names: Vec<&str> = registry.describe_all().iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec![
                "container_cpu_usage_nano_cores",
                "container_cpu_usage_seconds_total",
                "kubelet_container_log_filesystem_used_bytes",
            ]
        );
    }

    #[test]
    fn test_gather_from_filesystem() {
        let cgroup = tempfile::tempdir().unwrap();
        std::fs::create_dir(cgroup.path().join("c1")).unwrap();
        std::fs::write(cgroup.path().join("c1/cpu.stat"), "usage_usec 2000000\n").unwrap();

        let logs = tempfile::tempdir().unwrap();
        let container_logs = logs.path().join("default_web_uid-1/nginx");
        std::fs::create_dir_all(&container_logs).unwrap();
        std::fs::write(container_logs.join("0.log"), vec![b'x'; 64]).unwrap();

        let config = config::Config::from_lookup(|key| match key {
            "CGROUP_ROOT" => Some(cgroup.path().display().to_string()),
            "POD_LOG_DIR" => Some(logs.path().display().to_string()),
            _ => None,
        })
        .unwrap();
        let registry = build_registry(&config).unwrap();

        let text = encode::text::render(&registry.gather());
        assert!(text.contains("container_cpu_usage_seconds_total{container=\"c1\"} 2\n"));
        assert!(text.contains(
            "kubelet_container_log_filesystem_used_bytes{uid=\"uid-1\",namespace=\"default\",pod=\"web\",container=\"nginx\"} 64\n"
        ));
        assert!(!text.contains("container_cpu_usage_nano_cores{"));
    }
}
