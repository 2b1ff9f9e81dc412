use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::stats::{CpuStat, KeyValueStat};
use crate::container::ContainerID;
use crate::fsutil;
use crate::stats::{
    ContainerStats, ContainerStatsSource, CpuUsage, Result, SourceError, StatsFilter,
};

const CPU_STAT_FILE: &str = "cpu.stat";
/// Minimum age of the baseline reading before it is replaced.
const MIN_RATE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy)]
struct CpuReading {
    usage_nanos: u64,
    at: Instant,
}

/// Reads container cpu usage from a cgroup v2 hierarchy.
///
/// Every direct child directory of `root` whose name is a valid
/// [`ContainerID`] is treated as one container. The cpu rate is derived from
/// a baseline reading of the same container, so the first pass after a
/// container appears reports only cumulative usage. The baseline is kept for
/// at least [`MIN_RATE_WINDOW`], so back-to-back queries still average over a
/// meaningful window.
#[derive(Debug)]
pub struct CgroupStatsSource {
    root: PathBuf,
    previous: DashMap<ContainerID, CpuReading>,
}

impl CgroupStatsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            previous: DashMap::new(),
        }
    }

    fn container_dirs(&self) -> Result<Vec<(ContainerID, PathBuf)>> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| SourceError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SourceError::Io {
                path: self.root.clone(),
                source,
            })?;
            let is_dir = entry.file_type().is_ok_and(|file_type| file_type.is_dir());
            if !is_dir {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                log::trace!("skipping non utf-8 cgroup `{}`", entry.path().display());
                continue;
            };
            match ContainerID::new(name) {
                Ok(id) => out.push((id, entry.path())),
                Err(err) => log::trace!("skipping cgroup `{name}`: {err}"),
            }
        }
        out.sort_by(|(left, _), (right, _)| left.cmp(right));
        Ok(out)
    }

    fn cpu_usage(&self, id: &ContainerID, dir: &Path, now: Instant) -> Option<CpuUsage> {
        let path = dir.join(CPU_STAT_FILE);
        let stat = match fsutil::open_file_reader(&path) {
            Ok(mut reader) => CpuStat::from_reader(&mut reader),
            Err(err) if err.source.kind() == ErrorKind::NotFound => {
                log::debug!("no cpu stats for container `{id}`: {err}");
                return None;
            }
            Err(err) => {
                log::warn!("{err}");
                return None;
            }
        };
        let stat = match stat {
            Ok(stat) => stat,
            Err(err) => {
                log::warn!("failed to parse `{}`: {err}", path.display());
                return None;
            }
        };

        let usage_nanos = stat.usage_nanos()?;
        let reading = CpuReading {
            usage_nanos,
            at: now,
        };
        let usage_nano_cores = match self.previous.entry(id.clone()) {
            Entry::Occupied(mut entry) => {
                let previous = *entry.get();
                let rate = nano_cores(previous, reading);
                let window = now.saturating_duration_since(previous.at);
                if window >= MIN_RATE_WINDOW || rate.is_none() {
                    entry.insert(reading);
                }
                rate
            }
            Entry::Vacant(entry) => {
                entry.insert(reading);
                None
            }
        };

        Some(CpuUsage {
            usage_core_nano_seconds: Some(usage_nanos),
            usage_nano_cores,
        })
    }
}

/// Average usage between two readings in nano-cores, i.e. cpu-nanoseconds per second.
fn nano_cores(previous: CpuReading, current: CpuReading) -> Option<u64> {
    let elapsed = current.at.checked_duration_since(previous.at)?.as_nanos();
    if elapsed == 0 {
        return None;
    }
    // A counter that went backwards belongs to a recreated cgroup.
    let used = current.usage_nanos.checked_sub(previous.usage_nanos)?;
    let rate = u128::from(used) * 1_000_000_000 / elapsed;
    Some(u64::try_from(rate).unwrap_or(u64::MAX))
}

impl ContainerStatsSource for CgroupStatsSource {
    fn list_container_stats(&self, filter: &StatsFilter) -> Result<Vec<ContainerStats>> {
        let dirs = self.container_dirs()?;
        let now = Instant::now();

        self.previous
            .retain(|id, _| dirs.iter().any(|(present, _)| present == id));

        let stats = dirs
            .into_iter()
            .filter(|(id, _)| filter.matches_id(id))
            .map(|(id, dir)| {
                let cpu = self.cpu_usage(&id, &dir, now);
                ContainerStats {
                    id,
                    cpu,
                    metric: None,
                }
            })
            .collect::<Vec<_>>();
        log::trace!("read stats of {} containers", stats.len());
        Ok(stats)
    }
}
