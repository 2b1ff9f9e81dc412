//! Pod log usage read from a kubelet-style pod log directory.
//!
//! The expected layout is
//!
//! ```text
//! <root>/<namespace>_<pod name>_<pod uid>/<container name>/<restart count>.log
//! ```
use std::path::{Path, PathBuf};

use crate::container::PodReference;
use crate::fsutil;
use crate::stats::{FsStats, PodContainerStats, PodStats, PodStatsSource, Result, SourceError};

/// Reports the bytes every container's logs occupy below a pod log root.
#[derive(Debug, Clone)]
pub struct PodLogStatsSource {
    root: PathBuf,
}

impl PodLogStatsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn pod_stats(&self, pod_ref: PodReference, dir: &Path) -> PodStats {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("failed to read pod log directory `{}`: {err}", dir.display());
                return PodStats {
                    pod_ref,
                    containers: Vec::new(),
                };
            }
        };

        let mut containers = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_dir()))
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let used_bytes = match fsutil::regular_files_size(entry.path()) {
                    Ok(bytes) => Some(bytes),
                    Err(err) => {
                        log::warn!(
                            "failed to size logs of container `{name}` in pod {pod_ref}: {err}"
                        );
                        None
                    }
                };
                Some(PodContainerStats {
                    name,
                    logs: Some(FsStats { used_bytes }),
                })
            })
            .collect::<Vec<_>>();
        containers.sort_by(|left, right| left.name.cmp(&right.name));

        PodStats {
            pod_ref,
            containers,
        }
    }
}

impl PodStatsSource for PodLogStatsSource {
    fn list_pod_stats(&self) -> Result<Vec<PodStats>> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| SourceError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut pods = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SourceError::Io {
                path: self.root.clone(),
                source,
            })?;
            if !entry.file_type().is_ok_and(|file_type| file_type.is_dir()) {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            match name.parse::<PodReference>() {
                Ok(pod_ref) => pods.push(self.pod_stats(pod_ref, &entry.path())),
                Err(err) => log::warn!("skipping pod log directory: {err}"),
            }
        }
        pods.sort_by(|left, right| left.pod_ref.uid.cmp(&right.pod_ref.uid));
        log::trace!("read log stats of {} pods", pods.len());
        Ok(pods)
    }
}
