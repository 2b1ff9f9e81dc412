use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9102";
const DEFAULT_CGROUP_ROOT: &str = "/sys/fs/cgroup";
const DEFAULT_POD_LOG_DIR: &str = "/var/log/pods";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid LISTEN_ADDR `{value}`: {source}")]
    InvalidListenAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Runtime settings, read from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP server binds to (`LISTEN_ADDR`).
    pub listen_addr: SocketAddr,
    /// Cgroup whose child directories are containers (`CGROUP_ROOT`).
    pub cgroup_root: PathBuf,
    /// Root of the pod log directories (`POD_LOG_DIR`).
    pub pod_log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Unset or empty
    /// variables fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        let listen_addr = get("LISTEN_ADDR", DEFAULT_LISTEN_ADDR);
        let listen_addr = listen_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidListenAddr {
                value: listen_addr.clone(),
                source,
            })?;

        Ok(Self {
            listen_addr,
            cgroup_root: PathBuf::from(get("CGROUP_ROOT", DEFAULT_CGROUP_ROOT)),
            pod_log_dir: PathBuf::from(get("POD_LOG_DIR", DEFAULT_POD_LOG_DIR)),
        })
    }
}
