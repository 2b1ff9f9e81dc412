//! Parsing of the cgroup v2 `cpu.stat` file.
//!
//! ```rust
//! use container_stats_exporter::cgroup::stats::{CpuStat, KeyValueStat};
//!
//! let data = "usage_usec 1000000\nuser_usec 600000\nsystem_usec 400000\n";
//! let stat = CpuStat::from_reader(&mut data.as_bytes()).unwrap();
//! assert_eq!(stat.usage_nanos(), Some(1_000_000_000));
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use super::KeyValueStat;

/// The fields of `cpu.stat` that feed container cpu usage.
///
/// The kernel reports times in microseconds. Fields absent from the file stay `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuStat {
    /// Total cpu time (user + system).
    pub usage_usec: Option<u64>,
    pub user_usec: Option<u64>,
    pub system_usec: Option<u64>,
}

impl CpuStat {
    /// Total cpu time in nanoseconds, saturating on overflow.
    pub fn usage_nanos(&self) -> Option<u64> {
        self.usage_usec.map(|usec| usec.saturating_mul(1_000))
    }
}

type Setter = fn(&mut CpuStat, u64);

static SETTERS: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, Setter> = HashMap::with_capacity(3);

    m.insert("usage_usec", |stat, value| stat.usage_usec = Some(value));
    m.insert("user_usec", |stat, value| stat.user_usec = Some(value));
    m.insert("system_usec", |stat, value| stat.system_usec = Some(value));

    m
});

impl KeyValueStat for CpuStat {
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
        &SETTERS
    }
}
