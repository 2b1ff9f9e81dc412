//! Container cpu usage read from the cgroup v2 filesystem.
//!
//! [`CgroupStatsSource`] treats each child directory of a configured cgroup
//! (for example a runtime's pod slice) as one container and parses its
//! `cpu.stat`. The cpu rate in nano-cores is derived from consecutive
//! readings of the same container.
//!
//! # Platform Requirements
//!
//! - Linux with cgroup v2 support.
//! - Read access to the configured cgroup directory.
mod source;
pub mod stats;

pub use source::CgroupStatsSource;
