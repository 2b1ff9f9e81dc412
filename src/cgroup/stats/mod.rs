//! Parsers for the cgroup v2 files the exporter reads.
mod cpu;
mod error;
mod parser;

pub use cpu::CpuStat;
pub use error::StatParseError;
pub use parser::KeyValueStat;
