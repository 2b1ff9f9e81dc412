//! Generic parsing of flat `key value` stat files such as `cpu.stat`.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::LazyLock;
//! use container_stats_exporter::cgroup::stats::KeyValueStat;
//!
//! #[derive(Default)]
//! struct PidsStat {
//!     current: u64,
//! }
//!
//! static HANDLERS: LazyLock<HashMap<&'static str, fn(&mut PidsStat, u64)>> =
//!     LazyLock::new(|| {
//!         let mut map: HashMap<&'static str, fn(&mut PidsStat, u64)> = HashMap::new();
//!         map.insert("current", |stat, value| stat.current = value);
//!         map
//!     });
//!
//! impl KeyValueStat for PidsStat {
//!     fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
//!         &HANDLERS
//!     }
//! }
//!
//! let stat = PidsStat::from_reader(&mut "current 12\n".as_bytes()).unwrap();
//! assert_eq!(stat.current, 12);
//! ```

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use super::StatParseError;

/// A stat file with one whitespace separated key/value pair per line.
///
/// Known keys are dispatched to [`KeyValueStat::field_handlers`], unknown keys
/// are skipped, and a known key appearing twice is rejected.
pub trait KeyValueStat: Default + 'static {
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)>;

    /// Parses the whole reader.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading fails, or an [`StatParseError`] wrapped
    /// in an `io::Error` of kind `InvalidData` if a known value is malformed or duplicated.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut stat = Self::default();
        let handlers = Self::field_handlers();
        let mut seen_keys = HashSet::with_capacity(handlers.len());

        let mut line = String::new();
        let mut lineno = 0;
        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            let mut parts = line.split_whitespace();
            if let (Some(key), Some(value)) = (parts.next(), parts.next())
                && let Some((key, handler)) = handlers.get_key_value(key)
            {
                let parsed = value
                    .parse::<u64>()
                    .map_err(|source| StatParseError::InvalidKeyValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        line: lineno,
                        source,
                    })?;
                if !seen_keys.insert(*key) {
                    return Err(StatParseError::DuplicateField {
                        field: key.to_string(),
                        line: lineno,
                    }
                    .into());
                }
                handler(&mut stat, parsed);
            }
            line.clear();
        }

        Ok(stat)
    }
}
