//! Scan configuration that operators and the CLI can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const ENV_GROUP_CAPACITY_HINT: &str = "KEYMERGE_GROUP_CAPACITY_HINT";
pub const ENV_TRACE_ROWS: &str = "KEYMERGE_TRACE_ROWS";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Initial capacity for `Vec` groups built by the grouping helpers.
    pub group_capacity_hint: usize,

    /// Emit one trace event per join row (only with the `tracing` feature).
    pub trace_rows: bool,
}

impl ScanConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `KEYMERGE_GROUP_CAPACITY_HINT`: initial group capacity
    /// - `KEYMERGE_TRACE_ROWS`: `true`/`false` (also `1`/`0`)
    ///
    /// Unlike defaults, a variable that is set but unparsable is an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ScanConfig::from_env`] with an explicit variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(s) = lookup(ENV_GROUP_CAPACITY_HINT) {
            cfg.group_capacity_hint = s.trim().parse::<usize>().map_err(|e| {
                Error::Config(format!("{ENV_GROUP_CAPACITY_HINT}={s:?}: {e}"))
            })?;
        }

        if let Some(s) = lookup(ENV_TRACE_ROWS) {
            cfg.trace_rows = parse_flag(&s)
                .ok_or_else(|| Error::Config(format!("{ENV_TRACE_ROWS}={s:?}: expected a boolean")))?;
        }

        Ok(cfg)
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
