//! Convenient re-exports for downstream crates.

pub use crate::config::ScanConfig;
pub use crate::error::{Error, Result};
pub use crate::order::{comparator, compare_nulls_last, natural, Comparator};
pub use crate::source::{
    enumerate, from_fn, from_map, from_pairs, index_values, lookup_keys, PairSource, Pairs,
};
pub use crate::validator::{ChangeObserver, OrderValidator, RuleKind};
