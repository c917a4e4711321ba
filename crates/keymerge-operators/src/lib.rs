#![forbid(unsafe_code)]
//! keymerge-operators: grouping and sort-merge join over `PairSource`s.
//!
//! Design intent:
//! - Pure, synchronous, pull-driven; no threads and no async.
//! - Never buffer a whole input. A join holds one lookahead pair per side,
//!   grouping holds the current run plus one prefetched pair.
//! - Inputs are trusted to be key-ordered but the join verifies strict order
//!   on both sides as it goes.

pub mod error;
pub mod group;
pub mod join;
pub mod metrics;

pub use error::{JoinError, JoinSide};
pub use group::{GroupExt, Groups};
pub use join::{JoinKind, MergeJoin};
pub use metrics::JoinStats;
