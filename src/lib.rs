#![forbid(unsafe_code)]
//! keymerge: key-ordered pair sources, adjacent-key grouping and sort-merge join.
//!
//! Facade over `keymerge-core` and `keymerge-operators`.

pub use keymerge_core::{config, order, source, validator};
pub use keymerge_core::{ChangeObserver, Comparator, Error, OrderValidator, PairSource, Result, ScanConfig};
pub use keymerge_operators::{group, join, metrics};
pub use keymerge_operators::{
    GroupExt, Groups, JoinError, JoinKind, JoinSide, JoinStats, MergeJoin,
};

/// Everything needed to build sources, group them and join them.
pub mod prelude {
    pub use keymerge_core::prelude::*;
    pub use keymerge_operators::{
        GroupExt, Groups, JoinError, JoinKind, JoinSide, JoinStats, MergeJoin,
    };
}
