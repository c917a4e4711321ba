//! Join counters and tracing hooks.
//!
//! This module purposefully avoids pulling heavy telemetry stacks; with the
//! `tracing` feature off the hooks compile to nothing.

use serde::{Deserialize, Serialize};

/// Row counts for one completed join. A join that fails returns its error
/// instead, and the counts for the rows it delivered are not reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStats {
    /// Rows handed to the consumer.
    pub rows: u64,
    /// Rows with a value on both sides.
    pub matched: u64,
    pub left_only: u64,
    pub right_only: u64,
}

impl JoinStats {
    pub(crate) fn record(&mut self, left_present: bool, right_present: bool) {
        self.rows += 1;
        match (left_present, right_present) {
            (true, true) => self.matched += 1,
            (true, false) => self.left_only += 1,
            (false, true) => self.right_only += 1,
            (false, false) => {}
        }
    }
}

#[cfg(feature = "tracing")]
pub fn emit_stats(stats: &JoinStats) {
    tracing::debug!(
        rows = stats.rows,
        matched = stats.matched,
        left_only = stats.left_only,
        right_only = stats.right_only,
        "merge join finished"
    );
}

#[cfg(not(feature = "tracing"))]
pub fn emit_stats(_stats: &JoinStats) { /* no-op */
}

#[cfg(feature = "tracing")]
pub(crate) fn emit_row(row: u64, left_present: bool, right_present: bool) {
    tracing::trace!(row, left = left_present, right = right_present, "join row");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn emit_row(_row: u64, _left_present: bool, _right_present: bool) {}

#[cfg(feature = "tracing")]
pub(crate) fn emit_key_order_violation(side: crate::error::JoinSide) {
    tracing::debug!(%side, "key order violated");
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn emit_key_order_violation(_side: crate::error::JoinSide) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_classifies_rows() {
        let mut stats = JoinStats::default();
        stats.record(true, true);
        stats.record(true, false);
        stats.record(false, true);
        stats.record(true, true);
        assert_eq!(
            stats,
            JoinStats {
                rows: 4,
                matched: 2,
                left_only: 1,
                right_only: 1,
            }
        );
    }

    #[test]
    fn stats_serialize_as_flat_object() {
        let stats = JoinStats {
            rows: 3,
            matched: 1,
            left_only: 1,
            right_only: 1,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["rows"], 3);
        let back: JoinStats = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
    }
}
