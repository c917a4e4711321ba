//! Sort-merge join.
//!
//! One scan produces full-outer rows; inner/left/right joins are the same
//! rows with the ones missing a required side dropped.

pub mod merge;

use serde::{Deserialize, Serialize};

pub use merge::MergeJoin;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    #[default]
    Full,
}

impl JoinKind {
    /// Whether a row with the given sides present belongs to this kind of join.
    pub fn keeps(self, left_present: bool, right_present: bool) -> bool {
        match self {
            JoinKind::Inner => left_present && right_present,
            JoinKind::Left => left_present,
            JoinKind::Right => right_present,
            JoinKind::Full => left_present || right_present,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_matrix() {
        let rows = [(true, true), (true, false), (false, true)];
        let kept = |kind: JoinKind| -> Vec<bool> {
            rows.iter().map(|&(l, r)| kind.keeps(l, r)).collect()
        };
        assert_eq!(kept(JoinKind::Inner), vec![true, false, false]);
        assert_eq!(kept(JoinKind::Left), vec![true, true, false]);
        assert_eq!(kept(JoinKind::Right), vec![true, false, true]);
        assert_eq!(kept(JoinKind::Full), vec![true, true, true]);
    }

    #[test]
    fn serde_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&JoinKind::Inner).unwrap(), "\"inner\"");
        let kind: JoinKind = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(kind, JoinKind::Right);
    }
}
