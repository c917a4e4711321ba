use std::convert::Infallible;
use std::fmt;

use thiserror::Error;

/// Which input of a join an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinSide {
    Left,
    Right,
}

impl fmt::Display for JoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinSide::Left => f.write_str("left"),
            JoinSide::Right => f.write_str("right"),
        }
    }
}

/// Failure of a merge join. `E` is the consumer's error type for `try_join`.
///
/// Rows delivered before the failure stay delivered; the inputs are left
/// partially consumed.
#[derive(Debug, Error)]
pub enum JoinError<K, E = Infallible> {
    /// An input was not strictly increasing (out of order or a duplicate key).
    /// Pre-sort/deduplicate the input and rerun the whole join.
    #[error("key order violated on {side} input: {last_accepted:?} followed by {offending:?}")]
    KeyOrder {
        side: JoinSide,
        last_accepted: K,
        offending: K,
    },

    #[error("join consumer failed: {0}")]
    Consumer(E),
}

impl<K, E> JoinError<K, E> {
    pub fn is_key_order(&self) -> bool {
        matches!(self, JoinError::KeyOrder { .. })
    }
}
