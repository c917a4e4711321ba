#![forbid(unsafe_code)]
//! keymerge-core: the key-ordered pair enumeration protocol.
//!
//! Responsibilities:
//! - `PairSource`: a one-shot, forward-only cursor over key/value pairs.
//! - Factories over maps, pair sequences, indexed values and key lookups.
//! - Lazy compositors (filter/transform) that stay one wrapper deep.
//! - Comparators and the `OrderValidator` lookback predicate.
//!
//! **No I/O, no threads, no async** here. Operators live in `keymerge-operators`.

pub mod config;
pub mod error;
pub mod order;
pub mod prelude;
pub mod source;
pub mod validator;

pub use config::ScanConfig;
pub use error::{Error, Result};
pub use order::Comparator;
pub use source::PairSource;
pub use validator::{ChangeObserver, OrderValidator};
