//! Shared comparator handle plus the small ordering helpers the operators use.

use std::cmp::Ordering;
use std::sync::Arc;

/// Total order over `T`, shared between a join engine and its per-side validators.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Wrap a closure as a shareable [`Comparator`].
pub fn comparator<T, F>(f: F) -> Comparator<T>
where
    F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Comparator for intrinsically ordered types.
pub fn natural<T: Ord + 'static>() -> Comparator<T> {
    Arc::new(|a: &T, b: &T| a.cmp(b))
}

/// Reverse of `order`.
pub fn reversed<T: 'static>(order: Comparator<T>) -> Comparator<T> {
    Arc::new(move |a: &T, b: &T| order(b, a))
}

/// Compare two optional keys where an absent key sorts after every present one.
pub fn compare_nulls_last<T: ?Sized>(
    order: impl Fn(&T, &T) -> Ordering,
    a: Option<&T>,
    b: Option<&T>,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => order(x, y),
    }
}
