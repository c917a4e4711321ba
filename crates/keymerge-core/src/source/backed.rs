//! Sources backed by collections, iterators, key lookups and generator closures.
//!
//! Every factory takes an `IntoIterator`, so single-pass streams (reader lines,
//! channels drained by an iterator, ...) plug in the same way collections do.
//! Iterators are fused to keep exhaustion sticky.

use std::iter::{Enumerate, Fuse};

use super::PairSource;

/// Pairs straight from an iterator of `(key, value)` tuples.
pub struct IterPairs<I> {
    iter: Fuse<I>,
}

/// Source over a key/value mapping; order is the mapping's iteration order.
pub fn from_map<M, K, V>(map: M) -> IterPairs<M::IntoIter>
where
    M: IntoIterator<Item = (K, V)>,
{
    from_pairs(map)
}

/// Source over a sequence of existing pairs.
pub fn from_pairs<P, K, V>(pairs: P) -> IterPairs<P::IntoIter>
where
    P: IntoIterator<Item = (K, V)>,
{
    IterPairs {
        iter: pairs.into_iter().fuse(),
    }
}

/// Source keyed by position (`0, 1, 2, ...`).
pub fn enumerate<I>(values: I) -> IterPairs<Enumerate<I::IntoIter>>
where
    I: IntoIterator,
{
    from_pairs(values.into_iter().enumerate())
}

impl<I, K, V> PairSource for IterPairs<I>
where
    I: Iterator<Item = (K, V)>,
{
    type Key = K;
    type Value = V;

    fn try_advance(&mut self, visit: &mut dyn FnMut(K, V)) -> bool {
        match self.iter.next() {
            Some((k, v)) => {
                visit(k, v);
                true
            }
            None => false,
        }
    }
}

/// Values indexed through a key-extraction function.
pub struct IndexedValues<I, F> {
    values: Fuse<I>,
    key_of: F,
}

pub fn index_values<I, F, K>(values: I, key_of: F) -> IndexedValues<I::IntoIter, F>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> K,
{
    IndexedValues {
        values: values.into_iter().fuse(),
        key_of,
    }
}

impl<I, F, K> PairSource for IndexedValues<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item) -> K,
{
    type Key = K;
    type Value = I::Item;

    fn try_advance(&mut self, visit: &mut dyn FnMut(K, I::Item)) -> bool {
        match self.values.next() {
            Some(value) => {
                let key = (self.key_of)(&value);
                visit(key, value);
                true
            }
            None => false,
        }
    }
}

/// Keys resolved to values through a lookup function.
pub struct LookupKeys<I, F> {
    keys: Fuse<I>,
    lookup: F,
}

pub fn lookup_keys<I, F, V>(keys: I, lookup: F) -> LookupKeys<I::IntoIter, F>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> V,
{
    LookupKeys {
        keys: keys.into_iter().fuse(),
        lookup,
    }
}

impl<I, F, V> PairSource for LookupKeys<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item) -> V,
{
    type Key = I::Item;
    type Value = V;

    fn try_advance(&mut self, visit: &mut dyn FnMut(I::Item, V)) -> bool {
        match self.keys.next() {
            Some(key) => {
                let value = (self.lookup)(&key);
                visit(key, value);
                true
            }
            None => false,
        }
    }
}

/// Source driven by a generator closure; the first `None` ends it for good.
pub struct FromFn<F> {
    next: F,
    done: bool,
}

pub fn from_fn<F, K, V>(next: F) -> FromFn<F>
where
    F: FnMut() -> Option<(K, V)>,
{
    FromFn { next, done: false }
}

impl<F, K, V> PairSource for FromFn<F>
where
    F: FnMut() -> Option<(K, V)>,
{
    type Key = K;
    type Value = V;

    fn try_advance(&mut self, visit: &mut dyn FnMut(K, V)) -> bool {
        if self.done {
            return false;
        }
        match (self.next)() {
            Some((k, v)) => {
                visit(k, v);
                true
            }
            None => {
                self.done = true;
                false
            }
        }
    }
}
