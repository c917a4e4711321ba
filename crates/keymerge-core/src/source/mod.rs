//! `PairSource`: the single-method pull cursor everything else is built on.
//!
//! Invariants every implementation MUST keep:
//! - `try_advance` calls `visit` exactly once when it returns `true` and never
//!   when it returns `false`.
//! - Exhaustion is sticky: after the first `false`, every later call is `false`.
//! - Forward-only; there is no restart.

mod backed;
mod compose;

pub use backed::{
    enumerate, from_fn, from_map, from_pairs, index_values, lookup_keys, FromFn, IndexedValues,
    IterPairs, LookupKeys,
};
pub use compose::{Filtered, Transformed};

/// One-shot, forward-only cursor producing key/value pairs on demand.
pub trait PairSource {
    type Key;
    type Value;

    /// Hand the next pair to `visit` and return `true`, or return `false` once exhausted.
    fn try_advance(&mut self, visit: &mut dyn FnMut(Self::Key, Self::Value)) -> bool;

    /// Pull the next pair out by value.
    fn next_pair(&mut self) -> Option<(Self::Key, Self::Value)> {
        let mut slot = None;
        self.try_advance(&mut |k, v| slot = Some((k, v)));
        slot
    }

    /// Drain the remaining pairs into `visit`. A no-op on an exhausted source.
    fn for_each<F>(&mut self, mut visit: F)
    where
        Self: Sized,
        F: FnMut(Self::Key, Self::Value),
    {
        while self.try_advance(&mut visit) {}
    }

    fn filter_keys<P>(self, predicate: P) -> Filtered<Self, P, fn(&Self::Value) -> bool>
    where
        Self: Sized,
        P: FnMut(&Self::Key) -> bool,
    {
        Filtered::new(
            self,
            predicate,
            compose::accept_all::<Self::Value> as fn(&Self::Value) -> bool,
        )
    }

    fn filter_values<P>(self, predicate: P) -> Filtered<Self, fn(&Self::Key) -> bool, P>
    where
        Self: Sized,
        P: FnMut(&Self::Value) -> bool,
    {
        Filtered::new(
            self,
            compose::accept_all::<Self::Key> as fn(&Self::Key) -> bool,
            predicate,
        )
    }

    fn transform_keys<J, F>(self, f: F) -> Transformed<Self, F, fn(Self::Value) -> Self::Value>
    where
        Self: Sized,
        F: FnMut(Self::Key) -> J,
    {
        Transformed::new(
            self,
            f,
            compose::identity::<Self::Value> as fn(Self::Value) -> Self::Value,
        )
    }

    fn transform_values<T, F>(self, f: F) -> Transformed<Self, fn(Self::Key) -> Self::Key, F>
    where
        Self: Sized,
        F: FnMut(Self::Value) -> T,
    {
        Transformed::new(
            self,
            compose::identity::<Self::Key> as fn(Self::Key) -> Self::Key,
            f,
        )
    }

    /// Drain every remaining pair into `target` (a map, a list, ...).
    fn extend_into<E>(self, target: &mut E)
    where
        Self: Sized,
        E: Extend<(Self::Key, Self::Value)>,
    {
        target.extend(self.into_pairs());
    }

    /// Drain every remaining pair into a freshly built collection.
    fn collect_pairs<C>(self) -> C
    where
        Self: Sized,
        C: FromIterator<(Self::Key, Self::Value)>,
    {
        self.into_pairs().collect()
    }

    /// Adapt into a std [`Iterator`] over `(key, value)` tuples.
    fn into_pairs(self) -> Pairs<Self>
    where
        Self: Sized,
    {
        Pairs {
            source: self,
            done: false,
        }
    }
}

impl<S: PairSource + ?Sized> PairSource for &mut S {
    type Key = S::Key;
    type Value = S::Value;

    fn try_advance(&mut self, visit: &mut dyn FnMut(S::Key, S::Value)) -> bool {
        (**self).try_advance(visit)
    }
}

impl<S: PairSource + ?Sized> PairSource for Box<S> {
    type Key = S::Key;
    type Value = S::Value;

    fn try_advance(&mut self, visit: &mut dyn FnMut(S::Key, S::Value)) -> bool {
        (**self).try_advance(visit)
    }
}

/// Iterator view of a [`PairSource`].
pub struct Pairs<S> {
    source: S,
    done: bool,
}

impl<S> Pairs<S> {
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: PairSource> Iterator for Pairs<S> {
    type Item = (S::Key, S::Value);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.source.next_pair();
        self.done = next.is_none();
        next
    }
}

impl<S: PairSource> std::iter::FusedIterator for Pairs<S> {}
