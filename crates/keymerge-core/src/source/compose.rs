//! Lazy compositors over a `PairSource`.
//!
//! Each wrapper keeps its own exhausted flag, so it stays exhausted even over
//! a source that does not.
//!
//! Chaining a filter onto a `Filtered` (or a transform onto a `Transformed`)
//! folds the new function into the existing wrapper instead of nesting another
//! one, so wrapper depth stays at one however long the chain gets.

use super::PairSource;

pub(crate) fn accept_all<T>(_: &T) -> bool {
    true
}

pub(crate) fn identity<T>(value: T) -> T {
    value
}

/// Pairs whose key and value both satisfy their predicates.
pub struct Filtered<S, KP, VP> {
    source: S,
    keep_key: KP,
    keep_value: VP,
    done: bool,
}

impl<S, KP, VP> Filtered<S, KP, VP>
where
    S: PairSource,
    KP: FnMut(&S::Key) -> bool,
    VP: FnMut(&S::Value) -> bool,
{
    pub(crate) fn new(source: S, keep_key: KP, keep_value: VP) -> Self {
        Self {
            source,
            keep_key,
            keep_value,
            done: false,
        }
    }

    /// Narrow the key predicate; stays a single wrapper.
    pub fn filter_keys<P>(self, mut predicate: P) -> Filtered<S, impl FnMut(&S::Key) -> bool, VP>
    where
        P: FnMut(&S::Key) -> bool,
    {
        let mut keep_key = self.keep_key;
        Filtered {
            source: self.source,
            keep_key: move |k: &S::Key| keep_key(k) && predicate(k),
            keep_value: self.keep_value,
            done: self.done,
        }
    }

    /// Narrow the value predicate; stays a single wrapper.
    pub fn filter_values<P>(
        self,
        mut predicate: P,
    ) -> Filtered<S, KP, impl FnMut(&S::Value) -> bool>
    where
        P: FnMut(&S::Value) -> bool,
    {
        let mut keep_value = self.keep_value;
        Filtered {
            source: self.source,
            keep_key: self.keep_key,
            keep_value: move |v: &S::Value| keep_value(v) && predicate(v),
            done: self.done,
        }
    }
}

impl<S, KP, VP> PairSource for Filtered<S, KP, VP>
where
    S: PairSource,
    KP: FnMut(&S::Key) -> bool,
    VP: FnMut(&S::Value) -> bool,
{
    type Key = S::Key;
    type Value = S::Value;

    fn try_advance(&mut self, visit: &mut dyn FnMut(S::Key, S::Value)) -> bool {
        if self.done {
            return false;
        }
        let keep_key = &mut self.keep_key;
        let keep_value = &mut self.keep_value;
        let mut found = false;
        while !found {
            let pulled = self.source.try_advance(&mut |k, v| {
                if keep_key(&k) && keep_value(&v) {
                    visit(k, v);
                    found = true;
                }
            });
            if !pulled {
                self.done = true;
                break;
            }
        }
        found
    }
}

/// Pairs with their keys and values mapped through functions.
pub struct Transformed<S, KF, VF> {
    source: S,
    map_key: KF,
    map_value: VF,
    done: bool,
}

impl<S, KF, VF, J, T> Transformed<S, KF, VF>
where
    S: PairSource,
    KF: FnMut(S::Key) -> J,
    VF: FnMut(S::Value) -> T,
{
    pub(crate) fn new(source: S, map_key: KF, map_value: VF) -> Self {
        Self {
            source,
            map_key,
            map_value,
            done: false,
        }
    }

    /// Compose `f` after the current key function; stays a single wrapper.
    pub fn transform_keys<U, F>(self, mut f: F) -> Transformed<S, impl FnMut(S::Key) -> U, VF>
    where
        F: FnMut(J) -> U,
    {
        let mut map_key = self.map_key;
        Transformed {
            source: self.source,
            map_key: move |k: S::Key| f(map_key(k)),
            map_value: self.map_value,
            done: self.done,
        }
    }

    /// Compose `f` after the current value function; stays a single wrapper.
    pub fn transform_values<U, F>(self, mut f: F) -> Transformed<S, KF, impl FnMut(S::Value) -> U>
    where
        F: FnMut(T) -> U,
    {
        let mut map_value = self.map_value;
        Transformed {
            source: self.source,
            map_key: self.map_key,
            map_value: move |v: S::Value| f(map_value(v)),
            done: self.done,
        }
    }
}

impl<S, KF, VF, J, T> PairSource for Transformed<S, KF, VF>
where
    S: PairSource,
    KF: FnMut(S::Key) -> J,
    VF: FnMut(S::Value) -> T,
{
    type Key = J;
    type Value = T;

    fn try_advance(&mut self, visit: &mut dyn FnMut(J, T)) -> bool {
        if self.done {
            return false;
        }
        let map_key = &mut self.map_key;
        let map_value = &mut self.map_value;
        let pulled = self
            .source
            .try_advance(&mut |k, v| visit(map_key(k), map_value(v)));
        self.done = !pulled;
        pulled
    }
}

#[cfg(test)]
mod tests {
    use super::Transformed;
    use crate::source::{from_pairs, IterPairs, PairSource};

    fn langs() -> Vec<(&'static str, usize)> {
        vec![("Java", 4), ("Python", 6), ("Go", 2), ("Ruby", 4), ("Scala", 5)]
    }

    #[test]
    fn filter_keys_skips_until_match() {
        let pairs: Vec<_> = from_pairs(langs())
            .filter_keys(|k: &&str| k.starts_with('S') || k.starts_with('G'))
            .collect_pairs();
        assert_eq!(pairs, vec![("Go", 2), ("Scala", 5)]);
    }

    #[test]
    fn chained_filters_are_conjunctive() {
        let pairs: Vec<_> = from_pairs(langs())
            .filter_values(|v: &usize| *v >= 4)
            .filter_keys(|k: &&str| k.len() == 4)
            .filter_values(|v: &usize| *v != 6)
            .collect_pairs();
        assert_eq!(pairs, vec![("Java", 4), ("Ruby", 4)]);
    }

    #[test]
    fn filter_rejecting_everything_exhausts() {
        let mut src = from_pairs(langs()).filter_values(|_: &usize| false);
        assert_eq!(src.next_pair(), None);
        assert_eq!(src.next_pair(), None);
    }

    #[test]
    fn chained_transforms_compose_in_order() {
        let pairs: Vec<_> = from_pairs(vec![(1, 2), (3, 4)])
            .transform_values(|v: i32| v + 1)
            .transform_values(|v: i32| v * 10)
            .transform_keys(|k: i32| format!("#{k}"))
            .transform_keys(|k: String| k.len())
            .transform_values(|v: i32| v.to_string())
            .collect_pairs();
        assert_eq!(pairs, vec![(2, "30".to_string()), (2, "50".to_string())]);
    }

    #[test]
    fn transform_is_lazy() {
        let mut calls = 0;
        {
            let mut src = from_pairs(vec![(1, 1), (2, 2)]).transform_values(|v: i32| {
                calls += 1;
                v
            });
            assert_eq!(src.next_pair(), Some((1, 1)));
        }
        assert_eq!(calls, 1);
    }

    /// Yields a pair on odd calls and reports exhaustion on even ones.
    struct Flickering {
        calls: i32,
    }

    impl PairSource for Flickering {
        type Key = i32;
        type Value = i32;

        fn try_advance(&mut self, visit: &mut dyn FnMut(i32, i32)) -> bool {
            self.calls += 1;
            if self.calls % 2 == 1 {
                visit(self.calls, self.calls);
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn filter_stays_exhausted_over_flickering_source() {
        let mut src = Flickering { calls: 0 }.filter_keys(|_: &i32| true);
        let pulled: Vec<_> = (0..4).map(|_| src.next_pair()).collect();
        assert_eq!(pulled, vec![Some((1, 1)), None, None, None]);
    }

    #[test]
    fn chained_filter_keeps_exhausted_state() {
        let mut src = Flickering { calls: 0 }.filter_values(|_: &i32| true);
        assert_eq!(src.next_pair(), Some((1, 1)));
        assert_eq!(src.next_pair(), None);
        let mut src = src.filter_keys(|_: &i32| true);
        assert_eq!(src.next_pair(), None);
    }

    #[test]
    fn transform_stays_exhausted_over_flickering_source() {
        let mut src = Flickering { calls: 0 }.transform_values(|v: i32| v * 10);
        assert_eq!(src.next_pair(), Some((1, 10)));
        assert_eq!(src.next_pair(), None);
        assert!(!src.try_advance(&mut |_, _| panic!("visited after exhaustion")));
        let mut src = src.transform_keys(|k: i32| k + 1);
        assert_eq!(src.next_pair(), None);
    }

    #[test]
    fn long_chains_wrap_the_base_source_directly() {
        fn base_of<KF, VF>(
            src: Transformed<IterPairs<std::vec::IntoIter<(u32, u64)>>, KF, VF>,
        ) -> Transformed<IterPairs<std::vec::IntoIter<(u32, u64)>>, KF, VF> {
            src
        }

        let chained = from_pairs(vec![(7u32, 0u64)])
            .transform_values(|v: u64| v + 1)
            .transform_values(|v: u64| v + 1)
            .transform_values(|v: u64| v + 1)
            .transform_keys(|k: u32| k * 2);
        let mut chained = base_of(chained);
        assert_eq!(chained.next_pair(), Some((14, 3)));
    }
}
