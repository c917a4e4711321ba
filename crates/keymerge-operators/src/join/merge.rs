//! Merge join.
//!
//! Precondition: both inputs are strictly increasing by the join comparator.
//! This is checked, not assumed: each side runs a strictly-monotone
//! `OrderValidator` over the keys it moves past, and the first violation ends
//! the join with `JoinError::KeyOrder`. Because the check happens when a key
//! is consumed, every row up to and including the last valid key has already
//! reached the consumer by then.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::sync::Arc;

use keymerge_core::config::ScanConfig;
use keymerge_core::order::{self, compare_nulls_last, Comparator};
use keymerge_core::source::PairSource;
use keymerge_core::validator::OrderValidator;

use crate::error::{JoinError, JoinSide};
use crate::group::Groups;
use crate::join::JoinKind;
use crate::metrics::{self, JoinStats};

/// Sort-merge join engine over a total order on `K`.
///
/// Holds only the comparator and config, so one engine can run any number of
/// joins (and be shared across threads).
pub struct MergeJoin<K> {
    order: Comparator<K>,
    config: ScanConfig,
}

impl<K> Clone for MergeJoin<K> {
    fn clone(&self) -> Self {
        Self {
            order: Arc::clone(&self.order),
            config: self.config.clone(),
        }
    }
}

impl<K: 'static> MergeJoin<K> {
    pub fn new<F>(order: F) -> Self
    where
        F: Fn(&K, &K) -> Ordering + Send + Sync + 'static,
    {
        Self::from_comparator(order::comparator(order))
    }

    pub fn natural() -> Self
    where
        K: Ord,
    {
        Self::from_comparator(order::natural())
    }
}

impl<K> MergeJoin<K> {
    pub fn from_comparator(order: Comparator<K>) -> Self {
        Self {
            order,
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn comparator(&self) -> &Comparator<K> {
        &self.order
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Key equivalence implied by the comparator, used for group joins.
    fn same_key(&self) -> impl FnMut(&K, &K) -> bool {
        let order = Arc::clone(&self.order);
        move |a: &K, b: &K| order(a, b) == Ordering::Equal
    }

    fn new_vec_group<V>(&self) -> impl FnMut() -> Vec<V> {
        let capacity = self.config.group_capacity_hint;
        move || Vec::with_capacity(capacity)
    }
}

impl<K: Clone> MergeJoin<K> {
    /// Full-outer merge of two key-ordered sources: one consumer call per
    /// distinct key, ascending, with `None` on a side that lacks the key.
    pub fn join<L, R, C>(&self, left: L, right: R, mut consumer: C) -> Result<JoinStats, JoinError<K>>
    where
        L: PairSource<Key = K>,
        R: PairSource<Key = K>,
        C: FnMut(Option<L::Value>, Option<R::Value>, K),
    {
        self.try_join(left, right, |l, r, key| {
            consumer(l, r, key);
            Ok::<(), Infallible>(())
        })
    }

    /// Like [`MergeJoin::join`], but the consumer may fail; its first error
    /// stops the scan and comes back as `JoinError::Consumer`.
    pub fn try_join<L, R, C, E>(
        &self,
        left: L,
        right: R,
        mut consumer: C,
    ) -> Result<JoinStats, JoinError<K, E>>
    where
        L: PairSource<Key = K>,
        R: PairSource<Key = K>,
        C: FnMut(Option<L::Value>, Option<R::Value>, K) -> Result<(), E>,
    {
        let mut left = Side::new(JoinSide::Left, left, &self.order);
        let mut right = Side::new(JoinSide::Right, right, &self.order);
        let mut stats = JoinStats::default();

        while left.has_next() || right.has_next() {
            let step = compare_nulls_last(&*self.order, left.peek_key(), right.peek_key());

            let mut key = None;
            let mut current_left = None;
            let mut current_right = None;
            if step != Ordering::Greater {
                if let Some((k, v)) = left.advance()? {
                    key = Some(k);
                    current_left = Some(v);
                }
            }
            if step != Ordering::Less {
                if let Some((k, v)) = right.advance()? {
                    key = Some(k);
                    current_right = Some(v);
                }
            }
            let Some(key) = key else {
                break;
            };

            let (has_left, has_right) = (current_left.is_some(), current_right.is_some());
            stats.record(has_left, has_right);
            if self.config.trace_rows {
                metrics::emit_row(stats.rows, has_left, has_right);
            }
            consumer(current_left, current_right, key).map_err(JoinError::Consumer)?;
        }

        metrics::emit_stats(&stats);
        Ok(stats)
    }

    /// Run the full-outer scan but only hand `kind`'s rows to the consumer.
    pub fn join_kind<L, R, C>(
        &self,
        kind: JoinKind,
        left: L,
        right: R,
        mut consumer: C,
    ) -> Result<JoinStats, JoinError<K>>
    where
        L: PairSource<Key = K>,
        R: PairSource<Key = K>,
        C: FnMut(Option<L::Value>, Option<R::Value>, K),
    {
        self.join(left, right, |l, r, key| {
            if kind.keeps(l.is_some(), r.is_some()) {
                consumer(l, r, key);
            }
        })
    }

    /// Join where the consumer gets every left value for a key, collected by
    /// `new_left_group`, against the single right value.
    pub fn group_join_left<L, R, F, G, C>(
        &self,
        left: L,
        new_left_group: F,
        right: R,
        consumer: C,
    ) -> Result<JoinStats, JoinError<K>>
    where
        L: PairSource<Key = K>,
        R: PairSource<Key = K>,
        F: FnMut() -> G,
        G: Extend<L::Value>,
        C: FnMut(Option<G>, Option<R::Value>, K),
    {
        let left = Groups::with_equivalence(left, new_left_group, self.same_key());
        self.join(left, right, consumer)
    }

    pub fn group_join_right<L, R, F, G, C>(
        &self,
        left: L,
        right: R,
        new_right_group: F,
        consumer: C,
    ) -> Result<JoinStats, JoinError<K>>
    where
        L: PairSource<Key = K>,
        R: PairSource<Key = K>,
        F: FnMut() -> G,
        G: Extend<R::Value>,
        C: FnMut(Option<L::Value>, Option<G>, K),
    {
        let right = Groups::with_equivalence(right, new_right_group, self.same_key());
        self.join(left, right, consumer)
    }

    pub fn group_join_both<L, R, FL, GL, FR, GR, C>(
        &self,
        left: L,
        new_left_group: FL,
        right: R,
        new_right_group: FR,
        consumer: C,
    ) -> Result<JoinStats, JoinError<K>>
    where
        L: PairSource<Key = K>,
        R: PairSource<Key = K>,
        FL: FnMut() -> GL,
        GL: Extend<L::Value>,
        FR: FnMut() -> GR,
        GR: Extend<R::Value>,
        C: FnMut(Option<GL>, Option<GR>, K),
    {
        let left = Groups::with_equivalence(left, new_left_group, self.same_key());
        let right = Groups::with_equivalence(right, new_right_group, self.same_key());
        self.join(left, right, consumer)
    }

    /// [`MergeJoin::group_join_left`] collecting into `Vec`s sized by the
    /// configured capacity hint.
    pub fn group_join_left_vec<L, R, C>(
        &self,
        left: L,
        right: R,
        consumer: C,
    ) -> Result<JoinStats, JoinError<K>>
    where
        L: PairSource<Key = K>,
        R: PairSource<Key = K>,
        C: FnMut(Option<Vec<L::Value>>, Option<R::Value>, K),
    {
        self.group_join_left(left, self.new_vec_group(), right, consumer)
    }

    pub fn group_join_right_vec<L, R, C>(
        &self,
        left: L,
        right: R,
        consumer: C,
    ) -> Result<JoinStats, JoinError<K>>
    where
        L: PairSource<Key = K>,
        R: PairSource<Key = K>,
        C: FnMut(Option<L::Value>, Option<Vec<R::Value>>, K),
    {
        self.group_join_right(left, right, self.new_vec_group(), consumer)
    }

    pub fn group_join_both_vec<L, R, C>(
        &self,
        left: L,
        right: R,
        consumer: C,
    ) -> Result<JoinStats, JoinError<K>>
    where
        L: PairSource<Key = K>,
        R: PairSource<Key = K>,
        C: FnMut(Option<Vec<L::Value>>, Option<Vec<R::Value>>, K),
    {
        self.group_join_both(left, self.new_vec_group(), right, self.new_vec_group(), consumer)
    }
}

/// One input of a join: the source, a one-pair lookahead and the order check.
struct Side<S: PairSource> {
    which: JoinSide,
    source: S,
    validator: OrderValidator<S::Key>,
    next: Option<(S::Key, S::Value)>,
}

impl<S> Side<S>
where
    S: PairSource,
    S::Key: Clone,
{
    fn new(which: JoinSide, mut source: S, order: &Comparator<S::Key>) -> Self {
        let next = source.next_pair();
        Self {
            which,
            source,
            validator: OrderValidator::strictly_monotone(Arc::clone(order)),
            next,
        }
    }

    fn has_next(&self) -> bool {
        self.next.is_some()
    }

    fn peek_key(&self) -> Option<&S::Key> {
        self.next.as_ref().map(|(k, _)| k)
    }

    /// Move past the lookahead pair and return it, refilling the lookahead.
    /// Once the lookahead is empty the source is not pulled again.
    fn advance<E>(&mut self) -> Result<Option<(S::Key, S::Value)>, JoinError<S::Key, E>> {
        let Some((key, value)) = self.next.take() else {
            return Ok(None);
        };
        if !self.validator.test(&key) {
            if let Some(last) = self.validator.last_accepted() {
                metrics::emit_key_order_violation(self.which);
                return Err(JoinError::KeyOrder {
                    side: self.which,
                    last_accepted: last.clone(),
                    offending: key,
                });
            }
        }
        self.next = self.source.next_pair();
        Ok(Some((key, value)))
    }
}
