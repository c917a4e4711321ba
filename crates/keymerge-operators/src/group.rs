//! Adjacent-key grouping.
//!
//! Precondition: equal keys arrive next to each other. Grouping is by
//! adjacency, so equal keys separated by another key form separate groups;
//! sort first if global grouping is wanted.

use keymerge_core::source::PairSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Pull from the wrapped source.
    Normal,
    /// Hand out `pending` once, then go back to `Normal`.
    Replay,
    /// The wrapped source said "no more"; it is never pulled again.
    Exhausted,
}

/// Folds each maximal run of equivalent adjacent keys into one
/// `(first key of the run, collection of values)` pair.
pub struct Groups<S: PairSource, F, E> {
    source: S,
    new_group: F,
    same_key: E,
    pending: Option<(S::Key, S::Value)>,
    mode: Mode,
}

impl<S, F, G> Groups<S, F, fn(&S::Key, &S::Key) -> bool>
where
    S: PairSource,
    S::Key: PartialEq,
    F: FnMut() -> G,
    G: Extend<S::Value>,
{
    /// Group by key equality.
    pub fn new(source: S, new_group: F) -> Self {
        Self::with_equivalence(source, new_group, <S::Key as PartialEq>::eq)
    }
}

impl<S, F, E, G> Groups<S, F, E>
where
    S: PairSource,
    F: FnMut() -> G,
    G: Extend<S::Value>,
    E: FnMut(&S::Key, &S::Key) -> bool,
{
    /// Group by a caller supplied key equivalence.
    pub fn with_equivalence(source: S, new_group: F, same_key: E) -> Self {
        Self {
            source,
            new_group,
            same_key,
            pending: None,
            mode: Mode::Normal,
        }
    }

    fn pull(&mut self) -> Option<(S::Key, S::Value)> {
        match self.mode {
            Mode::Replay => {
                self.mode = Mode::Normal;
                self.pending.take()
            }
            Mode::Normal => {
                let next = self.source.next_pair();
                if next.is_none() {
                    self.mode = Mode::Exhausted;
                }
                next
            }
            Mode::Exhausted => None,
        }
    }
}

impl<S, F, E, G> PairSource for Groups<S, F, E>
where
    S: PairSource,
    F: FnMut() -> G,
    G: Extend<S::Value>,
    E: FnMut(&S::Key, &S::Key) -> bool,
{
    type Key = S::Key;
    type Value = G;

    fn try_advance(&mut self, visit: &mut dyn FnMut(S::Key, G)) -> bool {
        let mut run: Option<(S::Key, G)> = None;

        while let Some((key, value)) = self.pull() {
            if let Some((active, group)) = run.as_mut() {
                if (self.same_key)(active, &key) {
                    group.extend(Some(value));
                    continue;
                }
                // First key of the next run: keep it for the next call.
                self.pending = Some((key, value));
                self.mode = Mode::Replay;
                break;
            }
            let mut group = (self.new_group)();
            group.extend(Some(value));
            run = Some((key, group));
        }

        match run {
            Some((key, group)) => {
                visit(key, group);
                true
            }
            None => false,
        }
    }
}

/// Grouping adapters for every [`PairSource`].
pub trait GroupExt: PairSource + Sized {
    /// Group equal adjacent keys into `Vec`s.
    fn into_groups(self) -> Groups<Self, fn() -> Vec<Self::Value>, fn(&Self::Key, &Self::Key) -> bool>
    where
        Self::Key: PartialEq,
    {
        Groups::new(self, Vec::new as fn() -> Vec<Self::Value>)
    }

    /// Group equal adjacent keys into collections built by `new_group`.
    fn group_by<F, G>(self, new_group: F) -> Groups<Self, F, fn(&Self::Key, &Self::Key) -> bool>
    where
        Self::Key: PartialEq,
        F: FnMut() -> G,
        G: Extend<Self::Value>,
    {
        Groups::new(self, new_group)
    }

    /// Group adjacent keys that `same_key` considers equivalent.
    fn group_by_equivalence<F, G, E>(self, new_group: F, same_key: E) -> Groups<Self, F, E>
    where
        F: FnMut() -> G,
        G: Extend<Self::Value>,
        E: FnMut(&Self::Key, &Self::Key) -> bool,
    {
        Groups::with_equivalence(self, new_group, same_key)
    }
}

impl<S: PairSource> GroupExt for S {}
