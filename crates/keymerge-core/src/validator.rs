//! Lookback validation: accept a value based on the last *accepted* value,
//! or observe changes between neighbouring values.
//!
//! The join engine runs one `strictly_monotone` validator per input side; the
//! other rules are useful on their own, e.g. as key filters that collapse
//! adjacent duplicates.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::order::{self, Comparator};

/// Caller supplied relation over two values.
pub type Relation<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Which binary rule a validator applies to `(last_accepted, candidate)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    NotSame,
    NotEqual,
    NotEquivalent,
    NoDuplicates,
    Monotone,
    StrictlyMonotone,
    Custom,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleKind::NotSame => "not_same",
            RuleKind::NotEqual => "not_equal",
            RuleKind::NotEquivalent => "not_equivalent",
            RuleKind::NoDuplicates => "no_duplicates",
            RuleKind::Monotone => "monotone",
            RuleKind::StrictlyMonotone => "strictly_monotone",
            RuleKind::Custom => "custom",
        };
        f.write_str(s)
    }
}

enum Rule<T> {
    NotSame(fn(&T, &T) -> bool),
    NotEqual(fn(&T, &T) -> bool),
    NotEquivalent(Relation<T>),
    NoDuplicates(Comparator<T>),
    Monotone(Comparator<T>),
    StrictlyMonotone(Comparator<T>),
    Custom(Relation<T>),
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        match self {
            Rule::NotSame(f) => Rule::NotSame(*f),
            Rule::NotEqual(f) => Rule::NotEqual(*f),
            Rule::NotEquivalent(r) => Rule::NotEquivalent(Arc::clone(r)),
            Rule::NoDuplicates(c) => Rule::NoDuplicates(Arc::clone(c)),
            Rule::Monotone(c) => Rule::Monotone(Arc::clone(c)),
            Rule::StrictlyMonotone(c) => Rule::StrictlyMonotone(Arc::clone(c)),
            Rule::Custom(r) => Rule::Custom(Arc::clone(r)),
        }
    }
}

impl<T> Rule<T> {
    fn kind(&self) -> RuleKind {
        match self {
            Rule::NotSame(_) => RuleKind::NotSame,
            Rule::NotEqual(_) => RuleKind::NotEqual,
            Rule::NotEquivalent(_) => RuleKind::NotEquivalent,
            Rule::NoDuplicates(_) => RuleKind::NoDuplicates,
            Rule::Monotone(_) => RuleKind::Monotone,
            Rule::StrictlyMonotone(_) => RuleKind::StrictlyMonotone,
            Rule::Custom(_) => RuleKind::Custom,
        }
    }

    fn accepts(&self, last: &T, next: &T) -> bool {
        match self {
            Rule::NotSame(same) => !same(last, next),
            Rule::NotEqual(eq) => !eq(last, next),
            Rule::NotEquivalent(eq) => !eq(last, next),
            Rule::NoDuplicates(cmp) => cmp(last, next) != Ordering::Equal,
            Rule::Monotone(cmp) => cmp(last, next) != Ordering::Greater,
            Rule::StrictlyMonotone(cmp) => cmp(last, next) == Ordering::Less,
            Rule::Custom(rule) => rule(last, next),
        }
    }

    /// Rules are the same when their kind matches and they share the same function.
    fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            // The function is fixed by `T` for these two.
            (Rule::NotSame(_), Rule::NotSame(_)) | (Rule::NotEqual(_), Rule::NotEqual(_)) => true,
            (Rule::NotEquivalent(a), Rule::NotEquivalent(b)) | (Rule::Custom(a), Rule::Custom(b)) => {
                Arc::ptr_eq(a, b)
            }
            (Rule::NoDuplicates(a), Rule::NoDuplicates(b))
            | (Rule::Monotone(a), Rule::Monotone(b))
            | (Rule::StrictlyMonotone(a), Rule::StrictlyMonotone(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn same_target<T: Deref>(a: &T, b: &T) -> bool {
    std::ptr::eq(&**a, &**b)
}

/// Stateful predicate that accepts a value iff its rule holds against the last
/// accepted value. The first value is always accepted; a rejection never moves
/// the record.
pub struct OrderValidator<T> {
    rule: Rule<T>,
    last_accepted: Option<T>,
}

impl<T> OrderValidator<T> {
    fn with_rule(rule: Rule<T>) -> Self {
        Self {
            rule,
            last_accepted: None,
        }
    }

    /// Identity inequality for pointer-like values (`&U`, `Rc<U>`, `Arc<U>`).
    pub fn not_same() -> Self
    where
        T: Deref,
    {
        Self::with_rule(Rule::NotSame(same_target::<T>))
    }

    pub fn not_equal() -> Self
    where
        T: PartialEq,
    {
        Self::with_rule(Rule::NotEqual(<T as PartialEq>::eq))
    }

    pub fn not_equivalent<F>(equivalence: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self::with_rule(Rule::NotEquivalent(Arc::new(equivalence)))
    }

    pub fn no_duplicates(order: Comparator<T>) -> Self {
        Self::with_rule(Rule::NoDuplicates(order))
    }

    pub fn monotone(order: Comparator<T>) -> Self {
        Self::with_rule(Rule::Monotone(order))
    }

    pub fn strictly_monotone(order: Comparator<T>) -> Self {
        Self::with_rule(Rule::StrictlyMonotone(order))
    }

    pub fn no_duplicates_natural() -> Self
    where
        T: Ord + 'static,
    {
        Self::no_duplicates(order::natural())
    }

    pub fn monotone_natural() -> Self
    where
        T: Ord + 'static,
    {
        Self::monotone(order::natural())
    }

    pub fn strictly_monotone_natural() -> Self
    where
        T: Ord + 'static,
    {
        Self::strictly_monotone(order::natural())
    }

    /// Arbitrary rule over `(last_accepted, candidate)`.
    pub fn custom<F>(accept_next: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self::with_rule(Rule::Custom(Arc::new(accept_next)))
    }

    pub fn kind(&self) -> RuleKind {
        self.rule.kind()
    }

    pub fn last_accepted(&self) -> Option<&T> {
        self.last_accepted.as_ref()
    }

    /// Accept or reject `candidate`; on accept it becomes the new record.
    pub fn test(&mut self, candidate: &T) -> bool
    where
        T: Clone,
    {
        let accepted = match &self.last_accepted {
            None => true,
            Some(last) => self.rule.accepts(last, candidate),
        };
        if accepted {
            self.last_accepted = Some(candidate.clone());
        }
        accepted
    }

    /// Consume the validator into a predicate usable with `filter_keys`/`filter_values`.
    pub fn into_predicate(mut self) -> impl FnMut(&T) -> bool
    where
        T: Clone,
    {
        move |candidate: &T| self.test(candidate)
    }
}

impl<T: Clone> Clone for OrderValidator<T> {
    fn clone(&self) -> Self {
        Self {
            rule: self.rule.clone(),
            last_accepted: self.last_accepted.clone(),
        }
    }
}

impl<T: PartialEq> PartialEq for OrderValidator<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rule.same_as(&other.rule) && self.last_accepted == other.last_accepted
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderValidator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderValidator")
            .field("rule", &self.rule.kind())
            .field("last_accepted", &self.last_accepted)
            .finish()
    }
}

/// Lookback consumer: sees every value and calls `on_change(previous, current)`
/// whenever the change rule holds between the two.
///
/// Unlike [`OrderValidator`] the record always moves to the latest value, so
/// each call compares neighbours. The first value is recorded without a call.
pub struct ChangeObserver<T, F> {
    rule: Rule<T>,
    on_change: F,
    last_value: Option<T>,
}

impl<T, F> ChangeObserver<T, F>
where
    F: FnMut(&T, &T),
{
    /// Change = a different pointee, for pointer-like `T` (`&U`, `Rc<U>`, `Arc<U>`).
    pub fn for_identity(on_change: F) -> Self
    where
        T: Deref,
    {
        Self::with_rule(Rule::NotSame(same_target::<T>), on_change)
    }

    /// Change = `PartialEq` inequality.
    pub fn for_value(on_change: F) -> Self
    where
        T: PartialEq,
    {
        Self::with_rule(Rule::NotEqual(<T as PartialEq>::eq), on_change)
    }

    /// Change = the projection `property` differs.
    pub fn for_property<P, G>(property: G, on_change: F) -> Self
    where
        T: 'static,
        P: PartialEq,
        G: Fn(&T) -> P + Send + Sync + 'static,
    {
        let same = move |a: &T, b: &T| property(a) == property(b);
        Self::with_rule(Rule::NotEquivalent(Arc::new(same)), on_change)
    }

    fn with_rule(rule: Rule<T>, on_change: F) -> Self {
        Self {
            rule,
            on_change,
            last_value: None,
        }
    }

    pub fn accept(&mut self, value: T) {
        if let Some(last) = &self.last_value {
            if self.rule.accepts(last, &value) {
                (self.on_change)(last, &value);
            }
        }
        self.last_value = Some(value);
    }

    pub fn last_value(&self) -> Option<&T> {
        self.last_value.as_ref()
    }

    pub fn kind(&self) -> RuleKind {
        self.rule.kind()
    }
}

impl<T: fmt::Debug, F> fmt::Debug for ChangeObserver<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeObserver")
            .field("rule", &self.rule.kind())
            .field("last_value", &self.last_value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn run<T: Clone>(validator: &mut OrderValidator<T>, values: &[T]) -> Vec<bool> {
        values.iter().map(|v| validator.test(v)).collect()
    }

    #[test]
    fn strictly_monotone_rejects_repeat() {
        let mut v = OrderValidator::strictly_monotone_natural();
        assert_eq!(run(&mut v, &[1, 2, 2]), vec![true, true, false]);
        assert_eq!(v.last_accepted(), Some(&2));
    }

    #[test]
    fn rejection_keeps_last_accepted() {
        let mut v = OrderValidator::strictly_monotone_natural();
        assert_eq!(run(&mut v, &[5, 3, 4, 6]), vec![true, false, false, true]);
        assert_eq!(v.last_accepted(), Some(&6));
    }

    #[test]
    fn monotone_allows_equal() {
        let mut v = OrderValidator::monotone_natural();
        assert_eq!(run(&mut v, &[1, 1, 2, 1]), vec![true, true, true, false]);
    }

    #[test]
    fn no_duplicates_only_checks_neighbour() {
        let mut v = OrderValidator::no_duplicates_natural();
        assert_eq!(run(&mut v, &[1, 1, 2, 1]), vec![true, false, true, true]);
    }

    #[test]
    fn not_equal_and_not_equivalent() {
        let mut v = OrderValidator::not_equal();
        assert_eq!(run(&mut v, &["a", "a", "b"]), vec![true, false, true]);

        let mut v = OrderValidator::not_equivalent(|a: &String, b: &String| {
            a.eq_ignore_ascii_case(b)
        });
        let words: Vec<String> = ["Go", "GO", "Rust"].iter().map(|s| s.to_string()).collect();
        assert_eq!(run(&mut v, &words), vec![true, false, true]);
    }

    #[test]
    fn not_same_uses_identity() {
        let a = Rc::new(1);
        let b = Rc::new(1);
        let mut v = OrderValidator::not_same();
        assert!(v.test(&a));
        assert!(!v.test(&Rc::clone(&a)));
        assert!(v.test(&b));
    }

    #[test]
    fn custom_rule() {
        let mut v = OrderValidator::custom(|last: &i32, next: &i32| next - last == 1);
        assert_eq!(run(&mut v, &[3, 4, 6, 5]), vec![true, true, false, true]);
    }

    #[test]
    fn equality_tracks_rule_and_record() {
        let order = order::natural::<i32>();
        let mut a = OrderValidator::strictly_monotone(Arc::clone(&order));
        let mut b = OrderValidator::strictly_monotone(Arc::clone(&order));
        assert_eq!(a, b);

        a.test(&1);
        assert_ne!(a, b);
        b.test(&1);
        assert_eq!(a, b);

        let c = OrderValidator::monotone(order);
        assert_ne!(OrderValidator::strictly_monotone(order::natural()), c);
        assert_eq!(OrderValidator::<i32>::not_equal(), OrderValidator::not_equal());
    }

    #[test]
    fn predicate_form_collapses_adjacent_duplicates() {
        let mut keep = OrderValidator::not_equal().into_predicate();
        let kept: Vec<_> = [1, 1, 2, 2, 1].into_iter().filter(|v| keep(v)).collect();
        assert_eq!(kept, vec![1, 2, 1]);
    }

    #[test]
    fn change_observer_reports_neighbour_changes() {
        let mut changes = Vec::new();
        let mut observer = ChangeObserver::for_value(|a: &i32, b: &i32| changes.push((*a, *b)));
        for v in [1, 1, 2, 2, 2, 3, 1] {
            observer.accept(v);
        }
        assert_eq!(observer.last_value(), Some(&1));
        assert_eq!(observer.kind(), RuleKind::NotEqual);
        drop(observer);
        assert_eq!(changes, vec![(1, 2), (2, 3), (3, 1)]);
    }

    #[test]
    fn change_observer_first_value_is_silent() {
        let mut calls = 0;
        let mut observer = ChangeObserver::for_value(|_: &&str, _: &&str| calls += 1);
        assert_eq!(observer.last_value(), None);
        observer.accept("only");
        assert_eq!(observer.last_value(), Some(&"only"));
        drop(observer);
        assert_eq!(calls, 0);
    }

    #[test]
    fn change_observer_by_identity() {
        let a = Rc::new("x".to_string());
        let b = Rc::new("x".to_string());
        let mut changes = 0;
        let mut observer = ChangeObserver::for_identity(|_: &Rc<String>, _: &Rc<String>| changes += 1);
        observer.accept(Rc::clone(&a));
        observer.accept(Rc::clone(&a));
        observer.accept(Rc::clone(&b));
        drop(observer);
        assert_eq!(changes, 1);
    }

    #[test]
    fn change_observer_by_property() {
        let mut changes = Vec::new();
        let mut observer = ChangeObserver::for_property(
            |word: &&'static str| word.len(),
            |a: &&'static str, b: &&'static str| changes.push(format!("{a}->{b}")),
        );
        for word in ["Go", "Js", "Rust", "Java", "C"] {
            observer.accept(word);
        }
        drop(observer);
        assert_eq!(changes, vec!["Js->Rust", "Java->C"]);
    }

    #[test]
    fn debug_shows_kind() {
        let mut v = OrderValidator::strictly_monotone_natural();
        v.test(&7);
        let s = format!("{v:?}");
        assert!(s.contains("StrictlyMonotone"));
        assert!(s.contains('7'));
        assert_eq!(v.kind().to_string(), "strictly_monotone");
    }
}
