use std::collections::{BTreeMap, HashMap};

use keymerge::prelude::*;

#[test]
fn test_map_source_round_trip() {
    let map: BTreeMap<&str, i32> = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
    let mut copy = BTreeMap::new();
    from_map(map.clone()).extend_into(&mut copy);
    assert_eq!(copy, map);
}

#[test]
fn test_lookup_and_index_sources() {
    let ages: HashMap<&str, u32> = [("ann", 31), ("bob", 27)].into_iter().collect();
    let pairs: Vec<(&str, Option<u32>)> =
        lookup_keys(vec!["ann", "bob", "cid"], |name: &&str| ages.get(name).copied()).collect_pairs();
    assert_eq!(pairs, vec![("ann", Some(31)), ("bob", Some(27)), ("cid", None)]);

    let pairs: Vec<(char, &str)> = index_values(vec!["x-ray", "yak"], |w: &&str| {
        w.chars().next().unwrap_or(' ')
    })
    .collect_pairs();
    assert_eq!(pairs, vec![('x', "x-ray"), ('y', "yak")]);
}

#[test]
fn test_enumerate_keys_by_position() {
    let pairs: Vec<(usize, char)> = enumerate("abc".chars()).collect_pairs();
    assert_eq!(pairs, vec![(0, 'a'), (1, 'b'), (2, 'c')]);
}

#[test]
fn test_filters_and_transforms_compose_in_order() {
    let pairs: Vec<(String, i32)> = from_pairs((1..=6).map(|i| (i, i * 10)))
        .filter_keys(|k: &i32| *k > 1)
        .filter_keys(|k: &i32| *k < 6)
        .filter_values(|v: &i32| *v != 30)
        .transform_keys(|k: i32| k * 2)
        .transform_keys(|k: i32| format!("k{k}"))
        .transform_values(|v: i32| v + 1)
        .collect_pairs();
    assert_eq!(
        pairs,
        vec![
            ("k4".to_string(), 21),
            ("k8".to_string(), 41),
            ("k10".to_string(), 51),
        ]
    );
}

#[test]
fn test_from_fn_is_sticky_after_first_none() {
    let mut calls = 0;
    let mut script = vec![Some((1, 'a')), None, Some((2, 'b'))].into_iter();
    let mut src = from_fn(|| {
        calls += 1;
        script.next().flatten()
    });
    assert_eq!(src.next_pair(), Some((1, 'a')));
    assert_eq!(src.next_pair(), None);
    assert_eq!(src.next_pair(), None);
    drop(src);
    assert_eq!(calls, 2);
}

#[test]
fn test_every_source_stays_exhausted() {
    fn assert_sticky<S: PairSource>(mut source: S) {
        while source.next_pair().is_some() {}
        for _ in 0..3 {
            assert!(!source.try_advance(&mut |_, _| panic!("visited after exhaustion")));
        }
        let mut visits = 0;
        source.for_each(|_, _| visits += 1);
        assert_eq!(visits, 0);
    }

    assert_sticky(from_pairs(vec![(1, 2)]));
    assert_sticky(from_map(BTreeMap::from([(1, 2)])));
    assert_sticky(enumerate(vec!['a']));
    assert_sticky(index_values(vec![3], |v: &i32| *v));
    assert_sticky(lookup_keys(vec![3], |k: &i32| *k));
    assert_sticky(from_pairs(vec![(1, 2)]).filter_keys(|_: &i32| true));
    assert_sticky(from_pairs(vec![(1, 2)]).transform_values(|v: i32| v));
}

#[test]
fn test_iterator_view_and_boxed_sources() {
    let boxed: Box<dyn PairSource<Key = i32, Value = i32>> = Box::new(from_pairs(vec![(1, 1), (2, 4)]));
    let squares: Vec<i32> = boxed.into_pairs().map(|(_, v)| v).collect();
    assert_eq!(squares, vec![1, 4]);

    let mut src = from_pairs(vec![(1, 'a'), (2, 'b')]);
    assert_eq!((&mut src).next_pair(), Some((1, 'a')));
    let rest: Vec<(i32, char)> = src.collect_pairs();
    assert_eq!(rest, vec![(2, 'b')]);
}
