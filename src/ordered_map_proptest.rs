#![cfg(test)]

// Property tests for OrderedMap kept inside the crate so they can build maps
// below the public capacity floor and force early resizes.

use crate::hashing::{KeyHasher, StdEq, StdHash};
use crate::options::OrderingMode;
use crate::ordered_map::OrderedMap;
use proptest::prelude::*;

// Pool-indexed operations so shrinking walks toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Get(usize),
    Contains(usize),
    Peek(usize),
    Remove(usize),
    PopBack,
    Clear,
}

/// Reference model: entries in exposed order, head first.
struct Model {
    ordering: OrderingMode,
    entries: Vec<(String, i32)>,
}

impl Model {
    fn position(&self, k: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == k)
    }

    fn touch(&mut self, pos: usize) {
        if self.ordering == OrderingMode::AccessOrder {
            let e = self.entries.remove(pos);
            self.entries.insert(0, e);
        }
    }

    fn put(&mut self, k: &str, v: i32) -> Option<i32> {
        match self.position(k) {
            Some(pos) => {
                let old = core::mem::replace(&mut self.entries[pos].1, v);
                self.touch(pos);
                Some(old)
            }
            None => {
                let e = (k.to_string(), v);
                match self.ordering {
                    OrderingMode::InsertionOrder => self.entries.push(e),
                    OrderingMode::AccessOrder => self.entries.insert(0, e),
                }
                None
            }
        }
    }

    fn get(&mut self, k: &str) -> Option<i32> {
        let pos = self.position(k)?;
        let v = self.entries[pos].1;
        self.touch(pos);
        Some(v)
    }
}

fn arb_scenario() -> impl Strategy<Value = (bool, usize, Vec<String>, Vec<Op>)> {
    let load_factor_idx = 0usize..4;
    (
        any::<bool>(),
        load_factor_idx,
        proptest::collection::vec("[a-z]{0,4}", 1..=24),
    )
        .prop_flat_map(|(access, lf, pool)| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
                2 => idx.clone().prop_map(Op::Get),
                1 => idx.clone().prop_map(Op::Contains),
                1 => idx.clone().prop_map(Op::Peek),
                2 => idx.clone().prop_map(Op::Remove),
                1 => Just(Op::PopBack),
                1 => Just(Op::Clear),
            ];
            proptest::collection::vec(op, 1..120)
                .prop_map(move |ops| (access, lf, pool.clone(), ops))
        })
}

const LOAD_FACTORS: [f32; 4] = [0.5, 0.75, 1.0, 2.0];

fn check<H: KeyHasher<String>>(
    sut: &OrderedMap<String, i32, H, StdEq>,
    model: &Model,
) -> Result<(), TestCaseError> {
    sut.debug_validate();
    prop_assert_eq!(sut.len(), model.entries.len());
    prop_assert_eq!(sut.is_empty(), model.entries.is_empty());
    let got: Vec<(String, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
    prop_assert_eq!(&got, &model.entries);
    prop_assert!(sut.len() <= sut.threshold());
    Ok(())
}

// Property: state-machine equivalence against an ordered Vec model.
// Invariants exercised across random operation sequences:
// - `put` returns the superseded value; `len` counts distinct keys.
// - Export order matches the model for the chosen ordering mode.
// - Misses never reorder or mutate.
// - Both chain membership and order-list links stay consistent through
//   resizes (`debug_validate` after every step).
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_matches_ordered_model((access, lf, pool, ops) in arb_scenario()) {
        let ordering = if access {
            OrderingMode::AccessOrder
        } else {
            OrderingMode::InsertionOrder
        };
        let mut sut: OrderedMap<String, i32> = OrderedMap::with_raw_capacity(
            4,
            LOAD_FACTORS[lf],
            ordering,
            StdHash::default(),
            StdEq,
        );
        let mut model = Model { ordering, entries: Vec::new() };

        for op in ops {
            match op {
                Op::Put(i, v) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.put(k.clone(), v), model.put(k, v));
                }
                Op::Get(i) => {
                    let k = pool[i].as_str();
                    prop_assert_eq!(sut.get(k).copied(), model.get(k));
                }
                Op::Contains(i) => {
                    let k = pool[i].as_str();
                    prop_assert_eq!(sut.contains(k), model.get(k).is_some());
                }
                Op::Peek(i) => {
                    let k = pool[i].as_str();
                    let expected = model.position(k).map(|p| model.entries[p].1);
                    prop_assert_eq!(sut.peek(k).copied(), expected);
                }
                Op::Remove(i) => {
                    let k = pool[i].as_str();
                    let expected = model.position(k).map(|p| model.entries.remove(p).1);
                    prop_assert_eq!(sut.remove(k), expected);
                }
                Op::PopBack => {
                    prop_assert_eq!(sut.pop_back(), model.entries.pop());
                }
                Op::Clear => {
                    let cap = sut.capacity();
                    sut.clear();
                    model.entries.clear();
                    prop_assert_eq!(sut.capacity(), cap);
                }
            }
            check(&sut, &model)?;
        }
    }
}

// Property: capacity only ever doubles, and only when a fresh insert pushes
// `len` past the threshold.
proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
    #[test]
    fn prop_capacity_doubles_only_past_threshold(
        keys in proptest::collection::vec(0u32..500, 1..300)
    ) {
        let mut sut: OrderedMap<u32, u32> = OrderedMap::new();
        for k in keys {
            let (cap, threshold, len) = (sut.capacity(), sut.threshold(), sut.len());
            let fresh = sut.put(k, k).is_none();
            if fresh && len + 1 > threshold {
                prop_assert_eq!(sut.capacity(), cap * 2);
            } else {
                prop_assert_eq!(sut.capacity(), cap);
            }
            prop_assert!(sut.capacity().is_power_of_two());
        }
        sut.debug_validate();
    }
}
