#![cfg(test)]

// Property tests for BucketHashMap kept inside the crate so they can
// check the private bucket layout after every operation.

use crate::bucket_hash_map::{BucketHashMap, KeyNotFound};
use crate::policy::ResizePolicy;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    GetOrDefault(usize, i32),
    Remove(usize),
    Find(usize),
    At(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    // Pools up to 64 keys so runs cross several grow and shrink thresholds.
    proptest::collection::vec("[a-z]{0,5}", 1..=64).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let at_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::GetOrDefault(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Find),
            1 => prop_oneof![
                at_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::At),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_state_machine<S>(
    mut sut: BucketHashMap<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher,
{
    let mut model: HashMap<Key, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let already = model.contains_key(&k);
                let inserted = sut.insert(k.clone(), v);
                prop_assert_eq!(inserted, !already, "insert reports whether the key was new");
                model.entry(k).or_insert(v);
            }
            OpI::GetOrDefault(i, v) => {
                let k = key_from(pool, i);
                let slot = sut.get_or_default(k.clone());
                let mv = model.entry(k).or_default();
                prop_assert_eq!(*slot, *mv);
                *slot = v;
                *mv = v;
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                let got = sut.remove(&k);
                let want = model.remove(&k).map(|v| (k.clone(), v));
                prop_assert_eq!(got, want);
                prop_assert!(sut.find(&k) == sut.cursor_end());
            }
            OpI::Find(i) => {
                let k = key_from(pool, i);
                let c = sut.find(&k);
                match model.get(&k) {
                    Some(v) => prop_assert_eq!(c.entry(), Some((&k, v))),
                    None => prop_assert!(c == sut.cursor_end()),
                }
            }
            OpI::At(s) => {
                let want = model.get(s.as_str()).ok_or(KeyNotFound);
                let before = sut.len();
                prop_assert_eq!(sut.at(s.as_str()), want);
                prop_assert_eq!(sut.len(), before);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(v) = sut.find_mut(&k).into_value_mut() {
                    *v = v.saturating_add(d);
                    let mv = model.get_mut(&k).expect("model tracks every live key");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Iterate => {
                let s: BTreeMap<_, _> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m: BTreeMap<_, _> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s, m);
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), 1);
            }
        }

        // Post-conditions after each op
        sut.check_layout();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.iter().count(), model.len());
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - First write wins; `insert` reports `true` only for new keys.
// - `find`/`at` agree with the model; `at` never mutates.
// - `remove` returns the owned `(K,V)` and leaves `find == cursor_end`.
// - Every entry sits in its hash bucket; the resize policy bound holds.
// - `len`/`is_empty`/iteration count parity with the model after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(BucketHashMap::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants under worst-case collisions,
// with a tight custom policy so resizes happen often.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = BucketHashMap::with_hasher_and_policy(ConstBuildHasher, ResizePolicy::new(2, 3));
        run_state_machine(sut, &pool, ops)?;
    }
}

// Property: The smallest policy (load factor 1, resize factor 2) has a
// shrink window narrower than one resize step; the grow bound must
// still hold after every op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_tight_policy((pool, ops) in arb_scenario()) {
        let sut = BucketHashMap::with_policy(ResizePolicy::new(1, 2));
        run_state_machine(sut, &pool, ops)?;
    }
}

// Property: Walking cursors from front to end visits every key exactly
// once, buckets ascending, and agrees with `iter`.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_cursor_walk_matches_iter(keys in proptest::collection::vec(any::<u16>(), 0..300)) {
        let m: BucketHashMap<u16, usize> = keys.iter().enumerate().map(|(i, &k)| (k, i)).collect();
        let mut c = m.cursor_front();
        let mut walked = Vec::new();
        let mut last_bucket = 0;
        while c != m.cursor_end() {
            let (b, _) = c.position();
            prop_assert!(b >= last_bucket);
            last_bucket = b;
            walked.push(*c.key().expect("non-end cursor is readable"));
            c.move_next();
        }
        let from_iter: Vec<u16> = m.keys().copied().collect();
        prop_assert_eq!(&walked, &from_iter);
        let distinct: BTreeSet<u16> = keys.iter().copied().collect();
        prop_assert_eq!(walked.len(), distinct.len());
        prop_assert_eq!(walked.into_iter().collect::<BTreeSet<_>>(), distinct);
        // First occurrence wins.
        for (i, k) in keys.iter().enumerate() {
            let first = keys.iter().position(|x| x == k).unwrap();
            if first == i {
                prop_assert_eq!(m.at(k), Ok(&i));
            }
        }
    }
}
