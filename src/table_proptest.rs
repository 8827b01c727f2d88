#![cfg(test)]

// Property tests for the hashtable kept inside the crate so they can
// check chain slot consistency through the hlist internals.

use crate::arena::{Arena, NodeRef};
use crate::hash_table::{self, HashTable};
use crate::hlist::{self, HlistNode, Slot};
use crate::hlist_field;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

struct Entry {
    key: u32,
    hlink: HlistNode,
}
hlist_field!(struct ByHlink for Entry => hlink);

fn entry(arena: &mut Arena<Entry>, key: u32) -> NodeRef {
    arena.insert(Entry {
        key,
        hlink: HlistNode::new(),
    })
}

// Walk every bucket chain and check that each node's back-slot really
// points at the slot holding it, then return all nodes seen.
fn check_chains<const N: usize>(table: &HashTable<N>, arena: &Arena<Entry>) -> Vec<NodeRef> {
    let mut seen = Vec::new();
    for (bucket, head) in table.heads().iter().enumerate() {
        let mut prev: Option<NodeRef> = None;
        let mut cur = head.first();
        while let Some(node) = cur {
            match arena[node].hlink.pprev() {
                Some(Slot::Head(b)) => {
                    assert_eq!(b, bucket, "head slot names the wrong bucket");
                    assert!(prev.is_none(), "head slot on a non-first node");
                }
                Some(Slot::Next(p)) => {
                    assert_eq!(Some(p), prev, "back-slot does not name the predecessor");
                }
                None => panic!("chained node has no back-slot"),
            }
            seen.push(node);
            prev = cur;
            cur = arena[node].hlink.next();
        }
    }
    seen
}

#[derive(Clone, Debug)]
enum Op {
    Add(usize),
    Remove(usize),
    Lookup(usize),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<u32>, Vec<Op>)> {
    // Small key pools guarantee collisions and key reuse.
    proptest::collection::vec(any::<u32>(), 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            idx.clone().prop_map(Op::Add),
            idx.clone().prop_map(Op::Remove),
            idx.clone().prop_map(Op::Lookup),
            Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against a HashMap of node sets.
// Invariants exercised across random operation sequences:
// - Every chained node's back-slot points at the slot that holds it.
// - A key's bucket chain contains exactly the live nodes added under
//   keys hashing to that bucket, and lookup by scan finds each of them.
// - Removal detaches exactly the named node and leaves it unhashed.
// - Whole-table iteration visits each live node exactly once.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_table_state_machine((pool, ops) in arb_scenario()) {
        let mut arena: Arena<Entry> = Arena::new();
        let mut table: HashTable<8> = HashTable::new();
        let mut model: HashMap<u32, Vec<NodeRef>> = HashMap::new();

        for op in ops {
            match op {
                Op::Add(i) => {
                    let key = pool[i];
                    let n = entry(&mut arena, key);
                    table.add(ByHlink, &mut arena, n, key);
                    model.entry(key).or_default().push(n);
                }
                Op::Remove(i) => {
                    let key = pool[i];
                    if let Some(n) = model.get_mut(&key).and_then(|v| v.pop()) {
                        prop_assert!(hash_table::is_hashed(ByHlink, &arena, n));
                        table.remove(ByHlink, &mut arena, n);
                        prop_assert!(!hash_table::is_hashed(ByHlink, &arena, n));
                        arena.remove(n);
                    }
                }
                Op::Lookup(i) => {
                    let key = pool[i];
                    let hits: HashSet<NodeRef> = table
                        .iter_possible(ByHlink, &arena, key)
                        .filter(|(_, e)| e.key == key)
                        .map(|(n, _)| n)
                        .collect();
                    let want: HashSet<NodeRef> =
                        model.get(&key).into_iter().flatten().copied().collect();
                    prop_assert_eq!(hits, want);
                }
                Op::Iterate => {
                    let seen: Vec<NodeRef> =
                        table.iter(ByHlink, &arena).map(|(n, _)| n).collect();
                    let uniq: HashSet<NodeRef> = seen.iter().copied().collect();
                    prop_assert_eq!(uniq.len(), seen.len(), "node visited twice");
                }
            }

            // Post-conditions after each op.
            let chained: HashSet<NodeRef> = check_chains(&table, &arena).into_iter().collect();
            let live: HashSet<NodeRef> = model.values().flatten().copied().collect();
            prop_assert_eq!(chained, live);
            prop_assert_eq!(table.is_empty(), model.values().all(|v| v.is_empty()));
        }
    }
}

// Property: hash_min stays within the bucket range for every key width
// the table accepts.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_bucket_in_range(key32 in any::<u32>(), key64 in any::<u64>()) {
        prop_assert!(HashTable::<8>::bucket(key32) < 8);
        prop_assert!(HashTable::<8>::bucket(key64) < 8);
        prop_assert!(HashTable::<1>::bucket(key32) < 1);
        prop_assert!(HashTable::<256>::bucket(key64) < 256);
    }
}

// Property: moving a whole chain between tables with `move_list`
// preserves the chain's contents and order.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_move_list_preserves_chain(keys in proptest::collection::vec(any::<u32>(), 0..20)) {
        let mut arena: Arena<Entry> = Arena::new();
        let mut heads = [hlist::HlistHead::new(); 2];
        for &k in &keys {
            let n = entry(&mut arena, k);
            hlist::add_head(ByHlink, &mut heads, 0, &mut arena, n);
        }
        let before: Vec<u32> =
            hlist::iter(ByHlink, &arena, &heads[0]).map(|(_, e)| e.key).collect();

        hlist::move_list(ByHlink, &mut heads, 0, 1, &mut arena);

        prop_assert!(heads[0].is_empty());
        let after: Vec<u32> =
            hlist::iter(ByHlink, &arena, &heads[1]).map(|(_, e)| e.key).collect();
        prop_assert_eq!(before, after);
    }
}
