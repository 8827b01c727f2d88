#![cfg(test)]

// Property tests for the circular list kept inside the crate so they can
// reach the raw link fields when checking ring consistency.

use crate::arena::{Arena, NodeRef};
use crate::list::{self, ListNode};
use crate::list_field;
use proptest::prelude::*;
use std::collections::VecDeque;

struct Rec {
    id: u32,
    link: ListNode,
}
list_field!(struct Link for Rec => link);

fn rec(arena: &mut Arena<Rec>, id: u32) -> NodeRef {
    arena.insert(Rec {
        id,
        link: ListNode::new(),
    })
}

// Walk the ring in both directions and check that every next/prev pair
// agrees, then return the ids in forward order.
fn ring_ids(arena: &Arena<Rec>, head: NodeRef) -> Vec<u32> {
    let mut forward = Vec::new();
    let mut cur = arena[head].link.next();
    while cur != head {
        let next = arena[cur].link.next();
        assert_eq!(arena[next].link.prev(), cur, "broken prev backlink");
        forward.push(arena[cur].id);
        cur = next;
    }
    let mut backward = Vec::new();
    let mut cur = arena[head].link.prev();
    while cur != head {
        backward.push(arena[cur].id);
        cur = arena[cur].link.prev();
    }
    backward.reverse();
    assert_eq!(forward, backward, "forward and reverse walks disagree");
    forward
}

#[derive(Clone, Debug)]
enum Op {
    AddFront(u32),
    AddTail(u32),
    Remove(usize),
    MoveFront(usize),
    MoveTail(usize),
    RotateLeft,
    CutAndSpliceBack(usize),
    Iterate,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        any::<u32>().prop_map(Op::AddFront),
        any::<u32>().prop_map(Op::AddTail),
        any::<usize>().prop_map(Op::Remove),
        any::<usize>().prop_map(Op::MoveFront),
        any::<usize>().prop_map(Op::MoveTail),
        Just(Op::RotateLeft),
        any::<usize>().prop_map(Op::CutAndSpliceBack),
        Just(Op::Iterate),
    ];
    proptest::collection::vec(op, 1..60)
}

// Resolve the handle of the entry at model position `i` by walking the ring.
fn nth(arena: &Arena<Rec>, head: NodeRef, i: usize) -> NodeRef {
    let mut cur = arena[head].link.next();
    for _ in 0..i {
        cur = arena[cur].link.next();
    }
    cur
}

// Property: State-machine equivalence against VecDeque.
// Invariants exercised across random operation sequences:
// - Every next/prev pair on the ring stays mutually consistent.
// - Forward and reverse traversals agree and match the model's order.
// - `remove` poisons the detached node's links.
// - Cutting a prefix into a second list and splicing it back restores
//   the original order exactly.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_list_state_machine(ops in arb_ops()) {
        let mut arena: Arena<Rec> = Arena::new();
        let head = rec(&mut arena, u32::MAX);
        list::init(Link, &mut arena, head);
        let mut model: VecDeque<u32> = VecDeque::new();

        for op in ops {
            match op {
                Op::AddFront(id) => {
                    let n = rec(&mut arena, id);
                    list::add(Link, &mut arena, n, head);
                    model.push_front(id);
                }
                Op::AddTail(id) => {
                    let n = rec(&mut arena, id);
                    list::add_tail(Link, &mut arena, n, head);
                    model.push_back(id);
                }
                Op::Remove(i) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        let n = nth(&arena, head, i);
                        list::remove(Link, &mut arena, n);
                        prop_assert!(arena[n].link.next().is_poison());
                        prop_assert!(arena[n].link.prev().is_poison());
                        model.remove(i);
                        arena.remove(n);
                    }
                }
                Op::MoveFront(i) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        let n = nth(&arena, head, i);
                        list::move_front(Link, &mut arena, n, head);
                        let id = model.remove(i).unwrap();
                        model.push_front(id);
                    }
                }
                Op::MoveTail(i) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        let n = nth(&arena, head, i);
                        list::move_tail(Link, &mut arena, n, head);
                        let id = model.remove(i).unwrap();
                        model.push_back(id);
                    }
                }
                Op::RotateLeft => {
                    list::rotate_left(Link, &mut arena, head);
                    if let Some(id) = model.pop_front() {
                        model.push_back(id);
                    }
                }
                Op::CutAndSpliceBack(i) => {
                    if !model.is_empty() {
                        let i = i % model.len();
                        let entry = nth(&arena, head, i);
                        let out = rec(&mut arena, u32::MAX);
                        list::init(Link, &mut arena, out);
                        list::cut_position(Link, &mut arena, out, head, entry);

                        // Mid-state: `out` holds the prefix up to and
                        // including position i, `head` the remainder.
                        let prefix: Vec<u32> = model.iter().take(i + 1).copied().collect();
                        let rest: Vec<u32> = model.iter().skip(i + 1).copied().collect();
                        prop_assert_eq!(ring_ids(&arena, out), prefix);
                        prop_assert_eq!(ring_ids(&arena, head), rest);

                        list::splice_init(Link, &mut arena, out, head);
                        arena.remove(out);
                    }
                }
                Op::Iterate => {
                    let fwd: Vec<u32> =
                        list::iter(Link, &arena, head).map(|(_, r)| r.id).collect();
                    let mut rev: Vec<u32> =
                        list::iter_rev(Link, &arena, head).map(|(_, r)| r.id).collect();
                    rev.reverse();
                    prop_assert_eq!(&fwd, &rev);
                }
            }

            // Post-conditions after each op.
            let ids = ring_ids(&arena, head);
            let want: Vec<u32> = model.iter().copied().collect();
            prop_assert_eq!(ids, want);
            prop_assert_eq!(list::is_empty(Link, &arena, head), model.is_empty());
        }
    }
}

// Property: for_each_safe visits every entry once in forward order even
// when the callback unlinks and frees the entry it is handed.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_safe_drain(ids in proptest::collection::vec(any::<u32>(), 0..40)) {
        let mut arena: Arena<Rec> = Arena::new();
        let head = rec(&mut arena, u32::MAX);
        list::init(Link, &mut arena, head);
        for &id in &ids {
            let n = rec(&mut arena, id);
            list::add_tail(Link, &mut arena, n, head);
        }

        let mut seen = Vec::new();
        list::for_each_safe(Link, &mut arena, head, |arena, node| {
            seen.push(arena[node].id);
            list::remove(Link, arena, node);
            arena.remove(node);
        });

        prop_assert_eq!(seen, ids);
        prop_assert!(list::is_empty(Link, &arena, head));
        // Only the sentinel remains allocated.
        prop_assert_eq!(arena.len(), 1);
    }
}
