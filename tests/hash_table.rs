// Hashtable scenarios through the public API.

use entwine::{hlist_field, Arena, HashTable, HlistNode, NodeRef};

struct Conn {
    port: u32,
    by_port: HlistNode,
}
hlist_field!(struct ByPort for Conn => by_port);

fn conn(arena: &mut Arena<Conn>, port: u32) -> NodeRef {
    arena.insert(Conn {
        port,
        by_port: HlistNode::new(),
    })
}

fn lookup<const N: usize>(
    table: &HashTable<N>,
    arena: &Arena<Conn>,
    port: u32,
) -> Option<NodeRef> {
    table
        .iter_possible(ByPort, arena, port)
        .find(|(_, c)| c.port == port)
        .map(|(n, _)| n)
}

#[test]
fn collision_round_trip() {
    let mut arena = Arena::new();
    let mut table: HashTable<8> = HashTable::new();

    // Two distinct keys forced into the same bucket.
    let p1 = 80u32;
    let mut p2 = p1 + 1;
    while HashTable::<8>::bucket(p2) != HashTable::<8>::bucket(p1) {
        p2 += 1;
    }

    let c1 = conn(&mut arena, p1);
    let c2 = conn(&mut arena, p2);
    table.add(ByPort, &mut arena, c1, p1);
    table.add(ByPort, &mut arena, c2, p2);

    // Both resolve despite sharing a chain.
    assert_eq!(lookup(&table, &arena, p1), Some(c1));
    assert_eq!(lookup(&table, &arena, p2), Some(c2));

    // Removing one leaves the other reachable and the table non-empty.
    table.remove(ByPort, &mut arena, c1);
    assert_eq!(lookup(&table, &arena, p1), None);
    assert_eq!(lookup(&table, &arena, p2), Some(c2));
    assert!(!table.is_empty());

    table.remove(ByPort, &mut arena, c2);
    assert!(table.is_empty());
}

#[test]
fn wide_keys_and_narrow_keys_share_a_table() {
    // Keys of any hashable width can index the same table; only the
    // derived bucket matters.
    let mut arena = Arena::new();
    let mut table: HashTable<16> = HashTable::new();

    let a = conn(&mut arena, 1);
    let b = conn(&mut arena, 2);
    table.add(ByPort, &mut arena, a, 0xdead_beefu32);
    table.add(ByPort, &mut arena, b, 0xdead_beef_dead_beefu64);

    assert_eq!(table.iter(ByPort, &arena).count(), 2);
    table.remove(ByPort, &mut arena, a);
    table.remove(ByPort, &mut arena, b);
    assert!(table.is_empty());
}

#[test]
fn expire_scan_with_removal() {
    // Walk the whole table and drop stale entries in place.
    let mut arena = Arena::new();
    let mut table: HashTable<8> = HashTable::new();
    for port in 0u32..50 {
        let c = conn(&mut arena, port);
        table.add(ByPort, &mut arena, c, port);
    }

    table.for_each_safe(ByPort, &mut arena, |heads, arena, node| {
        if arena[node].port % 2 == 0 {
            entwine::hlist::remove_init(ByPort, heads, arena, node);
            arena.remove(node);
        }
    });

    let mut left: Vec<u32> = table.iter(ByPort, &arena).map(|(_, c)| c.port).collect();
    left.sort_unstable();
    assert_eq!(left, (0u32..50).filter(|p| p % 2 == 1).collect::<Vec<_>>());
    assert_eq!(arena.len(), 25);
}
