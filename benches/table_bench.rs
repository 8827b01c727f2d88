use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use entwine::hash::hash_64;
use entwine::{hlist_field, Arena, HashTable, HlistNode};
use std::time::Duration;

struct Entry {
    key: u64,
    hlink: HlistNode,
}
hlist_field!(struct ByHlink for Entry => hlink);

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

const BUCKETS: usize = 1024;

fn populated(n: usize) -> (Arena<Entry>, HashTable<BUCKETS>, Vec<u64>) {
    let mut arena = Arena::with_capacity(n);
    let mut table: HashTable<BUCKETS> = HashTable::new();
    let keys: Vec<u64> = lcg(3).take(n).collect();
    for &key in &keys {
        let node = arena.insert(Entry {
            key,
            hlink: HlistNode::new(),
        });
        table.add(ByHlink, &mut arena, node, key);
    }
    (arena, table, keys)
}

fn bench_hash(c: &mut Criterion) {
    c.bench_function("hash_64", |b| {
        let mut it = lcg(17);
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(hash_64(black_box(k), 10));
        })
    });
}

fn bench_add(c: &mut Criterion) {
    c.bench_function("table_add_10k", |b| {
        b.iter_batched(
            || {
                (
                    Arena::with_capacity(10_000),
                    HashTable::<BUCKETS>::new(),
                )
            },
            |(mut arena, mut table)| {
                for key in lcg(1).take(10_000) {
                    let node = arena.insert(Entry {
                        key,
                        hlink: HlistNode::new(),
                    });
                    table.add(ByHlink, &mut arena, node, key);
                }
                black_box((arena, table))
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lookup_hit(c: &mut Criterion) {
    c.bench_function("table_lookup_hit", |b| {
        let (arena, table, keys) = populated(10_000);
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = *it.next().unwrap();
            let hit = table
                .iter_possible(ByHlink, &arena, k)
                .find(|(_, e)| e.key == k);
            black_box(hit.is_some());
        })
    });
}

fn bench_lookup_miss(c: &mut Criterion) {
    c.bench_function("table_lookup_miss", |b| {
        let (arena, table, _keys) = populated(10_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // keys unlikely to be in the table
            let k = miss.next().unwrap();
            let hit = table
                .iter_possible(ByHlink, &arena, k)
                .find(|(_, e)| e.key == k);
            black_box(hit.is_none());
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_hash, bench_add, bench_lookup_hit, bench_lookup_miss
}
criterion_main!(benches);
