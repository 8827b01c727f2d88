//! Fixed-size bucketed hashtable over hlist chains.
//!
//! A table is nothing more than a compile-time-sized, power-of-two array
//! of [`HlistHead`] buckets. Insertion hashes the key down to
//! `BITS = log2(N)` bits and prepends to that bucket's chain; removal is
//! by node identity and needs no bucket knowledge. There is no resize, no
//! load-factor management, and no element count — if the table fills up,
//! the chains degrade to linear lists, which is the caller's design
//! problem, not this layer's.
//!
//! Lookup is not a primitive: the table is key-comparator-agnostic, so
//! callers scan [`iter_possible`](HashTable::iter_possible) and apply
//! their own key comparison.

use crate::arena::{Arena, NodeRef};
use crate::hash::HashKey;
use crate::hlist::{self, HlistField, HlistHead};

/// `N`-bucket hashtable. `N` must be a nonzero power of two.
#[derive(Debug, Clone)]
pub struct HashTable<const N: usize> {
    buckets: [HlistHead; N],
}

impl<const N: usize> HashTable<N> {
    /// log2 of the bucket count, derived from `N` at compile time.
    pub const BITS: u32 = {
        assert!(N.is_power_of_two(), "bucket count must be a nonzero power of two");
        N.trailing_zeros()
    };

    /// A table with every bucket empty.
    pub fn new() -> Self {
        HashTable {
            buckets: [HlistHead::new(); N],
        }
    }

    pub const fn size(&self) -> usize {
        N
    }

    /// The bucket index `key` hashes to.
    pub fn bucket<K: HashKey>(key: K) -> usize {
        key.hash_min(Self::BITS)
    }

    /// Hash `key` and prepend `node` to the selected bucket's chain.
    /// Within a bucket the newest entry comes first; there is no other
    /// ordering guarantee.
    pub fn add<A, T, K>(&mut self, field: A, arena: &mut Arena<T>, node: NodeRef, key: K)
    where
        A: HlistField<T>,
        K: HashKey,
    {
        let bucket = Self::bucket(key);
        hlist::add_head(field, &mut self.buckets, bucket, arena, node);
    }

    /// Remove `node` from whichever bucket holds it and reset it to the
    /// unhashed state. No-op if the node is not in any table.
    pub fn remove<A, T>(&mut self, field: A, arena: &mut Arena<T>, node: NodeRef)
    where
        A: HlistField<T>,
    {
        hlist::remove_init(field, &mut self.buckets, arena, node);
    }

    /// True if no bucket has a chain. O(N) scan, short-circuiting on the
    /// first occupied bucket; no running count is maintained.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|h| h.is_empty())
    }

    pub fn heads(&self) -> &[HlistHead] {
        &self.buckets
    }

    /// Direct access to the bucket heads, for hlist-level surgery.
    pub fn heads_mut(&mut self) -> &mut [HlistHead] {
        &mut self.buckets
    }

    /// Iterate one bucket's chain.
    pub fn iter_bucket<'a, A, T>(
        &'a self,
        field: A,
        arena: &'a Arena<T>,
        bucket: usize,
    ) -> hlist::Iter<'a, A, T>
    where
        A: HlistField<T>,
    {
        hlist::iter(field, arena, &self.buckets[bucket])
    }

    /// Iterate every node that could match `key`: the chain at `key`'s
    /// bucket. The caller applies its own key comparison to resolve
    /// collisions.
    pub fn iter_possible<'a, A, T, K>(
        &'a self,
        field: A,
        arena: &'a Arena<T>,
        key: K,
    ) -> hlist::Iter<'a, A, T>
    where
        A: HlistField<T>,
        K: HashKey,
    {
        self.iter_bucket(field, arena, Self::bucket(key))
    }

    /// Iterate the whole table, bucket by bucket.
    pub fn iter<'a, A, T>(&'a self, field: A, arena: &'a Arena<T>) -> Iter<'a, A, T>
    where
        A: HlistField<T>,
    {
        Iter {
            field,
            arena,
            buckets: &self.buckets,
            bucket: 0,
            cur: self.buckets.first().and_then(|h| h.first()),
        }
    }

    /// Traverse `key`'s chain, tolerating removal of the visited node.
    /// `f` receives the bucket heads and arena so it can call
    /// [`hlist::remove_init`] (or [`hlist::remove`]) on the visited node.
    pub fn for_each_possible_safe<A, T, K, F>(
        &mut self,
        field: A,
        arena: &mut Arena<T>,
        key: K,
        f: F,
    ) where
        A: HlistField<T>,
        K: HashKey,
        F: FnMut(&mut [HlistHead], &mut Arena<T>, NodeRef),
    {
        let bucket = Self::bucket(key);
        hlist::for_each_safe(field, &mut self.buckets, bucket, arena, f);
    }

    /// Traverse the whole table, tolerating removal of the visited node.
    pub fn for_each_safe<A, T, F>(&mut self, field: A, arena: &mut Arena<T>, mut f: F)
    where
        A: HlistField<T>,
        F: FnMut(&mut [HlistHead], &mut Arena<T>, NodeRef),
    {
        for bucket in 0..N {
            hlist::for_each_safe(field, &mut self.buckets, bucket, arena, &mut f);
        }
    }
}

impl<const N: usize> Default for HashTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `node` currently sits in any table (or chain).
pub fn is_hashed<A, T>(field: A, arena: &Arena<T>, node: NodeRef) -> bool
where
    A: HlistField<T>,
{
    !hlist::unhashed(field, arena, node)
}

/// Whole-table iterator: buckets in index order, chains front to back.
pub struct Iter<'a, A, T> {
    field: A,
    arena: &'a Arena<T>,
    buckets: &'a [HlistHead],
    bucket: usize,
    cur: Option<NodeRef>,
}

impl<'a, A, T> Iterator for Iter<'a, A, T>
where
    A: HlistField<T>,
{
    type Item = (NodeRef, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.cur {
                let arena: &'a Arena<T> = self.arena;
                let obj = &arena[node];
                self.cur = self.field.links(obj).next();
                return Some((node, obj));
            }
            self.bucket += 1;
            if self.bucket >= self.buckets.len() {
                return None;
            }
            self.cur = self.buckets[self.bucket].first();
        }
    }
}
