//! entwine: arena-backed intrusive linked lists and a fixed-bucket
//! hashtable.
//!
//! Internal design:
//!
//! Summary
//! - Goal: let many objects sit on many frequently-reorganized
//!   collections without per-collection allocation, in safe, verifiable
//!   layers that can each be reasoned about independently.
//! - Layers, leaf first:
//!   - `arena`: object storage with generational `NodeRef` handles; all
//!     linkage below is expressed in handles, never references.
//!   - `list`: circular doubly-linked list with a self-loop sentinel —
//!     insert, remove, move, rotate, cut, splice, iterate.
//!   - `hlist`: doubly-linked chain with a single-handle head, whose
//!     nodes back-reference the *slot* that points at them; built for
//!     hashtable buckets.
//!   - `fifo`: queue naming over `list`.
//!   - `hash`: golden-ratio multiplicative hashing with key-size
//!     dispatch.
//!   - `hash_table`: a power-of-two array of `hlist` heads; add hashes
//!     and prepends, remove is by node identity.
//!
//! Constraints
//! - Intrusive: link fields are embedded in the caller's records; the
//!   collections never own the records, and removing a record from a
//!   collection frees nothing.
//! - Single mutator: no internal synchronization. One logical mutator
//!   per list/chain/table at a time is the caller's job.
//! - No recoverable errors at this layer: operations either complete or
//!   the caller broke a precondition. Stale, null, and poisoned handles
//!   panic at the arena boundary instead of corrupting silently.
//! - Fixed tables: bucket counts are compile-time powers of two; there
//!   is no resize or load-factor management.
//!
//! Why handles instead of pointers?
//! - The C ancestry of this design lives on raw pointer surgery and
//!   `container_of` offset arithmetic. Generational handles keep the
//!   same O(1) algebra — every operation is a bounded set of handle
//!   rewrites — while making every dangling-link mistake a deterministic
//!   panic rather than undefined behavior.
//!
//! Field selectors
//! - A record may embed any number of link fields. Each operation takes
//!   a zero-sized selector value (see [`list_field!`] and
//!   [`hlist_field!`]) naming the field to rewrite, which is the
//!   handle-world rendition of passing a member offset at the call site.
//!
//! ```
//! use entwine::{hlist_field, list_field, Arena, Fifo, HashTable, HlistNode, ListNode};
//!
//! struct Session {
//!     key: u32,
//!     by_age: ListNode,
//!     by_key: HlistNode,
//! }
//! list_field!(struct ByAge for Session => by_age);
//! hlist_field!(struct ByKey for Session => by_key);
//!
//! let mut arena: Arena<Session> = Arena::new();
//! let mut index: HashTable<8> = HashTable::new();
//! let anchor = arena.insert(Session { key: 0, by_age: ListNode::new(), by_key: HlistNode::new() });
//! let queue = Fifo::new(ByAge, &mut arena, anchor);
//!
//! let s = arena.insert(Session { key: 7, by_age: ListNode::new(), by_key: HlistNode::new() });
//! queue.enqueue(ByAge, &mut arena, s);
//! index.add(ByKey, &mut arena, s, 7u32);
//!
//! let hit = index
//!     .iter_possible(ByKey, &arena, 7u32)
//!     .find(|(_, sess)| sess.key == 7)
//!     .map(|(node, _)| node);
//! assert_eq!(hit, Some(s));
//! ```

pub mod arena;
pub mod fifo;
pub mod hash;
pub mod hash_table;
pub mod hlist;
pub mod list;

mod list_proptest;
mod table_proptest;

// Public surface
pub use arena::{Arena, NodeRef};
pub use fifo::Fifo;
pub use hash::HashKey;
pub use hash_table::HashTable;
pub use hlist::{HlistHead, HlistNode, Slot};
pub use list::ListNode;
