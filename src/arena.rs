//! Arena storage and the `NodeRef` handle type.
//!
//! Every linked structure in this crate stores `NodeRef` handles instead of
//! raw pointers. The objects the handles name live in an [`Arena`], a thin
//! wrapper over a slotmap with generational keys: a handle to a removed
//! object never resolves to a later occupant of the same slot.
//!
//! Two handles are reserved as poison values. No arena ever allocates them,
//! so resolving one through `Index` panics. Removal operations write them
//! into the unlinked node's fields, turning a use-after-remove into an
//! immediate crash instead of silent corruption.

use core::ops::{Index, IndexMut};
use slotmap::{DefaultKey, Key, KeyData, SlotMap};

// Index patterns lifted from the classic non-null poison pointers, paired
// with an all-ones generation that insertion can never reach.
const POISON_NEXT_FFI: u64 = 0xffff_ffff_0010_0100;
const POISON_PREV_FFI: u64 = 0xffff_ffff_0020_0200;

/// Handle to an object stored in an [`Arena`].
///
/// `NodeRef` is `Copy` and comparison is by identity (slot and generation).
/// The default value is the null handle, which no arena resolves.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct NodeRef(DefaultKey);

impl NodeRef {
    pub(crate) fn from_key(k: DefaultKey) -> Self {
        NodeRef(k)
    }

    pub(crate) fn key(self) -> DefaultKey {
        self.0
    }

    /// The null handle. Unlinked `ListNode` fields hold this value.
    pub fn null() -> Self {
        NodeRef(DefaultKey::null())
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    /// Sentinel written into a removed node's forward link.
    ///
    /// Never allocated by any arena; dereferencing it panics.
    pub fn poison_next() -> Self {
        NodeRef(KeyData::from_ffi(POISON_NEXT_FFI).into())
    }

    /// Sentinel written into a removed node's back link.
    pub fn poison_prev() -> Self {
        NodeRef(KeyData::from_ffi(POISON_PREV_FFI).into())
    }

    /// True for either of the two poison sentinels.
    pub fn is_poison(self) -> bool {
        self == Self::poison_next() || self == Self::poison_prev()
    }
}

impl core::fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_null() {
            f.write_str("NodeRef(null)")
        } else if *self == Self::poison_next() {
            f.write_str("NodeRef(poison-next)")
        } else if *self == Self::poison_prev() {
            f.write_str("NodeRef(poison-prev)")
        } else {
            write!(f, "NodeRef({:#x})", self.0.data().as_ffi())
        }
    }
}

/// Object storage with stable, generational handles.
///
/// The arena owns the objects; the list and hashtable modules only rewrite
/// the link fields embedded in them. Removing an object from a list does
/// not remove it from its arena, and vice versa — lifetimes are entirely
/// the caller's decision, as with any intrusive design.
#[derive(Debug, Clone)]
pub struct Arena<T> {
    slots: SlotMap<DefaultKey, T>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }

    /// Insert an object and return its handle.
    pub fn insert(&mut self, value: T) -> NodeRef {
        NodeRef::from_key(self.slots.insert(value))
    }

    /// Insert an object that wants to know its own handle, e.g. a record
    /// whose link field should start out as a self-loop sentinel.
    pub fn insert_with<F>(&mut self, f: F) -> NodeRef
    where
        F: FnOnce(NodeRef) -> T,
    {
        NodeRef::from_key(self.slots.insert_with_key(|k| f(NodeRef::from_key(k))))
    }

    /// Remove an object from the arena. The caller is responsible for
    /// unlinking it from any list first; the arena does not know about
    /// link fields.
    pub fn remove(&mut self, node: NodeRef) -> Option<T> {
        self.slots.remove(node.key())
    }

    pub fn get(&self, node: NodeRef) -> Option<&T> {
        self.slots.get(node.key())
    }

    pub fn get_mut(&mut self, node: NodeRef) -> Option<&mut T> {
        self.slots.get_mut(node.key())
    }

    pub fn contains(&self, node: NodeRef) -> bool {
        self.slots.contains_key(node.key())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &T)> {
        self.slots.iter().map(|(k, v)| (NodeRef::from_key(k), v))
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cold]
#[inline(never)]
fn bad_handle(node: NodeRef) -> ! {
    panic!("dereferenced a stale, null, or poisoned handle: {:?}", node)
}

impl<T> Index<NodeRef> for Arena<T> {
    type Output = T;

    fn index(&self, node: NodeRef) -> &T {
        match self.slots.get(node.key()) {
            Some(v) => v,
            None => bad_handle(node),
        }
    }
}

impl<T> IndexMut<NodeRef> for Arena<T> {
    fn index_mut(&mut self, node: NodeRef) -> &mut T {
        match self.slots.get_mut(node.key()) {
            Some(v) => v,
            None => bad_handle(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: The poison handles are distinct from each other, from the
    /// null handle, and from every handle an arena hands out.
    #[test]
    fn poison_handles_are_reserved() {
        assert_ne!(NodeRef::poison_next(), NodeRef::poison_prev());
        assert_ne!(NodeRef::poison_next(), NodeRef::null());
        assert_ne!(NodeRef::poison_prev(), NodeRef::null());

        let mut arena: Arena<u32> = Arena::new();
        for i in 0..1024 {
            let n = arena.insert(i);
            assert!(!n.is_poison());
            assert!(!n.is_null());
        }
    }

    /// Invariant: Resolving a poison handle panics rather than yielding an
    /// object.
    #[test]
    #[should_panic(expected = "poisoned")]
    fn poison_deref_panics() {
        let arena: Arena<u32> = Arena::new();
        let _ = &arena[NodeRef::poison_next()];
    }

    /// Invariant: A removed object's handle never resolves to a later
    /// occupant of the same slot (generational keys).
    #[test]
    fn stale_handle_does_not_alias() {
        let mut arena: Arena<&'static str> = Arena::new();
        let a = arena.insert("old");
        assert_eq!(arena.remove(a), Some("old"));
        let b = arena.insert("new");
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(b), Some(&"new"));
    }

    /// Invariant: `insert_with` exposes the final handle to the
    /// constructor, so self-referential records can be built in one step.
    #[test]
    fn insert_with_sees_own_handle() {
        struct SelfRef {
            me: NodeRef,
        }
        let mut arena: Arena<SelfRef> = Arena::new();
        let n = arena.insert_with(|me| SelfRef { me });
        assert_eq!(arena[n].me, n);
    }

    #[test]
    #[should_panic(expected = "stale")]
    fn stale_deref_panics() {
        let mut arena: Arena<u8> = Arena::new();
        let n = arena.insert(1);
        arena.remove(n);
        let _ = &arena[n];
    }
}
