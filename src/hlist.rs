//! Doubly-linked chains with a single-handle head.
//!
//! The head holds only a `first` handle, which is what makes this the
//! chain type for hashtable buckets: a bucket array of one-handle heads is
//! half the size of an array of circular-list sentinels, and chains never
//! need O(1) tail access.
//!
//! Each chained node carries `next` plus a back-reference `pprev` to the
//! *slot* that currently points at it — either some head's `first` field
//! or some node's `next` field. That slot reference is what buys O(1)
//! removal without knowing the predecessor node or whether the predecessor
//! is the head. In C this is a pointer-to-pointer; here it is the tagged
//! [`Slot`], and operations that may have to rewrite a head slot take the
//! `&mut [HlistHead]` the chain hangs off.
//!
//! Consistency invariant: for every chained node `n`, resolving `n.pprev`
//! yields `Some(n)`. A node with `pprev == None` is unhashed (on no chain).

use crate::arena::{Arena, NodeRef};

/// Chain head: one handle, or `None` for an empty chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct HlistHead {
    first: Option<NodeRef>,
}

impl HlistHead {
    pub const fn new() -> Self {
        HlistHead { first: None }
    }

    pub fn first(&self) -> Option<NodeRef> {
        self.first
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    pub fn init(&mut self) {
        self.first = None;
    }
}

/// A storage location that can hold a handle to a chain member: a head's
/// `first` field (named by its index in the head slice) or a node's
/// `next` field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Head(usize),
    Next(NodeRef),
}

/// Embedded chain link field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct HlistNode {
    next: Option<NodeRef>,
    pprev: Option<Slot>,
}

impl HlistNode {
    /// A new, unhashed node.
    pub const fn new() -> Self {
        HlistNode {
            next: None,
            pprev: None,
        }
    }

    pub fn next(&self) -> Option<NodeRef> {
        self.next
    }

    /// The slot currently pointing at this node, or `None` if unhashed.
    pub fn pprev(&self) -> Option<Slot> {
        self.pprev
    }
}

/// Selects one embedded [`HlistNode`] field of a record.
pub trait HlistField<T>: Copy {
    fn links(self, owner: &T) -> &HlistNode;
    fn links_mut(self, owner: &mut T) -> &mut HlistNode;
}

/// Generates an [`HlistField`] selector for one `HlistNode` field.
#[macro_export]
macro_rules! hlist_field {
    ($vis:vis struct $name:ident for $owner:ty => $field:ident) => {
        #[derive(Copy, Clone, Debug)]
        $vis struct $name;

        impl $crate::hlist::HlistField<$owner> for $name {
            #[inline]
            fn links(self, owner: &$owner) -> &$crate::hlist::HlistNode {
                &owner.$field
            }
            #[inline]
            fn links_mut(self, owner: &mut $owner) -> &mut $crate::hlist::HlistNode {
                &mut owner.$field
            }
        }
    };
}

/// Reset `node` to the unhashed state.
pub fn init_node<A, T>(field: A, arena: &mut Arena<T>, node: NodeRef)
where
    A: HlistField<T>,
{
    *field.links_mut(&mut arena[node]) = HlistNode::new();
}

/// True iff `node` is on no chain.
pub fn unhashed<A, T>(field: A, arena: &Arena<T>, node: NodeRef) -> bool
where
    A: HlistField<T>,
{
    field.links(&arena[node]).pprev.is_none()
}

/// Read the handle currently stored in `slot`.
pub fn resolve<A, T>(field: A, heads: &[HlistHead], arena: &Arena<T>, slot: Slot) -> Option<NodeRef>
where
    A: HlistField<T>,
{
    match slot {
        Slot::Head(i) => heads[i].first,
        Slot::Next(p) => field.links(&arena[p]).next,
    }
}

fn write_slot<A, T>(
    field: A,
    heads: &mut [HlistHead],
    arena: &mut Arena<T>,
    slot: Slot,
    to: Option<NodeRef>,
) where
    A: HlistField<T>,
{
    match slot {
        Slot::Head(i) => heads[i].first = to,
        Slot::Next(p) => field.links_mut(&mut arena[p]).next = to,
    }
}

/// Prepend `node` to the chain at `heads[bucket]`.
pub fn add_head<A, T>(
    field: A,
    heads: &mut [HlistHead],
    bucket: usize,
    arena: &mut Arena<T>,
    node: NodeRef,
) where
    A: HlistField<T>,
{
    let first = heads[bucket].first;
    field.links_mut(&mut arena[node]).next = first;
    if let Some(f) = first {
        field.links_mut(&mut arena[f]).pprev = Some(Slot::Next(node));
    }
    heads[bucket].first = Some(node);
    field.links_mut(&mut arena[node]).pprev = Some(Slot::Head(bucket));
}

/// Insert `node` immediately before `before`, which must already be
/// chained. Takes the head slice because `before` may be first in its
/// chain, in which case the head slot is the one rewritten.
pub fn add_before<A, T>(
    field: A,
    heads: &mut [HlistHead],
    arena: &mut Arena<T>,
    node: NodeRef,
    before: NodeRef,
) where
    A: HlistField<T>,
{
    let slot = field
        .links(&arena[before])
        .pprev
        .expect("add_before target is unhashed");
    {
        let links = field.links_mut(&mut arena[node]);
        links.pprev = Some(slot);
        links.next = Some(before);
    }
    field.links_mut(&mut arena[before]).pprev = Some(Slot::Next(node));
    write_slot(field, heads, arena, slot, Some(node));
}

/// Insert `node` immediately after `after`, which must already be
/// chained. Never touches a head slot.
pub fn add_after<A, T>(field: A, arena: &mut Arena<T>, node: NodeRef, after: NodeRef)
where
    A: HlistField<T>,
{
    debug_assert!(
        field.links(&arena[after]).pprev.is_some(),
        "add_after target is unhashed"
    );
    let after_next = field.links(&arena[after]).next;
    {
        let links = field.links_mut(&mut arena[node]);
        links.next = after_next;
        links.pprev = Some(Slot::Next(after));
    }
    field.links_mut(&mut arena[after]).next = Some(node);
    if let Some(n) = after_next {
        field.links_mut(&mut arena[n]).pprev = Some(Slot::Next(node));
    }
}

/// Make `node` appear chained by pointing its `pprev` at its own `next`
/// slot. A subsequent [`remove`]/[`remove_init`] then works without the
/// node ever having been on a real chain.
pub fn add_fake<A, T>(field: A, arena: &mut Arena<T>, node: NodeRef)
where
    A: HlistField<T>,
{
    field.links_mut(&mut arena[node]).pprev = Some(Slot::Next(node));
}

// Repoint the slot that holds `node` at `node.next`, and fix the
// successor's back-reference. The node's own fields are left untouched.
fn unlink<A, T>(field: A, heads: &mut [HlistHead], arena: &mut Arena<T>, node: NodeRef)
where
    A: HlistField<T>,
{
    let (next, slot) = {
        let links = field.links(&arena[node]);
        (
            links.next,
            links.pprev.expect("removing an unhashed node"),
        )
    };
    write_slot(field, heads, arena, slot, next);
    if let Some(n) = next {
        field.links_mut(&mut arena[n]).pprev = Some(slot);
    }
}

/// Unlink `node` from its chain and poison its fields.
///
/// `heads` must be the slice the node's chain hangs off; nodes do not
/// record which slice owns them.
pub fn remove<A, T>(field: A, heads: &mut [HlistHead], arena: &mut Arena<T>, node: NodeRef)
where
    A: HlistField<T>,
{
    unlink(field, heads, arena, node);
    let links = field.links_mut(&mut arena[node]);
    links.next = Some(NodeRef::poison_next());
    links.pprev = Some(Slot::Next(NodeRef::poison_prev()));
}

/// Unlink `node` and reset it to the unhashed state. No-op if `node` is
/// already unhashed.
pub fn remove_init<A, T>(field: A, heads: &mut [HlistHead], arena: &mut Arena<T>, node: NodeRef)
where
    A: HlistField<T>,
{
    if !unhashed(field, arena, node) {
        unlink(field, heads, arena, node);
        init_node(field, arena, node);
    }
}

/// Transfer an entire chain from `heads[from]` to `heads[to]` in O(1),
/// fixing up only the first node's back-reference.
pub fn move_list<A, T>(
    field: A,
    heads: &mut [HlistHead],
    from: usize,
    to: usize,
    arena: &mut Arena<T>,
) where
    A: HlistField<T>,
{
    heads[to].first = heads[from].first;
    if let Some(f) = heads[to].first {
        field.links_mut(&mut arena[f]).pprev = Some(Slot::Head(to));
    }
    heads[from].first = None;
}

/// Iterate a chain front to back, yielding `(handle, &object)`.
pub fn iter<'a, A, T>(field: A, arena: &'a Arena<T>, head: &HlistHead) -> Iter<'a, A, T>
where
    A: HlistField<T>,
{
    Iter {
        field,
        arena,
        cur: head.first,
    }
}

pub struct Iter<'a, A, T> {
    field: A,
    arena: &'a Arena<T>,
    cur: Option<NodeRef>,
}

impl<'a, A, T> Iterator for Iter<'a, A, T>
where
    A: HlistField<T>,
{
    type Item = (NodeRef, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cur?;
        let arena: &'a Arena<T> = self.arena;
        let obj = &arena[node];
        self.cur = self.field.links(obj).next;
        Some((node, obj))
    }
}

/// Traverse the chain at `heads[bucket]`, tolerating removal of the
/// visited node. The next cursor is cached before `f` runs; `f` receives
/// the head slice and arena so it can call [`remove`]/[`remove_init`] on
/// the node it was handed. Removing any other node is not supported.
pub fn for_each_safe<A, T, F>(
    field: A,
    heads: &mut [HlistHead],
    bucket: usize,
    arena: &mut Arena<T>,
    mut f: F,
) where
    A: HlistField<T>,
    F: FnMut(&mut [HlistHead], &mut Arena<T>, NodeRef),
{
    let mut cur = heads[bucket].first;
    while let Some(node) = cur {
        let next = field.links(&arena[node]).next;
        f(heads, arena, node);
        cur = next;
    }
}
