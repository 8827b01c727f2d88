//! Circular doubly-linked list with a self-loop sentinel.
//!
//! A list is nothing but a set of `ListNode` fields embedded in arena
//! objects and stitched into a cycle. Any node can serve as the head; the
//! head is simply the node the caller treats as the traversal anchor. An
//! empty list is a node whose `next` and `prev` both refer to itself.
//!
//! Operations take a [`ListField`] selector value naming which embedded
//! link field to operate on, so a record can sit on several lists at once
//! through several link fields. The selector plays the role the
//! `container_of` byte offset plays in C intrusive lists.
//!
//! Consistency invariant: for every node `n` reachable from a head,
//! `n.next.prev == n` and `n.prev.next == n`. Every operation here
//! preserves it; none of them allocates or frees anything.

use crate::arena::{Arena, NodeRef};

/// Embedded link field. Two handles, never a reference to the owner.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ListNode {
    next: NodeRef,
    prev: NodeRef,
}

impl ListNode {
    /// A detached link: both handles null. Call [`init`] before use as a
    /// head; insertion operations set the fields themselves.
    pub fn new() -> Self {
        ListNode {
            next: NodeRef::null(),
            prev: NodeRef::null(),
        }
    }

    pub fn next(&self) -> NodeRef {
        self.next
    }

    pub fn prev(&self) -> NodeRef {
        self.prev
    }
}

impl Default for ListNode {
    fn default() -> Self {
        Self::new()
    }
}

/// Selects one embedded [`ListNode`] field of a record.
///
/// Implemented by zero-sized selector types, usually generated with
/// [`list_field!`](crate::list_field). The selector is passed by value at
/// every call site, naming which of the record's link fields the
/// operation rewrites.
pub trait ListField<T>: Copy {
    fn links(self, owner: &T) -> &ListNode;
    fn links_mut(self, owner: &mut T) -> &mut ListNode;
}

/// Generates a [`ListField`] selector for one `ListNode` field.
///
/// ```
/// use entwine::{list_field, ListNode};
///
/// struct Job {
///     id: u64,
///     link: ListNode,
/// }
/// list_field!(pub struct ByLink for Job => link);
/// ```
#[macro_export]
macro_rules! list_field {
    ($vis:vis struct $name:ident for $owner:ty => $field:ident) => {
        #[derive(Copy, Clone, Debug)]
        $vis struct $name;

        impl $crate::list::ListField<$owner> for $name {
            #[inline]
            fn links(self, owner: &$owner) -> &$crate::list::ListNode {
                &owner.$field
            }
            #[inline]
            fn links_mut(self, owner: &mut $owner) -> &mut $crate::list::ListNode {
                &mut owner.$field
            }
        }
    };
}

/// Make `node` an empty list: a self-loop sentinel.
pub fn init<A, T>(field: A, arena: &mut Arena<T>, node: NodeRef)
where
    A: ListField<T>,
{
    let links = field.links_mut(&mut arena[node]);
    links.next = node;
    links.prev = node;
}

// Splice `new` between two known-consecutive nodes. Exactly four handle
// writes; correct even when `prev == next` (inserting into an empty list)
// because the writes land one node at a time.
fn insert_between<A, T>(field: A, arena: &mut Arena<T>, new: NodeRef, prev: NodeRef, next: NodeRef)
where
    A: ListField<T>,
{
    field.links_mut(&mut arena[next]).prev = new;
    {
        let links = field.links_mut(&mut arena[new]);
        links.next = next;
        links.prev = prev;
    }
    field.links_mut(&mut arena[prev]).next = new;
}

/// Insert `new` right after `head`. Stack push when `head` is the anchor.
pub fn add<A, T>(field: A, arena: &mut Arena<T>, new: NodeRef, head: NodeRef)
where
    A: ListField<T>,
{
    let next = field.links(&arena[head]).next;
    insert_between(field, arena, new, head, next);
}

/// Insert `new` right before `head`. Queue push when `head` is the anchor.
pub fn add_tail<A, T>(field: A, arena: &mut Arena<T>, new: NodeRef, head: NodeRef)
where
    A: ListField<T>,
{
    let prev = field.links(&arena[head]).prev;
    insert_between(field, arena, new, prev, head);
}

// Link the node's neighbors to each other, leaving the node's own fields
// untouched.
fn unlink<A, T>(field: A, arena: &mut Arena<T>, node: NodeRef)
where
    A: ListField<T>,
{
    let (prev, next) = {
        let links = field.links(&arena[node]);
        (links.prev, links.next)
    };
    field.links_mut(&mut arena[next]).prev = prev;
    field.links_mut(&mut arena[prev]).next = next;
}

/// Remove `node` from its list and poison its link fields.
///
/// The node is left in a deliberately unusable state: any later traversal
/// through it panics in `Arena::index`. Re-insert it with [`add`] /
/// [`add_tail`], or use [`remove_init`] if it must remain usable.
pub fn remove<A, T>(field: A, arena: &mut Arena<T>, node: NodeRef)
where
    A: ListField<T>,
{
    unlink(field, arena, node);
    let links = field.links_mut(&mut arena[node]);
    links.next = NodeRef::poison_next();
    links.prev = NodeRef::poison_prev();
}

/// Remove `node` from its list and reinitialize it as an empty list.
pub fn remove_init<A, T>(field: A, arena: &mut Arena<T>, node: NodeRef)
where
    A: ListField<T>,
{
    unlink(field, arena, node);
    init(field, arena, node);
}

/// Move `node` from whichever list holds it to the front of `head`'s list.
pub fn move_front<A, T>(field: A, arena: &mut Arena<T>, node: NodeRef, head: NodeRef)
where
    A: ListField<T>,
{
    unlink(field, arena, node);
    add(field, arena, node, head);
}

/// Move `node` from whichever list holds it to the tail of `head`'s list.
pub fn move_tail<A, T>(field: A, arena: &mut Arena<T>, node: NodeRef, head: NodeRef)
where
    A: ListField<T>,
{
    unlink(field, arena, node);
    add_tail(field, arena, node, head);
}

/// True if `node` is the last entry of `head`'s list.
pub fn is_last<A, T>(field: A, arena: &Arena<T>, node: NodeRef, head: NodeRef) -> bool
where
    A: ListField<T>,
{
    field.links(&arena[node]).next == head
}

/// True if the list anchored at `head` has no entries.
pub fn is_empty<A, T>(field: A, arena: &Arena<T>, head: NodeRef) -> bool
where
    A: ListField<T>,
{
    field.links(&arena[head]).next == head
}

/// Best-effort emptiness check that also cross-checks `prev`.
///
/// This is an assertion aid, not a synchronization primitive: it can
/// notice a half-finished mutation of the head (only `next` or only
/// `prev` rewritten so far) but guarantees nothing under races. Do not
/// rely on it for correctness.
pub fn is_empty_careful<A, T>(field: A, arena: &Arena<T>, head: NodeRef) -> bool
where
    A: ListField<T>,
{
    let links = field.links(&arena[head]);
    let next = links.next;
    next == head && next == links.prev
}

/// True if the list has exactly one entry.
pub fn is_singular<A, T>(field: A, arena: &Arena<T>, head: NodeRef) -> bool
where
    A: ListField<T>,
{
    let links = field.links(&arena[head]);
    links.next != head && links.next == links.prev
}

/// Move the first entry to the tail position.
pub fn rotate_left<A, T>(field: A, arena: &mut Arena<T>, head: NodeRef)
where
    A: ListField<T>,
{
    if !is_empty(field, arena, head) {
        let first = field.links(&arena[head]).next;
        move_tail(field, arena, first, head);
    }
}

fn cut<A, T>(field: A, arena: &mut Arena<T>, out: NodeRef, head: NodeRef, entry: NodeRef)
where
    A: ListField<T>,
{
    let head_next = field.links(&arena[head]).next;
    let new_first = field.links(&arena[entry]).next;

    field.links_mut(&mut arena[out]).next = head_next;
    field.links_mut(&mut arena[head_next]).prev = out;
    field.links_mut(&mut arena[out]).prev = entry;
    field.links_mut(&mut arena[entry]).next = out;
    field.links_mut(&mut arena[head]).next = new_first;
    field.links_mut(&mut arena[new_first]).prev = head;
}

/// Split `head`'s list in two, moving the prefix up to and including
/// `entry` onto `out`.
///
/// `entry` must be a member of `head`'s list, or `head` itself (in which
/// case `out` just becomes empty). `out` should be empty or a list whose
/// contents the caller no longer cares about.
///
/// Deliberate no-ops rather than corruption: an empty `head`, or a
/// single-entry `head` where `entry` is neither that entry nor `head`.
/// Callers that need to detect the no-op must check postconditions
/// themselves.
pub fn cut_position<A, T>(field: A, arena: &mut Arena<T>, out: NodeRef, head: NodeRef, entry: NodeRef)
where
    A: ListField<T>,
{
    if is_empty(field, arena, head) {
        return;
    }
    if is_singular(field, arena, head)
        && field.links(&arena[head]).next != entry
        && head != entry
    {
        return;
    }
    if entry == head {
        init(field, arena, out);
    } else {
        cut(field, arena, out, head, entry);
    }
}

// Stitch the span `src.next ..= src.prev` between `prev` and `next`.
fn splice_between<A, T>(field: A, arena: &mut Arena<T>, src: NodeRef, prev: NodeRef, next: NodeRef)
where
    A: ListField<T>,
{
    let first = field.links(&arena[src]).next;
    let last = field.links(&arena[src]).prev;

    field.links_mut(&mut arena[first]).prev = prev;
    field.links_mut(&mut arena[prev]).next = first;
    field.links_mut(&mut arena[last]).next = next;
    field.links_mut(&mut arena[next]).prev = last;
}

/// Concatenate all of `src`'s entries at the front of `head`'s list.
///
/// `src`'s own head is left stale; the caller must discard it or call
/// [`init`] on it before using it again. See [`splice_init`].
pub fn splice<A, T>(field: A, arena: &mut Arena<T>, src: NodeRef, head: NodeRef)
where
    A: ListField<T>,
{
    if !is_empty(field, arena, src) {
        let next = field.links(&arena[head]).next;
        splice_between(field, arena, src, head, next);
    }
}

/// Concatenate all of `src`'s entries at the back of `head`'s list.
pub fn splice_tail<A, T>(field: A, arena: &mut Arena<T>, src: NodeRef, head: NodeRef)
where
    A: ListField<T>,
{
    if !is_empty(field, arena, src) {
        let prev = field.links(&arena[head]).prev;
        splice_between(field, arena, src, prev, head);
    }
}

/// [`splice`], then reinitialize `src` to an empty list.
pub fn splice_init<A, T>(field: A, arena: &mut Arena<T>, src: NodeRef, head: NodeRef)
where
    A: ListField<T>,
{
    if !is_empty(field, arena, src) {
        let next = field.links(&arena[head]).next;
        splice_between(field, arena, src, head, next);
        init(field, arena, src);
    }
}

/// [`splice_tail`], then reinitialize `src` to an empty list.
pub fn splice_tail_init<A, T>(field: A, arena: &mut Arena<T>, src: NodeRef, head: NodeRef)
where
    A: ListField<T>,
{
    if !is_empty(field, arena, src) {
        let prev = field.links(&arena[head]).prev;
        splice_between(field, arena, src, prev, head);
        init(field, arena, src);
    }
}

/// First entry of `head`'s list, or `None` when empty.
pub fn first<A, T>(field: A, arena: &Arena<T>, head: NodeRef) -> Option<NodeRef>
where
    A: ListField<T>,
{
    let next = field.links(&arena[head]).next;
    (next != head).then_some(next)
}

/// Last entry of `head`'s list, or `None` when empty.
pub fn last<A, T>(field: A, arena: &Arena<T>, head: NodeRef) -> Option<NodeRef>
where
    A: ListField<T>,
{
    let prev = field.links(&arena[head]).prev;
    (prev != head).then_some(prev)
}

/// The node after `node` in cycle order (may be the head).
pub fn next_of<A, T>(field: A, arena: &Arena<T>, node: NodeRef) -> NodeRef
where
    A: ListField<T>,
{
    field.links(&arena[node]).next
}

/// The node before `node` in cycle order (may be the head).
pub fn prev_of<A, T>(field: A, arena: &Arena<T>, node: NodeRef) -> NodeRef
where
    A: ListField<T>,
{
    field.links(&arena[node]).prev
}

/// Iterate `head`'s entries front to back, yielding `(handle, &object)`.
pub fn iter<A, T>(field: A, arena: &Arena<T>, head: NodeRef) -> Iter<'_, A, T>
where
    A: ListField<T>,
{
    Iter {
        field,
        arena,
        head,
        cur: field.links(&arena[head]).next,
    }
}

/// Iterate `head`'s entries back to front.
pub fn iter_rev<A, T>(field: A, arena: &Arena<T>, head: NodeRef) -> IterRev<'_, A, T>
where
    A: ListField<T>,
{
    IterRev {
        field,
        arena,
        head,
        cur: field.links(&arena[head]).prev,
    }
}

pub struct Iter<'a, A, T> {
    field: A,
    arena: &'a Arena<T>,
    head: NodeRef,
    cur: NodeRef,
}

impl<'a, A, T> Iterator for Iter<'a, A, T>
where
    A: ListField<T>,
{
    type Item = (NodeRef, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == self.head {
            return None;
        }
        let node = self.cur;
        let arena: &'a Arena<T> = self.arena;
        let obj = &arena[node];
        self.cur = self.field.links(obj).next;
        Some((node, obj))
    }
}

pub struct IterRev<'a, A, T> {
    field: A,
    arena: &'a Arena<T>,
    head: NodeRef,
    cur: NodeRef,
}

impl<'a, A, T> Iterator for IterRev<'a, A, T>
where
    A: ListField<T>,
{
    type Item = (NodeRef, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur == self.head {
            return None;
        }
        let node = self.cur;
        let arena: &'a Arena<T> = self.arena;
        let obj = &arena[node];
        self.cur = self.field.links(obj).prev;
        Some((node, obj))
    }
}

/// Traverse front to back, tolerating removal of the visited entry.
///
/// The next cursor is read before `f` runs, so `f` may [`remove`] the
/// entry it was handed. Removing any *other* entry, or mutating the list
/// shape in other ways, invalidates the cached cursor and is not
/// supported.
pub fn for_each_safe<A, T, F>(field: A, arena: &mut Arena<T>, head: NodeRef, mut f: F)
where
    A: ListField<T>,
    F: FnMut(&mut Arena<T>, NodeRef),
{
    let mut cur = field.links(&arena[head]).next;
    while cur != head {
        let next = field.links(&arena[cur]).next;
        f(arena, cur);
        cur = next;
    }
}

/// [`for_each_safe`], back to front.
pub fn for_each_rev_safe<A, T, F>(field: A, arena: &mut Arena<T>, head: NodeRef, mut f: F)
where
    A: ListField<T>,
    F: FnMut(&mut Arena<T>, NodeRef),
{
    let mut cur = field.links(&arena[head]).prev;
    while cur != head {
        let prev = field.links(&arena[cur]).prev;
        f(arena, cur);
        cur = prev;
    }
}
