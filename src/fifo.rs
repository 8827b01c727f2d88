//! First-in, first-out queue over a circular list.
//!
//! A thin naming layer: enqueue is a tail push, dequeue removes the
//! oldest entry (the one right after the head). Strict FIFO order falls
//! out of the list invariants; nothing here adds state beyond the head
//! handle.

use crate::arena::{Arena, NodeRef};
use crate::list::{self, ListField};

/// FIFO queue anchored at a caller-provided head node.
#[derive(Copy, Clone, Debug)]
pub struct Fifo {
    head: NodeRef,
}

impl Fifo {
    /// Initialize `head` as an empty queue and wrap it.
    pub fn new<A, T>(field: A, arena: &mut Arena<T>, head: NodeRef) -> Self
    where
        A: ListField<T>,
    {
        list::init(field, arena, head);
        Fifo { head }
    }

    /// The anchor node, usable with the `list` operations directly.
    pub fn head(&self) -> NodeRef {
        self.head
    }

    pub fn is_empty<A, T>(&self, field: A, arena: &Arena<T>) -> bool
    where
        A: ListField<T>,
    {
        list::is_empty(field, arena, self.head)
    }

    /// Push `node` at the back of the queue.
    pub fn enqueue<A, T>(&self, field: A, arena: &mut Arena<T>, node: NodeRef)
    where
        A: ListField<T>,
    {
        list::add_tail(field, arena, node, self.head);
    }

    /// Pop the oldest entry, or `None` when the queue is empty.
    ///
    /// The dequeued node's link fields are poisoned, as with
    /// [`list::remove`]; re-enqueueing it is fine, any other list use is
    /// not.
    pub fn dequeue<A, T>(&self, field: A, arena: &mut Arena<T>) -> Option<NodeRef>
    where
        A: ListField<T>,
    {
        let oldest = list::first(field, arena, self.head)?;
        list::remove(field, arena, oldest);
        Some(oldest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListNode;
    use crate::list_field;

    struct Job {
        id: u32,
        link: ListNode,
    }

    list_field!(struct ByLink for Job => link);

    fn job(arena: &mut Arena<Job>, id: u32) -> NodeRef {
        arena.insert(Job {
            id,
            link: ListNode::new(),
        })
    }

    /// Invariant: Strict FIFO order — a, b, c in; a, b, c out.
    #[test]
    fn fifo_order() {
        let mut arena = Arena::new();
        let head = job(&mut arena, 0);
        let q = Fifo::new(ByLink, &mut arena, head);
        assert!(q.is_empty(ByLink, &arena));

        let ids = [1, 2, 3];
        for id in ids {
            let n = job(&mut arena, id);
            q.enqueue(ByLink, &mut arena, n);
        }

        for want in ids {
            let n = q.dequeue(ByLink, &mut arena).expect("queue not empty");
            assert_eq!(arena[n].id, want);
        }
        assert!(q.is_empty(ByLink, &arena));
        assert_eq!(q.dequeue(ByLink, &mut arena), None);
    }

    /// Invariant: Dequeued nodes come out poisoned, and re-enqueueing one
    /// is valid.
    #[test]
    fn dequeue_poisons_and_reenqueue_works() {
        let mut arena = Arena::new();
        let head = job(&mut arena, 0);
        let q = Fifo::new(ByLink, &mut arena, head);

        let n = job(&mut arena, 1);
        q.enqueue(ByLink, &mut arena, n);
        let out = q.dequeue(ByLink, &mut arena).unwrap();
        assert_eq!(out, n);
        let links = ByLink.links(&arena[n]);
        assert_eq!(links.next(), NodeRef::poison_next());
        assert_eq!(links.prev(), NodeRef::poison_prev());

        q.enqueue(ByLink, &mut arena, n);
        assert_eq!(q.dequeue(ByLink, &mut arena), Some(n));
    }

    /// Invariant: Interleaved enqueue/dequeue preserves arrival order.
    #[test]
    fn interleaved_operations() {
        let mut arena = Arena::new();
        let head = job(&mut arena, 0);
        let q = Fifo::new(ByLink, &mut arena, head);

        let a = job(&mut arena, 1);
        let b = job(&mut arena, 2);
        q.enqueue(ByLink, &mut arena, a);
        q.enqueue(ByLink, &mut arena, b);
        assert_eq!(q.dequeue(ByLink, &mut arena), Some(a));

        let c = job(&mut arena, 3);
        q.enqueue(ByLink, &mut arena, c);
        assert_eq!(q.dequeue(ByLink, &mut arena), Some(b));
        assert_eq!(q.dequeue(ByLink, &mut arena), Some(c));
        assert_eq!(q.dequeue(ByLink, &mut arena), None);
    }
}
