// libex10-rs/libex10/src/fifo/list.rs

//! Doubly linked list over an index arena.
//!
//! Slot 0 is the sentinel: the list is empty when the sentinel links to
//! itself. Freed slots are recycled, so a list that has reached its working
//! size does not allocate on push.

const SENTINEL: usize = 0;

/// Handle to an element still linked into a [`LinkedList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
}

/// Doubly linked list whose nodes live in a recycled slot arena.
#[derive(Debug)]
pub struct LinkedList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedList<T> {
    /// An empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Reserve room for `capacity` elements up front.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity + 1);
        slots.push(Slot {
            value: None,
            prev: SENTINEL,
            next: SENTINEL,
        });
        Self {
            slots,
            free: Vec::with_capacity(capacity),
        }
    }

    /// O(1).
    pub fn is_empty(&self) -> bool {
        self.slots[SENTINEL].next == SENTINEL
    }

    /// Walks the list; O(n).
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Link `value` at the front and return its handle.
    pub fn push_front(&mut self, value: T) -> NodeId {
        self.insert_after(SENTINEL, value)
    }

    /// Link `value` at the back and return its handle.
    pub fn push_back(&mut self, value: T) -> NodeId {
        let last = self.slots[SENTINEL].prev;
        self.insert_after(last, value)
    }

    /// Unlink and return the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        match self.slots[SENTINEL].next {
            SENTINEL => None,
            idx => self.unlink(idx),
        }
    }

    /// Unlink and return the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        match self.slots[SENTINEL].prev {
            SENTINEL => None,
            idx => self.unlink(idx),
        }
    }

    pub fn front(&self) -> Option<&T> {
        self.slots[self.slots[SENTINEL].next].value.as_ref()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        let idx = self.slots[SENTINEL].next;
        self.slots[idx].value.as_mut()
    }

    pub fn back(&self) -> Option<&T> {
        self.slots[self.slots[SENTINEL].prev].value.as_ref()
    }

    /// Element behind `id`, if it is still linked.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0).and_then(|slot| slot.value.as_ref())
    }

    /// Unlink the element behind `id`. Returns `None` for a handle whose
    /// element is already gone, as long as its slot has not been reused.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        match self.slots.get(id.0) {
            Some(slot) if id.0 != SENTINEL && slot.value.is_some() => self.unlink(id.0),
            _ => None,
        }
    }

    /// Unlink every element.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.slots[SENTINEL].next,
        }
    }

    fn alloc(&mut self, value: T) -> usize {
        let slot = Slot {
            value: Some(value),
            prev: SENTINEL,
            next: SENTINEL,
        };
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = slot;
                idx
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    fn insert_after(&mut self, at: usize, value: T) -> NodeId {
        let idx = self.alloc(value);
        let next = self.slots[at].next;
        self.slots[idx].prev = at;
        self.slots[idx].next = next;
        self.slots[at].next = idx;
        self.slots[next].prev = idx;
        NodeId(idx)
    }

    fn unlink(&mut self, idx: usize) -> Option<T> {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
        self.slots[idx].prev = idx;
        self.slots[idx].next = idx;
        self.free.push(idx);
        self.slots[idx].value.take()
    }
}

/// Iterator returned by [`LinkedList::iter`].
pub struct Iter<'a, T> {
    list: &'a LinkedList<T>,
    cursor: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.cursor == SENTINEL {
            return None;
        }
        let slot = &self.list.slots[self.cursor];
        self.cursor = slot.next;
        slot.value.as_ref()
    }
}
