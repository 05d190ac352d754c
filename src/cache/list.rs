//! Index List Module
//!
//! Arena-backed doubly-linked list with stable slot handles.
//!
//! Both eviction strategies keep their recency order here. Slots are reused
//! through a free list, so a handle stays valid until its value is removed.

// == Node ==
#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Index List ==
/// Doubly-linked list where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug)]
pub struct IndexList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for IndexList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IndexList<T> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Push Front ==
    /// Inserts a value at the most-recent end and returns its slot handle.
    pub fn push_front(&mut self, value: T) -> usize {
        let node = Node {
            value,
            prev: None,
            next: self.head,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.head {
            Some(old_head) => self.node_mut(old_head).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.len += 1;
        idx
    }

    // == Remove ==
    /// Unlinks the slot and returns its value. Unknown handles return None.
    pub fn remove(&mut self, idx: usize) -> Option<T> {
        let node = self.slots.get_mut(idx)?.take()?;

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        self.free.push(idx);
        self.len -= 1;
        Some(node.value)
    }

    // == Move To Front ==
    /// Marks a slot as most recently used. The handle stays the same.
    pub fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) || !self.contains(idx) {
            return;
        }

        let (prev, next) = {
            let node = self.node_mut(idx);
            (node.prev, node.next)
        };
        if let Some(prev) = prev {
            self.node_mut(prev).next = next;
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }

        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = None;
            node.next = old_head;
        }
        if let Some(old_head) = old_head {
            self.node_mut(old_head).prev = Some(idx);
        }
        self.head = Some(idx);
    }

    // == Back ==
    /// Handle of the least recently used slot.
    pub fn back(&self) -> Option<usize> {
        self.tail
    }

    /// Removes and returns the least recently used value.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.slots
            .get(idx)
            .and_then(|slot| slot.as_ref())
            .map(|node| &node.value)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots
            .get_mut(idx)
            .and_then(|slot| slot.as_mut())
            .map(|node| &mut node.value)
    }

    pub fn contains(&self, idx: usize) -> bool {
        matches!(self.slots.get(idx), Some(Some(_)))
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<T> {
        match self.slots[idx].as_mut() {
            Some(node) => node,
            None => panic!("index list corrupted: linked slot {idx} is vacant"),
        }
    }
}

// == Iterator ==
pub struct Iter<'a, T> {
    list: &'a IndexList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = self.list.slots[idx].as_ref()?;
        self.cursor = node.next;
        Some(&node.value)
    }
}
