// Copyright 2026 loadcache Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Slot index into the arena.
pub(crate) type Index = usize;

/// Sentinel for absent links.
const NIL: Index = usize::MAX;

#[derive(Debug)]
struct Node<T> {
    elem: Option<T>,
    prev: Index,
    next: Index,
}

/// A doubly-linked list over an arena of recycled slots.
///
/// Slots are addressed by stable indices, so an external key index can unlink,
/// refresh, or inspect any live element in O(1). Elements keep their index
/// until removed; freed slots are recycled through a free list.
#[derive(Debug)]
pub(crate) struct ArenaList<T> {
    nodes: Vec<Node<T>>,
    free: Vec<Index>,

    /// Oldest element.
    head: Index,
    /// Youngest element.
    tail: Index,

    len: usize,
}

impl<T> Default for ArenaList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ArenaList<T> {
    /// Create an empty [`ArenaList`].
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
        }
    }

    /// Append an element at the tail.
    ///
    /// Returns the index that addresses the element until it is removed.
    pub fn push_back(&mut self, elem: T) -> Index {
        let node = Node {
            elem: Some(elem),
            prev: self.tail,
            next: NIL,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = node;
                index
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        if self.tail != NIL {
            self.nodes[self.tail].next = index;
        } else {
            self.head = index;
        }
        self.tail = index;
        self.len += 1;

        index
    }

    /// Remove and return the element at the head.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.head == NIL {
            return None;
        }
        self.remove(self.head)
    }

    /// Remove the element at `index`.
    ///
    /// Returns `None` if the slot is vacant.
    pub fn remove(&mut self, index: Index) -> Option<T> {
        let elem = self.nodes.get_mut(index)?.elem.take()?;

        self.unlink(index);
        self.free.push(index);
        self.len -= 1;

        Some(elem)
    }

    /// Move the element at `index` to the tail.
    pub fn move_to_back(&mut self, index: Index) {
        debug_assert!(self.nodes[index].elem.is_some());

        if self.tail == index {
            return;
        }

        self.unlink(index);

        self.nodes[index].prev = self.tail;
        self.nodes[index].next = NIL;
        if self.tail != NIL {
            self.nodes[self.tail].next = index;
        } else {
            self.head = index;
        }
        self.tail = index;
    }

    /// Borrow the element at the head.
    #[cfg(test)]
    pub fn front(&self) -> Option<&T> {
        if self.head == NIL {
            return None;
        }
        self.nodes[self.head].elem.as_ref()
    }

    /// Borrow the element at `index`.
    pub fn get(&self, index: Index) -> Option<&T> {
        self.nodes.get(index)?.elem.as_ref()
    }

    /// Mutably borrow the element at `index`.
    pub fn get_mut(&mut self, index: Index) -> Option<&mut T> {
        self.nodes.get_mut(index)?.elem.as_mut()
    }

    /// Returns the element count.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there is no element in the list.
    #[cfg(test)]
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate elements from oldest to youngest.
    #[cfg(test)]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Detach `index` from its neighbors without freeing the slot.
    fn unlink(&mut self, index: Index) {
        let Node { prev, next, .. } = self.nodes[index];

        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }

        self.nodes[index].prev = NIL;
        self.nodes[index].next = NIL;
    }
}

#[cfg(test)]
pub(crate) struct Iter<'a, T> {
    list: &'a ArenaList<T>,
    cursor: Index,
}

#[cfg(test)]
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let node = &self.list.nodes[self.cursor];
        self.cursor = node.next;
        node.elem.as_ref()
    }
}
