//! A bounded most-recently-used set.

use std::collections::VecDeque;

/// A bounded set ordered from most to least recently used.
///
/// Re-adding an existing element moves it to the front. When the set is full,
/// adding a new element evicts the least recently used one.
#[derive(Debug, Clone)]
pub struct LruSet<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T: PartialEq> LruSet<T> {
    /// Create an empty set holding at most `capacity` elements.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// The maximum number of elements.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mark `item` as most recently used.
    ///
    /// Returns the evicted element, if any.
    pub fn add(&mut self, item: T) -> Option<T> {
        self.remove(&item);
        self.items.push_front(item);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    /// Remove `item`. Returns `true` if it was present.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.items.iter().position(|existing| existing == item) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Whether `item` is present.
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// The most recently used element.
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Iterate from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Walk from most to least recently used and return the first element
    /// accepted by `accept`. Elements rejected on the way are removed.
    pub fn find_and_prune(&mut self, mut accept: impl FnMut(&T) -> bool) -> Option<&T> {
        while let Some(front) = self.items.front() {
            if accept(front) {
                return self.items.front();
            }
            self.items.pop_front();
        }
        None
    }
}
