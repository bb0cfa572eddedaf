//! Unbounded FIFO queue backing the scheduler
//!
//! The queue is a linked list with O(1) enqueue at the tail and O(1) dequeue
//! at the head. It is owned by the scheduler task and never shared.

use std::collections::LinkedList;

/// First-in first-out queue of pending items
#[derive(Debug)]
pub struct FifoQueue<T> {
    items: LinkedList<T>,
}

impl<T> FifoQueue<T> {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self {
            items: LinkedList::new(),
        }
    }

    /// Appends an item at the tail
    pub fn enqueue(&mut self, value: T) {
        self.items.push_back(value);
    }

    /// Removes and returns the head, or `None` when the queue is empty
    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Returns the head without removing it
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for FifoQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
