// src/crawl/queue.rs
// =============================================================================
// A plain first-in, first-out queue.
//
// The queue has no locking of its own. The frontier wraps it behind a mutex
// and is the only place it is shared between workers.
//
// Rust concepts:
// - Generics: Queue<T> works for any element type
// - VecDeque: ring buffer with O(1) push_back / pop_front
// =============================================================================

use std::collections::VecDeque;

/// An ordered FIFO container.
#[derive(Debug)]
pub struct Queue<T> {
    elements: VecDeque<T>,
}

impl<T> Queue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            elements: VecDeque::new(),
        }
    }

    /// Adds an element to the back of the queue.
    pub fn enqueue(&mut self, item: T) {
        self.elements.push_back(item);
    }

    /// Removes and returns the element at the front, or None when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        self.elements.pop_front()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}
