//! Bounded binary min-heap.
//!
//! The heap is array-backed with a capacity fixed at construction. Positions
//! use 1-based arithmetic: the parent of `i` is `i / 2` and its children are
//! `2i` and `2i + 1`, with the root at 1. Storage is 0-based underneath.
//!
//! Invariant: for every non-root position `i`, `heap[i] >= heap[parent(i)]`.
//!
//! Full and empty heaps are reported as [`HeapError`] values so callers can
//! test the preconditions. Index queries outside `1..=len` are programming
//! errors and panic.

use crate::error::HeapError;

/// A fixed-capacity binary min-heap.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    slots: Vec<T>,
    capacity: usize,
}

impl<T: Ord> MinHeap<T> {
    /// Creates an empty heap that holds at most `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the number of elements in the heap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the heap holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if another insert would exceed capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Returns the parent position of `i`, or `None` for the root.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not in `1..=len`.
    #[must_use]
    pub fn parent(&self, i: usize) -> Option<usize> {
        self.check_position(i, "parent");
        if i == 1 { None } else { Some(i / 2) }
    }

    /// Returns the left child position of `i`, if it exists.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not in `1..=len`.
    #[must_use]
    pub fn left(&self, i: usize) -> Option<usize> {
        self.check_position(i, "left");
        let child = i * 2;
        (child <= self.len()).then_some(child)
    }

    /// Returns the right child position of `i`, if it exists.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not in `1..=len`.
    #[must_use]
    pub fn right(&self, i: usize) -> Option<usize> {
        self.check_position(i, "right");
        let child = i * 2 + 1;
        (child <= self.len()).then_some(child)
    }

    /// Inserts `value`, sifting it toward the root.
    ///
    /// The value stops rising as soon as its parent is less than or equal to
    /// it, so it never passes an equal element.
    pub fn insert(&mut self, value: T) -> Result<(), HeapError> {
        if self.is_full() {
            return Err(HeapError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.slots.push(value);
        let mut i = self.len();
        while let Some(p) = self.parent(i) {
            if self.at(i) >= self.at(p) {
                break;
            }
            self.swap(i, p);
            i = p;
        }
        Ok(())
    }

    /// Removes and returns the minimum element.
    pub fn extract_min(&mut self) -> Result<T, HeapError> {
        let last = self.slots.pop().ok_or(HeapError::EmptyHeap)?;
        if self.slots.is_empty() {
            return Ok(last);
        }
        let top = std::mem::replace(&mut self.slots[0], last);
        self.sift_down(1);
        Ok(top)
    }

    /// Returns the minimum element without removing it.
    pub fn peek_min(&self) -> Result<&T, HeapError> {
        self.slots.first().ok_or(HeapError::EmptyHeap)
    }

    /// Returns the elements in heap (level) order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.slots
    }

    /// Returns true if every non-root element is `>=` its parent.
    #[must_use]
    pub fn is_valid_heap(&self) -> bool {
        (2..=self.len()).all(|i| self.at(i) >= self.at(i / 2))
    }

    fn sift_down(&mut self, mut i: usize) {
        loop {
            let child = match (self.left(i), self.right(i)) {
                (Some(l), Some(r)) => {
                    if self.at(l) <= self.at(r) {
                        l
                    } else {
                        r
                    }
                }
                (Some(l), None) => l,
                _ => break,
            };
            if self.at(i) <= self.at(child) {
                break;
            }
            self.swap(i, child);
            i = child;
        }
    }

    fn check_position(&self, i: usize, query: &str) {
        assert!(
            (1..=self.len()).contains(&i),
            "{query}: impossible heap position {i} (len {})",
            self.len()
        );
    }

    fn at(&self, i: usize) -> &T {
        &self.slots[i - 1]
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a - 1, b - 1);
    }
}
