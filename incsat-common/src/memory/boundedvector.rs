//! A vector that never reallocates.

use crate::memory::{HeapSpace, Vector};
use incsat_macros::HeapSpace;
use std::slice;

/// A vector with a capacity fixed at construction.
///
/// Serves as the stack of a [`StackMapping`](struct.StackMapping.html) and
/// as the target region of an [`Arena`](struct.Arena.html) compaction.
/// Pushing beyond the capacity is a precondition violation.
#[derive(Debug, Clone, HeapSpace, PartialEq, Default)]
pub struct BoundedVector<T: HeapSpace> {
    vector: Vector<T>,
}

impl<T: HeapSpace> BoundedVector<T> {
    pub fn with_capacity(capacity: usize) -> BoundedVector<T> {
        BoundedVector {
            vector: Vector::with_capacity(capacity),
        }
    }
    pub fn push(&mut self, value: T) {
        self.vector.push_no_grow(value)
    }
    pub fn pop(&mut self) -> Option<T> {
        self.vector.pop()
    }
    pub fn len(&self) -> usize {
        self.vector.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.vector.capacity()
    }
    pub fn iter(&self) -> slice::Iter<T> {
        self.vector.iter()
    }
    /// Drop the bound, keeping elements and capacity.
    pub fn into_vector(self) -> Vector<T> {
        self.vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic]
    fn push_beyond_capacity() {
        let mut region = BoundedVector::with_capacity(1);
        region.push(1u8);
        let capacity = region.capacity();
        for value in 0..capacity {
            region.push(value as u8);
        }
    }

    #[test]
    fn keeps_capacity_when_unbounded() {
        let mut region = BoundedVector::with_capacity(3);
        region.push(7u32);
        region.push(8);
        assert_eq!(region.pop(), Some(8));
        let vector = region.into_vector();
        assert_eq!(vector.len(), 1);
        assert!(vector.capacity() >= 3);
    }
}
