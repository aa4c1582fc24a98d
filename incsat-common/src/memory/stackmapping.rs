//! Sparse marks that can be reset in time proportional to their number.

use crate::memory::{Array, BoundedVector, HeapSpace, Offset};
use incsat_macros::HeapSpace;
use std::{fmt::Debug, ops::Index, slice};

/// A map from keys to values that remembers which keys were pushed.
///
/// Lookup is a plain array access. [`clear`](#method.clear) only resets
/// the keys on the stack, so a mostly-default map is cheap to reset.
#[derive(Debug, HeapSpace, Default)]
pub struct StackMapping<Key: Offset + Copy + Debug, T: Copy + Debug> {
    /// The value of keys that are not mapped.
    default_value: T,
    array: Array<Key, T>,
    stack: BoundedVector<Key>,
}

impl<Key: Offset + Copy + Debug, T: Copy + Debug> StackMapping<Key, T> {
    /// A map for keys with offsets below `keys`, holding at most
    /// `capacity` pushed keys.
    pub fn new(default_value: T, keys: usize, capacity: usize) -> StackMapping<Key, T> {
        StackMapping {
            default_value,
            array: Array::new(default_value, keys),
            stack: BoundedVector::with_capacity(capacity),
        }
    }
    /// Make room for more keys. Only allowed while the stack is empty.
    pub fn grow(&mut self, keys: usize, capacity: usize) {
        requires!(self.is_empty());
        self.array.grow(keys, self.default_value);
        if capacity > self.stack.capacity() {
            self.stack = BoundedVector::with_capacity(capacity);
        }
    }
    pub fn len(&self) -> usize {
        self.stack.len()
    }
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
    /// Map `key` to `value` and push it.
    pub fn push(&mut self, key: Key, value: T) {
        self.array[key] = value;
        self.stack.push(key);
    }
    /// Map `key` to `value` without pushing it.
    pub fn set(&mut self, key: Key, value: T) {
        self.array[key] = value;
    }
    /// Pop the last key and reset its value.
    pub fn pop(&mut self) -> Option<Key> {
        let key = self.stack.pop()?;
        self.array[key] = self.default_value;
        Some(key)
    }
    /// Reset every pushed key.
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }
    /// The pushed keys, oldest first.
    pub fn iter(&self) -> slice::Iter<Key> {
        self.stack.iter()
    }
}

impl<Key: Offset + Copy + Debug, T: Copy + Debug> Index<Key> for StackMapping<Key, T> {
    type Output = T;
    fn index(&self, key: Key) -> &T {
        &self.array[key]
    }
}
