//! A `Vec` wrapper with a smaller growth factor and optional bounds checks.

use crate::{config, memory::HeapSpace};
use static_assertions::const_assert;
use std::{
    cmp,
    iter::FromIterator,
    mem::size_of,
    ops::{Deref, DerefMut, Index, IndexMut, Range},
    ptr, slice,
};

/// A growable array.
///
/// Grows by a factor of 1.5, starting at 4 elements. Indexing is only
/// checked if `config::ENABLE_BOUNDS_CHECKING` is set.
#[derive(Debug, Clone, Default, Eq)]
pub struct Vector<T>(Vec<T>);

impl<T> Vector<T> {
    pub fn new() -> Vector<T> {
        Vector(Vec::new())
    }
    pub fn with_capacity(capacity: usize) -> Vector<T> {
        Vector(Vec::with_capacity(capacity))
    }
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }
    pub fn pop(&mut self) -> Option<T> {
        self.0.pop()
    }
    pub fn iter(&self) -> slice::Iter<T> {
        self.0.iter()
    }
    pub fn truncate(&mut self, length: usize) {
        self.0.truncate(length)
    }
    pub fn clear(&mut self) {
        self.0.clear()
    }
    /// Make room for at least `capacity` elements in total.
    pub fn reserve_total(&mut self, capacity: usize) {
        if capacity > self.capacity() {
            self.0.reserve_exact(capacity - self.len());
        }
    }
    /// Append without reallocating.
    ///
    /// # Panics
    /// Panics if preconditions are checked and the vector is full.
    pub fn push_no_grow(&mut self, value: T) {
        requires!(self.len() < self.capacity());
        let length = self.len();
        unsafe {
            ptr::write(self.0.as_mut_ptr().add(length), value);
            self.0.set_len(length + 1)
        }
    }
    /// Remove the element at `index`, moving the last one in its place.
    pub fn swap_remove(&mut self, index: usize) -> T {
        assert_in_bounds(0..self.len(), index);
        self.0.swap_remove(index)
    }
}

impl<T: Clone + Default> Vector<T> {
    pub fn push(&mut self, value: T) {
        if self.len() == self.capacity() {
            let capacity = grown_capacity(self.capacity());
            self.0.reserve_exact(capacity - self.len());
        }
        self.push_no_grow(value)
    }
    /// Grow or shrink to `length`, filling new slots with the default value.
    pub fn resize(&mut self, length: usize) {
        self.0.resize(length, T::default())
    }
}

impl<T: Clone> Vector<T> {
    /// Grow or shrink to `length`, filling new slots with `value`.
    pub fn resize_with_value(&mut self, length: usize, value: T) {
        self.0.resize(length, value)
    }
}

fn grown_capacity(capacity: usize) -> usize {
    // Clause arenas are indexed by usize offsets.
    const_assert!(size_of::<usize>() >= 8);
    if capacity == 0 {
        4
    } else {
        cmp::max(capacity + capacity / 2, capacity + 1)
    }
}

/// Like `vec!`, but for [`Vector`](memory/struct.Vector.html).
#[macro_export]
macro_rules! vector {
    ($($x:expr),*) => (
        {
            #[allow(unused_mut)]
            let mut result = $crate::memory::Vector::new();
            $(
                result.push($x);
            )*
            result
        }
    );
    ($($x:expr,)*) => ($crate::vector!($($x),*))
}

/// # Panics
/// Panics if bounds checking is enabled and `offset` is not in `bounds`.
pub fn assert_in_bounds(bounds: Range<usize>, offset: usize) {
    if config::ENABLE_BOUNDS_CHECKING {
        assert!(
            bounds.contains(&offset),
            "index {} out of bounds {:?}",
            offset,
            bounds,
        );
    }
}

/// Check a range against a vector of length `length`.
fn assert_range_in_bounds(length: usize, range: &Range<usize>) {
    assert_in_bounds(0..length + 1, range.start);
    assert_in_bounds(0..length + 1, range.end);
}

impl<T> Deref for Vector<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> DerefMut for Vector<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.0
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        assert_in_bounds(0..self.len(), index);
        unsafe { self.0.get_unchecked(index) }
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert_in_bounds(0..self.len(), index);
        unsafe { self.0.get_unchecked_mut(index) }
    }
}

impl<T> Index<Range<usize>> for Vector<T> {
    type Output = [T];
    fn index(&self, range: Range<usize>) -> &[T] {
        assert_range_in_bounds(self.len(), &range);
        &self.0[range]
    }
}

impl<T> IndexMut<Range<usize>> for Vector<T> {
    fn index_mut(&mut self, range: Range<usize>) -> &mut [T] {
        assert_range_in_bounds(self.len(), &range);
        &mut self.0[range]
    }
}

impl<T: PartialEq> PartialEq for Vector<T> {
    fn eq(&self, other: &Vector<T>) -> bool {
        self.0 == other.0
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;
    fn into_iter(self) -> slice::Iter<'a, T> {
        self.iter()
    }
}

impl<T> IntoIterator for Vector<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> std::vec::IntoIter<T> {
        self.0.into_iter()
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Vector<T> {
        Vector(iter.into_iter().collect())
    }
}

impl<T: HeapSpace> HeapSpace for Vector<T> {
    fn heap_space(&self) -> usize {
        self.capacity() * size_of::<T>() + self.iter().map(HeapSpace::heap_space).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_factor() {
        let mut vector = Vector::new();
        vector.push(1u32);
        assert_eq!(vector.capacity(), 4);
        for value in 2..=5 {
            vector.push(value);
        }
        assert_eq!(vector.capacity(), 6);
        assert_eq!(&vector[1..3], &[2, 3]);
    }

    #[test]
    fn grow_from_single_slot() {
        let mut vector = Vector::with_capacity(1);
        for value in 0..4u32 {
            vector.push(value);
        }
        assert_eq!(vector, vector![0, 1, 2, 3]);
        assert!(vector.capacity() >= 4);
    }

    #[test]
    fn swap_remove_moves_last() {
        let mut vector: Vector<u32> = vector![10, 20, 30];
        assert_eq!(vector.swap_remove(0), 10);
        assert_eq!(vector, vector![30, 20]);
    }
}
