//! A dense map indexed by a strong type.

use crate::memory::{assert_in_bounds, HeapSpace, Offset, Vector};
use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut, Index, IndexMut},
};

/// Per-variable or per-literal data, indexed by `I`.
///
/// Variables are allocated incrementally, so an `Array` can be enlarged
/// with [`grow`](#method.grow). It never grows by itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Array<I: Offset, T> {
    data: Vector<T>,
    index: PhantomData<I>,
}

impl<I: Offset, T: Clone> Array<I, T> {
    /// An array of `size` copies of `value`.
    pub fn new(value: T, size: usize) -> Array<I, T> {
        let mut data = Vector::with_capacity(size);
        data.resize_with_value(size, value);
        Array {
            data,
            index: PhantomData,
        }
    }
    /// Enlarge to `size` elements, if smaller. New elements are `value`.
    pub fn grow(&mut self, size: usize, value: T) {
        if size > self.size() {
            self.data.resize_with_value(size, value);
        }
    }
}

impl<I: Offset, T> Array<I, T> {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl<I: Offset, T> Default for Array<I, T> {
    fn default() -> Array<I, T> {
        Array {
            data: Vector::new(),
            index: PhantomData,
        }
    }
}

impl<I: Offset, T> Deref for Array<I, T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<I: Offset, T> DerefMut for Array<I, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<I: Offset, T> Index<I> for Array<I, T> {
    type Output = T;
    fn index(&self, key: I) -> &T {
        let offset = key.as_offset();
        assert_in_bounds(0..self.size(), offset);
        unsafe { self.data.get_unchecked(offset) }
    }
}

impl<I: Offset, T> IndexMut<I> for Array<I, T> {
    fn index_mut(&mut self, key: I) -> &mut T {
        let offset = key.as_offset();
        assert_in_bounds(0..self.size(), offset);
        unsafe { self.data.get_unchecked_mut(offset) }
    }
}

impl<I: Offset, T: HeapSpace> HeapSpace for Array<I, T> {
    fn heap_space(&self) -> usize {
        self.data.heap_space()
    }
}
