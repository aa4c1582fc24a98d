//! Containers used by the solver.
//!
//! - [`Vector`](struct.Vector.html) replaces `Vec`, with bounds checks that
//!   can be switched off in `config`.
//! - [`Array`](struct.Array.html) and [`StackMapping`](struct.StackMapping.html)
//!   are indexed by a strong type such as `Literal`, so a variable cannot be
//!   used where a literal is expected.
//! - [`BoundedVector`](struct.BoundedVector.html) never reallocates.
//! - [`Arena`](struct.Arena.html) holds the clauses and is compacted by
//!   copying live clauses into a second region.

mod arena;
mod array;
mod boundedvector;
#[macro_use]
mod vector;
mod stackmapping;

pub use crate::memory::{
    arena::{Arena, MemoryAccounting},
    array::Array,
    boundedvector::BoundedVector,
    stackmapping::StackMapping,
    vector::{assert_in_bounds, Vector},
};

/// A type that can index an [`Array`](struct.Array.html).
pub trait Offset {
    fn as_offset(&self) -> usize;
}

impl Offset for usize {
    fn as_offset(&self) -> usize {
        *self
    }
}

/// Heap memory owned by a value, derived with `#[derive(HeapSpace)]`.
pub trait HeapSpace {
    /// Bytes allocated on the heap, not counting `size_of::<Self>()`.
    fn heap_space(&self) -> usize;
}

impl<T: Copy> HeapSpace for T {
    fn heap_space(&self) -> usize {
        0
    }
}

/// Render a byte count in mebibytes.
pub fn format_memory_usage(bytes: usize) -> String {
    format!("{:12}", bytes >> 20)
}
