//! Two-space storage for relocatable objects.
//!
//! Objects live in the `from` region and are referred to by their offset.
//! Compaction copies every live object into a freshly prepared `to` region
//! and then swaps the regions, retiring the old `from`:
//!
//! ```
//! # use incsat_common::memory::{Arena, MemoryAccounting};
//! let accounting = MemoryAccounting::default();
//! let mut arena = Arena::new(accounting.clone());
//! let dead = arena.allocate(vec![1u32, 2, 3]);
//! let live = arena.allocate(vec![4u32, 5]);
//! arena.prepare(2);
//! let moved = arena.copy(live..live + 2);
//! arena.swap();
//! assert_eq!(&arena[moved..moved + 2], &[4, 5]);
//! # let _ = dead;
//! ```

use crate::memory::{BoundedVector, HeapSpace, Vector};
use std::{
    cell::Cell,
    fmt,
    mem::size_of,
    ops::{Index, IndexMut, Range},
    rc::Rc,
};

/// Shared byte counter that mirrors every allocation of the arenas of one solver.
#[derive(Clone, Default)]
pub struct MemoryAccounting {
    counters: Rc<Counters>,
}

#[derive(Default)]
struct Counters {
    /// Bytes currently allocated.
    live: Cell<usize>,
    /// The maximum of `live` over time.
    peak: Cell<usize>,
    /// Number of regions released.
    releases: Cell<usize>,
}

impl MemoryAccounting {
    /// Record an allocation.
    pub fn inc_bytes(&self, bytes: usize) {
        let live = self.counters.live.get() + bytes;
        self.counters.live.set(live);
        if live > self.counters.peak.get() {
            self.counters.peak.set(live);
        }
    }
    /// Record a deallocation.
    pub fn dec_bytes(&self, bytes: usize) {
        let live = self.counters.live.get();
        invariant!(bytes <= live, "releasing {} bytes but only {} are live", bytes, live);
        self.counters.live.set(live - bytes);
    }
    /// Record that a whole region of `bytes` was released.
    fn release_region(&self, bytes: usize) {
        self.dec_bytes(bytes);
        self.counters.releases.set(self.counters.releases.get() + 1);
    }
    pub fn live_bytes(&self) -> usize {
        self.counters.live.get()
    }
    pub fn peak_bytes(&self) -> usize {
        self.counters.peak.get()
    }
    /// How many regions have been released so far.
    pub fn releases(&self) -> usize {
        self.counters.releases.get()
    }
}

impl fmt::Debug for MemoryAccounting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MemoryAccounting {{ live: {}, peak: {} }}",
            self.live_bytes(),
            self.peak_bytes()
        )
    }
}

/// Relocatable storage with two regions.
///
/// Offsets handed out by [`allocate`](#method.allocate) and
/// [`copy`](#method.copy) stay valid until the next [`swap`](#method.swap)
/// (for `allocate`) or become valid after it (for `copy`).
pub struct Arena<T: Copy + Default> {
    /// The live objects.
    from: Vector<T>,
    /// Bytes reported for `from`.
    from_bytes: usize,
    /// The relocation target, only present between `prepare` and `swap`.
    to: Option<BoundedVector<T>>,
    /// Bytes reported for `to`.
    to_bytes: usize,
    accounting: MemoryAccounting,
}

impl<T: Copy + Default> Arena<T> {
    /// Create an empty arena reporting to `accounting`.
    pub fn new(accounting: MemoryAccounting) -> Arena<T> {
        Arena {
            from: Vector::new(),
            from_bytes: 0,
            to: None,
            to_bytes: 0,
            accounting,
        }
    }
    /// The number of elements in the `from` region.
    pub fn len(&self) -> usize {
        self.from.len()
    }
    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }
    /// Whether a relocation is in progress.
    pub fn is_relocating(&self) -> bool {
        self.to.is_some()
    }
    /// Append a new object to the `from` region and return its offset.
    pub fn allocate(&mut self, items: impl IntoIterator<Item = T>) -> usize {
        requires!(!self.is_relocating(), "cannot allocate during relocation");
        let offset = self.from.len();
        for item in items {
            self.from.push(item);
        }
        let bytes = self.from.capacity() * size_of::<T>();
        if bytes > self.from_bytes {
            self.accounting.inc_bytes(bytes - self.from_bytes);
        } else {
            self.accounting.dec_bytes(self.from_bytes - bytes);
        }
        self.from_bytes = bytes;
        offset
    }
    /// Allocate the `to` region with room for `capacity` elements.
    ///
    /// # Panics
    /// Panics if a `to` region already exists.
    pub fn prepare(&mut self, capacity: usize) {
        assert!(self.to.is_none(), "arena relocation already in progress");
        self.to = Some(BoundedVector::with_capacity(capacity));
        self.to_bytes = capacity * size_of::<T>();
        self.accounting.inc_bytes(self.to_bytes);
    }
    /// Copy the object at `source` in `from` to the end of `to`.
    ///
    /// Returns the offset of the copy, which is valid in `from` after the
    /// next [`swap`](#method.swap).
    ///
    /// # Panics
    /// Panics if there is no `to` region or it would overflow.
    pub fn copy(&mut self, source: Range<usize>) -> usize {
        let to = match self.to.as_mut() {
            Some(to) => to,
            None => panic!("arena copy without prepare"),
        };
        assert!(
            to.len() + source.len() <= to.capacity(),
            "arena overflow: {} + {} exceeds {}",
            to.len(),
            source.len(),
            to.capacity()
        );
        let offset = to.len();
        for &item in &self.from[source] {
            to.push(item);
        }
        offset
    }
    /// Retire `from` and promote `to` in its place.
    ///
    /// # Panics
    /// Panics if there is no `to` region.
    pub fn swap(&mut self) {
        let to = match self.to.take() {
            Some(to) => to,
            None => panic!("arena swap without prepare"),
        };
        self.accounting.release_region(self.from_bytes);
        self.from = to.into_vector();
        self.from_bytes = self.to_bytes;
        self.to_bytes = 0;
    }
    /// Access a range of the `from` region.
    pub fn slice(&self, range: Range<usize>) -> &[T] {
        &self.from[range]
    }
    /// Mutably access a range of the `from` region.
    pub fn slice_mut(&mut self, range: Range<usize>) -> &mut [T] {
        &mut self.from[range]
    }
    /// The shared byte counter.
    pub fn accounting(&self) -> &MemoryAccounting {
        &self.accounting
    }
}

impl<T: Copy + Default> Drop for Arena<T> {
    fn drop(&mut self) {
        self.accounting.release_region(self.from_bytes);
        if self.to.is_some() {
            self.accounting.release_region(self.to_bytes);
        }
    }
}

impl<T: Copy + Default> Index<usize> for Arena<T> {
    type Output = T;
    fn index(&self, offset: usize) -> &T {
        &self.from[offset]
    }
}

impl<T: Copy + Default> IndexMut<usize> for Arena<T> {
    fn index_mut(&mut self, offset: usize) -> &mut T {
        &mut self.from[offset]
    }
}

impl<T: Copy + Default> Index<Range<usize>> for Arena<T> {
    type Output = [T];
    fn index(&self, range: Range<usize>) -> &[T] {
        &self.from[range]
    }
}

impl<T: Copy + Default> HeapSpace for Arena<T> {
    fn heap_space(&self) -> usize {
        self.from.heap_space() + self.to.as_ref().map_or(0, HeapSpace::heap_space)
    }
}

impl<T: Copy + Default + fmt::Debug> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Arena")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("accounting", &self.accounting)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fill an arena so that its `from` region is exactly full.
    fn exact_arena(accounting: &MemoryAccounting, objects: &[&[u32]]) -> (Arena<u32>, Vec<usize>) {
        let total: usize = objects.iter().map(|object| object.len()).sum();
        let mut arena = Arena::new(accounting.clone());
        arena.prepare(total);
        arena.swap();
        let offsets = objects
            .iter()
            .map(|object| arena.allocate(object.iter().copied()))
            .collect();
        (arena, offsets)
    }

    #[test]
    fn compaction_keeps_live_bytes() {
        let accounting = MemoryAccounting::default();
        let (mut arena, offsets) = exact_arena(&accounting, &[&[1, 2], &[3, 4, 5], &[6]]);
        assert_eq!(arena.len(), 6);
        let before = accounting.live_bytes();
        let releases = accounting.releases();
        assert_eq!(before, 6 * size_of::<u32>());

        arena.prepare(6);
        let moved: Vec<usize> = vec![
            arena.copy(offsets[0]..offsets[0] + 2),
            arena.copy(offsets[1]..offsets[1] + 3),
            arena.copy(offsets[2]..offsets[2] + 1),
        ];
        assert_eq!(accounting.live_bytes(), 2 * before);
        arena.swap();

        assert_eq!(accounting.live_bytes(), before);
        assert_eq!(accounting.releases(), releases + 1);
        assert_eq!(&arena[moved[1]..moved[1] + 3], &[3, 4, 5]);
        assert_eq!(arena[moved[2]], 6);
    }

    #[test]
    fn compaction_drops_dead_objects() {
        let accounting = MemoryAccounting::default();
        let mut arena = Arena::new(accounting.clone());
        let dead = arena.allocate(vec![7u32; 10]);
        let live = arena.allocate(vec![1u32, 2, 3]);
        arena.prepare(3);
        let moved = arena.copy(live..live + 3);
        arena.swap();
        assert_eq!(arena.len(), 3);
        assert_eq!(moved, 0);
        assert_eq!(arena.slice(0..3), &[1, 2, 3]);
        assert_eq!(accounting.live_bytes(), 3 * size_of::<u32>());
        let _ = dead;
    }

    #[test]
    fn drop_releases_everything() {
        let accounting = MemoryAccounting::default();
        {
            let mut arena = Arena::new(accounting.clone());
            arena.allocate(vec![1u64, 2, 3, 4, 5]);
            arena.prepare(4);
            assert!(accounting.live_bytes() > 0);
        }
        assert_eq!(accounting.live_bytes(), 0);
        assert!(accounting.peak_bytes() >= 4 * size_of::<u64>());
    }

    #[test]
    #[should_panic(expected = "arena overflow")]
    fn copy_beyond_capacity() {
        let mut arena = Arena::new(MemoryAccounting::default());
        let offset = arena.allocate(vec![1u32, 2, 3]);
        arena.prepare(2);
        arena.copy(offset..offset + 3);
    }

    #[test]
    #[should_panic(expected = "already in progress")]
    fn prepare_twice() {
        let mut arena: Arena<u32> = Arena::new(MemoryAccounting::default());
        arena.prepare(1);
        arena.prepare(1);
    }
}
