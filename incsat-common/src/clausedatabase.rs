//! Container for clauses
//!
//! Clauses are stored back to back in an [`Arena`](../memory/struct.Arena.html)
//! and addressed by offset. Deleting a clause only marks it as garbage;
//! the space is reclaimed by [`collect_garbage()`](struct.ClauseDatabase.html#method.collect_garbage),
//! which relocates all remaining clauses and thus invalidates every
//! [`ClauseRef`](../clause/struct.ClauseRef.html).

use crate::{
    clause::{ClauseFields, ClauseRef},
    literal::Literal,
    memory::{Arena, HeapSpace, MemoryAccounting, Vector},
};
use incsat_macros::HeapSpace;
use std::ops::Range;

/// Size of metadata that precede the literals of a clause
pub const PADDING_START: usize = 2;
/// Location of the fields within the metadata.
pub const FIELDS_OFFSET: usize = 0;
/// Location of the clause size within the metadata.
pub const SIZE_OFFSET: usize = 1;

/// Stores clauses in a flat, compactable buffer
#[derive(Debug, HeapSpace)]
pub struct ClauseDatabase {
    /// Stores clauses with some metadata.
    /// The first element contains a `struct ClauseFields`.
    /// The second element is the number of literals.
    /// After that, the literals are stored.
    arena: Arena<Literal>,
    /// All clauses, including the ones marked as garbage, in insertion order.
    clauses: Vector<ClauseRef>,
    /// Number of arena elements occupied by garbage clauses.
    garbage_literals: usize,
}

impl ClauseDatabase {
    /// Create an empty clause database reporting its memory to `accounting`.
    pub fn new(accounting: MemoryAccounting) -> ClauseDatabase {
        ClauseDatabase {
            arena: Arena::new(accounting),
            clauses: Vector::new(),
            garbage_literals: 0,
        }
    }
    /// Returns the total number of clauses that are stored, including garbage.
    pub fn number_of_clauses(&self) -> usize {
        self.clauses.len()
    }
    /// Number of arena elements in use.
    pub fn arena_size(&self) -> usize {
        self.arena.len()
    }
    /// Number of arena elements that the next compaction will reclaim.
    pub fn garbage_size(&self) -> usize {
        self.garbage_literals
    }
    /// Store a new clause.
    pub fn add_clause(&mut self, literals: &[Literal], fields: ClauseFields) -> ClauseRef {
        requires!(literals.len() >= 2, "clauses of size < 2 are not stored");
        let header = [Literal::from_raw(fields.0), Literal::from_raw(literals.len() as u32)];
        let offset = self
            .arena
            .allocate(header.iter().chain(literals.iter()).copied());
        let clause = ClauseRef::new(offset);
        self.clauses.push(clause);
        clause
    }
    /// The arena offsets of the literals in the clause.
    pub fn clause_range(&self, clause: ClauseRef) -> Range<usize> {
        let start = clause.offset + PADDING_START;
        start..start + self.size(clause)
    }
    /// The literals in the the clause.
    pub fn clause(&self, clause: ClauseRef) -> &[Literal] {
        self.arena.slice(self.clause_range(clause))
    }
    /// The literals in the clause, mutably, e.g. to move watches.
    pub fn clause_mut(&mut self, clause: ClauseRef) -> &mut [Literal] {
        let range = self.clause_range(clause);
        self.arena.slice_mut(range)
    }
    /// The number of literals in the clause.
    pub fn size(&self, clause: ClauseRef) -> usize {
        self.arena[clause.offset + SIZE_OFFSET].encoding as usize
    }
    /// The first two literals in the clause.
    pub fn watches(&self, clause: ClauseRef) -> [Literal; 2] {
        let start = clause.offset + PADDING_START;
        [self.arena[start], self.arena[start + 1]]
    }
    /// Access the metadata for this clause.
    pub fn fields(&self, clause: ClauseRef) -> ClauseFields {
        ClauseFields(self.arena[clause.offset + FIELDS_OFFSET].encoding)
    }
    /// Overwrite the metadata for this clause.
    pub fn store_fields(&mut self, clause: ClauseRef, fields: ClauseFields) {
        self.arena[clause.offset + FIELDS_OFFSET] = Literal::from_raw(fields.0);
    }
    /// Mark a clause for removal by the next garbage collection.
    pub fn mark_garbage(&mut self, clause: ClauseRef) {
        let mut fields = self.fields(clause);
        if fields.garbage() {
            return;
        }
        fields.set_garbage(true);
        self.store_fields(clause, fields);
        self.garbage_literals += PADDING_START + self.size(clause);
    }
    /// Iterate over the clauses that are not garbage.
    pub fn iter(&self) -> impl Iterator<Item = ClauseRef> + '_ {
        self.clauses
            .iter()
            .copied()
            .filter(move |&clause| !self.fields(clause).garbage())
    }
    /// Whether garbage makes up at least `percent` percent of an arena
    /// that holds at least `minimum` elements.
    pub fn needs_compaction(&self, percent: u32, minimum: usize) -> bool {
        self.garbage_literals > 0
            && self.arena.len() >= minimum
            && self.garbage_literals * 100 >= self.arena.len() * percent as usize
    }
    /// Relocate all clauses that are not garbage into a fresh region.
    ///
    /// Every previously returned `ClauseRef` is invalid afterwards; use
    /// [`iter()`](#method.iter) to find the new ones.
    /// Returns the number of clauses that were removed.
    pub fn collect_garbage(&mut self) -> usize {
        let live_size: usize = self
            .iter()
            .map(|clause| PADDING_START + self.size(clause))
            .sum();
        let old_clauses = std::mem::replace(&mut self.clauses, Vector::new());
        self.arena.prepare(live_size);
        for &clause in &old_clauses {
            if self.fields(clause).garbage() {
                continue;
            }
            let end = clause.offset + PADDING_START + self.size(clause);
            let offset = self.arena.copy(clause.offset..end);
            self.clauses.push(ClauseRef::new(offset));
        }
        self.arena.swap();
        self.garbage_literals = 0;
        old_clauses.len() - self.clauses.len()
    }
    /// The byte counter shared with the arena.
    pub fn accounting(&self) -> &MemoryAccounting {
        self.arena.accounting()
    }
    /// Give the DIMACS representation of a clause.
    ///
    /// Only used for debugging.
    pub fn clause_to_string(&self, clause: ClauseRef) -> String {
        format!(
            "[{}]{} 0",
            clause,
            self.clause(clause)
                .iter()
                .map(|&literal| format!(" {}", literal))
                .collect::<Vec<_>>()
                .join("")
        )
    }
}
