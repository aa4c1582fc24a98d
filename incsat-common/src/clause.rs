//! Clause references, reasons and clause metadata

use crate::memory::Offset;
use bitfield::bitfield;
use static_assertions::const_assert;
use std::{
    fmt,
    io::{self, Write},
    mem::{align_of, size_of},
};

/// A reference to a clause, given as offset of its header in the clause database.
///
/// References are invalidated by garbage collection, which relocates
/// every clause.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
pub struct ClauseRef {
    pub offset: usize,
}

impl ClauseRef {
    pub fn new(offset: usize) -> ClauseRef {
        ClauseRef { offset }
    }
}

impl Offset for ClauseRef {
    fn as_offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for ClauseRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "@{}", self.offset)
    }
}

/// The reason for assigning a literal
///
/// A literal is either a decision (this includes assumptions, dummy-free
/// root units and literals pushed from outside the propagation loop), or
/// forced by some clause.
///
/// This is essentially this enum, but we pack everything into `size_of::<usize>()` bits.
/// ```
/// # use incsat_common::clause::ClauseRef;
/// enum Reason {
///     Decision,
///     Forced(ClauseRef),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reason(TaggedUSize);

impl Reason {
    /// Create an invalid reason, i.e. for unassigned literals.
    pub fn invalid() -> Reason {
        Reason(TaggedUSize::new(0))
    }
    /// Create a reason for decisions.
    pub fn decision() -> Reason {
        Reason(TaggedUSize::new(0).with_bit1())
    }
    /// Create a reason for a literal that was forced by the given clause.
    pub fn forced(clause: ClauseRef) -> Reason {
        Reason(TaggedUSize::new(clause.offset).with_bit1().with_bit2())
    }
    /// Return true when this is a decision.
    pub fn is_decision(self) -> bool {
        invariant!(self != Reason::invalid());
        !self.0.bit2()
    }
    /// Return the clause. Only valid if this is not a decision or invalid.
    pub fn clause(self) -> ClauseRef {
        invariant!(self != Reason::invalid());
        invariant!(self != Reason::decision());
        ClauseRef::new(self.0.payload())
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if *self == Reason::invalid() {
            write!(f, "Unassigned")
        } else if self.is_decision() {
            write!(f, "Decision")
        } else {
            write!(f, "Forced by clause {}", self.clause())
        }
    }
}

/// Value with `size_of::<usize>() - 2` bits of payload and 2 flag bits
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct TaggedUSize(usize);

impl TaggedUSize {
    const MASK: usize = TaggedUSize::MASK1 | TaggedUSize::MASK2;
    pub const MASK1: usize = 1 << (size_of::<usize>() * 8 - 1);
    pub const MASK2: usize = 1 << (size_of::<usize>() * 8 - 2);
    const MAX_PAYLOAD: usize = usize::max_value() & !TaggedUSize::MASK;

    pub fn new(payload: usize) -> TaggedUSize {
        requires!(payload <= TaggedUSize::MAX_PAYLOAD);
        TaggedUSize(payload)
    }
    pub fn with_bit1(self) -> TaggedUSize {
        TaggedUSize(self.0 | TaggedUSize::MASK1)
    }
    pub fn with_bit2(self) -> TaggedUSize {
        TaggedUSize(self.0 | TaggedUSize::MASK2)
    }
    pub fn payload(self) -> usize {
        self.0 & !TaggedUSize::MASK
    }
    pub fn bit1(self) -> bool {
        self.0 & TaggedUSize::MASK1 != 0
    }
    pub fn bit2(self) -> bool {
        self.0 & TaggedUSize::MASK2 != 0
    }
}

bitfield! {
    /// The data to store for each clause in the metadata field of the
    /// [ClauseDatabase](../clausedatabase/struct.ClauseDatabase.html).
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClauseFields(u32);
    impl Debug;
    /// Whether the clause was derived (as opposed to part of the formula).
    pub is_redundant, set_redundant: 0;
    /// Whether the clause will be removed by the next garbage collection.
    pub garbage, set_garbage: 1;
    /// Whether the clause only lives for the duration of one solve call.
    pub is_temporary, set_temporary: 2;
}

impl ClauseFields {
    /// Fields for a clause of the formula.
    pub fn irredundant() -> ClauseFields {
        ClauseFields(0)
    }
    /// Fields for a derived clause.
    pub fn redundant() -> ClauseFields {
        let mut fields = ClauseFields(0);
        fields.set_redundant(true);
        fields
    }
    /// Fields for the clause of a constraint.
    pub fn temporary() -> ClauseFields {
        let mut fields = ClauseFields(0);
        fields.set_temporary(true);
        fields
    }
}

/// State the sizes of data types.
#[allow(dead_code)]
fn assert_primitive_sizes() {
    const_assert!(size_of::<ClauseFields>() == 4);
    const_assert!(size_of::<Reason>() == size_of::<usize>());
    const_assert!(align_of::<Reason>() == align_of::<usize>());
}

/// Write some external literals in DIMACS format.
///
/// Includes a terminating 0, but no newline.
pub fn write_clause(file: &mut impl Write, clause: &[i32]) -> io::Result<()> {
    for &literal in clause {
        write!(file, "{} ", literal)?;
    }
    write!(file, "0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons() {
        let reason = Reason::forced(ClauseRef::new(42));
        assert!(!reason.is_decision());
        assert_eq!(reason.clause(), ClauseRef::new(42));
        assert!(Reason::decision().is_decision());
        assert_eq!(format!("{}", Reason::decision()), "Decision");
    }

    #[test]
    fn fields() {
        let mut fields = ClauseFields::redundant();
        assert!(fields.is_redundant() && !fields.garbage());
        fields.set_garbage(true);
        assert_eq!(fields.0, 0b11);
        assert!(ClauseFields::temporary().is_temporary());
        assert!(!ClauseFields::irredundant().is_redundant());
    }

    #[test]
    fn dimacs_line() {
        let mut buffer = Vec::new();
        write_clause(&mut buffer, &[-1, 2]).unwrap();
        assert_eq!(buffer, b"-1 2 0");
    }
}
