//! Variable and literal representations
//!
//! These are the dense, solver-assigned indices. User-facing literals are
//! plain `i32` values and are translated at the API boundary.

use crate::memory::Offset;
use static_assertions::const_assert;
use std::{fmt, fmt::Display, mem::size_of, ops};

/// A variable, numbered from 1. Variable 0 is never allocated.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub struct Variable(pub u32);

/// A literal is a variable together with a sign.
///
/// It is encoded as `2 * variable + sign` where sign 1 means negated, so
/// negation only flips the lowest bit.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Default)]
pub struct Literal {
    pub encoding: u32,
}

const_assert!(size_of::<Literal>() == 4);

impl Variable {
    pub fn new(value: u32) -> Variable {
        Variable(value)
    }
    /// The literal of this variable with the given polarity.
    pub fn literal(self, positive: bool) -> Literal {
        Literal {
            encoding: self.0 * 2 + (!positive) as u32,
        }
    }
    /// Size of an array indexed by variables up to this one.
    pub fn array_size_for_variables(self) -> usize {
        self.as_offset() + 1
    }
    /// Size of an array indexed by literals of variables up to this one.
    pub fn array_size_for_literals(self) -> usize {
        2 * (self.as_offset() + 1)
    }
    /// Iterate over variables `1..=self`.
    pub fn all(self) -> impl Iterator<Item = Variable> {
        (1..=self.0).map(Variable)
    }
}

impl Offset for Variable {
    fn as_offset(&self) -> usize {
        self.0 as usize
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Literal {
    /// The literal with encoding 0; never a valid literal.
    pub const ZERO: Literal = Literal { encoding: 0 };

    /// Construct a new literal from the usual signed representation.
    pub fn new(value: i32) -> Literal {
        requires!(value != i32::min_value());
        Literal {
            encoding: (value.abs() as u32) * 2 + ((value < 0) as u32),
        }
    }
    /// Create a literal from its raw encoding. Used for metadata words in clause storage.
    pub fn from_raw(encoding: u32) -> Literal {
        Literal { encoding }
    }
    /// Convert to the signed representation.
    pub fn decode(self) -> i32 {
        let magnitude = self.variable().0 as i32;
        if self.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }
    pub fn variable(self) -> Variable {
        Variable(self.encoding / 2)
    }
    pub fn is_negative(self) -> bool {
        self.encoding & 1 != 0
    }
    pub fn is_zero(self) -> bool {
        self.variable().0 == 0
    }
    /// Iterate over both literals of each variable in `1..=maxvar`.
    pub fn all(maxvar: Variable) -> impl Iterator<Item = Literal> {
        (2..maxvar.array_size_for_literals() as u32).map(Literal::from_raw)
    }
}

impl Offset for Literal {
    fn as_offset(&self) -> usize {
        self.encoding as usize
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.decode())
    }
}

impl ops::Neg for Literal {
    type Output = Literal;
    fn neg(self) -> Literal {
        Literal {
            encoding: self.encoding ^ 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding() {
        let literal = Literal::new(-3);
        assert_eq!(literal.encoding, 7);
        assert_eq!(literal.decode(), -3);
        assert_eq!(-literal, Literal::new(3));
        assert_eq!(literal.variable(), Variable(3));
        assert_eq!(Variable(3).literal(false), literal);
        assert!(Literal::new(0).is_zero());
        assert_eq!(
            Literal::all(Variable(2)).map(Literal::decode).collect::<Vec<_>>(),
            vec![1, -1, 2, -2]
        );
    }
}
