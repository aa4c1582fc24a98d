//! Translation between user literals and dense solver literals.
//!
//! Users name variables with arbitrary positive integers. The solver maps
//! each of them to the next free internal variable the first time it is
//! seen, so internal arrays stay dense.

use incsat_common::{
    literal::{Literal, Variable},
    memory::{HeapSpace, Vector},
};
use incsat_macros::HeapSpace;
use std::convert::TryFrom;

/// The bidirectional variable map.
#[derive(Debug, Clone, HeapSpace)]
pub struct External {
    /// Maps external variable to internal variable; `Variable(0)` means unmapped.
    e2i: Vector<Variable>,
    /// Maps internal variable to external variable.
    i2e: Vector<i32>,
    /// The largest external variable seen so far.
    max_var: i32,
}

impl Default for External {
    fn default() -> External {
        External {
            e2i: vector![Variable(0)],
            i2e: vector![0],
            max_var: 0,
        }
    }
}

/// Panic unless `literal` names a variable.
pub fn check_literal(literal: i32) {
    assert!(
        literal != 0 && literal != i32::min_value(),
        "invalid API usage: literal {} is not a valid literal",
        literal
    );
}

impl External {
    /// The largest external variable seen so far.
    pub fn max_var(&self) -> i32 {
        self.max_var
    }
    /// The largest internal variable allocated so far.
    pub fn internal_max_var(&self) -> Variable {
        Variable((self.i2e.len() - 1) as u32)
    }
    /// Make room for external variables up to `max_var` without allocating
    /// internal variables.
    pub fn reserve(&mut self, max_var: i32) {
        if max_var > self.max_var {
            self.max_var = max_var;
            self.e2i.resize(max_var as usize + 1);
        }
    }
    /// Translate an external literal, allocating a new internal variable
    /// if the variable has not been seen before.
    pub fn internalize(&mut self, literal: i32) -> Literal {
        check_literal(literal);
        let variable = literal.abs();
        self.reserve(variable);
        let index = variable as usize;
        if self.e2i[index] == Variable(0) {
            let internal = self.i2e.len();
            requires!(u32::try_from(internal).is_ok());
            self.e2i[index] = Variable(internal as u32);
            self.i2e.push(variable);
        }
        self.e2i[index].literal(literal > 0)
    }
    /// Translate an external literal if its variable is known.
    pub fn lookup(&self, literal: i32) -> Option<Literal> {
        check_literal(literal);
        let index = literal.abs() as usize;
        if index >= self.e2i.len() || self.e2i[index] == Variable(0) {
            return None;
        }
        Some(self.e2i[index].literal(literal > 0))
    }
    /// Translate an internal literal back.
    pub fn externalize(&self, literal: Literal) -> i32 {
        requires!(!literal.is_zero());
        let variable = self.i2e[literal.variable().0 as usize];
        if literal.is_negative() {
            -variable
        } else {
            variable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_allocation() {
        let mut external = External::default();
        let a = external.internalize(-40);
        let b = external.internalize(7);
        assert_eq!(a, Variable(1).literal(false));
        assert_eq!(b, Variable(2).literal(true));
        assert_eq!(external.internalize(40), -a);
        assert_eq!(external.max_var(), 40);
        assert_eq!(external.internal_max_var(), Variable(2));
        assert_eq!(external.externalize(-b), -7);
        assert_eq!(external.lookup(-7), Some(-b));
        assert_eq!(external.lookup(8), None);
        assert_eq!(external.lookup(100), None);
    }

    #[test]
    #[should_panic(expected = "invalid API usage")]
    fn zero_is_not_a_literal() {
        External::default().internalize(0);
    }
}
