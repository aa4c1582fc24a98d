//! A partial assignment with decision levels.
//!
//! The trail records assigned literals in chronological order, and the
//! control stack records where each decision level starts in the trail.
//! We expose most of the internals because the checker and the tree
//! enumerator manipulate levels directly.

use crate::{
    clause::Reason,
    config,
    literal::{Literal, Variable},
    memory::{Array, HeapSpace, Vector},
};
use std::{fmt, fmt::Display, ops::Index, slice};

/// The truth value of a literal under the current assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    True,
    False,
    Unassigned,
}

impl Value {
    /// The usual `1`, `-1`, `0` encoding.
    pub fn signum(self) -> i32 {
        match self {
            Value::True => 1,
            Value::False => -1,
            Value::Unassigned => 0,
        }
    }
}

/// An assignment comprising a mapping plus a trail (stack of literals) and
/// a control stack of level offsets.
///
/// Unlike the trail, the control stack may contain *dummy* levels that
/// assign nothing; their offset equals the offset of the next level.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// Maps assigned literal to true.
    mapping: Array<Literal, bool>,
    /// Assigned literals, in chronologic order.
    trail: Vector<(Literal, Reason)>,
    /// Maps variable to its offset in `trail`.
    position_in_trail: Array<Variable, usize>,
    /// Maps variable to the decision level it was assigned at.
    level: Array<Variable, usize>,
    /// Maps decision level to the trail offset where it begins.
    control: Vector<usize>,
}

impl Assignment {
    /// Create an empty assignment at level 0.
    pub fn new(maxvar: Variable) -> Assignment {
        let mut control = Vector::new();
        control.push(0);
        Assignment {
            mapping: Array::new(false, maxvar.array_size_for_literals()),
            trail: Vector::with_capacity(maxvar.array_size_for_variables()),
            position_in_trail: Array::new(usize::max_value(), maxvar.array_size_for_variables()),
            level: Array::new(0, maxvar.array_size_for_variables()),
            control,
        }
    }
    /// Make room for variables up to `maxvar`.
    pub fn grow(&mut self, maxvar: Variable) {
        self.mapping.grow(maxvar.array_size_for_literals(), false);
        self.position_in_trail
            .grow(maxvar.array_size_for_variables(), usize::max_value());
        self.level.grow(maxvar.array_size_for_variables(), 0);
        self.trail.reserve_total(maxvar.array_size_for_variables());
    }
    /// Return the number of assigned literals.
    pub fn len(&self) -> usize {
        self.trail.len()
    }
    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }
    /// The current decision level.
    pub fn level(&self) -> usize {
        self.control.len() - 1
    }
    /// The trail offset where `level` begins.
    pub fn control_at(&self, level: usize) -> usize {
        self.control[level]
    }
    /// The whole control stack.
    pub fn control(&self) -> &[usize] {
        &self.control
    }
    /// The value of `literal`.
    pub fn value(&self, literal: Literal) -> Value {
        if self.mapping[literal] {
            Value::True
        } else if self.mapping[-literal] {
            Value::False
        } else {
            Value::Unassigned
        }
    }
    /// Whether the variable has a value.
    pub fn is_assigned(&self, variable: Variable) -> bool {
        self.value(variable.literal(true)) != Value::Unassigned
    }
    /// The decision level of an assigned variable.
    pub fn level_of(&self, variable: Variable) -> usize {
        requires!(self.is_assigned(variable));
        self.level[variable]
    }
    /// Return the position in the trail where this variable was assigned.
    pub fn position_in_trail(&self, variable: Variable) -> usize {
        requires!(self.is_assigned(variable));
        self.position_in_trail[variable]
    }
    /// The reason of an assigned variable.
    pub fn reason_of(&self, variable: Variable) -> Reason {
        self.trail[self.position_in_trail(variable)].1
    }
    /// Replace the reason of an assigned variable.
    pub fn set_reason(&mut self, variable: Variable, reason: Reason) {
        let position = self.position_in_trail(variable);
        self.trail[position].1 = reason;
    }
    /// Access the trail by offset.
    pub fn trail_at(&self, offset: usize) -> (Literal, Reason) {
        self.trail[offset]
    }
    /// Add a new literal to the trail at the current level, assigning it to true.
    pub fn push(&mut self, literal: Literal, reason: Reason) {
        requires!(!literal.is_zero());
        requires!(
            self.value(literal) == Value::Unassigned,
            "literal {} is already assigned",
            literal
        );
        let variable = literal.variable();
        self.mapping[literal] = true;
        self.position_in_trail[variable] = self.len();
        self.level[variable] = self.level();
        self.trail.push((literal, reason));
    }
    /// Open a new decision level starting at the end of the trail.
    pub fn new_level(&mut self) {
        let offset = self.len();
        self.control.push(offset);
    }
    /// Unassign everything above `level` and close those levels.
    pub fn backtrack(&mut self, level: usize) {
        requires!(level <= self.level());
        if level == self.level() {
            return;
        }
        let start = self.control[level + 1];
        self.unassign_from(start);
        self.control.truncate(level + 1);
    }
    /// Unassign every literal at trail offset `length` and later.
    ///
    /// Note: this does not close levels, so `length` must not be smaller
    /// than the start of the current level.
    pub fn shrink_trail(&mut self, length: usize) {
        requires!(length >= self.control[self.level()] && length <= self.len());
        self.unassign_from(length);
    }
    fn unassign_from(&mut self, length: usize) {
        while self.len() > length {
            if let Some((literal, _reason)) = self.trail.pop() {
                self.mapping[literal] = false;
            }
        }
    }
    /// Iterate over the assigned literals, from oldest to newest.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.trail.iter().map(|&(literal, _reason)| literal)
    }
    /// Check that trail, mapping and control stack agree with each other.
    pub fn assignment_invariants(&self) {
        if !config::CHECK_TRAIL_INVARIANTS {
            return;
        }
        invariant!(self.control[0] == 0);
        for level in 1..self.control.len() {
            invariant!(self.control[level - 1] <= self.control[level]);
        }
        invariant!(self.control[self.level()] <= self.len());
        let mut level = 0;
        for (position, &(literal, _reason)) in self.trail.iter().enumerate() {
            while level < self.level() && self.control[level + 1] <= position {
                level += 1;
            }
            let variable = literal.variable();
            invariant!(self.mapping[literal] && !self.mapping[-literal]);
            invariant!(self.position_in_trail[variable] == position);
            invariant!(
                self.level[variable] == level,
                "{} assigned at level {} but found at level {}",
                literal,
                self.level[variable],
                level
            );
        }
    }
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Assignment) -> bool {
        self.trail == other.trail && self.control == other.control
    }
}

/// Iterate over the literals in the trail, from oldest to newest.
impl<'a> IntoIterator for &'a Assignment {
    type Item = &'a (Literal, Reason);
    type IntoIter = slice::Iter<'a, (Literal, Reason)>;
    fn into_iter(self) -> Self::IntoIter {
        self.trail.iter()
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Assignment: {}", self.len())?;
        for (literal, reason) in self {
            write!(
                f,
                " {}@{} ({}),",
                literal,
                self.level[literal.variable()],
                reason
            )?;
        }
        Ok(())
    }
}

impl Index<Literal> for Assignment {
    type Output = bool;
    fn index(&self, literal: Literal) -> &bool {
        &self.mapping[literal]
    }
}

impl HeapSpace for Assignment {
    fn heap_space(&self) -> usize {
        self.mapping.heap_space()
            + self.trail.heap_space()
            + self.position_in_trail.heap_space()
            + self.level.heap_space()
            + self.control.heap_space()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(value: i32) -> Literal {
        Literal::new(value)
    }

    #[test]
    fn levels_and_backtracking() {
        let mut assignment = Assignment::new(Variable(4));
        assignment.push(lit(1), Reason::decision());
        assignment.new_level();
        assignment.push(lit(-2), Reason::decision());
        assignment.new_level();
        assignment.new_level();
        assignment.push(lit(3), Reason::decision());
        assert_eq!(assignment.level(), 3);
        assert_eq!(assignment.control(), &[0, 1, 2, 2]);
        assert_eq!(assignment.level_of(Variable(3)), 3);
        assert_eq!(assignment.value(lit(2)), Value::False);
        assignment.assignment_invariants();

        assignment.backtrack(1);
        assert_eq!(assignment.level(), 1);
        assert_eq!(assignment.len(), 2);
        assert_eq!(assignment.value(lit(3)), Value::Unassigned);
        assignment.backtrack(0);
        assert_eq!(assignment.literals().collect::<Vec<_>>(), vec![lit(1)]);
    }

    #[test]
    fn shrink_keeps_levels() {
        let mut assignment = Assignment::new(Variable(2));
        assignment.new_level();
        assignment.push(lit(1), Reason::decision());
        assignment.push(lit(2), Reason::decision());
        assignment.shrink_trail(1);
        assert_eq!(assignment.level(), 1);
        assert!(assignment[lit(1)]);
        assert_eq!(assignment.value(lit(-2)), Value::Unassigned);
    }

    #[test]
    fn grow_keeps_values() {
        let mut assignment = Assignment::new(Variable(1));
        assignment.push(lit(-1), Reason::decision());
        assignment.grow(Variable(5));
        assignment.push(lit(5), Reason::decision());
        assert_eq!(assignment.value(lit(1)), Value::False);
        assert_eq!(assignment.value(lit(5)).signum(), 1);
        assert_eq!(assignment.position_in_trail(Variable(5)), 1);
    }

    #[test]
    fn trail_outgrows_initial_capacity() {
        let mut assignment = Assignment::new(Variable(0));
        assignment.grow(Variable(3));
        for value in 1..=3 {
            assignment.push(lit(value), Reason::decision());
        }
        assert_eq!(assignment.len(), 3);
        assert_eq!(assignment.position_in_trail(Variable(3)), 2);
    }
}
