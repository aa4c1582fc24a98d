//! The propagation engine.
//!
//! This owns the trail, the clauses and the watch lists, and provides the
//! primitives everything else is built from: assigning decisions, unit
//! propagation and backtracking.

use incsat_common::{
    assignment::{Assignment, Value},
    clause::{ClauseFields, ClauseRef, Reason},
    clausedatabase::ClauseDatabase,
    config,
    literal::{Literal, Variable},
    memory::{format_memory_usage, Array, HeapSpace, MemoryAccounting, StackMapping, Vector},
    output::print_key_value,
};
use incsat_macros::HeapSpace;
use std::cmp;

/// A list of watched clauses
type Watchlist = Vector<ClauseRef>;

/// Event counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Trail literals whose watch lists were visited.
    pub propagations: u64,
    pub decisions: u64,
    pub conflicts: u64,
    /// Compactions of the clause arena.
    pub collections: u64,
}

/// The solver state below the API layer.
#[derive(Debug, HeapSpace)]
pub struct Internal {
    /// See [`Options::verbose`](../options/struct.Options.html#structfield.verbose).
    pub verbosity: u32,
    /// The largest variable that arrays are sized for.
    maxvar: Variable,
    /// The trail storing variable assignments
    pub assignment: Assignment,
    /// Clause store
    pub clause_db: ClauseDatabase,
    /// Clauses watched by each literal, by the first two literals of the clause.
    watchlist: Array<Literal, Watchlist>,
    /// Index of the first literal in the trail that has not yet been propagated
    pub propagated: usize,
    /// For each level, the value of `propagated` when it was opened.
    propagated_at_level: Vector<usize>,
    /// The falsified clause found by the last propagation, if any.
    pub conflict: Option<ClauseRef>,
    /// Whether the formula was found unsatisfiable without assumptions.
    pub unsat: bool,
    /// Marks used while extracting unsat cores.
    pub seen: StackMapping<Literal, bool>,
    pub counters: Counters,
}

impl Internal {
    /// Create an empty engine whose clause memory is reported to `accounting`.
    pub fn new(accounting: MemoryAccounting) -> Internal {
        let maxvar = Variable(0);
        Internal {
            verbosity: 0,
            maxvar,
            assignment: Assignment::new(maxvar),
            clause_db: ClauseDatabase::new(accounting),
            watchlist: Array::new(Vector::new(), maxvar.array_size_for_literals()),
            propagated: 0,
            propagated_at_level: vector![0],
            conflict: None,
            unsat: false,
            seen: StackMapping::new(
                false,
                maxvar.array_size_for_literals(),
                maxvar.array_size_for_variables(),
            ),
            counters: Counters::default(),
        }
    }
    /// Make room for variables up to `maxvar`.
    pub fn grow(&mut self, maxvar: Variable) {
        if maxvar <= self.maxvar {
            return;
        }
        self.maxvar = maxvar;
        self.assignment.grow(maxvar);
        self.watchlist
            .grow(maxvar.array_size_for_literals(), Vector::new());
        self.seen.grow(
            maxvar.array_size_for_literals(),
            maxvar.array_size_for_variables(),
        );
    }
    pub fn maxvar(&self) -> Variable {
        self.maxvar
    }
    /// The current decision level.
    pub fn level(&self) -> usize {
        self.assignment.level()
    }
    /// The value of `literal` under the current assignment.
    pub fn value(&self, literal: Literal) -> Value {
        self.assignment.value(literal)
    }
    /// The value of `literal` if it is fixed at level 0.
    pub fn fixed(&self, literal: Literal) -> Value {
        match self.value(literal) {
            Value::Unassigned => Value::Unassigned,
            value => {
                if self.assignment.level_of(literal.variable()) == 0 {
                    value
                } else {
                    Value::Unassigned
                }
            }
        }
    }
    /// Open a new decision level.
    fn new_level(&mut self) {
        self.propagated_at_level.push(self.propagated);
        self.assignment.new_level();
    }
    /// Open a decision level that assigns nothing.
    pub fn push_dummy_level(&mut self) {
        self.new_level();
    }
    /// Open a new decision level and assign `literal` as its decision.
    ///
    /// The literal is not propagated.
    pub fn assume_decision(&mut self, literal: Literal) {
        requires!(self.value(literal) == Value::Unassigned);
        self.counters.decisions += 1;
        self.new_level();
        self.assignment.push(literal, Reason::decision());
    }
    /// Unassign everything above `level`.
    ///
    /// Literals that were still pending when the first removed level was
    /// opened become pending again.
    pub fn backtrack(&mut self, level: usize) {
        if level >= self.level() {
            return;
        }
        self.assignment.backtrack(level);
        let cursor = self.propagated_at_level[level + 1];
        self.propagated_at_level.truncate(level + 1);
        self.propagated = cmp::min(self.propagated, cursor);
        invariant!(self.propagated <= self.assignment.len());
    }
    /// Truncate the trail at the current level to `length` literals and
    /// rewind the propagation cursor to `propagated`.
    pub fn shrink_trail(&mut self, length: usize, propagated: usize) {
        requires!(propagated <= length);
        self.assignment.shrink_trail(length);
        self.propagated = propagated;
    }
    /// Forget the conflict found by the last propagation.
    pub fn reset_conflict(&mut self) {
        self.conflict = None;
    }

    /// Perform unit propagation from the propagation cursor.
    ///
    /// Returns false on conflict, which is then stored in
    /// [`conflict`](#structfield.conflict). A conflict at level 0 makes the
    /// formula unsatisfiable.
    pub fn propagate(&mut self) -> bool {
        requires!(self.conflict.is_none());
        while self.propagated < self.assignment.len() {
            let literal = -self.assignment.trail_at(self.propagated).0;
            self.propagated += 1;
            self.counters.propagations += 1;
            if let Some(clause) = self.propagate_literal(literal) {
                self.counters.conflicts += 1;
                self.conflict = Some(clause);
                if self.level() == 0 {
                    log!(self, 1, "conflict at level 0");
                    self.unsat = true;
                }
                return false;
            }
        }
        true
    }

    /// Visit the clauses watching `literal`, which has just become false.
    ///
    /// Returns the first falsified clause.
    fn propagate_literal(&mut self, literal: Literal) -> Option<ClauseRef> {
        let mut i = 0;
        while i < self.watchlist[literal].len() {
            let clause = self.watchlist[literal][i];
            if self.clause_db.fields(clause).garbage() {
                self.watchlist[literal].swap_remove(i);
                continue;
            }
            let [mut w1, mut w2] = self.clause_db.watches(clause);
            invariant!(w1 == literal || w2 == literal);
            if self.assignment[w1] || self.assignment[w2] {
                i += 1;
                continue;
            }
            if w1 == literal {
                self.clause_db.clause_mut(clause).swap(0, 1);
                w1 = w2;
                w2 = literal;
            }
            invariant!(w2 == literal);
            if let Some(position) = self.first_non_falsified(clause, 2) {
                self.watchlist[literal].swap_remove(i);
                let literals = self.clause_db.clause_mut(clause);
                let w = literals[position];
                literals[1] = w;
                literals[position] = w2;
                self.watchlist[w].push(clause);
                continue;
            }
            if self.value(w1) == Value::False {
                return Some(clause);
            }
            self.assignment.push(w1, Reason::forced(clause));
            i += 1;
        }
        None
    }

    /// The position of the first literal at or after `start` that is not false.
    fn first_non_falsified(&self, clause: ClauseRef, start: usize) -> Option<usize> {
        self.clause_db.clause(clause)[start..]
            .iter()
            .position(|&literal| self.value(literal) != Value::False)
            .map(|offset| start + offset)
    }

    /// Add a clause to the formula, simplified by the root-level assignment.
    ///
    /// Backtracks to level 0 first. Duplicate and falsified literals are
    /// removed; tautologies and satisfied clauses are dropped; the empty
    /// clause makes the formula unsatisfiable and unit clauses are assigned
    /// at level 0 without propagation. Returns the stored clause, if any.
    pub fn add_clause(&mut self, literals: &[Literal], fields: ClauseFields) -> Option<ClauseRef> {
        self.backtrack(0);
        if self.unsat {
            return None;
        }
        let mut clause: Vector<Literal> = literals.iter().copied().collect();
        clause.sort_unstable();
        let mut length = 0;
        for i in 0..clause.len() {
            let literal = clause[i];
            if length > 0 && clause[length - 1] == literal {
                continue;
            }
            if length > 0 && clause[length - 1] == -literal {
                return None;
            }
            match self.value(literal) {
                Value::True => return None,
                Value::False => continue,
                Value::Unassigned => (),
            }
            clause[length] = literal;
            length += 1;
        }
        clause.truncate(length);
        match clause.len() {
            0 => {
                log!(self, 1, "added the empty clause");
                self.unsat = true;
                None
            }
            1 => {
                self.assignment.push(clause[0], Reason::decision());
                None
            }
            _ => {
                let reference = self.clause_db.add_clause(&clause, fields);
                self.watchlist[clause[0]].push(reference);
                self.watchlist[clause[1]].push(reference);
                Some(reference)
            }
        }
    }

    /// Assign `literal` at level 0 without propagating it.
    ///
    /// An already falsified literal makes the formula unsatisfiable.
    pub fn add_unit(&mut self, literal: Literal) {
        self.backtrack(0);
        match self.value(literal) {
            Value::True => (),
            Value::False => {
                log!(self, 1, "unit {} contradicts level 0", literal);
                self.unsat = true;
            }
            Value::Unassigned => self.assignment.push(literal, Reason::decision()),
        }
    }

    /// Mark every clause that is satisfied at level 0 as garbage.
    pub fn mark_satisfied_clauses(&mut self) -> usize {
        requires!(self.level() == 0);
        let satisfied: Vec<ClauseRef> = self
            .clause_db
            .iter()
            .filter(|&clause| {
                self.clause_db
                    .clause(clause)
                    .iter()
                    .any(|&literal| self.value(literal) == Value::True)
            })
            .collect();
        for &clause in &satisfied {
            self.clause_db.mark_garbage(clause);
        }
        satisfied.len()
    }

    /// Compact the clause arena.
    ///
    /// Only allowed at level 0. Reasons of root-level literals are dropped
    /// (they are never expanded) and watch lists are rebuilt.
    pub fn collect_garbage(&mut self) {
        requires!(self.level() == 0);
        requires!(self.conflict.is_none());
        for position in 0..self.assignment.len() {
            let literal = self.assignment.trail_at(position).0;
            self.assignment
                .set_reason(literal.variable(), Reason::decision());
        }
        let bytes_before = self.clause_db.accounting().live_bytes();
        let removed = self.clause_db.collect_garbage();
        self.counters.collections += 1;
        for literal in Literal::all(self.maxvar) {
            self.watchlist[literal].clear();
        }
        let clauses: Vec<ClauseRef> = self.clause_db.iter().collect();
        for clause in clauses {
            let [w1, w2] = self.clause_db.watches(clause);
            self.watchlist[w1].push(clause);
            self.watchlist[w2].push(clause);
        }
        log!(
            self,
            2,
            "collected {} clauses, arena bytes {} -> {}",
            removed,
            bytes_before,
            self.clause_db.accounting().live_bytes()
        );
        self.watch_invariants();
    }

    /// Compact the clause arena if garbage exceeds `percent` percent of an
    /// arena of at least `minimum` elements.
    pub fn collect_garbage_if_needed(&mut self, percent: u32, minimum: usize) {
        if self.level() == 0
            && self.conflict.is_none()
            && self.clause_db.needs_compaction(percent, minimum)
        {
            self.collect_garbage();
        }
    }

    /// Verify the trail and watch lists, regardless of compile-time switches.
    ///
    /// # Panics
    /// Panics if some invariant is violated.
    pub fn self_check(&self) {
        let mut level = 0;
        let control = self.assignment.control();
        assert!(control[0] == 0, "control stack must start at 0");
        for (position, &(literal, reason)) in (&self.assignment).into_iter().enumerate() {
            while level + 1 < control.len() && control[level + 1] <= position {
                level += 1;
            }
            assert!(
                self.value(literal) == Value::True,
                "trail literal {} is not true",
                literal
            );
            assert!(
                self.assignment.level_of(literal.variable()) == level,
                "trail literal {} has a wrong level",
                literal
            );
            if !reason.is_decision() {
                let clause = self.clause_db.clause(reason.clause());
                assert!(
                    clause.contains(&literal)
                        && clause.iter().all(|&other| other == literal
                            || self.value(other) == Value::False),
                    "reason of {} does not imply it",
                    literal
                );
            }
        }
        for clause in self.clause_db.iter() {
            let [w1, w2] = self.clause_db.watches(clause);
            assert!(
                self.watchlist[w1].contains(&clause) && self.watchlist[w2].contains(&clause),
                "clause {} is not watched by its first two literals",
                self.clause_db.clause_to_string(clause)
            );
        }
    }

    /// Check invariants on the trail (expensive).
    pub fn assignment_invariants(&self) {
        self.assignment.assignment_invariants();
        if config::CHECK_TRAIL_INVARIANTS {
            invariant!(self.propagated <= self.assignment.len());
            invariant!(self.propagated_at_level.len() == self.level() + 1);
        }
    }

    /// Check watch invariants (very expensive).
    fn watch_invariants(&self) {
        if !config::CHECK_WATCH_INVARIANTS {
            return;
        }
        for literal in Literal::all(self.maxvar) {
            for &clause in &self.watchlist[literal] {
                let [w1, w2] = self.clause_db.watches(clause);
                invariant!(
                    literal == w1 || literal == w2,
                    "watch {} not within the first two literals in {}",
                    literal,
                    self.clause_db.clause_to_string(clause)
                );
            }
        }
    }

    /// Print the memory usage of each component.
    pub fn print_memory_usage(&self) {
        macro_rules! heap_space {
            ($($x:expr),*) => {{
                $(print_key_value(stringify!($x), format_memory_usage($x.heap_space()));)*
            }};
        }
        heap_space!(self.assignment, self.clause_db, self.watchlist, self.seen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(value: i32) -> Literal {
        Literal::new(value)
    }

    fn engine(maxvar: u32, clauses: &[&[i32]]) -> Internal {
        let mut internal = Internal::new(MemoryAccounting::default());
        internal.grow(Variable(maxvar));
        for clause in clauses {
            let literals: Vec<Literal> = clause.iter().map(|&value| lit(value)).collect();
            internal.add_clause(&literals, ClauseFields::irredundant());
        }
        internal
    }

    #[test]
    fn chain_propagation() {
        let mut internal = engine(4, &[&[-1, 2], &[-2, 3], &[-3, 4]]);
        internal.assume_decision(lit(1));
        assert!(internal.propagate());
        assert_eq!(
            internal.assignment.literals().collect::<Vec<_>>(),
            vec![lit(1), lit(2), lit(3), lit(4)]
        );
        assert_eq!(internal.assignment.level_of(Variable(4)), 1);
        internal.self_check();
        internal.backtrack(0);
        assert!(internal.assignment.is_empty());
        assert_eq!(internal.propagated, 0);
    }

    #[test]
    fn conflict_is_reported() {
        let mut internal = engine(2, &[&[-1, 2], &[-1, -2]]);
        internal.assume_decision(lit(1));
        assert!(!internal.propagate());
        let conflict = internal.conflict.unwrap();
        assert!(internal
            .clause_db
            .clause(conflict)
            .iter()
            .all(|&literal| internal.value(literal) == Value::False));
        assert!(!internal.unsat);
        internal.reset_conflict();
        internal.backtrack(0);
        assert_eq!(internal.level(), 0);
    }

    #[test]
    fn root_simplification() {
        let mut internal = engine(3, &[&[1, 1, -2], &[2, -2], &[-3]]);
        assert_eq!(internal.clause_db.number_of_clauses(), 1);
        assert_eq!(internal.value(lit(3)), Value::False);
        assert!(internal
            .add_clause(&[lit(3), lit(1)], ClauseFields::irredundant())
            .is_none());
        assert_eq!(internal.value(lit(1)), Value::True);
        internal.add_clause(&[lit(3)], ClauseFields::irredundant());
        assert!(internal.unsat);
    }

    #[test]
    fn pending_units_survive_backtracking() {
        let mut internal = engine(3, &[&[-1, 2]]);
        internal.add_unit(lit(1));
        internal.assume_decision(lit(3));
        assert!(internal.propagate());
        assert_eq!(internal.value(lit(2)), Value::True);
        internal.backtrack(0);
        assert_eq!(internal.value(lit(2)), Value::Unassigned);
        assert_eq!(internal.propagated, 0);
        assert!(internal.propagate());
        assert_eq!(internal.fixed(lit(2)), Value::True);
    }

    #[test]
    fn compaction_rebuilds_watches() {
        let mut internal = engine(4, &[&[1, 2], &[-1, 3, 4], &[2, 3]]);
        internal.add_unit(lit(2));
        assert!(internal.propagate());
        assert_eq!(internal.mark_satisfied_clauses(), 2);
        internal.collect_garbage();
        assert_eq!(internal.clause_db.number_of_clauses(), 1);
        assert_eq!(internal.clause_db.garbage_size(), 0);
        internal.self_check();
        internal.assume_decision(lit(1));
        internal.assume_decision(lit(-3));
        assert!(internal.propagate());
        assert_eq!(internal.value(lit(4)), Value::True);
    }
}
