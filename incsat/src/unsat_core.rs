//! Extraction of the decisions responsible for a conflict.

use crate::internal::Internal;
use incsat_common::{
    assignment::Assignment, clausedatabase::ClauseDatabase, literal::Literal,
    memory::StackMapping,
};

/// Exclusive access to the seen marks for the duration of one extraction.
///
/// All marks are cleared when the guard is dropped, on every exit path.
pub struct SeenGuard<'a> {
    seen: &'a mut StackMapping<Literal, bool>,
    /// Number of literals that are currently marked.
    pending: usize,
}

impl<'a> SeenGuard<'a> {
    pub fn new(seen: &'a mut StackMapping<Literal, bool>) -> SeenGuard<'a> {
        requires!(seen.is_empty(), "seen marks leaked from a previous extraction");
        SeenGuard { seen, pending: 0 }
    }
    /// Mark a literal. Marking twice has no effect.
    pub fn mark(&mut self, literal: Literal) {
        if !self.seen[literal] {
            self.seen.push(literal, true);
            self.pending += 1;
        }
    }
    pub fn unmark(&mut self, literal: Literal) {
        if self.seen[literal] {
            self.seen.set(literal, false);
            self.pending -= 1;
        }
    }
    pub fn is_marked(&self, literal: Literal) -> bool {
        self.seen[literal]
    }
    /// The number of marked literals.
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl Drop for SeenGuard<'_> {
    fn drop(&mut self) {
        self.seen.clear();
    }
}

/// Mark the true trail literal of the falsified `literal`, unless it was
/// assigned at level 0.
pub fn mark_falsified(assignment: &Assignment, seen: &mut SeenGuard, literal: Literal) {
    if assignment.level_of(literal.variable()) > 0 {
        seen.mark(-literal);
    }
}

/// Walk the trail backwards, replacing each marked literal by the literals
/// of its reason until only decisions remain.
///
/// Each decision that is reached is passed to `emit`, latest first, and
/// every mark is removed.
pub fn expand_reasons(
    assignment: &Assignment,
    clause_db: &ClauseDatabase,
    seen: &mut SeenGuard,
    mut emit: impl FnMut(Literal),
) {
    let mut position = assignment.len();
    while position > 0 && seen.pending() > 0 {
        position -= 1;
        let (literal, reason) = assignment.trail_at(position);
        if !seen.is_marked(literal) {
            continue;
        }
        seen.unmark(literal);
        if reason.is_decision() {
            emit(literal);
            continue;
        }
        for &other in clause_db.clause(reason.clause()) {
            if other != literal {
                mark_falsified(assignment, seen, other);
            }
        }
    }
    invariant!(seen.pending() == 0);
}

/// Pass the decisions that imply the current conflict to `emit`.
///
/// Does nothing if there is no conflict.
pub fn conflict_decisions(internal: &mut Internal, emit: impl FnMut(Literal)) {
    let Internal {
        assignment,
        clause_db,
        seen,
        conflict,
        ..
    } = internal;
    let conflict = match conflict {
        Some(clause) => *clause,
        None => return,
    };
    let mut guard = SeenGuard::new(seen);
    for &literal in clause_db.clause(conflict) {
        mark_falsified(assignment, &mut guard, literal);
    }
    expand_reasons(assignment, clause_db, &mut guard, emit);
}

/// Pass the decisions that imply that `literal` is false to `emit`.
pub fn falsified_decisions(internal: &mut Internal, literal: Literal, emit: impl FnMut(Literal)) {
    let Internal {
        assignment,
        clause_db,
        seen,
        ..
    } = internal;
    let mut guard = SeenGuard::new(seen);
    mark_falsified(assignment, &mut guard, literal);
    expand_reasons(assignment, clause_db, &mut guard, emit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use incsat_common::{
        assignment::Value,
        clause::ClauseFields,
        literal::Variable,
        memory::{MemoryAccounting, Vector},
    };

    fn lit(value: i32) -> Literal {
        Literal::new(value)
    }

    #[test]
    fn decisions_of_the_conflict() {
        let mut internal = Internal::new(MemoryAccounting::default());
        internal.grow(Variable(6));
        let clauses: &[&[i32]] = &[&[-1, 3], &[-2, 4], &[-3, -4, -6, 5], &[-3, -4, -5]];
        for clause in clauses {
            let literals: Vec<Literal> = clause.iter().map(|&value| lit(value)).collect();
            internal.add_clause(&literals, ClauseFields::irredundant());
        }
        internal.add_unit(lit(6));
        internal.assume_decision(lit(1));
        assert!(internal.propagate());
        assert_eq!(internal.value(lit(2)), Value::Unassigned);
        internal.assume_decision(lit(2));
        assert!(!internal.propagate());

        let mut core = Vector::new();
        conflict_decisions(&mut internal, |literal| core.push(literal));
        assert_eq!(core, vector![lit(2), lit(1)]);
        assert!(internal.seen.is_empty());
    }

    #[test]
    fn guard_clears_on_early_exit() {
        let mut seen = StackMapping::new(false, 8, 4);
        {
            let mut guard = SeenGuard::new(&mut seen);
            guard.mark(lit(2));
            guard.mark(lit(-3));
            guard.mark(lit(2));
            assert_eq!(guard.pending(), 2);
        }
        assert!(seen.is_empty());
        assert!(!seen[lit(2)] && !seen[lit(-3)]);
    }
}
