//! A plain backtracking search on top of the propagation engine.
//!
//! Decisions are made on the lowest unassigned variable with a fixed
//! phase. On conflict the deepest decision that has not been flipped yet
//! is flipped. Nothing is learned, so the formula itself never changes
//! except for the constraint clause, which only lives during one call.

use crate::{
    internal::Internal,
    unsat_core::{conflict_decisions, falsified_decisions},
};
use incsat_common::{
    assignment::Value,
    clause::{ClauseFields, ClauseRef},
    literal::Literal,
    memory::Vector,
};

/// The result code of a solve call, as in IPASIR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unknown = 0,
    Satisfiable = 10,
    Unsatisfiable = 20,
}

impl Status {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// What to solve for.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    pub assumptions: &'a [Literal],
    /// A clause that has to be satisfied in this call only.
    pub constraint: Option<&'a [Literal]>,
    /// Polarity of decisions.
    pub phase: bool,
    /// Verify that the model satisfies every clause.
    pub check_model: bool,
}

/// The conclusion of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub status: Status,
    /// All assigned literals, if satisfiable.
    pub model: Vector<Literal>,
    /// The assumptions responsible for unsatisfiability.
    pub failed: Vector<Literal>,
    /// Whether the constraint is responsible for unsatisfiability.
    pub constraint_failed: bool,
}

impl Answer {
    fn new(status: Status) -> Answer {
        Answer {
            status,
            model: Vector::new(),
            failed: Vector::new(),
            constraint_failed: false,
        }
    }
}

/// How the constraint takes part in a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Constraint {
    /// There is none, or it is satisfied at level 0.
    Inactive,
    /// All its literals are false at level 0.
    Falsified,
    /// A single literal is not false; it is assumed last.
    Unit(Literal),
    /// Stored as a temporary clause.
    Clause(ClauseRef),
}

/// Simplify the constraint against level 0.
fn reduce_constraint(internal: &mut Internal, constraint: Option<&[Literal]>) -> Constraint {
    let constraint = match constraint {
        Some(constraint) => constraint,
        None => return Constraint::Inactive,
    };
    if constraint
        .iter()
        .any(|&literal| internal.value(literal) == Value::True)
    {
        return Constraint::Inactive;
    }
    let mut remaining: Vector<Literal> = constraint
        .iter()
        .copied()
        .filter(|&literal| internal.value(literal) == Value::Unassigned)
        .collect();
    remaining.sort_unstable();
    let mut length = 0;
    for i in 0..remaining.len() {
        if length == 0 || remaining[length - 1] != remaining[i] {
            remaining[length] = remaining[i];
            length += 1;
        }
    }
    remaining.truncate(length);
    match remaining.len() {
        0 => Constraint::Falsified,
        1 => Constraint::Unit(remaining[0]),
        _ => match internal.add_clause(&remaining, ClauseFields::temporary()) {
            Some(clause) => Constraint::Clause(clause),
            None => Constraint::Inactive,
        },
    }
}

/// Search for a model of the formula under the assumptions and the
/// constraint of `query`.
///
/// `terminate` is polled before every decision; if it returns true the
/// search gives up with [`Status::Unknown`](enum.Status.html). The engine
/// is left at level 0 without conflict.
pub fn search(
    internal: &mut Internal,
    query: &Query,
    terminate: &mut dyn FnMut() -> bool,
) -> Answer {
    internal.backtrack(0);
    internal.reset_conflict();
    if internal.unsat || !internal.propagate() {
        internal.reset_conflict();
        return Answer::new(Status::Unsatisfiable);
    }
    let constraint = reduce_constraint(internal, query.constraint);
    let answer = if constraint == Constraint::Falsified {
        let mut answer = Answer::new(Status::Unsatisfiable);
        answer.constraint_failed = true;
        answer
    } else {
        search_under_assumptions(internal, query, constraint, terminate)
    };
    internal.backtrack(0);
    internal.reset_conflict();
    if let Constraint::Clause(clause) = constraint {
        internal.clause_db.mark_garbage(clause);
    }
    log!(
        internal,
        1,
        "search: {} after {} decisions, {} conflicts",
        answer.status.code(),
        internal.counters.decisions,
        internal.counters.conflicts
    );
    answer
}

fn search_under_assumptions(
    internal: &mut Internal,
    query: &Query,
    constraint: Constraint,
    terminate: &mut dyn FnMut() -> bool,
) -> Answer {
    let unit = match constraint {
        Constraint::Unit(literal) => Some(literal),
        _ => None,
    };
    for literal in query.assumptions.iter().copied().chain(unit) {
        let mut answer = Answer::new(Status::Unsatisfiable);
        let mut blame = |decision: Literal| {
            if Some(decision) == unit {
                answer.constraint_failed = true;
            } else if !answer.failed.iter().any(|&failed| failed == decision) {
                answer.failed.push(decision);
            }
        };
        match internal.value(literal) {
            Value::True => {
                internal.push_dummy_level();
                continue;
            }
            Value::False => {
                blame(literal);
                falsified_decisions(internal, literal, &mut blame);
            }
            Value::Unassigned => {
                internal.assume_decision(literal);
                if internal.propagate() {
                    continue;
                }
                let clause_falsified = match constraint {
                    Constraint::Clause(clause) => internal.conflict == Some(clause),
                    _ => false,
                };
                conflict_decisions(internal, &mut blame);
                internal.reset_conflict();
                answer.constraint_failed |= clause_falsified;
            }
        }
        return answer;
    }
    decide_until_done(internal, query, constraint != Constraint::Inactive, terminate)
}

/// Chronological backtracking above the assumption levels.
fn decide_until_done(
    internal: &mut Internal,
    query: &Query,
    constrained: bool,
    terminate: &mut dyn FnMut() -> bool,
) -> Answer {
    let base = internal.level();
    // Whether the decision of each level above `base` is already flipped.
    let mut flipped: Vector<bool> = Vector::new();
    loop {
        if !internal.propagate() {
            internal.reset_conflict();
            loop {
                match flipped.pop() {
                    None => return exhausted(internal, query, constrained),
                    Some(true) => continue,
                    Some(false) => {
                        let level = base + flipped.len();
                        let decision = internal
                            .assignment
                            .trail_at(internal.assignment.control_at(level + 1))
                            .0;
                        internal.backtrack(level);
                        internal.assume_decision(-decision);
                        flipped.push(true);
                        break;
                    }
                }
            }
            continue;
        }
        if terminate() {
            log!(internal, 1, "search terminated");
            return Answer::new(Status::Unknown);
        }
        let unassigned = internal
            .maxvar()
            .all()
            .find(|&variable| !internal.assignment.is_assigned(variable));
        match unassigned {
            Some(variable) => {
                internal.assume_decision(variable.literal(query.phase));
                flipped.push(false);
            }
            None => return satisfied(internal, query),
        }
    }
}

/// Every branch above the assumptions failed.
fn exhausted(internal: &mut Internal, query: &Query, constrained: bool) -> Answer {
    let mut answer = Answer::new(Status::Unsatisfiable);
    answer.failed = query.assumptions.iter().copied().collect();
    answer.constraint_failed = constrained;
    if query.assumptions.is_empty() && !constrained {
        log!(internal, 1, "formula is unsatisfiable");
        internal.unsat = true;
    }
    answer
}

fn satisfied(internal: &Internal, query: &Query) -> Answer {
    if query.check_model {
        for clause in internal.clause_db.iter() {
            assert!(
                internal
                    .clause_db
                    .clause(clause)
                    .iter()
                    .any(|&literal| internal.value(literal) == Value::True),
                "model does not satisfy clause {}",
                internal.clause_db.clause_to_string(clause)
            );
        }
        for &literal in query.assumptions {
            assert!(
                internal.value(literal) == Value::True,
                "model does not satisfy assumption {}",
                literal
            );
        }
    }
    let mut answer = Answer::new(Status::Satisfiable);
    answer.model = internal.assignment.literals().collect();
    answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use incsat_common::{literal::Variable, memory::MemoryAccounting};

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

    fn solve(internal: &mut Internal, assumptions: &[i32], constraint: Option<&[i32]>) -> Answer {
        let assumptions: Vec<Literal> = assumptions.iter().map(|&value| lit(value)).collect();
        let constraint: Option<Vec<Literal>> =
            constraint.map(|constraint| constraint.iter().map(|&value| lit(value)).collect());
        let query = Query {
            assumptions: &assumptions,
            constraint: constraint.as_deref(),
            phase: true,
            check_model: true,
        };
        search(internal, &query, &mut || false)
    }

    #[test]
    fn finds_a_model() {
        let mut internal = engine(3, &[&[-1, -2], &[-1, 3], &[2, -3]]);
        let answer = solve(&mut internal, &[], None);
        assert_eq!(answer.status, Status::Satisfiable);
        assert!(answer.model.iter().any(|&literal| literal == lit(-1)));
        assert_eq!(answer.model.len(), 3);
        assert_eq!(internal.level(), 0);
    }

    #[test]
    fn exhaustion_proves_unsatisfiability() {
        let mut internal = engine(2, &[&[1, 2], &[1, -2], &[-1, 2], &[-1, -2]]);
        let answer = solve(&mut internal, &[], None);
        assert_eq!(answer.status, Status::Unsatisfiable);
        assert!(internal.unsat);
    }

    #[test]
    fn failed_assumptions() {
        let mut internal = engine(4, &[&[-1, 2], &[-2, -3]]);
        let answer = solve(&mut internal, &[4, 1, 3], None);
        assert_eq!(answer.status, Status::Unsatisfiable);
        let mut failed = answer.failed.into_vec();
        failed.sort();
        assert_eq!(failed, vec![lit(1), lit(3)]);
        assert!(!answer.constraint_failed);
        assert!(!internal.unsat);
        assert_eq!(solve(&mut internal, &[1], None).status, Status::Satisfiable);
    }

    #[test]
    fn constraint_is_temporary() {
        let mut internal = engine(3, &[&[-1, -2], &[-3]]);
        let answer = solve(&mut internal, &[1], Some(&[2, 3]));
        assert_eq!(answer.status, Status::Unsatisfiable);
        assert!(answer.constraint_failed);
        assert_eq!(solve(&mut internal, &[1], None).status, Status::Satisfiable);
        let answer = solve(&mut internal, &[], Some(&[-1, 3]));
        assert_eq!(answer.status, Status::Satisfiable);
        assert!(answer.model.iter().any(|&literal| literal == lit(-1)));
        let answer = solve(&mut internal, &[], Some(&[3]));
        assert!(answer.constraint_failed);
        assert!(!internal.unsat);
    }

    #[test]
    fn terminated() {
        let mut internal = engine(2, &[&[1, 2]]);
        let query = Query {
            assumptions: &[],
            constraint: None,
            phase: false,
            check_model: false,
        };
        let answer = search(&mut internal, &query, &mut || true);
        assert_eq!(answer.status, Status::Unknown);
        assert_eq!(internal.level(), 0);
    }
}
