//! Consistency check of an assumption sequence under unit propagation.

use crate::{
    external::External,
    internal::Internal,
    unsat_core::{conflict_decisions, falsified_decisions},
};
use incsat_common::{assignment::Value, memory::Vector};
use std::fmt;

/// Why a consistency check succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropcheckOutcome {
    /// All assumptions were assigned and propagated without conflict.
    Consistent,
    /// The formula is already unsatisfiable at level 0.
    Inconsistent,
    /// A conflict from an earlier propagation has not been cleared.
    PendingConflict,
    /// Catching up propagation of literals that were assigned out of band
    /// before the check ran into a conflict. No assumption was tried.
    RestoreConflict,
    /// An assumption was already false.
    ConflictingAssignment,
    /// Propagating an assumption produced a conflict.
    PropagationConflict,
}

impl PropcheckOutcome {
    pub fn name(self) -> &'static str {
        match self {
            PropcheckOutcome::Consistent => "consistent",
            PropcheckOutcome::Inconsistent => "inconsistent",
            PropcheckOutcome::PendingConflict => "pending conflict",
            PropcheckOutcome::RestoreConflict => "conflict while restoring",
            PropcheckOutcome::ConflictingAssignment => "conflicting assignment",
            PropcheckOutcome::PropagationConflict => "propagation conflict",
        }
    }
}

impl fmt::Display for PropcheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The result of a consistency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Propcheck {
    pub outcome: PropcheckOutcome,
    /// Number of literals assigned above the starting level, including the
    /// literal whose propagation failed.
    pub num_propagated: usize,
    /// The literals counted in `num_propagated`, in trail order, if requested.
    pub propagated: Option<Vector<i32>>,
    /// Assumptions that explain the failure, if requested.
    pub core: Option<Vector<i32>>,
}

impl Propcheck {
    fn new(outcome: PropcheckOutcome, save_propagated: bool, save_core: bool) -> Propcheck {
        Propcheck {
            outcome,
            num_propagated: 0,
            propagated: if save_propagated {
                Some(Vector::new())
            } else {
                None
            },
            core: if save_core { Some(Vector::new()) } else { None },
        }
    }
    /// Whether no assumption failed.
    pub fn is_consistent(&self) -> bool {
        self.outcome == PropcheckOutcome::Consistent
    }
}

/// Check whether `assumptions` can be assigned in order without a conflict.
///
/// The trail, the decision level and the propagation cursor are identical
/// before and after the call. With `restore`, literals that were assigned
/// but not yet propagated at the current level are propagated first, and
/// a conflict there is reported as
/// [`RestoreConflict`](enum.PropcheckOutcome.html#variant.RestoreConflict).
pub fn propcheck(
    internal: &mut Internal,
    external: &mut External,
    assumptions: &[i32],
    restore: bool,
    save_propagated: bool,
    save_core: bool,
) -> Propcheck {
    if internal.unsat {
        log!(internal, 1, "propcheck on an inconsistent formula");
        return Propcheck::new(PropcheckOutcome::Inconsistent, save_propagated, save_core);
    }
    if internal.conflict.is_some() {
        return Propcheck::new(
            PropcheckOutcome::PendingConflict,
            save_propagated,
            save_core,
        );
    }
    let level = internal.level();
    let trail_length = internal.assignment.len();
    let propagated = internal.propagated;
    let mut result = Propcheck::new(PropcheckOutcome::Consistent, save_propagated, save_core);

    if restore && !internal.propagate() {
        result.outcome = PropcheckOutcome::RestoreConflict;
        if let Some(core) = &mut result.core {
            conflict_decisions(internal, |decision| core.push(external.externalize(decision)));
        }
    }

    if result.outcome == PropcheckOutcome::Consistent {
        for &assumption in assumptions {
            let literal = external.internalize(assumption);
            internal.grow(external.internal_max_var());
            match internal.value(literal) {
                Value::True => (),
                Value::False => {
                    result.outcome = PropcheckOutcome::ConflictingAssignment;
                    if let Some(core) = &mut result.core {
                        core.push(assumption);
                        falsified_decisions(internal, literal, |decision| {
                            core.push(external.externalize(decision))
                        });
                    }
                    break;
                }
                Value::Unassigned => {
                    internal.assume_decision(literal);
                    if !internal.propagate() {
                        result.outcome = PropcheckOutcome::PropagationConflict;
                        if let Some(core) = &mut result.core {
                            conflict_decisions(internal, |decision| {
                                core.push(external.externalize(decision))
                            });
                        }
                        break;
                    }
                }
            }
        }
        if internal.level() > level {
            let start = internal.assignment.control_at(level + 1);
            result.num_propagated = internal.assignment.len() - start;
            if let Some(output) = &mut result.propagated {
                for position in start..internal.assignment.len() {
                    output.push(external.externalize(internal.assignment.trail_at(position).0));
                }
            }
            if let Some(conflict) = internal.conflict {
                result.num_propagated += 1;
                if let Some(output) = &mut result.propagated {
                    output.push(external.externalize(internal.clause_db.clause(conflict)[0]));
                }
            }
        }
    }

    internal.reset_conflict();
    internal.backtrack(level);
    internal.shrink_trail(trail_length, propagated);
    internal.assignment_invariants();
    log!(
        internal,
        1,
        "propcheck of {} assumptions: {}, {} propagated",
        assumptions.len(),
        result.outcome,
        result.num_propagated
    );
    result
}
