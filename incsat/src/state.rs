//! The lifecycle of a solver as seen through its API.
//!
//! Every public operation of [`Solver`](../solver/struct.Solver.html) is
//! listed in [`Operation`](enum.Operation.html) together with the set of
//! states in which it may be called. Calling an operation in any other
//! state is a usage error and panics.

use std::{error::Error, fmt, ops::BitOr};

/// The state of a solver.
///
/// The discriminants are distinct bits so that states can be combined
/// into [`States`](struct.States.html).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// During construction.
    Initializing = 1,
    /// Options may still be changed.
    Configuring = 2,
    /// Ready to accept clauses, assumptions and solve calls.
    Steady = 4,
    /// A clause or constraint is being added literal by literal.
    Adding = 8,
    /// A solve call is in progress.
    Solving = 16,
    /// The last solve call found a model.
    Satisfied = 32,
    /// The last solve call found the formula unsatisfiable under the assumptions.
    Unsatisfied = 64,
    /// During destruction.
    Deleting = 128,
}

impl State {
    /// All states, in the order of their discriminants.
    pub const ALL: [State; 8] = [
        State::Initializing,
        State::Configuring,
        State::Steady,
        State::Adding,
        State::Solving,
        State::Satisfied,
        State::Unsatisfied,
        State::Deleting,
    ];

    pub fn name(self) -> &'static str {
        match self {
            State::Initializing => "INITIALIZING",
            State::Configuring => "CONFIGURING",
            State::Steady => "STEADY",
            State::Adding => "ADDING",
            State::Solving => "SOLVING",
            State::Satisfied => "SATISFIED",
            State::Unsatisfied => "UNSATISFIED",
            State::Deleting => "DELETING",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A set of states.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct States(u32);

impl States {
    /// The states in which the solver holds a consistent formula.
    pub const VALID: States = States(
        State::Configuring as u32
            | State::Steady as u32
            | State::Adding as u32
            | State::Satisfied as u32
            | State::Unsatisfied as u32,
    );
    /// The valid states in which no clause is being added.
    pub const READY: States = States(
        State::Configuring as u32
            | State::Steady as u32
            | State::Satisfied as u32
            | State::Unsatisfied as u32,
    );
    pub const VALID_OR_SOLVING: States = States(States::VALID.0 | State::Solving as u32);

    pub const fn only(state: State) -> States {
        States(state as u32)
    }
    pub fn contains(self, state: State) -> bool {
        self.0 & state as u32 != 0
    }
}

impl From<State> for States {
    fn from(state: State) -> States {
        States::only(state)
    }
}

impl BitOr for State {
    type Output = States;
    fn bitor(self, other: State) -> States {
        States(self as u32 | other as u32)
    }
}

impl BitOr<State> for States {
    type Output = States;
    fn bitor(self, other: State) -> States {
        States(self.0 | other as u32)
    }
}

impl fmt::Debug for States {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for States {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<&str> = State::ALL
            .iter()
            .filter(|&&state| self.contains(state))
            .map(|state| state.name())
            .collect();
        write!(f, "{}", names.join(" | "))
    }
}

/// The operations of the solver API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Change an option.
    Set,
    /// Change an option that may be changed at any time (`verbose`, `quiet`).
    SetAnytime,
    Reserve,
    Vars,
    Add,
    Constrain,
    Assume,
    ResetAssumptions,
    ResetConstraint,
    Solve,
    Simplify,
    Val,
    Failed,
    ConstraintFailed,
    Fixed,
    Inconsistent,
    Propcheck,
    PropcheckAllTree,
    /// Direct access to propagation, decisions and backtracking.
    InternalAccess,
    AddUnitClause,
    AddDerived,
    Terminate,
    ReadDimacs,
    Statistics,
    Delete,
}

impl Operation {
    /// The transition table: the states in which this operation is permitted.
    pub fn permitted(self) -> States {
        match self {
            Operation::Set => States::only(State::Configuring),
            Operation::ReadDimacs => State::Configuring | State::Steady,
            Operation::Solve
            | Operation::Simplify
            | Operation::Propcheck
            | Operation::PropcheckAllTree => States::READY,
            Operation::Val => States::only(State::Satisfied),
            Operation::Failed | Operation::ConstraintFailed => States::only(State::Unsatisfied),
            Operation::Vars
            | Operation::Inconsistent
            | Operation::Terminate
            | Operation::Statistics
            | Operation::Delete => States::VALID_OR_SOLVING,
            Operation::SetAnytime
            | Operation::Reserve
            | Operation::Add
            | Operation::Constrain
            | Operation::Assume
            | Operation::ResetAssumptions
            | Operation::ResetConstraint
            | Operation::Fixed
            | Operation::InternalAccess
            | Operation::AddUnitClause
            | Operation::AddDerived => States::VALID,
        }
    }
    pub fn name(self) -> &'static str {
        match self {
            Operation::Set | Operation::SetAnytime => "set",
            Operation::Reserve => "reserve",
            Operation::Vars => "vars",
            Operation::Add => "add",
            Operation::Constrain => "constrain",
            Operation::Assume => "assume",
            Operation::ResetAssumptions => "reset_assumptions",
            Operation::ResetConstraint => "reset_constraint",
            Operation::Solve => "solve",
            Operation::Simplify => "simplify",
            Operation::Val => "val",
            Operation::Failed => "failed",
            Operation::ConstraintFailed => "constraint_failed",
            Operation::Fixed => "fixed",
            Operation::Inconsistent => "inconsistent",
            Operation::Propcheck => "propcheck",
            Operation::PropcheckAllTree => "propcheck_all_tree",
            Operation::InternalAccess => "internal access",
            Operation::AddUnitClause => "add_unit_clause",
            Operation::AddDerived => "add_derived",
            Operation::Terminate => "terminate",
            Operation::ReadDimacs => "read_dimacs",
            Operation::Statistics => "statistics",
            Operation::Delete => "delete",
        }
    }
}

/// An operation was called in a state that does not permit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidState {
    pub operation: Operation,
    pub state: State,
}

impl fmt::Display for InvalidState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid API usage of '{}' in state {} (permitted: {})",
            self.operation.name(),
            self.state,
            self.operation.permitted()
        )
    }
}

impl Error for InvalidState {}

/// Tracks the current state and validates operations against the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    state: State,
}

impl Default for Lifecycle {
    fn default() -> Lifecycle {
        Lifecycle {
            state: State::Initializing,
        }
    }
}

impl Lifecycle {
    pub fn state(&self) -> State {
        self.state
    }
    /// Check whether `operation` is permitted in the current state.
    pub fn check(&self, operation: Operation) -> Result<(), InvalidState> {
        if operation.permitted().contains(self.state) {
            Ok(())
        } else {
            Err(InvalidState {
                operation,
                state: self.state,
            })
        }
    }
    /// Enter a new state, returning the old one.
    pub fn enter(&mut self, state: State) -> State {
        std::mem::replace(&mut self.state, state)
    }
}

/// Panic unless the solver's lifecycle permits the given operation.
macro_rules! api_requires {
    ($solver:expr, $operation:expr) => {
        if let Err(error) = $solver.lifecycle.check($operation) {
            panic!("{}", error);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_sets() {
        assert!(States::VALID.contains(State::Adding));
        assert!(!States::READY.contains(State::Adding));
        assert!(!States::VALID.contains(State::Solving));
        assert!(States::VALID_OR_SOLVING.contains(State::Solving));
        for &state in &[State::Initializing, State::Deleting] {
            assert!(!States::VALID_OR_SOLVING.contains(state));
        }
        assert_eq!(
            format!("{}", State::Configuring | State::Steady),
            "CONFIGURING | STEADY"
        );
    }

    #[test]
    fn transition_table() {
        let mut lifecycle = Lifecycle::default();
        assert!(lifecycle.check(Operation::Add).is_err());
        lifecycle.enter(State::Configuring);
        assert!(lifecycle.check(Operation::Set).is_ok());
        assert_eq!(lifecycle.enter(State::Adding), State::Configuring);
        assert!(lifecycle.check(Operation::Add).is_ok());
        let error = lifecycle.check(Operation::Solve).unwrap_err();
        assert_eq!(error.state, State::Adding);
        assert!(error.to_string().starts_with("invalid API usage of 'solve' in state ADDING"));
        lifecycle.enter(State::Satisfied);
        assert!(lifecycle.check(Operation::Val).is_ok());
        assert!(lifecycle.check(Operation::Failed).is_err());
        assert!(lifecycle.check(Operation::Set).is_err());
        assert!(lifecycle.check(Operation::SetAnytime).is_ok());
    }
}
