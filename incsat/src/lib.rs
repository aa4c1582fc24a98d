//! An incremental SAT solving core.
//!
//! The entry point is [`Solver`](solver/struct.Solver.html), which exposes an
//! IPASIR-style interface guarded by the lifecycle state machine in
//! [`state`](state/index.html). On top of plain solving it offers two
//! propagation-only queries:
//!
//! - [`Solver::propcheck`](solver/struct.Solver.html#method.propcheck) checks
//!   whether a sequence of assumptions is consistent under unit propagation,
//!   optionally returning the propagated literals and an unsat core;
//! - [`Solver::propcheck_all_tree`](solver/struct.Solver.html#method.propcheck_all_tree)
//!   enumerates all sign assignments to a list of variables that survive
//!   unit propagation.
//!
//! ```
//! use incsat::Solver;
//!
//! let mut solver = Solver::new();
//! solver.clause(&[1, 2]);
//! solver.clause(&[-1]);
//! assert!(!solver.propcheck(&[-2], false, false, false).is_consistent());
//! assert_eq!(solver.propcheck_all_tree(&[2, 3], 0, false).total, 2);
//! ```

#[macro_use]
extern crate incsat_common;

#[macro_use]
pub mod state;
pub mod external;
pub mod internal;
pub mod options;
pub mod propcheck;
pub mod search;
pub mod solver;
pub mod tree;
pub mod unsat_core;

pub use crate::{
    options::Options,
    propcheck::{Propcheck, PropcheckOutcome},
    solver::{Solver, Statistics, Terminator},
    state::{InvalidState, Operation, State},
    tree::Tree,
};
