//! The solver API.
//!
//! Every public method checks the lifecycle state first (see
//! [`Operation::permitted`](../state/enum.Operation.html#method.permitted))
//! and panics with an "invalid API usage" message if the call is not
//! allowed in the current state.

use crate::{
    external::{check_literal, External},
    internal::Internal,
    options::Options,
    propcheck::{self, Propcheck},
    search::{self, Query, Status},
    state::{Lifecycle, Operation, State},
    tree::{self, Tree},
};
use incsat_common::{
    assignment::Value,
    clause::ClauseFields,
    literal::Literal,
    memory::{HeapSpace, MemoryAccounting, Vector},
    output::print_key_value,
    parser::{parse_dimacs, read_compressed_file_or_stdin},
};
use std::io;

/// Decides whether a running [`solve`](struct.Solver.html#method.solve)
/// should give up.
pub trait Terminator {
    /// Polled before every decision of the search.
    fn terminate(&mut self) -> bool;
}

impl<F: FnMut() -> bool> Terminator for F {
    fn terminate(&mut self) -> bool {
        self()
    }
}

/// Counters and memory usage of a solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// The largest external variable.
    pub variables: i32,
    /// Clauses of size two or more, including garbage not yet collected.
    pub clauses: usize,
    pub solves: u64,
    pub propagations: u64,
    pub decisions: u64,
    pub conflicts: u64,
    /// Compactions of the clause arena.
    pub collections: u64,
    /// Bytes currently held by the clause arena.
    pub arena_bytes: usize,
    /// The largest value `arena_bytes` ever had.
    pub peak_arena_bytes: usize,
    /// Heap usage of the solver's data structures.
    pub heap_bytes: usize,
}

/// An incremental SAT solver.
pub struct Solver {
    lifecycle: Lifecycle,
    options: Options,
    internal: Internal,
    external: External,
    /// The clause being added with [`add`](#method.add).
    clause: Vector<i32>,
    /// The clause being added with [`add_derived`](#method.add_derived).
    derived: Vector<i32>,
    /// The constraint for the next solve call, if one was closed.
    constraint: Option<Vector<i32>>,
    /// The constraint being added with [`constrain`](#method.constrain).
    open_constraint: Vector<i32>,
    adding_clause: bool,
    adding_derived: bool,
    adding_constraint: bool,
    assumptions: Vector<i32>,
    /// Value of each external variable in the last model: 1, -1 or 0.
    model: Vector<i8>,
    failed: Vector<i32>,
    constraint_failed: bool,
    terminator: Option<Box<dyn Terminator>>,
    terminate_requested: bool,
    solves: u64,
}

impl Default for Solver {
    fn default() -> Solver {
        Solver::new()
    }
}

impl Solver {
    /// Create a solver with default options.
    pub fn new() -> Solver {
        Solver::with_options(Options::default())
    }
    /// Create a solver with the given options, ready to be configured.
    pub fn with_options(options: Options) -> Solver {
        let mut internal = Internal::new(MemoryAccounting::default());
        internal.verbosity = options.verbosity();
        let mut solver = Solver {
            lifecycle: Lifecycle::default(),
            options,
            internal,
            external: External::default(),
            clause: Vector::new(),
            derived: Vector::new(),
            constraint: None,
            open_constraint: Vector::new(),
            adding_clause: false,
            adding_derived: false,
            adding_constraint: false,
            assumptions: Vector::new(),
            model: Vector::new(),
            failed: Vector::new(),
            constraint_failed: false,
            terminator: None,
            terminate_requested: false,
            solves: 0,
        };
        solver.set_state(State::Configuring);
        solver
    }

    fn set_state(&mut self, state: State) {
        if self.lifecycle.enter(state) != state {
            log!(self.internal, 2, "API enters state {}", state);
        }
    }

    /// Leave configuration or a previous result behind.
    ///
    /// Results of the last solve call, its assumptions and its constraint
    /// are only valid until the next state changing call.
    fn transition_to_steady_state(&mut self) {
        match self.lifecycle.state() {
            State::Configuring => {
                if self.options.check {
                    self.internal.self_check();
                }
            }
            State::Satisfied | State::Unsatisfied => {
                self.assumptions.clear();
                self.constraint = None;
                self.model.clear();
                self.failed.clear();
                self.constraint_failed = false;
            }
            _ => return,
        }
        self.set_state(State::Steady);
    }

    /// The state after an addition of a literal.
    fn adding_or_steady(&mut self) {
        if self.adding_clause || self.adding_derived || self.adding_constraint {
            self.set_state(State::Adding);
        } else {
            self.set_state(State::Steady);
        }
    }

    /// Translate an external literal and make room for its variable.
    fn import(&mut self, literal: i32) -> Literal {
        let literal = self.external.internalize(literal);
        self.internal.grow(self.external.internal_max_var());
        literal
    }

    pub fn state(&self) -> State {
        self.lifecycle.state()
    }
    /// Whether `operation` may be called in the current state.
    pub fn permits(&self, operation: Operation) -> bool {
        self.lifecycle.check(operation).is_ok()
    }

    /// Set an option by name. Returns false if the option does not exist or
    /// the value is out of range.
    ///
    /// Only `verbose` and `quiet` may be changed after configuration.
    pub fn set(&mut self, name: &str, value: i64) -> bool {
        if Options::can_set_after_configuring(name) {
            api_requires!(self, Operation::SetAnytime);
        } else {
            api_requires!(self, Operation::Set);
        }
        let result = self.options.set(name, value);
        self.internal.verbosity = self.options.verbosity();
        result
    }
    pub fn get(&self, name: &str) -> Option<i64> {
        self.options.get(name)
    }
    pub fn options(&self) -> &Options {
        &self.options
    }
    /// Replace all options at once.
    pub fn set_options(&mut self, options: Options) {
        api_requires!(self, Operation::Set);
        self.options = options;
        self.internal.verbosity = self.options.verbosity();
    }

    /// Make sure that external variables up to `max_var` can be used.
    pub fn reserve(&mut self, max_var: i32) {
        api_requires!(self, Operation::Reserve);
        self.transition_to_steady_state();
        self.external.reserve(max_var);
    }
    /// The largest external variable used so far.
    pub fn vars(&self) -> i32 {
        api_requires!(self, Operation::Vars);
        self.external.max_var()
    }

    /// Add a literal to the current clause, or finish it with 0.
    pub fn add(&mut self, literal: i32) {
        api_requires!(self, Operation::Add);
        assert!(
            !self.adding_constraint && !self.adding_derived,
            "invalid API usage: 'add' while another clause is open"
        );
        if literal != 0 {
            check_literal(literal);
        }
        self.transition_to_steady_state();
        if literal != 0 {
            self.clause.push(literal);
            self.adding_clause = true;
        } else {
            let clause = internalize_all(&mut self.external, &self.clause);
            self.internal.grow(self.external.internal_max_var());
            self.internal.add_clause(&clause, ClauseFields::irredundant());
            self.clause.clear();
            self.adding_clause = false;
        }
        self.adding_or_steady();
    }
    /// Add a whole clause.
    pub fn clause(&mut self, literals: &[i32]) {
        for &literal in literals {
            check_literal(literal);
            self.add(literal);
        }
        self.add(0);
    }

    /// Add a literal to the constraint for the next solve call, or finish
    /// it with 0. A new constraint replaces the previous one.
    pub fn constrain(&mut self, literal: i32) {
        api_requires!(self, Operation::Constrain);
        assert!(
            !self.adding_clause && !self.adding_derived,
            "invalid API usage: 'constrain' while a clause is open"
        );
        if literal != 0 {
            check_literal(literal);
        }
        self.transition_to_steady_state();
        if literal != 0 {
            self.open_constraint.push(literal);
            self.adding_constraint = true;
        } else {
            self.constraint = Some(std::mem::replace(
                &mut self.open_constraint,
                Vector::new(),
            ));
            self.adding_constraint = false;
        }
        self.adding_or_steady();
    }
    /// Assume a literal for the next solve call.
    pub fn assume(&mut self, literal: i32) {
        api_requires!(self, Operation::Assume);
        check_literal(literal);
        self.transition_to_steady_state();
        self.assumptions.push(literal);
    }
    pub fn reset_assumptions(&mut self) {
        api_requires!(self, Operation::ResetAssumptions);
        self.transition_to_steady_state();
        self.assumptions.clear();
    }
    pub fn reset_constraint(&mut self) {
        api_requires!(self, Operation::ResetConstraint);
        self.transition_to_steady_state();
        self.constraint = None;
    }

    /// Search for a model under the current assumptions and constraint.
    ///
    /// Returns 10 if satisfiable, 20 if unsatisfiable and 0 if the search
    /// was terminated.
    pub fn solve(&mut self) -> i32 {
        api_requires!(self, Operation::Solve);
        self.transition_to_steady_state();
        self.set_state(State::Solving);
        self.solves += 1;
        let assumptions = internalize_all(&mut self.external, &self.assumptions);
        let constraint = match &self.constraint {
            Some(constraint) => Some(internalize_all(&mut self.external, constraint)),
            None => None,
        };
        self.internal.grow(self.external.internal_max_var());
        let query = Query {
            assumptions: &assumptions,
            constraint: constraint.as_deref(),
            phase: self.options.phase,
            check_model: self.options.check,
        };
        let answer = {
            let terminate_requested = &mut self.terminate_requested;
            let terminator = &mut self.terminator;
            let mut terminate = || {
                *terminate_requested
                    || terminator
                        .as_mut()
                        .map_or(false, |terminator| terminator.terminate())
            };
            search::search(&mut self.internal, &query, &mut terminate)
        };
        self.terminate_requested = false;
        match answer.status {
            Status::Satisfiable => {
                self.model.clear();
                self.model
                    .resize_with_value(self.external.max_var() as usize + 1, 0);
                for &literal in &answer.model {
                    let literal = self.external.externalize(literal);
                    self.model[literal.abs() as usize] = literal.signum() as i8;
                }
                self.set_state(State::Satisfied);
            }
            Status::Unsatisfiable => {
                self.failed = answer
                    .failed
                    .iter()
                    .map(|&literal| self.external.externalize(literal))
                    .collect();
                self.constraint_failed = answer.constraint_failed;
                self.set_state(State::Unsatisfied);
            }
            Status::Unknown => self.set_state(State::Steady),
        }
        self.internal
            .collect_garbage_if_needed(self.options.compact, self.options.compactmin);
        answer.status.code()
    }

    /// Propagate the root, remove satisfied clauses and compact the clause
    /// arena. Returns 20 if the formula is found unsatisfiable, 0 otherwise.
    pub fn simplify(&mut self) -> i32 {
        api_requires!(self, Operation::Simplify);
        self.transition_to_steady_state();
        self.internal.backtrack(0);
        if self.internal.unsat || !self.internal.propagate() {
            self.internal.reset_conflict();
            self.set_state(State::Unsatisfied);
            return Status::Unsatisfiable.code();
        }
        let removed = self.internal.mark_satisfied_clauses();
        if self.internal.clause_db.garbage_size() > 0 {
            self.internal.collect_garbage();
        }
        log!(self.internal, 1, "simplify removed {} clauses", removed);
        Status::Unknown.code()
    }

    /// The value of `literal` in the model: `literal` if true, `-literal` if false.
    ///
    /// Variables the solver has never seen are false.
    pub fn val(&self, literal: i32) -> i32 {
        api_requires!(self, Operation::Val);
        check_literal(literal);
        let positive = self
            .model
            .get(literal.abs() as usize)
            .map_or(false, |&value| value > 0);
        if positive == (literal > 0) {
            literal
        } else {
            -literal
        }
    }
    /// Whether the assumption `literal` was used to prove unsatisfiability.
    pub fn failed(&self, literal: i32) -> bool {
        api_requires!(self, Operation::Failed);
        check_literal(literal);
        self.failed.iter().any(|&failed| failed == literal)
    }
    /// Whether the constraint was used to prove unsatisfiability.
    pub fn constraint_failed(&self) -> bool {
        api_requires!(self, Operation::ConstraintFailed);
        self.constraint_failed
    }
    /// The value of `literal` if it is implied at level 0: 1 if true, -1 if
    /// false and 0 otherwise.
    pub fn fixed(&self, literal: i32) -> i32 {
        api_requires!(self, Operation::Fixed);
        match self.external.lookup(literal) {
            Some(literal) => self.internal.fixed(literal).signum(),
            None => 0,
        }
    }
    /// Whether the formula is unsatisfiable regardless of assumptions.
    pub fn inconsistent(&self) -> bool {
        api_requires!(self, Operation::Inconsistent);
        self.internal.unsat
    }

    /// Check whether `assumptions` can be assigned in order without a
    /// propagation conflict. The assignment is unchanged afterwards.
    ///
    /// See [`propcheck`](../propcheck/fn.propcheck.html).
    pub fn propcheck(
        &mut self,
        assumptions: &[i32],
        restore: bool,
        save_propagated: bool,
        save_core: bool,
    ) -> Propcheck {
        api_requires!(self, Operation::Propcheck);
        for &literal in assumptions {
            check_literal(literal);
        }
        self.transition_to_steady_state();
        propcheck::propcheck(
            &mut self.internal,
            &mut self.external,
            assumptions,
            restore,
            save_propagated,
            save_core,
        )
    }
    /// Count the cubes over `variables` that survive unit propagation,
    /// collecting them if `save` is set.
    ///
    /// See [`propcheck_all_tree_with`](../tree/fn.propcheck_all_tree_with.html).
    pub fn propcheck_all_tree(&mut self, variables: &[i32], limit: u64, save: bool) -> Tree {
        api_requires!(self, Operation::PropcheckAllTree);
        self.check_variables(variables);
        self.transition_to_steady_state();
        tree::propcheck_all_tree(
            &mut self.internal,
            &mut self.external,
            variables,
            limit,
            save,
        )
    }
    /// Like [`propcheck_all_tree`](#method.propcheck_all_tree), passing each
    /// cube to `on_cube` instead of collecting it.
    pub fn propcheck_all_tree_with(
        &mut self,
        variables: &[i32],
        limit: u64,
        on_cube: impl FnMut(&[i32]),
    ) -> Tree {
        api_requires!(self, Operation::PropcheckAllTree);
        self.check_variables(variables);
        self.transition_to_steady_state();
        tree::propcheck_all_tree_with(
            &mut self.internal,
            &mut self.external,
            variables,
            limit,
            on_cube,
        )
    }
    fn check_variables(&self, variables: &[i32]) {
        for &variable in variables {
            check_literal(variable);
        }
    }

    /// Propagate from the propagation cursor. Returns false on conflict,
    /// which stays pending until
    /// [`internal_reset_conflict`](#method.internal_reset_conflict).
    pub fn internal_propagate(&mut self) -> bool {
        api_requires!(self, Operation::InternalAccess);
        self.internal.propagate()
    }
    pub fn internal_reset_conflict(&mut self) {
        api_requires!(self, Operation::InternalAccess);
        self.internal.reset_conflict();
    }
    pub fn internal_level(&self) -> usize {
        api_requires!(self, Operation::InternalAccess);
        self.internal.level()
    }
    /// The current value of `literal`: 1, -1 or 0.
    pub fn internal_val(&mut self, literal: i32) -> i32 {
        api_requires!(self, Operation::InternalAccess);
        let literal = self.import(literal);
        self.internal.value(literal).signum()
    }
    /// Open a decision level that assigns `literal`, or nothing if `literal`
    /// is 0. The literal is not propagated.
    pub fn internal_assume_decision(&mut self, literal: i32) {
        api_requires!(self, Operation::InternalAccess);
        if literal == 0 {
            self.internal.push_dummy_level();
            return;
        }
        let literal = self.import(literal);
        assert!(
            self.internal.value(literal) == Value::Unassigned,
            "invalid API usage: decision on an assigned literal"
        );
        self.internal.assume_decision(literal);
    }
    pub fn internal_backtrack(&mut self, level: usize) {
        api_requires!(self, Operation::InternalAccess);
        self.internal.backtrack(level);
    }
    /// The assigned literals in trail order.
    pub fn internal_trail(&self) -> Vector<i32> {
        api_requires!(self, Operation::InternalAccess);
        self.internal
            .assignment
            .literals()
            .map(|literal| self.external.externalize(literal))
            .collect()
    }
    /// The number of trail literals that have been propagated.
    pub fn internal_propagated(&self) -> usize {
        api_requires!(self, Operation::InternalAccess);
        self.internal.propagated
    }

    /// Assign `literal` at level 0 without propagating it.
    pub fn add_unit_clause(&mut self, literal: i32) {
        api_requires!(self, Operation::AddUnitClause);
        assert!(
            self.internal.level() == 0,
            "invalid API usage: 'add_unit_clause' above level 0"
        );
        let literal = self.import(literal);
        self.internal.add_unit(literal);
    }
    /// Add a literal to the current redundant clause, or finish it with 0.
    pub fn add_derived(&mut self, literal: i32) {
        api_requires!(self, Operation::AddDerived);
        assert!(
            !self.adding_clause && !self.adding_constraint,
            "invalid API usage: 'add_derived' while another clause is open"
        );
        if literal != 0 {
            check_literal(literal);
        }
        self.transition_to_steady_state();
        if literal != 0 {
            self.derived.push(literal);
            self.adding_derived = true;
        } else {
            let clause = internalize_all(&mut self.external, &self.derived);
            self.internal.grow(self.external.internal_max_var());
            self.internal.add_clause(&clause, ClauseFields::redundant());
            self.derived.clear();
            self.adding_derived = false;
        }
        self.adding_or_steady();
    }

    /// Ask a running or the next solve call to give up.
    pub fn terminate(&mut self) {
        api_requires!(self, Operation::Terminate);
        self.terminate_requested = true;
    }
    pub fn connect_terminator(&mut self, terminator: Box<dyn Terminator>) {
        api_requires!(self, Operation::Terminate);
        self.terminator = Some(terminator);
    }
    pub fn disconnect_terminator(&mut self) {
        api_requires!(self, Operation::Terminate);
        self.terminator = None;
    }

    /// Add the clauses of a DIMACS file, which may be compressed. The
    /// filename "-" stands for standard input.
    ///
    /// Returns the largest variable announced in the header. On a parse
    /// error, the clauses read so far are kept and a partial clause is
    /// discarded.
    pub fn read_dimacs(&mut self, filename: &str) -> io::Result<i32> {
        api_requires!(self, Operation::ReadDimacs);
        let stdin = io::stdin();
        let mut input = read_compressed_file_or_stdin(filename, stdin.lock())?;
        let result = parse_dimacs(&mut input, |literal| self.add(literal));
        if result.is_err() {
            self.clause.clear();
            self.adding_clause = false;
            self.adding_or_steady();
        }
        let header = result?;
        self.external.reserve(header.maxvar);
        log!(
            self.internal,
            1,
            "read {} clauses over {} variables from {}",
            header.num_clauses,
            header.maxvar,
            filename
        );
        Ok(header.maxvar)
    }

    pub fn statistics(&self) -> Statistics {
        api_requires!(self, Operation::Statistics);
        let accounting = self.internal.clause_db.accounting();
        let counters = self.internal.counters;
        Statistics {
            variables: self.external.max_var(),
            clauses: self.internal.clause_db.number_of_clauses(),
            solves: self.solves,
            propagations: counters.propagations,
            decisions: counters.decisions,
            conflicts: counters.conflicts,
            collections: counters.collections,
            arena_bytes: accounting.live_bytes(),
            peak_arena_bytes: accounting.peak_bytes(),
            heap_bytes: self.internal.heap_space() + self.external.heap_space(),
        }
    }
    /// Print statistics and memory usage as comments.
    pub fn print_statistics(&self) {
        let statistics = self.statistics();
        print_key_value("variables", statistics.variables);
        print_key_value("clauses", statistics.clauses);
        print_key_value("solves", statistics.solves);
        print_key_value("propagations", statistics.propagations);
        print_key_value("decisions", statistics.decisions);
        print_key_value("conflicts", statistics.conflicts);
        print_key_value("collections", statistics.collections);
        print_key_value("arena bytes", statistics.arena_bytes);
        print_key_value("peak arena bytes", statistics.peak_arena_bytes);
        self.internal.print_memory_usage();
    }
}

/// Translate external literals, allocating variables as needed.
fn internalize_all(external: &mut External, literals: &[i32]) -> Vec<Literal> {
    literals
        .iter()
        .map(|&literal| external.internalize(literal))
        .collect()
}

impl Drop for Solver {
    fn drop(&mut self) {
        if self.permits(Operation::Delete) {
            self.set_state(State::Deleting);
        }
    }
}
