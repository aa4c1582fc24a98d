use incsat::{Operation, Solver, State};
use std::io::Write;

#[test]
fn incremental_solving() {
    let mut solver = Solver::new();
    solver.clause(&[-1, -2]);
    solver.clause(&[-1, -3]);
    solver.clause(&[2, 3, 4]);
    assert_eq!(solver.vars(), 4);
    assert_eq!(solver.solve(), 10);
    for variable in 1..=4 {
        let value = solver.val(variable);
        assert!(value == variable || value == -variable);
    }

    solver.assume(1);
    solver.constrain(2);
    solver.constrain(3);
    solver.constrain(0);
    assert_eq!(solver.solve(), 20);
    assert!(solver.failed(1));
    assert!(solver.constraint_failed());

    assert_eq!(solver.solve(), 10);

    solver.constrain(-4);
    solver.constrain(0);
    solver.assume(-2);
    assert_eq!(solver.solve(), 10);
    assert_eq!(solver.val(4), -4);
    assert_eq!(solver.val(2), -2);
    assert_eq!(solver.val(3), 3);
    assert!(!solver.inconsistent());
}

#[test]
fn permanent_unsatisfiability() {
    let mut solver = Solver::new();
    solver.clause(&[1, 2]);
    solver.clause(&[1, -2]);
    solver.clause(&[-1, 2]);
    solver.clause(&[-1, -2]);
    assert!(!solver.inconsistent());
    assert_eq!(solver.solve(), 20);
    assert!(solver.inconsistent());
    assert_eq!(solver.state(), State::Unsatisfied);
    assert!(solver.permits(Operation::Failed));
    assert!(!solver.permits(Operation::Val));
}

#[test]
fn states_follow_the_calls() {
    let mut solver = Solver::new();
    assert_eq!(solver.state(), State::Configuring);
    assert!(solver.permits(Operation::Set));
    solver.reserve(10);
    assert_eq!(solver.state(), State::Steady);
    assert!(!solver.permits(Operation::Set));
    assert!(solver.permits(Operation::SetAnytime));
    solver.constrain(1);
    assert_eq!(solver.state(), State::Adding);
    assert!(!solver.permits(Operation::Propcheck));
    solver.constrain(0);
    assert_eq!(solver.state(), State::Steady);
    assert_eq!(solver.solve(), 10);
    assert_eq!(solver.state(), State::Satisfied);
    solver.propcheck(&[2], true, false, false);
    assert_eq!(solver.state(), State::Steady);
}

#[test]
#[should_panic(expected = "invalid API usage of 'propcheck' in state ADDING")]
fn propcheck_while_adding() {
    let mut solver = Solver::new();
    solver.add(1);
    solver.propcheck(&[1], false, false, false);
}

#[test]
#[should_panic(expected = "invalid API usage")]
fn zero_assumption() {
    let mut solver = Solver::new();
    solver.assume(0);
}

#[test]
#[should_panic(expected = "invalid API usage")]
fn zero_in_tree_variables() {
    let mut solver = Solver::new();
    solver.propcheck_all_tree(&[1, 0], 0, false);
}

#[test]
fn options_from_toml() {
    let options = incsat::Options::from_toml("phase = false\nverbose = 0\n").unwrap();
    let mut solver = Solver::with_options(options);
    assert_eq!(solver.get("phase"), Some(0));
    solver.clause(&[1, 2]);
    assert_eq!(solver.solve(), 10);
    assert_eq!(solver.val(1), -1);
    assert_eq!(solver.val(2), 2);
}

#[test]
fn dimacs_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".cnf")
        .tempfile()
        .unwrap();
    write!(file, "c example\np cnf 3 3\n1 -2 0\n2 3 0\n-1 -3 0\n").unwrap();
    file.flush().unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let mut solver = Solver::new();
    assert_eq!(solver.read_dimacs(&path).unwrap(), 3);
    assert_eq!(solver.state(), State::Steady);
    assert_eq!(solver.propcheck_all_tree(&[1, 2, 3], 0, false).total, 2);
    assert_eq!(solver.solve(), 10);
}

#[test]
fn malformed_dimacs_file() {
    let mut file = tempfile::Builder::new()
        .suffix(".cnf")
        .tempfile()
        .unwrap();
    write!(file, "p cnf 2 2\n1 2 0\n-1 x 0\n").unwrap();
    file.flush().unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let mut solver = Solver::new();
    assert!(solver.read_dimacs(&path).is_err());
    assert_eq!(solver.state(), State::Steady);
    assert_eq!(solver.statistics().clauses, 1);
    assert!(solver.read_dimacs("/nonexistent/formula.cnf").is_err());
}

#[test]
fn arena_memory_is_accounted() {
    let mut solver = Solver::new();
    for variable in 1..=50 {
        solver.clause(&[variable, variable + 1, -(variable + 2)]);
    }
    let statistics = solver.statistics();
    assert_eq!(statistics.clauses, 50);
    assert!(statistics.arena_bytes > 0);
    assert!(statistics.peak_arena_bytes >= statistics.arena_bytes);
    for variable in 1..=40 {
        solver.clause(&[variable]);
    }
    assert_eq!(solver.simplify(), 0);
    let after = solver.statistics();
    assert_eq!(after.collections, 1);
    assert!(after.clauses < 50);
    assert!(after.arena_bytes < statistics.arena_bytes);
    assert!(after.peak_arena_bytes >= statistics.arena_bytes);
}

#[test]
fn terminate_from_a_callback() {
    let mut solver = Solver::new();
    solver.clause(&[1, 2, 3]);
    let mut polls = 0;
    solver.connect_terminator(Box::new(move || {
        polls += 1;
        polls > 1
    }));
    assert_eq!(solver.solve(), 0);
    assert_eq!(solver.state(), State::Steady);
}

#[test]
fn trail_grows_with_the_formula() {
    let mut solver = Solver::new();
    solver.clause(&[1]);
    solver.clause(&[2]);
    solver.clause(&[3, -1]);
    assert_eq!(solver.solve(), 10);
    assert_eq!(solver.val(3), 3);

    let mut empty = Solver::new();
    assert_eq!(empty.propcheck_all_tree(&[1, 2, 3], 0, false).total, 8);
}
