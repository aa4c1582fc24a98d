use incsat::Solver;

fn cubes(solver: &mut Solver, variables: &[i32], limit: u64) -> Vec<Vec<i32>> {
    let tree = solver.propcheck_all_tree(variables, limit, true);
    let cubes: Vec<Vec<i32>> = tree
        .cubes
        .unwrap()
        .into_iter()
        .map(|cube| cube.into_vec())
        .collect();
    assert_eq!(cubes.len() as u64, tree.total);
    cubes
}

#[test]
fn two_free_variables() {
    let mut solver = Solver::new();
    assert_eq!(
        cubes(&mut solver, &[1, 2], 0),
        vec![vec![-1, -2], vec![-1, 2], vec![1, -2], vec![1, 2]]
    );
}

#[test]
fn all_cubes_without_clauses() {
    for n in 0..=10 {
        let mut solver = Solver::new();
        let variables: Vec<i32> = (1..=n).collect();
        let expected = if n == 0 { 0 } else { 1 << n };
        assert_eq!(
            solver.propcheck_all_tree(&variables, 0, false).total,
            expected
        );
    }
    let mut solver = Solver::new();
    let variables: Vec<i32> = (1..=16).collect();
    let mut seen = 0u64;
    let tree = solver.propcheck_all_tree_with(&variables, 0, |cube| {
        assert_eq!(cube.len(), 16);
        seen += 1;
    });
    assert_eq!(tree.total, 1 << 16);
    assert_eq!(seen, 1 << 16);
    assert_eq!(tree.checked, (1 << 17) - 2);
}

#[test]
fn cubes_come_in_sign_order() {
    let mut solver = Solver::new();
    solver.clause(&[1, 2, 3]);
    solver.clause(&[-2, -4]);
    solver.clause(&[-1, 4, 5]);
    let variables = [4, 1, 5, 2, 3];
    let first = cubes(&mut solver, &variables, 0);
    let second = cubes(&mut solver, &variables, 0);
    assert_eq!(first, second);
    let signs: Vec<Vec<i32>> = first
        .iter()
        .map(|cube| cube.iter().map(|literal| literal.signum()).collect())
        .collect();
    for pair in signs.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn unit_clause_prunes_the_tree() {
    let mut solver = Solver::new();
    solver.clause(&[1, -2, 3]);
    solver.clause(&[-1, 2]);
    solver.clause(&[-3, -4, 5]);
    solver.clause(&[2, 4, -5]);
    let variables = [1, 2, 3, 4, 5];
    let before = cubes(&mut solver, &variables, 0);
    solver.clause(&[3]);
    let after = cubes(&mut solver, &variables, 0);
    assert!(after.len() <= before.len());
    let expected: Vec<Vec<i32>> = before
        .into_iter()
        .filter(|cube| cube.contains(&3))
        .collect();
    assert_eq!(after, expected);
}

#[test]
fn limit_truncates_in_order() {
    let mut solver = Solver::new();
    let all = cubes(&mut solver, &[1, 2, 3, 4, 5], 0);
    let some = cubes(&mut solver, &[1, 2, 3, 4, 5], 7);
    assert_eq!(some.len(), 7);
    assert_eq!(&all[..7], &some[..]);
}

#[test]
fn returns_to_the_root() {
    let mut solver = Solver::new();
    solver.clause(&[-1, 2]);
    solver.internal_assume_decision(1);
    solver.internal_assume_decision(0);
    assert_eq!(solver.internal_level(), 2);
    assert_eq!(solver.propcheck_all_tree(&[1, 2], 0, false).total, 3);
    assert_eq!(solver.internal_level(), 0);
}

#[test]
fn root_conflict_yields_nothing() {
    let mut solver = Solver::new();
    solver.clause(&[-1, 2]);
    solver.clause(&[-1, -2]);
    solver.add_unit_clause(1);
    assert!(!solver.inconsistent());
    assert_eq!(solver.propcheck_all_tree(&[3], 0, false).total, 0);
    assert!(solver.inconsistent());
    assert_eq!(solver.propcheck_all_tree(&[3], 0, false).total, 0);
}
