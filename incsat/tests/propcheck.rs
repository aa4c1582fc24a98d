use incsat::{PropcheckOutcome, Solver};

/// Deterministic pseudo-random numbers for generating formulas.
struct Lcg(u64);

impl Lcg {
    fn below(&mut self, bound: u32) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) % u64::from(bound)) as u32
    }
    fn literal(&mut self, variables: u32) -> i32 {
        let variable = 1 + self.below(variables) as i32;
        if self.below(2) == 0 {
            -variable
        } else {
            variable
        }
    }
}

fn random_solver(rng: &mut Lcg, variables: u32, clauses: usize) -> Solver {
    let mut solver = Solver::new();
    for _ in 0..clauses {
        let clause = [
            rng.literal(variables),
            rng.literal(variables),
            rng.literal(variables),
        ];
        solver.clause(&clause);
    }
    solver
}

#[test]
fn assigned_assumption_propagates_nothing() {
    let mut solver = Solver::new();
    solver.clause(&[1]);
    let result = solver.propcheck(&[1], false, true, false);
    assert!(result.is_consistent());
    assert_eq!(result.num_propagated, 0);
    assert_eq!(result.propagated.map(|literals| literals.len()), Some(0));
}

#[test]
fn core_names_the_responsible_assumption() {
    let mut solver = Solver::new();
    solver.clause(&[1, 2]);
    solver.clause(&[-1]);
    let result = solver.propcheck(&[-2], false, false, true);
    assert_eq!(result.outcome, PropcheckOutcome::PropagationConflict);
    assert_eq!(result.core.unwrap().into_vec(), vec![-2]);

    let result = solver.propcheck(&[-2], true, false, true);
    assert_eq!(result.outcome, PropcheckOutcome::ConflictingAssignment);
    assert_eq!(result.core.unwrap().into_vec(), vec![-2]);
}

#[test]
fn propagated_ends_with_the_conflicting_literal() {
    let mut solver = Solver::new();
    solver.clause(&[-1, 2]);
    solver.clause(&[-1, 3]);
    solver.clause(&[-2, -3]);
    let result = solver.propcheck(&[1], false, true, false);
    assert!(!result.is_consistent());
    assert_eq!(result.num_propagated, 4);
    assert_eq!(result.propagated.unwrap().into_vec(), vec![1, 2, 3, -3]);
}

#[test]
fn trail_is_restored() {
    let mut rng = Lcg(7);
    let mut solver = random_solver(&mut rng, 20, 40);
    solver.add_unit_clause(5);
    let decision = (1..=20)
        .find(|&variable| variable != 5 && solver.internal_val(variable) == 0)
        .unwrap();
    solver.internal_assume_decision(decision);
    solver.internal_assume_decision(0);
    let trail = solver.internal_trail();
    let level = solver.internal_level();
    let propagated = solver.internal_propagated();
    assert_eq!(level, 2);
    for round in 0..60 {
        let assumptions: Vec<i32> = (0..1 + round % 6).map(|_| rng.literal(20)).collect();
        let restore = round % 2 == 0;
        solver.propcheck(&assumptions, restore, true, true);
        assert_eq!(solver.internal_trail(), trail);
        assert_eq!(solver.internal_level(), level);
        assert_eq!(solver.internal_propagated(), propagated);
    }
}

#[test]
fn cores_are_sufficient() {
    let mut failures = 0;
    for seed in 0..40 {
        let mut rng = Lcg(seed);
        let mut solver = random_solver(&mut rng, 12, 30);
        if solver.simplify() == 20 {
            continue;
        }
        let mut assumptions: Vec<i32> = Vec::new();
        while assumptions.len() < 6 {
            let literal = rng.literal(12);
            if assumptions.iter().all(|&other| other.abs() != literal.abs()) {
                assumptions.push(literal);
            }
        }
        let result = solver.propcheck(&assumptions, false, false, true);
        if result.is_consistent() {
            continue;
        }
        failures += 1;
        let core = result.core.unwrap().into_vec();
        assert!(!core.is_empty());
        assert!(core.iter().all(|literal| assumptions.contains(literal)));
        assert!(!solver.propcheck(&core, false, false, false).is_consistent());
    }
    assert!(failures > 0);
}

#[test]
fn inconsistent_solver_is_reported() {
    let mut solver = Solver::new();
    solver.clause(&[1, 2]);
    solver.clause(&[1, -2]);
    solver.clause(&[-1]);
    assert!(!solver.inconsistent());
    assert_eq!(solver.simplify(), 20);
    let result = solver.propcheck(&[3], true, false, false);
    assert_eq!(result.outcome, PropcheckOutcome::Inconsistent);
}
