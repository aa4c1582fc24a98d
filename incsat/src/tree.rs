//! Enumeration of all cubes over a list of variables that survive unit
//! propagation.
//!
//! The binary tree of sign assignments is walked without recursion: the
//! current path is the sign array together with the decision levels of
//! the engine, and an explicit state says what to do next.

use crate::{external::External, internal::Internal};
use incsat_common::{assignment::Value, memory::Vector};

/// The result of a cube enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    /// Number of cubes that propagate without conflict.
    pub total: u64,
    /// Number of propagation calls.
    pub checked: u64,
    /// The cubes themselves, if requested, in enumeration order.
    pub cubes: Option<Vector<Vector<i32>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Extend the current path by one literal, or record a leaf.
    Descending,
    /// Move to the next unexplored sibling of the deepest negative level.
    Ascending,
    /// Propagate the literal that was just assumed.
    Propagating,
}

/// Enumerate the cubes over `variables` that are consistent under unit
/// propagation, calling `on_cube` for each of them.
///
/// Negative signs are tried before positive ones, deepest level first.
/// Stops once `limit` cubes were found, unless `limit` is 0. The engine is
/// left at level 0.
pub fn propcheck_all_tree_with(
    internal: &mut Internal,
    external: &mut External,
    variables: &[i32],
    limit: u64,
    mut on_cube: impl FnMut(&[i32]),
) -> Tree {
    let mut tree = Tree::default();
    if variables.is_empty() || internal.unsat {
        return tree;
    }
    internal.backtrack(0);
    if !internal.propagate() {
        internal.reset_conflict();
        return tree;
    }
    let mut signs: Vector<i32> = Vector::new();
    signs.resize_with_value(variables.len(), -1);
    let mut cube: Vector<i32> = Vector::with_capacity(variables.len());
    let mut state = State::Descending;
    loop {
        invariant!(internal.level() <= variables.len());
        match state {
            State::Descending => {
                let depth = internal.level();
                if depth == variables.len() {
                    cube.clear();
                    for (&sign, &variable) in signs.iter().zip(variables) {
                        cube.push(sign * variable);
                    }
                    on_cube(&cube);
                    tree.total += 1;
                    if limit > 0 && tree.total >= limit {
                        break;
                    }
                    state = State::Ascending;
                    continue;
                }
                let literal = external.internalize(signs[depth] * variables[depth]);
                internal.grow(external.internal_max_var());
                match internal.value(literal) {
                    Value::True => internal.push_dummy_level(),
                    Value::False => {
                        internal.push_dummy_level();
                        state = State::Ascending;
                    }
                    Value::Unassigned => {
                        internal.assume_decision(literal);
                        state = State::Propagating;
                    }
                }
            }
            State::Ascending => {
                let mut depth = internal.level();
                while depth > 0 && signs[depth - 1] > 0 {
                    depth -= 1;
                }
                if depth == 0 {
                    break;
                }
                signs[depth - 1] = 1;
                for sign in signs.iter_mut().skip(depth) {
                    *sign = -1;
                }
                internal.backtrack(depth - 1);
                state = State::Descending;
            }
            State::Propagating => {
                tree.checked += 1;
                if internal.propagate() {
                    state = State::Descending;
                } else {
                    internal.reset_conflict();
                    state = State::Ascending;
                }
            }
        }
    }
    internal.backtrack(0);
    log!(
        internal,
        1,
        "propcheck_all_tree over {} variables: {} cubes, {} propagations",
        variables.len(),
        tree.total,
        tree.checked
    );
    tree
}

/// Like [`propcheck_all_tree_with`](fn.propcheck_all_tree_with.html), but
/// collects the cubes if `save` is set.
pub fn propcheck_all_tree(
    internal: &mut Internal,
    external: &mut External,
    variables: &[i32],
    limit: u64,
    save: bool,
) -> Tree {
    let mut cubes: Vector<Vector<i32>> = Vector::new();
    let mut tree = propcheck_all_tree_with(internal, external, variables, limit, |cube| {
        if save {
            cubes.push(cube.iter().copied().collect())
        }
    });
    if save {
        tree.cubes = Some(cubes);
    }
    tree
}
