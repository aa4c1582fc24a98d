//! Compile-time switches

/// Compile in the `log!` statements; the `verbose` option selects what is printed.
pub const ENABLE_LOGGING: bool = true;
/// Check indices of `Vector`, `Array` and the clause arena.
pub const ENABLE_BOUNDS_CHECKING: bool = cfg!(debug_assertions);
/// Check `requires!()` preconditions (cheap).
pub const CHECK_PRECONDITIONS: bool = true;
/// Check `invariant!()` (cheap).
pub const CHECK_INVARIANTS: bool = true;
/// Verify trail, levels and propagation cursor after checks (expensive).
pub const CHECK_TRAIL_INVARIANTS: bool = cfg!(debug_assertions);
/// Verify that every clause is watched by its first two literals (very expensive).
pub const CHECK_WATCH_INVARIANTS: bool = false;
