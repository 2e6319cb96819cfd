//! Dense two-phase tableau simplex solver for standard-form linear
//! programs: maximize `c·x` subject to `Ax {≤,=,≥} b` and `x ≥ 0`.
//!
//! The [`Problem`] type models an LP with signed constraints and
//! normalizes it to standard form (slack/surplus columns, non-negative
//! right-hand sides); the [`Solver`] runs the two-phase primal simplex
//! method over a dense [`Tableau`] and classifies the result as one of
//! the [`Outcome`] codes.
//!
//! ```
//! use nalgebra::RowDVector;
//! use simplex_lp::{Constraint, ObjectiveFunction, Problem, Sign};
//!
//! // maximize 3x₁ + 2x₂  s.t.  x₁ + x₂ ≤ 4,  x₁ + 3x₂ ≤ 6
//! let problem = Problem::new(
//!     ObjectiveFunction::new(RowDVector::from_row_slice(&[3., 2.])),
//!     vec![
//!         Constraint::new(RowDVector::from_row_slice(&[1., 1.]), Sign::Less, 4.),
//!         Constraint::new(RowDVector::from_row_slice(&[1., 3.]), Sign::Less, 6.),
//!     ],
//! );
//!
//! let solution = problem.solve();
//! assert!(solution.outcome.is_optimal());
//! assert_eq!(solution.value, 12.);
//! assert_eq!(solution.variables[0], 4.);
//! assert_eq!(solution.variables[1], 0.);
//! ```

mod helpers;
pub mod simplex;

pub use simplex::{
    Constraint, Iterations, ObjectiveFunction, Outcome, Phase, PivotObserver, PivotSnapshot,
    Problem, RecordingObserver, Sign, Solution, Solver, SolverError, Tableau,
};
