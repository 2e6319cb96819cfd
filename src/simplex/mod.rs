mod observer;
mod problem;
mod solution;
mod solver;
mod tableau;

pub use observer::{Phase, PivotObserver, PivotSnapshot, RecordingObserver};
pub use problem::{Constraint, ObjectiveFunction, Problem, Sign};
pub use solution::{Iterations, Outcome, Solution};
pub use solver::Solver;
pub use tableau::Tableau;

use derive_more::{Display, Error};

/// Tolerance for all sign and zero tests on tableau entries.
pub(crate) const EPSILON: f64 = 1e-9;

/// Construction-time contract failure: the objective, constraint matrix
/// and right-hand side do not agree in shape.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SolverError {
    #[display(fmt = "dimension mismatch: {} != {}", left, right)]
    DimensionMismatch { left: String, right: String },
}
