use std::fmt;

use derive_more::{Display, IsVariant};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Classification of a finished solve attempt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IsVariant, Serialize, Deserialize,
)]
pub enum Outcome {
    /// A unique optimal vertex was reached.
    #[display(fmt = "optimal")]
    Optimal,
    /// An optimal vertex was reached but some nonbasic variable has a
    /// zero reduced cost, so the optimum is not unique.
    #[display(fmt = "multiple optima")]
    MultipleOptima,
    /// The objective can be improved without bound.
    #[display(fmt = "unbounded")]
    Unbounded,
    /// No feasible point exists (the phase-1 optimum is nonzero).
    /// Also the initial "unsolved" value before a solve attempt.
    #[display(fmt = "infeasible")]
    Infeasible,
    /// Phase 1 terminated abnormally; no feasible basis could be
    /// initialized.
    #[display(fmt = "phase 1 failed")]
    PhaseOneFailed,
    /// Consecutive degenerate pivots made no progress.
    #[display(fmt = "degenerate stall")]
    DegenerateStall,
    /// The configured pivot budget was exhausted.
    #[display(fmt = "iteration limit exceeded")]
    IterationLimitExceeded,
}

impl Outcome {
    /// Numeric outcome code. Codes 0–4 are fixed by the external
    /// interface; 5 and 6 are the named termination conditions added on
    /// top of it.
    pub const fn code(self) -> u8 {
        match self {
            Outcome::Optimal => 0,
            Outcome::MultipleOptima => 1,
            Outcome::Unbounded => 2,
            Outcome::Infeasible => 3,
            Outcome::PhaseOneFailed => 4,
            Outcome::DegenerateStall => 5,
            Outcome::IterationLimitExceeded => 6,
        }
    }
}

/// Pivot counts split by phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Iterations {
    pub phase1: usize,
    pub phase2: usize,
}

impl Iterations {
    pub const fn total(self) -> usize {
        self.phase1 + self.phase2
    }
}

/// Result of [`Solver::solve`](crate::Solver::solve): the outcome code,
/// the objective value, the full variable assignment (structural
/// variables followed by slack/surplus columns) and the pivot counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub outcome: Outcome,
    pub value: f64,
    pub variables: DVector<f64>,
    pub iterations: Iterations,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Iterations { phase1, phase2 } = self.iterations;
        match self.outcome {
            Outcome::Optimal | Outcome::MultipleOptima => {
                if self.outcome.is_optimal() {
                    writeln!(f, "Optimal solution:")?;
                } else {
                    writeln!(f, "Multiple optimal solutions, showing one:")?;
                }
                writeln!(
                    f,
                    "Iterations: {phase1} (phase 1) + {phase2} (phase 2) = {}",
                    self.iterations.total()
                )?;
                write!(f, "v = {:.2}", self.value)?;
                for (i, x) in self.variables.iter().enumerate() {
                    write!(f, ", x{i} = {x:.2}")?;
                }
                Ok(())
            }
            Outcome::Unbounded => {
                writeln!(f, "Unbounded solution:")?;
                writeln!(
                    f,
                    "Iterations: {phase1} (phase 1) + {phase2} (phase 2) = {}",
                    self.iterations.total()
                )?;
                write!(f, "Value and variables tend to infinity.")
            }
            Outcome::Infeasible => write!(f, "No feasible solution exists."),
            Outcome::PhaseOneFailed => {
                write!(f, "Impossible to find initial values for the variables.")
            }
            Outcome::DegenerateStall => {
                write!(f, "Stalled on degenerate pivots without improvement.")
            }
            Outcome::IterationLimitExceeded => {
                write!(f, "Gave up after {} iterations.", self.iterations.total())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_str_eq;

    use super::*;

    #[test]
    fn outcome_codes_match_the_interface() {
        assert_eq!(Outcome::Optimal.code(), 0);
        assert_eq!(Outcome::MultipleOptima.code(), 1);
        assert_eq!(Outcome::Unbounded.code(), 2);
        assert_eq!(Outcome::Infeasible.code(), 3);
        assert_eq!(Outcome::PhaseOneFailed.code(), 4);
    }

    #[test]
    fn optimal_solution_renders_value_and_variables() {
        let solution = Solution {
            outcome: Outcome::Optimal,
            value: 12.,
            variables: DVector::from_column_slice(&[4., 0.]),
            iterations: Iterations { phase1: 0, phase2: 1 },
        };
        assert_str_eq!(
            solution.to_string(),
            "Optimal solution:\n\
             Iterations: 0 (phase 1) + 1 (phase 2) = 1\n\
             v = 12.00, x0 = 4.00, x1 = 0.00"
        );
    }
}
