use nalgebra::{DMatrix, DVector, RowDVector};

use crate::ensure_eq;

use super::{
    Iterations, Outcome, Phase, PivotObserver, PivotSnapshot, Problem, Solution, SolverError,
    Tableau, EPSILON,
};

/// Default pivot budget shared by both phases.
const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Result of a single [`Solver::iterate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// One basis exchange was performed.
    Pivoted {
        entering: usize,
        leaving_row: usize,
        /// The ratio test came out zero: the basis changed but the
        /// vertex did not move.
        degenerate: bool,
    },
    /// No improving direction remains.
    Converged,
    /// An improving column has no positive constraint coefficient.
    Unbounded,
}

/// Two-phase primal simplex engine. Exclusively owns its [`Tableau`];
/// the phase-1 auxiliary problem runs in an independent solver and only
/// matrix rows are copied back.
#[derive(Debug, Clone, PartialEq)]
pub struct Solver {
    tableau: Tableau,
    iterations: Iterations,
    outcome: Outcome,
    max_iterations: usize,
}

impl Solver {
    /// Build a solver from a standard-form LP. The objective length
    /// must match the constraint width and the constraint count must
    /// match the right-hand side length.
    pub fn new(
        objective: RowDVector<f64>,
        constraints: DMatrix<f64>,
        rhs: DVector<f64>,
    ) -> Result<Self, SolverError> {
        ensure_eq!(objective.len(), constraints.ncols());
        ensure_eq!(constraints.nrows(), rhs.len());
        Ok(Self::from_parts(objective, constraints, rhs))
    }

    /// Normalization guarantees consistent shapes.
    pub(crate) fn from_problem(problem: Problem) -> Self {
        let Problem {
            objective,
            constraints,
            rhs,
        } = problem;
        Self::from_parts(objective, constraints, rhs)
    }

    fn from_parts(objective: RowDVector<f64>, constraints: DMatrix<f64>, rhs: DVector<f64>) -> Self {
        Self {
            tableau: Tableau::new(objective, constraints, rhs),
            iterations: Iterations::default(),
            outcome: Outcome::Infeasible,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Replace the default pivot budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn tableau(&self) -> &Tableau {
        &self.tableau
    }

    pub fn iterations(&self) -> Iterations {
        self.iterations
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Objective value of the current basis.
    pub fn objective_value(&self) -> f64 {
        self.tableau.objective_value()
    }

    /// Run the two-phase simplex method to termination.
    pub fn solve(&mut self) -> Solution {
        self.solve_observed(&mut |_: PivotSnapshot<'_>| {})
    }

    /// Like [`solve`](Self::solve), invoking `observer` once per pivot
    /// (phase-1 pivots included) with a snapshot of the tableau state.
    pub fn solve_observed(&mut self, observer: &mut dyn PivotObserver) -> Solution {
        self.outcome = Outcome::Infeasible;

        if self.tableau.is_feasible_at_origin() {
            log::info!("all-nonbasic-zero is a feasible solution, skipping phase 1");
        } else {
            log::info!("origin is not a feasible basic solution, initializing phase 1");
            let phase1 = self.phase1(observer);
            log::info!(
                "phase 1 done after {} iteration(s): {phase1}",
                self.iterations.phase1
            );
            if !phase1.is_optimal() {
                self.outcome = phase1;
                return self.report();
            }
        }

        log::info!("initializing phase 2");
        self.outcome = self.phase2(observer);
        log::info!(
            "phase 2 done after {} iteration(s): {}",
            self.iterations.phase2,
            self.outcome
        );
        self.report()
    }

    /// First phase: drive the sum of the artificial variables to zero
    /// in an independent auxiliary solver, then fold its tableau back.
    /// Returns `Optimal` on success, any other outcome on failure.
    fn phase1(&mut self, observer: &mut dyn PivotObserver) -> Outcome {
        let n_real = self.tableau.n_variables();
        let (objective, constraints, rhs) = self.tableau.auxiliary_parts();
        let n_aux = objective.len();
        log::info!(
            "phase 1: {} artificial variable(s) for rows {:?}",
            n_aux - n_real,
            self.tableau.infeasible_rows()
        );

        let mut aux = Self::from_parts(objective, constraints, rhs);
        // Make the auxiliary objective row orthogonal to the
        // all-artificial starting basis: subtract every row carrying a
        // 1 in a column where the raw objective is nonzero.
        for j in n_real..n_aux {
            for r in 0..aux.tableau.n_constraints() {
                if (aux.tableau.entry(r + 1, j) - 1.).abs() <= EPSILON {
                    aux.tableau.add_scaled_row(0, -1., r + 1);
                }
            }
        }
        aux.tableau.reseat_basis();

        let stall_limit = 2 * aux.tableau.n_variables();
        let mut stalled = 0usize;

        while !aux.tableau.is_optimal() {
            if self.iterations.total() >= self.max_iterations {
                return Outcome::IterationLimitExceeded;
            }
            match aux.iterate() {
                Step::Pivoted {
                    entering,
                    leaving_row,
                    degenerate,
                } => {
                    self.iterations.phase1 += 1;
                    observer.on_pivot(PivotSnapshot {
                        phase: Phase::One,
                        entering,
                        leaving_row,
                        matrix: aux.tableau.matrix(),
                        variable_values: aux.tableau.variable_values(),
                    });
                    stalled = if degenerate { stalled + 1 } else { 0 };
                    if stalled > stall_limit {
                        log::warn!("auxiliary problem stalled on degenerate pivots");
                        return Outcome::PhaseOneFailed;
                    }
                }
                Step::Converged => break,
                Step::Unbounded => {
                    log::warn!("auxiliary problem is unbounded, no feasible basis found");
                    return Outcome::PhaseOneFailed;
                }
            }
        }

        let auxiliary_value = aux.tableau.objective_value();
        if auxiliary_value.abs() > EPSILON {
            log::info!("phase 1 optimum {auxiliary_value} is nonzero, the problem is infeasible");
            return Outcome::Infeasible;
        }

        self.tableau.transplant(&mut aux.tableau);
        Outcome::Optimal
    }

    /// Second phase: pivot the now-feasible tableau to optimality.
    fn phase2(&mut self, observer: &mut dyn PivotObserver) -> Outcome {
        // Cycling guard: this many consecutive degenerate pivots in a
        // row means the vertex is not going to move.
        let stall_limit = 2 * self.tableau.n_variables();
        let mut stalled = 0usize;

        while !self.tableau.is_optimal() {
            if self.iterations.total() >= self.max_iterations {
                return Outcome::IterationLimitExceeded;
            }
            match self.iterate() {
                Step::Pivoted {
                    entering,
                    leaving_row,
                    degenerate,
                } => {
                    self.iterations.phase2 += 1;
                    observer.on_pivot(PivotSnapshot {
                        phase: Phase::Two,
                        entering,
                        leaving_row,
                        matrix: self.tableau.matrix(),
                        variable_values: self.tableau.variable_values(),
                    });
                    stalled = if degenerate { stalled + 1 } else { 0 };
                    if stalled > stall_limit {
                        return Outcome::DegenerateStall;
                    }
                }
                Step::Converged => break,
                Step::Unbounded => return Outcome::Unbounded,
            }
        }

        if self.tableau.has_alternative_optima() {
            Outcome::MultipleOptima
        } else {
            Outcome::Optimal
        }
    }

    /// One basis exchange: pick the entering variable by the most
    /// negative objective-row coefficient, the leaving row by the
    /// minimum ratio test, then row-reduce. Ties break to the lowest
    /// index in both selections.
    fn iterate(&mut self) -> Step {
        if self.tableau.is_optimal() {
            return Step::Converged;
        }

        let n = self.tableau.n_variables();
        let rhs_col = n;

        let mut entering = None;
        let mut min_coefficient = -EPSILON;
        for j in 0..n {
            let coefficient = self.tableau.entry(0, j);
            if coefficient < min_coefficient {
                entering = Some(j);
                min_coefficient = coefficient;
            }
        }
        let Some(entering) = entering else {
            return Step::Converged;
        };
        log::debug!("enter: x{entering}");

        let mut leaving: Option<(usize, f64)> = None;
        for r in 0..self.tableau.n_constraints() {
            let coefficient = self.tableau.entry(r + 1, entering);
            if coefficient > EPSILON {
                let ratio = self.tableau.entry(r + 1, rhs_col) / coefficient;
                if leaving.map_or(true, |(_, best)| ratio < best) {
                    leaving = Some((r, ratio));
                }
            }
        }
        let Some((leaving_row, ratio)) = leaving else {
            log::info!("column x{entering} has no positive constraint coefficient");
            return Step::Unbounded;
        };
        log::debug!(
            "leave: row {leaving_row} (basic variable {:?}, ratio {ratio})",
            self.tableau.basis()[leaving_row]
        );

        self.tableau.pivot(leaving_row, entering);
        Step::Pivoted {
            entering,
            leaving_row,
            degenerate: ratio.abs() <= EPSILON,
        }
    }

    fn report(&self) -> Solution {
        Solution {
            outcome: self.outcome,
            value: self.tableau.objective_value(),
            variables: self.tableau.variable_values().clone(),
            iterations: self.iterations,
        }
    }
}

#[cfg(test)]
mod tests;
