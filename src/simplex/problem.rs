use std::ops::{Mul, MulAssign};

use derive_more::{Display, IsVariant};
use derive_new::new;
use nalgebra::{DMatrix, DVector, RowDVector};

use super::{Solution, Solver};

/// Linear objective to maximize.
#[derive(Debug, Clone, PartialEq, new)]
pub struct ObjectiveFunction {
    pub(crate) coefficients: RowDVector<f64>,
}

/// One linear constraint, `coefficients · x  {≤,=,≥}  rhs`.
#[derive(Debug, Clone, PartialEq, new)]
pub struct Constraint {
    coefficients: RowDVector<f64>,
    sign: Sign,
    rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IsVariant)]
pub enum Sign {
    Less = -1,
    Equals = 0,
    Greater = 1,
}

/// An LP normalized to standard form: equality constraints with
/// slack/surplus columns appended and non-negative right-hand sides.
#[derive(Debug, Clone, PartialEq, Display)]
#[display(
    fmt = "Problem {{\n    objective:\n{}\n    constraints:\n{}\n    rhs:\n{}\n}}",
    r#"objective.to_string().trim().lines().map(|l| format!("{}\n", l.trim())).collect::<String>()"#,
    r#"constraints.to_string().trim().lines().map(|l| format!("{}\n", l.trim())).collect::<String>()"#,
    r#"rhs.to_string().trim().lines().map(|l| format!("{}\n", l.trim())).collect::<String>()"#
)]
pub struct Problem {
    pub(crate) objective: RowDVector<f64>,
    pub(crate) constraints: DMatrix<f64>,
    pub(crate) rhs: DVector<f64>,
}

impl Problem {
    pub fn new(objective_function: ObjectiveFunction, constraints: Vec<Constraint>) -> Self {
        Self::normalize(objective_function, constraints)
    }

    /// Solve with the two-phase tableau simplex method.
    pub fn solve(self) -> Solution {
        Solver::from_problem(self).solve()
    }

    pub fn objective(&self) -> &RowDVector<f64> {
        &self.objective
    }

    pub fn constraints(&self) -> &DMatrix<f64> {
        &self.constraints
    }

    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    #[inline]
    fn normalize(
        mut objective_function: ObjectiveFunction,
        mut constraints: Vec<Constraint>,
    ) -> Self {
        let max_coefficients_count = constraints
            .iter()
            .map(|constraint| constraint.coefficients.len())
            .chain([objective_function.coefficients.len()])
            .max()
            .unwrap();

        assert_ne!(max_coefficients_count, 0);

        constraints
            .iter_mut()
            // Reverse the sign of constraints with a negative rhs
            .map(|constraint| {
                if constraint.rhs < 0. {
                    *constraint *= -1.;
                }
                &mut constraint.coefficients
            })
            // Pad the constraints and the objective to a common width
            .chain([&mut objective_function.coefficients])
            .for_each(|coefficients| {
                let current_len = coefficients.len();
                if current_len < max_coefficients_count {
                    *coefficients = coefficients
                        .clone()
                        .resize_horizontally(max_coefficients_count, 0.);
                }
            });

        // Insert slack/surplus columns for the inequalities
        let non_equals = constraints
            .iter()
            .enumerate()
            .filter_map(|(i, constraint)| (!constraint.sign.is_equals()).then_some(i))
            .collect::<Vec<_>>();
        for i in non_equals {
            let constraint = &mut constraints[i];
            constraint
                .coefficients
                .extend([if constraint.sign.is_less() { 1. } else { -1. }]);
            objective_function.coefficients.extend([0.]);
            let constraints_count = constraints.len();
            for j in (0..constraints_count).filter(|j| j != &i) {
                constraints[j].coefficients.extend([0.]);
            }
        }

        let nrows = constraints.len();
        let ncols = constraints[0].coefficients.len();
        let rhs = DVector::from_iterator(nrows, constraints.iter().map(|c| c.rhs));
        let constraints = DMatrix::from_row_iterator(
            nrows,
            ncols,
            // row-major: every constraint contributes one full row
            constraints
                .into_iter()
                .flat_map(|c| c.coefficients.into_iter().copied().collect::<Vec<_>>()),
        );

        Self {
            objective: objective_function.coefficients,
            constraints,
            rhs,
        }
    }
}

impl Mul<f64> for Sign {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        if rhs >= 0. {
            return self;
        }
        match self {
            Sign::Less => Sign::Greater,
            Sign::Equals => self,
            Sign::Greater => Sign::Less,
        }
    }
}

impl MulAssign<f64> for Sign {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

impl Mul<f64> for Constraint {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            coefficients: self.coefficients * rhs,
            rhs: self.rhs * rhs,
            sign: self.sign * rhs,
        }
    }
}

impl MulAssign<f64> for Constraint {
    fn mul_assign(&mut self, rhs: f64) {
        self.coefficients *= rhs;
        self.rhs *= rhs;
        self.sign *= rhs;
    }
}
