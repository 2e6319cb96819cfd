use nalgebra::{DMatrix, DVector, RowDVector};
use num_traits::Zero;

use super::EPSILON;

/// Augmented-matrix encoding of a standard-form LP.
///
/// Row 0 holds the negated objective coefficients; its last column
/// tracks the objective value of the current basis under the elementary
/// row operations. Rows `1..=m` hold the constraints with the
/// right-hand side in the last column. `basis[r]` names the variable
/// currently basic in constraint row `r + 1`; its column is a unit
/// vector after every pivot (canonical form).
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    matrix: DMatrix<f64>,
    basis: Vec<Option<usize>>,
    variable_values: DVector<f64>,
    original_objective: RowDVector<f64>,
    original_constraints: DMatrix<f64>,
    original_rhs: DVector<f64>,
    /// Constraint rows whose natural slack/identity start is not a
    /// feasible basic solution at the origin.
    infeasible_rows: Vec<usize>,
}

impl Tableau {
    /// Shapes must already agree; [`Solver::new`](crate::Solver::new)
    /// checks them.
    pub(crate) fn new(
        objective: RowDVector<f64>,
        mut constraints: DMatrix<f64>,
        mut rhs: DVector<f64>,
    ) -> Self {
        let m = constraints.nrows();
        let n = constraints.ncols();

        // Rows with a negative right-hand side are sign-flipped so the
        // phase-1 artificial basis starts non-negative.
        for r in 0..m {
            if rhs[r] < 0. {
                constraints.row_mut(r).apply(|el| *el = -*el);
                rhs[r] = -rhs[r];
            }
        }

        let mut matrix = DMatrix::zeros(m + 1, n + 1);
        for j in 0..n {
            matrix[(0, j)] = -objective[j];
        }
        for r in 0..m {
            for j in 0..n {
                matrix[(r + 1, j)] = constraints[(r, j)];
            }
            matrix[(r + 1, n)] = rhs[r];
        }

        let mut tableau = Self {
            matrix,
            basis: vec![None; m],
            variable_values: DVector::zeros(n),
            original_objective: objective,
            original_constraints: constraints,
            original_rhs: rhs,
            infeasible_rows: Vec::new(),
        };
        tableau.reseat_basis();
        tableau
    }

    /// Number of variable columns (structural plus slack/surplus).
    pub fn n_variables(&self) -> usize {
        self.matrix.ncols() - 1
    }

    /// Number of constraint rows.
    pub fn n_constraints(&self) -> usize {
        self.matrix.nrows() - 1
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn basis(&self) -> &[Option<usize>] {
        &self.basis
    }

    /// Current value of every variable: nonbasic variables are 0, basic
    /// variables take the right-hand side of their row. Only valid
    /// after [`refresh_vars`](Self::refresh_vars).
    pub fn variable_values(&self) -> &DVector<f64> {
        &self.variable_values
    }

    pub fn infeasible_rows(&self) -> &[usize] {
        &self.infeasible_rows
    }

    /// Objective value of the current basis, read from the objective
    /// row's right-hand-side slot.
    pub fn objective_value(&self) -> f64 {
        self.matrix[(0, self.matrix.ncols() - 1)]
    }

    pub(crate) fn entry(&self, row: usize, col: usize) -> f64 {
        self.matrix[(row, col)]
    }

    /// Multiply every entry of `row` by `factor`. A zero factor would
    /// destroy the row, which no pivot ever asks for.
    pub fn scale_row(&mut self, row: usize, factor: f64) {
        assert!(!factor.is_zero(), "cannot scale a tableau row by zero");
        self.matrix.row_mut(row).apply(|el| *el *= factor);
    }

    /// Replace `row` with `row + scale * other_row`.
    pub fn add_scaled_row(&mut self, row: usize, scale: f64, other_row: usize) {
        let other = self.matrix.row(other_row).into_owned();
        self.matrix
            .row_mut(row)
            .zip_apply(&other, |el, other_el| *el += scale * other_el);
    }

    /// Recompute `variable_values` from `matrix` and `basis`. Pure
    /// projection: never touches either.
    pub fn refresh_vars(&mut self) {
        let rhs_col = self.matrix.ncols() - 1;
        self.variable_values.fill(Zero::zero());
        for (r, entry) in self.basis.iter().enumerate() {
            if let Some(j) = entry {
                self.variable_values[*j] = self.matrix[(r + 1, rhs_col)];
            }
        }
    }

    /// True iff every constraint row, evaluated at the current
    /// `variable_values`, equals its right-hand side.
    pub fn is_feasible_at_origin(&self) -> bool {
        let rhs_col = self.matrix.ncols() - 1;
        (1..self.matrix.nrows()).all(|r| {
            let value: f64 = (0..rhs_col)
                .map(|j| self.matrix[(r, j)] * self.variable_values[j])
                .sum();
            (value - self.matrix[(r, rhs_col)]).abs() <= EPSILON
        })
    }

    /// True iff no objective-row coefficient is negative, i.e. no
    /// improving direction remains.
    pub fn is_optimal(&self) -> bool {
        (0..self.n_variables()).all(|j| self.matrix[(0, j)] >= -EPSILON)
    }

    /// One basis exchange: scale the pivot row so the pivot element
    /// becomes 1, eliminate the pivot column from every other row
    /// (objective row included), reseat the basis entry and refresh the
    /// derived values.
    pub(crate) fn pivot(&mut self, constraint_row: usize, col: usize) {
        let pivot_row = constraint_row + 1;
        let pivot_el = self.matrix[(pivot_row, col)];
        self.scale_row(pivot_row, 1. / pivot_el);
        for i in 0..self.matrix.nrows() {
            if i == pivot_row {
                continue;
            }
            let multiplier = self.matrix[(i, col)];
            if multiplier.abs() > EPSILON {
                self.add_scaled_row(i, -multiplier, pivot_row);
            }
        }
        self.basis[constraint_row] = Some(col);
        self.refresh_vars();
    }

    /// Rescan the matrix for unit columns (1 in their own row, 0 in
    /// every other row, objective row included), reseat `basis` from
    /// them and recompute `infeasible_rows` and the variable values.
    pub(crate) fn reseat_basis(&mut self) {
        let m = self.n_constraints();
        let n = self.n_variables();
        for r in 0..m {
            self.basis[r] = (0..n).find(|&j| self.is_unit_column(j, r + 1));
        }
        self.infeasible_rows = (0..m).filter(|&r| self.basis[r].is_none()).collect();
        self.refresh_vars();
    }

    fn is_unit_column(&self, col: usize, one_row: usize) -> bool {
        (0..self.matrix.nrows()).all(|i| {
            let expected = if i == one_row { 1. } else { 0. };
            (self.matrix[(i, col)] - expected).abs() <= EPSILON
        })
    }

    /// Standard-form parts of the phase-1 auxiliary problem: the
    /// original constraints extended with one artificial unit column
    /// per infeasible row, under the objective "maximize minus the sum
    /// of the artificials".
    pub(crate) fn auxiliary_parts(&self) -> (RowDVector<f64>, DMatrix<f64>, DVector<f64>) {
        let n = self.original_constraints.ncols();
        let k = self.infeasible_rows.len();
        let mut constraints = self
            .original_constraints
            .clone()
            .resize_horizontally(n + k, 0.);
        for (offset, &row) in self.infeasible_rows.iter().enumerate() {
            constraints[(row, n + offset)] = 1.;
        }
        let mut objective = RowDVector::zeros(n + k);
        for j in n..n + k {
            objective[j] = -1.;
        }
        (objective, constraints, self.original_rhs.clone())
    }

    /// Fold a solved phase-1 auxiliary tableau back into this one:
    /// pivot residual artificial variables out of its basis, copy the
    /// constraint rows (artificial columns excluded), adopt the basis,
    /// and rebuild the real objective row in canonical form.
    pub(crate) fn transplant(&mut self, aux: &mut Tableau) {
        let n = self.n_variables();
        let m = self.n_constraints();
        let aux_rhs_col = aux.matrix.ncols() - 1;

        for r in 0..m {
            if aux.basis[r].map_or(false, |j| j >= n) {
                match (0..n).find(|&c| aux.matrix[(r + 1, c)].abs() > EPSILON) {
                    Some(c) => aux.pivot(r, c),
                    None => {
                        // 0 = 0 row: it can never win a ratio test.
                        log::warn!("constraint row {r} is redundant after phase 1");
                        aux.basis[r] = None;
                    }
                }
            }
        }

        for r in 0..m {
            for c in 0..n {
                self.matrix[(r + 1, c)] = aux.matrix[(r + 1, c)];
            }
            self.matrix[(r + 1, n)] = aux.matrix[(r + 1, aux_rhs_col)];
        }
        self.basis = aux
            .basis
            .iter()
            .copied()
            .map(|entry| entry.filter(|&j| j < n))
            .collect();

        for c in 0..n {
            self.matrix[(0, c)] = -self.original_objective[c];
        }
        self.matrix[(0, n)] = 0.;
        for r in 0..m {
            if let Some(j) = self.basis[r] {
                let coefficient = self.matrix[(0, j)];
                if coefficient.abs() > EPSILON {
                    self.add_scaled_row(0, -coefficient, r + 1);
                }
            }
        }
        self.refresh_vars();
    }

    /// True iff some nonbasic column has a zero reduced cost at the
    /// current basis, i.e. the optimum is not a unique vertex.
    pub(crate) fn has_alternative_optima(&self) -> bool {
        let n = self.n_variables();
        let nonzero = (0..n)
            .filter(|&j| self.matrix[(0, j)].abs() > EPSILON)
            .count();
        let nonbasic = n - self.basis.iter().flatten().count();
        nonzero < nonbasic
    }
}
