use nalgebra::{DMatrix, DVector, RowDVector};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::simplex::{Constraint, ObjectiveFunction, RecordingObserver, Sign};

fn less(coefficients: &[f64], rhs: f64) -> Constraint {
    Constraint::new(RowDVector::from_row_slice(coefficients), Sign::Less, rhs)
}

/// Every `Some` basis entry must name a unit column: 1 in its own row,
/// 0 in every other row, objective row included.
fn assert_canonical(solver: &Solver) {
    let tableau = solver.tableau();
    let matrix = tableau.matrix();
    for (r, entry) in tableau.basis().iter().enumerate() {
        let Some(j) = entry else { continue };
        for i in 0..matrix.nrows() {
            let expected = if i == r + 1 { 1. } else { 0. };
            assert!(
                (matrix[(i, *j)] - expected).abs() <= 1e-9,
                "column {j} is not canonical for row {r}: entry ({i}, {j}) = {}",
                matrix[(i, *j)]
            );
        }
    }
}

/// Every constraint row of a mid-solve snapshot must own a unit column
/// (1 in its own row, 0 everywhere else, objective row included).
fn assert_snapshot_canonical(matrix: &DMatrix<f64>) {
    for r in 1..matrix.nrows() {
        let seated = (0..matrix.ncols() - 1).any(|j| {
            (0..matrix.nrows()).all(|i| {
                let expected = if i == r { 1. } else { 0. };
                (matrix[(i, j)] - expected).abs() <= 1e-9
            })
        });
        assert!(seated, "row {r} of a pivot snapshot has no unit column");
    }
}

#[test]
fn bounded_lp_with_unique_optimum_solves_without_phase_1() {
    let mut solver = Solver::from_problem(Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[3., 2.])),
        vec![less(&[1., 1.], 4.), less(&[1., 3.], 6.)],
    ));
    let solution = solver.solve();

    assert_eq!(solution.outcome, Outcome::Optimal);
    assert_eq!(solution.value, 12.);
    assert_eq!(solution.variables[0], 4.);
    assert_eq!(solution.variables[1], 0.);
    assert_eq!(solution.iterations.phase1, 0);
    assert_canonical(&solver);
}

#[test]
fn zero_reduced_cost_at_optimality_reports_multiple_optima() {
    let solution = Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[1., 1.])),
        vec![less(&[1., 1.], 4.)],
    )
    .solve();

    assert_eq!(solution.outcome, Outcome::MultipleOptima);
    assert_eq!(solution.value, 4.);
    // the reported vertex sits tightly on the constraint
    assert_eq!(solution.variables[0] + solution.variables[1], 4.);
}

#[test]
fn improving_direction_without_positive_coefficients_is_unbounded() {
    // maximize x subject only to x - y = 0
    let mut solver = Solver::new(
        RowDVector::from_row_slice(&[1., 0.]),
        DMatrix::from_row_slice(1, 2, &[1., -1.]),
        DVector::from_column_slice(&[0.]),
    )
    .unwrap();
    let solution = solver.solve();

    assert_eq!(solution.outcome, Outcome::Unbounded);
    assert_eq!(solution.outcome.code(), 2);
}

#[test]
fn contradictory_constraints_are_infeasible() {
    // x ≤ -1 with x ≥ 0
    let solution = Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[1.])),
        vec![less(&[1.], -1.)],
    )
    .solve();

    assert_eq!(solution.outcome, Outcome::Infeasible);
    assert_eq!(solution.outcome.code(), 3);
}

#[test]
fn greater_constraint_solves_through_phase_1() {
    let mut solver = Solver::from_problem(Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[1., 1.])),
        vec![
            Constraint::new(RowDVector::from_row_slice(&[1., 1.]), Sign::Greater, 1.),
            less(&[1., 0.], 2.),
            less(&[0., 1.], 2.),
        ],
    ));
    let solution = solver.solve();

    assert_eq!(solution.outcome, Outcome::Optimal);
    assert_eq!(solution.value, 4.);
    assert_eq!(solution.variables[0], 2.);
    assert_eq!(solution.variables[1], 2.);
    assert_eq!(solution.iterations.phase1, 1);
    assert_canonical(&solver);
}

#[test]
fn equality_constraint_solves_through_phase_1() {
    // maximize 2x₁ + 3x₂  s.t.  x₁ + x₂ = 5,  x₁ + 2x₂ ≤ 8
    let mut solver = Solver::from_problem(Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[2., 3.])),
        vec![
            Constraint::new(RowDVector::from_row_slice(&[1., 1.]), Sign::Equals, 5.),
            less(&[1., 2.], 8.),
        ],
    ));
    let solution = solver.solve();

    assert_eq!(solution.outcome, Outcome::Optimal);
    assert_eq!(solution.value, 13.);
    assert_eq!(solution.variables[0], 2.);
    assert_eq!(solution.variables[1], 3.);
    assert!(solution.iterations.phase1 >= 1);
    assert_canonical(&solver);
}

#[test]
fn redundant_equality_row_is_dropped_during_transplant() {
    // the same equality stated twice: its second artificial variable
    // can never pivot out, the row collapses to 0 = 0
    let mut solver = Solver::from_problem(Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[1., 0.])),
        vec![
            Constraint::new(RowDVector::from_row_slice(&[1., 1.]), Sign::Equals, 2.),
            Constraint::new(RowDVector::from_row_slice(&[1., 1.]), Sign::Equals, 2.),
        ],
    ));
    let solution = solver.solve();

    assert_eq!(solution.outcome, Outcome::Optimal);
    assert_eq!(solution.value, 2.);
    assert_eq!(solution.variables[0], 2.);
    assert_eq!(solution.variables[1], 0.);
    assert_eq!(solver.tableau().basis(), &[Some(0), None]);
    assert_canonical(&solver);
}

#[test]
fn degenerate_cycling_lp_terminates_within_the_stall_guard() {
    // Beale's example: the first ratio tests all tie at zero and the
    // most-negative-coefficient rule revisits the same bases
    let mut solver = Solver::from_problem(Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[0.75, -150., 0.02, -6.])),
        vec![
            less(&[0.25, -60., -0.04, 9.], 0.),
            less(&[0.5, -90., -0.02, 3.], 0.),
            less(&[0., 0., 1., 0.], 1.),
        ],
    ));
    let solution = solver.solve();

    assert!(
        solution.iterations.total() < 100,
        "cycling ran {} pivot(s) instead of stalling out",
        solution.iterations.total()
    );
    assert!(matches!(
        solution.outcome,
        Outcome::Optimal | Outcome::MultipleOptima | Outcome::DegenerateStall
    ));
    if !solution.outcome.is_degenerate_stall() {
        // z = 1/20 at (1/25, 0, 1, 0)
        assert!((solution.value - 0.05).abs() <= 1e-6);
    }
}

#[test]
fn degenerate_phase_1_pivot_does_not_trip_the_stall_guard() {
    // the zero-rhs row wins the first auxiliary ratio test, so phase 1
    // opens with a degenerate pivot and still reaches a feasible basis
    let mut solver = Solver::from_problem(Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[0., 1.])),
        vec![
            Constraint::new(RowDVector::from_row_slice(&[1., 1.]), Sign::Equals, 2.),
            less(&[1., -1.], 0.),
        ],
    ));
    let solution = solver.solve();

    assert_eq!(solution.outcome, Outcome::Optimal);
    assert_eq!(solution.value, 2.);
    assert_eq!(solution.variables[0], 0.);
    assert_eq!(solution.variables[1], 2.);
    assert_eq!(solution.iterations.phase1, 2);
    assert_canonical(&solver);
}

#[test]
fn mismatched_shapes_fail_construction() {
    let error = Solver::new(
        RowDVector::from_row_slice(&[1., 2., 3.]),
        DMatrix::from_row_slice(1, 2, &[1., 1.]),
        DVector::from_column_slice(&[4.]),
    )
    .unwrap_err();

    assert!(matches!(error, SolverError::DimensionMismatch { .. }));
    assert!(error.to_string().starts_with("dimension mismatch"));
}

#[test]
fn exhausted_pivot_budget_reports_the_limit() {
    let solution = Solver::new(
        RowDVector::from_row_slice(&[3., 2., 0., 0.]),
        DMatrix::from_row_slice(2, 4, &[1., 1., 1., 0., 1., 3., 0., 1.]),
        DVector::from_column_slice(&[4., 6.]),
    )
    .unwrap()
    .with_max_iterations(0)
    .solve();

    assert_eq!(solution.outcome, Outcome::IterationLimitExceeded);
}

#[test]
fn observer_fires_once_per_pivot_in_both_phases() {
    let mut solver = Solver::from_problem(Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[1., 1.])),
        vec![
            Constraint::new(RowDVector::from_row_slice(&[1., 1.]), Sign::Greater, 1.),
            less(&[1., 0.], 2.),
            less(&[0., 1.], 2.),
        ],
    ));
    let mut observer = RecordingObserver::new();
    let solution = solver.solve_observed(&mut observer);

    assert_eq!(observer.history().len(), solution.iterations.total());
    assert!(solution.iterations.total() > 0);
    for (matrix, _) in observer.history() {
        assert_snapshot_canonical(matrix);
    }
}

#[test]
fn closure_observers_see_every_phase_2_pivot() {
    let mut pivots = 0usize;
    let solution = Solver::from_problem(Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[3., 2.])),
        vec![less(&[1., 1.], 4.), less(&[1., 3.], 6.)],
    ))
    .solve_observed(&mut |snapshot: PivotSnapshot<'_>| {
        assert_eq!(snapshot.phase, Phase::Two);
        pivots += 1;
    });

    assert_eq!(pivots, solution.iterations.phase2);
}

#[test]
fn resolving_a_solved_tableau_is_stable() {
    let mut solver = Solver::from_problem(Problem::new(
        ObjectiveFunction::new(RowDVector::from_row_slice(&[3., 2.])),
        vec![less(&[1., 1.], 4.), less(&[1., 3.], 6.)],
    ));
    let first = solver.solve();
    let second = solver.solve();

    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn reported_optima_are_feasible_and_consistent(
        (a, b, c) in (1usize..=3, 1usize..=3).prop_flat_map(|(m, n)| {
            (
                prop::collection::vec(prop::collection::vec(0.0..5.0f64, n), m),
                prop::collection::vec(0.0..10.0f64, m),
                prop::collection::vec(0.0..5.0f64, n),
            )
        })
    ) {
        let n = c.len();
        let mut solver = Solver::from_problem(Problem::new(
            ObjectiveFunction::new(RowDVector::from_row_slice(&c)),
            a.iter()
                .zip(&b)
                .map(|(row, &rhs)| less(row, rhs))
                .collect(),
        ));
        let solution = solver.solve();

        prop_assert!(matches!(
            solution.outcome,
            Outcome::Optimal | Outcome::MultipleOptima | Outcome::Unbounded | Outcome::DegenerateStall
        ));

        if matches!(solution.outcome, Outcome::Optimal | Outcome::MultipleOptima) {
            let x = &solution.variables;
            let direct: f64 = (0..n).map(|j| c[j] * x[j]).sum();
            prop_assert!((solution.value - direct).abs() <= 1e-6);
            for (row, &rhs) in a.iter().zip(&b) {
                let lhs: f64 = (0..n).map(|j| row[j] * x[j]).sum();
                prop_assert!(lhs <= rhs + 1e-6);
            }
            for value in x.iter() {
                prop_assert!(*value >= -1e-6);
            }
            let tableau = solver.tableau();
            for (r, entry) in tableau.basis().iter().enumerate() {
                let Some(j) = entry else { continue };
                for i in 0..tableau.matrix().nrows() {
                    let expected = if i == r + 1 { 1. } else { 0. };
                    prop_assert!((tableau.matrix()[(i, *j)] - expected).abs() <= 1e-6);
                }
            }
        }
    }
}
