use nalgebra::{DMatrix, DVector};

/// Which phase of the algorithm produced a pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    One,
    Two,
}

/// State handed to a [`PivotObserver`] once per basis exchange.
///
/// Phase-1 snapshots view the auxiliary tableau (with its artificial
/// columns), phase-2 snapshots the real one.
#[derive(Debug, Clone, Copy)]
pub struct PivotSnapshot<'a> {
    pub phase: Phase,
    /// Column index of the variable that entered the basis.
    pub entering: usize,
    /// Constraint row (0-based) whose basic variable was replaced.
    pub leaving_row: usize,
    pub matrix: &'a DMatrix<f64>,
    pub variable_values: &'a DVector<f64>,
}

/// Passive observer of the solve loop. The solver never depends on what
/// an observer does with a snapshot.
pub trait PivotObserver {
    fn on_pivot(&mut self, snapshot: PivotSnapshot<'_>);
}

impl<F: for<'a> FnMut(PivotSnapshot<'a>)> PivotObserver for F {
    fn on_pivot(&mut self, snapshot: PivotSnapshot<'_>) {
        self(snapshot)
    }
}

/// Observer that clones every snapshot, for callers who want the full
/// iteration history (e.g. to narrate a solve afterwards).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordingObserver {
    history: Vec<(DMatrix<f64>, DVector<f64>)>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// One `(matrix, variable_values)` pair per pivot, in order.
    pub fn history(&self) -> &[(DMatrix<f64>, DVector<f64>)] {
        &self.history
    }
}

impl PivotObserver for RecordingObserver {
    fn on_pivot(&mut self, snapshot: PivotSnapshot<'_>) {
        self.history
            .push((snapshot.matrix.clone(), snapshot.variable_values.clone()));
    }
}
