use std::collections::BTreeMap;
use std::time::Duration;

use strum::Display;

use crate::state::PuzzleState;

/// Terminal status of one solver run.
///
/// `Unsat`, `Failed`, and `Skipped` are ordinary search outcomes; only
/// `Error` marks an unexpected fault, with diagnostics in
/// [`SolveOutcome::detail`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SolveStatus {
    /// A search solver reached a goal state.
    Solved,
    /// The SAT solver found a satisfying, connected model.
    Sat,
    /// The SAT solver proved no solution exists.
    Unsat,
    /// A search solver exhausted its space without reaching a goal.
    Failed,
    /// An unexpected internal fault; see the outcome's detail.
    Error,
    /// The caller declined to run the solver, typically over a size bound.
    Skipped,
}

/// What one solver run produced: a status, optionally the solution, wall
/// time, and an open map of algorithm-specific effort metrics.
///
/// One record shape serves every algorithm; metrics keys differ per solver
/// (`iterations`, `expanded`, `explored`, `visited`).
pub struct SolveOutcome<'g> {
    /// Terminal status.
    pub status: SolveStatus,
    /// The solution state, present for `Solved` and `Sat`.
    pub state: Option<PuzzleState<'g>>,
    /// Wall time spent inside the solver.
    pub elapsed: Duration,
    /// Algorithm-specific effort counters.
    pub metrics: BTreeMap<&'static str, u64>,
    /// Diagnostic detail, present for `Error` and `Skipped`.
    pub detail: Option<String>,
}

impl<'g> SolveOutcome<'g> {
    fn bare(status: SolveStatus, state: Option<PuzzleState<'g>>, elapsed: Duration) -> Self {
        Self {
            status,
            state,
            elapsed,
            metrics: BTreeMap::new(),
            detail: None,
        }
    }

    /// A search solver reached `state` as a goal.
    #[inline]
    pub fn solved(state: PuzzleState<'g>, elapsed: Duration) -> Self {
        Self::bare(SolveStatus::Solved, Some(state), elapsed)
    }

    /// The SAT solver accepted `state` as a connected model.
    #[inline]
    pub fn sat(state: PuzzleState<'g>, elapsed: Duration) -> Self {
        Self::bare(SolveStatus::Sat, Some(state), elapsed)
    }

    /// The SAT solver proved unsatisfiability.
    #[inline]
    pub fn unsat(elapsed: Duration) -> Self {
        Self::bare(SolveStatus::Unsat, None, elapsed)
    }

    /// A search solver exhausted its space.
    #[inline]
    pub fn failed(elapsed: Duration) -> Self {
        Self::bare(SolveStatus::Failed, None, elapsed)
    }

    /// An unexpected fault, with diagnostic detail.
    #[inline]
    pub fn error<D>(detail: D, elapsed: Duration) -> Self
    where
        D: Into<String>,
    {
        let mut outcome = Self::bare(SolveStatus::Error, None, elapsed);
        outcome.detail = Some(detail.into());
        outcome
    }

    /// The caller declined to run this solver; `reason` says why.
    #[inline]
    pub fn skipped<D>(reason: D) -> Self
    where
        D: Into<String>,
    {
        let mut outcome = Self::bare(SolveStatus::Skipped, None, Duration::ZERO);
        outcome.detail = Some(reason.into());
        outcome
    }

    /// Attach an effort metric, builder style.
    #[inline]
    pub fn with_metric(mut self, name: &'static str, value: u64) -> Self {
        self.metrics.insert(name, value);
        self
    }

    /// Whether this outcome carries a solution.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self.status, SolveStatus::Solved | SolveStatus::Sat)
    }
}
