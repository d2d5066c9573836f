use std::time::Instant;

use itertools::Itertools;

use crate::checker::ConstraintChecker;
use crate::grid::{CorridorId, Grid};
use crate::result::SolveOutcome;
use crate::state::PuzzleState;

/// Exhaustive enumeration of every corridor multiplicity in `{0, 1, 2}`.
///
/// Purely an exponential reference baseline. There is no internal size
/// guard; callers are expected to bound the corridor count before invoking
/// and report [`SolveStatus::Skipped`](crate::SolveStatus::Skipped) themselves
/// when they decline.
pub struct BruteForceSolver<'c, 'g> {
    grid: &'g Grid,
    checker: &'c ConstraintChecker<'g>,
}

impl<'c, 'g> BruteForceSolver<'c, 'g> {
    /// A solver over the checker's grid.
    pub fn new(checker: &'c ConstraintChecker<'g>) -> Self {
        Self {
            grid: checker.grid(),
            checker,
        }
    }

    /// Enumerate all assignments, reporting `Solved` or `Failed` with the
    /// visited-assignment count under the `visited` metric.
    pub fn solve(&self) -> SolveOutcome<'g> {
        let started = Instant::now();

        // tightly constrained corridors first, to fail fast
        let order = self
            .grid
            .corridors()
            .iter()
            .map(|corridor| corridor.id)
            .sorted_by_key(|&id| {
                let (a, b) = self.grid.corridor(id).islands;
                let targets = (self.grid.island(a).target, self.grid.island(b).target);
                (targets.0.min(targets.1), targets.0 + targets.1)
            })
            .collect_vec();

        let mut visited: u64 = 0;
        let initial = PuzzleState::new(self.grid);
        match self.enumerate(&order, 0, initial, &mut visited) {
            Some(solution) => {
                SolveOutcome::solved(solution, started.elapsed()).with_metric("visited", visited)
            }
            None => SolveOutcome::failed(started.elapsed()).with_metric("visited", visited),
        }
    }

    fn enumerate(
        &self,
        order: &[CorridorId],
        index: usize,
        state: PuzzleState<'g>,
        visited: &mut u64,
    ) -> Option<PuzzleState<'g>> {
        if index == order.len() {
            return state.is_goal().then_some(state);
        }
        let corridor = order[index];
        for value in 0..=2u8 {
            let mut branch = state.clone();
            branch.set_corridor_value(corridor, value).unwrap();
            *visited += 1;
            if !self.checker.is_valid(&branch) {
                continue;
            }
            if let Some(solution) = self.enumerate(order, index + 1, branch, visited) {
                return Some(solution);
            }
        }
        None
    }
}
