use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::Instant;

use strum::{Display, VariantArray};

use crate::checker::ConstraintChecker;
use crate::result::SolveOutcome;
use crate::state::PuzzleState;

/// Admissible lower bounds on the number of increment actions still needed
/// to reach a goal from a partial assignment.
///
/// All values are expressed in half-bridge units (twice the bound) so that
/// f-scores stay integral and expansion order is exact; `Deficit` would
/// otherwise take half-integer values.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Display, VariantArray)]
pub enum Heuristic {
    /// Half the summed positive remaining degrees: one increment feeds at
    /// most two islands.
    Deficit,
    /// Components of the current bridge graph minus one: each merge takes at
    /// least one increment.
    MinConnectivity,
    /// Demand exceeding the count of unsaturated incident corridors forces
    /// double bridges; summed, halved, rounded up.
    Bottleneck,
    /// Pointwise maximum of the other three; dominates each and stays
    /// admissible because each component bound is independently valid.
    Composite,
}

impl Heuristic {
    /// Evaluate this bound for `state`, in half-bridge units.
    pub fn evaluate(&self, state: &PuzzleState<'_>) -> u64 {
        match self {
            Self::Deficit => state.deficit(),
            Self::MinConnectivity => 2 * (state.component_count() as u64 - 1),
            Self::Bottleneck => {
                let grid = state.grid();
                let mut excess: u64 = 0;
                for island in grid.islands() {
                    let remaining = state.remaining_degree(island.id);
                    if remaining <= 0 {
                        continue;
                    }
                    let unsaturated = grid
                        .corridors_incident_to(island.id)
                        .iter()
                        .filter(|&&corridor| state.corridor_value(corridor) < 2)
                        .count() as i64;
                    excess += remaining.saturating_sub(unsaturated).max(0) as u64;
                }
                // 2 * ceil(excess / 2)
                excess + (excess & 1)
            }
            Self::Composite => [Self::Deficit, Self::MinConnectivity, Self::Bottleneck]
                .into_iter()
                .map(|heuristic| heuristic.evaluate(state))
                .max()
                .unwrap_or(0),
        }
    }
}

/// Frontier entry ordered as a min-heap on (f-score, insertion sequence).
/// The sequence counter makes expansion order deterministic across runs.
struct Frontier<'g> {
    f: u64,
    seq: u64,
    g: u64,
    state: PuzzleState<'g>,
}

impl PartialEq for Frontier<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl Eq for Frontier<'_> {}

impl PartialOrd for Frontier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed so the std max-heap pops the smallest entry
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Best-first search over partial assignments.
///
/// Expansion branches only over corridors incident to the island with the
/// smallest positive remaining degree, incrementing one corridor by one per
/// branch; the dense multiplicity vector is the deduplication signature.
pub struct AStarSolver<'c, 'g> {
    checker: &'c ConstraintChecker<'g>,
    heuristic: Heuristic,
}

impl<'c, 'g> AStarSolver<'c, 'g> {
    /// A solver guided by the given heuristic.
    pub fn new(checker: &'c ConstraintChecker<'g>, heuristic: Heuristic) -> Self {
        Self { checker, heuristic }
    }

    /// Search from `initial`, reporting `Solved` on the first goal popped or
    /// `Failed` once the frontier empties. Expanded-node count is reported
    /// under the `expanded` metric.
    pub fn solve(&self, initial: PuzzleState<'g>) -> SolveOutcome<'g> {
        let started = Instant::now();
        let grid = initial.grid();

        let mut g_score: HashMap<Vec<u8>, u64> = HashMap::new();
        let mut closed: HashSet<Vec<u8>> = HashSet::new();
        let mut open = BinaryHeap::new();
        let mut seq: u64 = 0;
        let mut expanded: u64 = 0;

        g_score.insert(initial.bridges().to_vec(), 0);
        open.push(Frontier {
            f: self.heuristic.evaluate(&initial),
            seq,
            g: 0,
            state: initial,
        });

        while let Some(entry) = open.pop() {
            let signature = entry.state.bridges().to_vec();
            if closed.contains(&signature) {
                continue;
            }
            if entry.state.is_goal() {
                return SolveOutcome::solved(entry.state, started.elapsed())
                    .with_metric("expanded", expanded);
            }
            closed.insert(signature);
            expanded += 1;

            // every island satisfied but the graph disconnected: a dead end,
            // since increments can only overshoot from here
            let Some(island) = entry.state.most_constrained_island() else {
                continue;
            };

            for &corridor in grid.corridors_incident_to(island) {
                let current = entry.state.corridor_value(corridor);
                if current >= 2 {
                    continue;
                }
                let (a, b) = grid.corridor(corridor).islands;
                if entry.state.remaining_degree(a) < 1 || entry.state.remaining_degree(b) < 1 {
                    continue;
                }

                let mut next = entry.state.clone();
                next.set_corridor_value(corridor, current + 1).unwrap();
                let tentative = entry.g + 1;
                let signature = next.bridges().to_vec();
                if tentative >= g_score.get(&signature).copied().unwrap_or(u64::MAX) {
                    continue;
                }
                if !self.checker.is_valid(&next) {
                    continue;
                }

                g_score.insert(signature, tentative);
                seq += 1;
                open.push(Frontier {
                    f: 2 * tentative + self.heuristic.evaluate(&next),
                    seq,
                    g: tentative,
                    state: next,
                });
            }
        }

        SolveOutcome::failed(started.elapsed()).with_metric("expanded", expanded)
    }
}
