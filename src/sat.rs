use std::time::Instant;

use petgraph::unionfind::UnionFind;
use unordered_pair::UnorderedPair;
use varisat::{ExtendFormula, Lit, Solver};

use crate::encoder::{decode_model, CnfEncoder, Encoding};
use crate::grid::{Grid, IslandId};
use crate::result::SolveOutcome;
use crate::state::PuzzleState;
use crate::vars::{VarKey, VariableRegistry};

/// SAT-based solver: a full CNF encoding of the local rules plus a lazy,
/// counterexample-guided loop for the one rule CNF does not express well,
/// global connectivity.
///
/// Each iteration asks the backend for a model, decodes it, and runs
/// union-find over the islands it connects. A single component is accepted;
/// otherwise every stray component contributes a blocking clause demanding
/// at least one active corridor toward the main component, and the backend
/// is asked again. Termination of this loop is empirical rather than proven,
/// so a configurable iteration ceiling turns runaway refinement into an
/// explicit error instead of a hang.
pub struct SatSolver {
    refinement_limit: u64,
}

impl Default for SatSolver {
    fn default() -> Self {
        Self {
            refinement_limit: 10_000,
        }
    }
}

impl SatSolver {
    /// A solver with the default refinement ceiling.
    pub fn new() -> Self {
        Self::default()
    }

    /// A solver which gives up with an error after `limit` refinement
    /// iterations.
    pub fn with_refinement_limit(limit: u64) -> Self {
        Self {
            refinement_limit: limit,
        }
    }

    /// Solve `grid`, reporting `Sat` with a connected solution, `Unsat`, or
    /// `Error` on backend failure or ceiling exhaustion. The refinement
    /// iteration count is reported under the `iterations` metric.
    pub fn solve<'g>(&self, grid: &'g Grid) -> SolveOutcome<'g> {
        let started = Instant::now();
        let Encoding { formula, mut registry } = CnfEncoder::new(grid).build();

        // the backend lives exactly as long as the refinement loop
        let mut solver = Solver::new();
        solver.add_formula(&formula);

        let mut iterations: u64 = 0;
        loop {
            if iterations >= self.refinement_limit {
                return SolveOutcome::error(
                    format!(
                        "connectivity refinement did not converge within {} iterations",
                        self.refinement_limit
                    ),
                    started.elapsed(),
                )
                .with_metric("iterations", iterations);
            }
            iterations += 1;

            match solver.solve() {
                Ok(true) => {}
                Ok(false) => {
                    return SolveOutcome::unsat(started.elapsed())
                        .with_metric("iterations", iterations);
                }
                Err(fault) => {
                    return SolveOutcome::error(
                        format!("SAT backend failed: {}", fault),
                        started.elapsed(),
                    )
                    .with_metric("iterations", iterations);
                }
            }
            let Some(model) = solver.model() else {
                return SolveOutcome::error(
                    "SAT backend reported satisfiable but produced no model",
                    started.elapsed(),
                )
                .with_metric("iterations", iterations);
            };

            let state = decode_model(grid, &registry, &model);
            let labels = component_labels(grid, &state);
            let root = labels[0];
            if labels.iter().all(|&label| label == root) {
                return SolveOutcome::sat(state, started.elapsed())
                    .with_metric("iterations", iterations);
            }

            let cuts = blocking_clauses(grid, &mut registry, &labels, root);
            if cuts.is_empty() {
                // no corridor can ever join the stray components to the main
                // one, so no model will ever be connected
                return SolveOutcome::unsat(started.elapsed())
                    .with_metric("iterations", iterations);
            }
            for clause in cuts {
                solver.add_clause(&clause);
            }
        }
    }
}

/// Union-find labeling of islands under the corridors active in `state`.
fn component_labels(grid: &Grid, state: &PuzzleState<'_>) -> Vec<IslandId> {
    let mut sets = UnionFind::<IslandId>::new(grid.islands().len());
    for corridor in grid.corridors() {
        if state.corridor_value(corridor.id) > 0 {
            sets.union(corridor.islands.0, corridor.islands.1);
        }
    }
    sets.into_labeling()
}

/// One clause per stray component: at least one corridor that would join it
/// directly to the root component must become active. Components with no
/// such corridor contribute nothing; a later iteration reaches them once
/// nearer components have been pulled in.
fn blocking_clauses(
    grid: &Grid,
    registry: &mut VariableRegistry,
    labels: &[IslandId],
    root: IslandId,
) -> Vec<Vec<Lit>> {
    let mut components: Vec<IslandId> = labels.to_vec();
    components.sort_unstable();
    components.dedup();

    let mut clauses = Vec::new();
    for component in components {
        if component == root {
            continue;
        }
        let wanted = UnorderedPair::from((component, root));
        let literals: Vec<Lit> = grid
            .corridors()
            .iter()
            .filter(|corridor| {
                let spans =
                    UnorderedPair::from((labels[corridor.islands.0], labels[corridor.islands.1]));
                spans == wanted
            })
            .map(|corridor| registry.var(VarKey::Active(corridor.id)).positive())
            .collect();
        if !literals.is_empty() {
            clauses.push(literals);
        }
    }
    clauses
}
