use std::collections::HashMap;

use itertools::Itertools;

use crate::grid::{CorridorId, Grid, Orientation};
use crate::location::Location;
use crate::state::PuzzleState;

/// Stateless validity oracle for partial assignments over one [`Grid`].
///
/// Every search solver consults this after each tentative mutation, so the
/// crossing rule is precomputed down to the corridor pairs that actually
/// share a cell; validation then costs O(islands + crossing pairs) instead
/// of a full grid rescan.
pub struct ConstraintChecker<'g> {
    grid: &'g Grid,
    crossings: Vec<(CorridorId, CorridorId)>,
}

impl<'g> ConstraintChecker<'g> {
    /// Bind a checker to `grid`, precomputing its crossing corridor pairs.
    pub fn new(grid: &'g Grid) -> Self {
        let mut by_cell: HashMap<Location, (Vec<CorridorId>, Vec<CorridorId>)> = HashMap::new();
        for corridor in grid.corridors() {
            for &cell in &corridor.cells {
                let entry = by_cell.entry(cell).or_default();
                match corridor.orientation {
                    Orientation::Horizontal => entry.0.push(corridor.id),
                    Orientation::Vertical => entry.1.push(corridor.id),
                }
            }
        }

        let crossings = by_cell
            .into_values()
            .flat_map(|(horizontal, vertical)| {
                horizontal
                    .into_iter()
                    .cartesian_product(vertical)
                    .collect_vec()
            })
            .unique()
            .collect_vec();

        Self { grid, crossings }
    }

    /// The grid this checker is bound to.
    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    /// Whether `state` violates neither the degree rule nor the crossing rule.
    ///
    /// Returns `false` for legitimate dead ends; it never errors on them.
    pub fn is_valid(&self, state: &PuzzleState<'_>) -> bool {
        self.respects_degrees(state) && self.avoids_crossings(state)
    }

    fn respects_degrees(&self, state: &PuzzleState<'_>) -> bool {
        self.grid
            .islands()
            .iter()
            .all(|island| state.remaining_degree(island.id) >= 0)
    }

    fn avoids_crossings(&self, state: &PuzzleState<'_>) -> bool {
        self.crossings.iter().all(|&(horizontal, vertical)| {
            state.corridor_value(horizontal) == 0 || state.corridor_value(vertical) == 0
        })
    }
}
