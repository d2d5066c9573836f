use std::fmt::{Display, Formatter};

use ndarray::Array2;
use petgraph::unionfind::UnionFind;

use crate::grid::{CorridorId, Grid, IslandId, Orientation};

/// Reasons a [`PuzzleState`] mutation is rejected.
///
/// These are contract violations by the caller, never search dead ends.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StateError {
    /// A corridor was assigned a multiplicity outside `{0, 1, 2}`.
    InvalidMultiplicity {
        /// The corridor being assigned.
        corridor: CorridorId,
        /// The rejected value.
        value: u8,
    },
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMultiplicity { corridor, value } => write!(
                f,
                "corridor {} cannot carry {} bridges; only 0, 1, or 2 are legal",
                corridor, value
            ),
        }
    }
}

impl std::error::Error for StateError {}

/// A partial assignment of bridge multiplicities to the corridors of one [`Grid`].
///
/// Stored as a dense vector indexed by [`CorridorId`], default 0, which doubles
/// as the canonical deduplication signature for search. States are branch
/// scoped: searches either clone them per branch or mutate and undo in place.
#[derive(Clone)]
pub struct PuzzleState<'g> {
    grid: &'g Grid,
    bridges: Vec<u8>,
}

impl<'g> PuzzleState<'g> {
    /// The empty assignment over `grid`: every corridor carries 0 bridges.
    pub fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            bridges: vec![0; grid.corridors().len()],
        }
    }

    pub(crate) fn with_bridges(grid: &'g Grid, bridges: Vec<u8>) -> Self {
        debug_assert_eq!(bridges.len(), grid.corridors().len());
        Self { grid, bridges }
    }

    /// The grid this assignment ranges over.
    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    /// Current multiplicity of the given corridor.
    pub fn corridor_value(&self, corridor: CorridorId) -> u8 {
        self.bridges[corridor]
    }

    /// Assign a multiplicity to a corridor.
    ///
    /// Any value above 2 is a programmer error and is rejected with
    /// [`StateError::InvalidMultiplicity`] rather than treated as a dead end.
    pub fn set_corridor_value(&mut self, corridor: CorridorId, value: u8) -> Result<(), StateError> {
        if value > 2 {
            return Err(StateError::InvalidMultiplicity { corridor, value });
        }
        self.bridges[corridor] = value;
        Ok(())
    }

    /// The full multiplicity vector, in corridor-id order.
    pub fn bridges(&self) -> &[u8] {
        &self.bridges
    }

    /// Target minus the assigned multiplicities incident to `island`.
    ///
    /// Negative values signal over-assignment and may occur transiently
    /// during search.
    pub fn remaining_degree(&self, island: IslandId) -> i64 {
        let used: i64 = self.grid.corridors_incident_to(island)
            .iter()
            .map(|&id| i64::from(self.bridges[id]))
            .sum();
        i64::from(self.grid.island(island).target) - used
    }

    /// Whether every island is reachable from every other along corridors
    /// with nonzero multiplicity.
    pub fn is_connected(&self) -> bool {
        let islands = self.grid.islands();
        let mut visited = vec![false; islands.len()];
        let mut stack = vec![0];
        let mut seen = 0;
        while let Some(island) = stack.pop() {
            if visited[island] {
                continue;
            }
            visited[island] = true;
            seen += 1;
            for &corridor in self.grid.corridors_incident_to(island) {
                if self.bridges[corridor] == 0 {
                    continue;
                }
                let neighbor = self.grid.corridor(corridor).other_endpoint(island);
                if !visited[neighbor] {
                    stack.push(neighbor);
                }
            }
        }
        seen == islands.len()
    }

    /// Number of connected components among islands, counting corridors with
    /// nonzero multiplicity as edges. Unconnected islands count singly.
    pub(crate) fn component_count(&self) -> usize {
        let mut sets = UnionFind::<IslandId>::new(self.grid.islands().len());
        for corridor in self.grid.corridors() {
            if self.bridges[corridor.id] > 0 {
                sets.union(corridor.islands.0, corridor.islands.1);
            }
        }
        let labels = sets.into_labeling();
        let mut roots = labels;
        roots.sort_unstable();
        roots.dedup();
        roots.len()
    }

    /// Whether every island's remaining degree is exactly zero.
    pub fn islands_satisfied(&self) -> bool {
        self.grid
            .islands()
            .iter()
            .all(|island| self.remaining_degree(island.id) == 0)
    }

    /// Whether this assignment solves the puzzle: all degrees exact and the
    /// bridge graph connected.
    pub fn is_goal(&self) -> bool {
        self.islands_satisfied() && self.is_connected()
    }

    /// Sum over islands of the still-unmet degree, ignoring over-assignment.
    pub fn deficit(&self) -> u64 {
        self.grid
            .islands()
            .iter()
            .map(|island| self.remaining_degree(island.id).max(0) as u64)
            .sum()
    }

    /// Among islands with strictly positive remaining degree, the one with
    /// the smallest such value; ties break toward the lower id.
    pub(crate) fn most_constrained_island(&self) -> Option<IslandId> {
        self.grid
            .islands()
            .iter()
            .filter_map(|island| {
                let remaining = self.remaining_degree(island.id);
                (remaining > 0).then_some((remaining, island.id))
            })
            .min()
            .map(|(_, id)| id)
    }

    /// Project this assignment onto a symbol matrix for rendering.
    ///
    /// Island cells hold their target digit; corridor cells hold `-`/`=` for
    /// single/double horizontal bridges and `|`/`$` for vertical ones; every
    /// other cell holds `0`. This projection is the sole interface handed to
    /// external renderers.
    pub fn symbol_matrix(&self) -> Array2<char> {
        let mut out = Array2::from_elem((self.grid.height(), self.grid.width()), '0');
        for island in self.grid.islands() {
            // targets above 35 have no single-character rendering
            let digit = char::from_digit(island.target, 36).unwrap_or('?');
            out[island.location.as_index()] = digit;
        }
        for corridor in self.grid.corridors() {
            let value = self.bridges[corridor.id];
            if value == 0 {
                continue;
            }
            let symbol = match (corridor.orientation, value) {
                (Orientation::Horizontal, 1) => '-',
                (Orientation::Horizontal, _) => '=',
                (Orientation::Vertical, 1) => '|',
                (Orientation::Vertical, _) => '$',
            };
            for cell in &corridor.cells {
                out[cell.as_index()] = symbol;
            }
        }
        out
    }
}

impl Display for PuzzleState<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let matrix = self.symbol_matrix();
        let mut out = String::with_capacity(matrix.nrows() * (matrix.ncols() + 1));
        for row in matrix.rows() {
            for cell in row {
                out.push(*cell);
            }
            out.push('\n');
        }
        write!(f, "{}", out)
    }
}
