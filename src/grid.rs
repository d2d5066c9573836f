use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use strum::VariantArray;
use unordered_pair::UnorderedPair;

use crate::location::Location;

/// Identifier of an [`Island`], dense from zero in row-major discovery order.
pub type IslandId = usize;
/// Identifier of a [`Corridor`], dense from zero in discovery order.
pub type CorridorId = usize;

/// Axis a corridor runs along.
#[derive(Copy, Clone, VariantArray, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub enum Orientation {
    /// Runs left to right within one row.
    Horizontal,
    /// Runs top to bottom within one column.
    Vertical,
}

/// A numbered cell which must end up with exactly `target` incident bridges.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Island {
    /// Identifier, usable as an index into [`Grid::islands`].
    pub id: IslandId,
    /// Where this island sits on the grid.
    pub location: Location,
    /// Required total bridge multiplicity. Positive; not bounded by the input format.
    pub target: u32,
}

/// A candidate straight-line bridge placement between two islands.
///
/// The cell run is strictly between the endpoints and never contains an
/// island cell; adjacent islands yield a corridor with an empty run.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Corridor {
    /// Identifier, usable as an index into [`Grid::corridors`].
    pub id: CorridorId,
    /// Endpoints, scan origin first.
    pub islands: (IslandId, IslandId),
    /// Axis this corridor runs along.
    pub orientation: Orientation,
    /// Cells strictly between the endpoints, in scan order.
    pub cells: Vec<Location>,
}

impl Corridor {
    /// The endpoints with their scan order forgotten.
    pub fn endpoints(&self) -> UnorderedPair<IslandId> {
        UnorderedPair::from(self.islands)
    }

    /// The endpoint which is not `island`.
    pub fn other_endpoint(&self, island: IslandId) -> IslandId {
        if self.islands.0 == island {
            self.islands.1
        } else {
            self.islands.0
        }
    }
}

/// Reasons an input matrix cannot be turned into a [`Grid`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GridError {
    /// The matrix has no rows or no columns.
    EmptyMatrix,
    /// A row differs in length from the first row.
    RaggedRows {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// No cell of the matrix is positive, so there is nothing to solve.
    NoIslands,
}

impl Display for GridError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMatrix => write!(f, "input matrix is empty"),
            Self::RaggedRows {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} cells where {} were expected",
                row, found, expected
            ),
            Self::NoIslands => write!(f, "input matrix contains no islands"),
        }
    }
}

impl std::error::Error for GridError {}

/// Immutable island/corridor topology of one puzzle.
///
/// Built once from the input matrix; every solver shares one `Grid` read-only.
/// Whether the puzzle is actually solvable is not checked here.
pub struct Grid {
    matrix: Array2<u32>,
    islands: Vec<Island>,
    corridors: Vec<Corridor>,
    island_lookup: HashMap<Location, IslandId>,
    incidence: UnGraphMap<IslandId, CorridorId>,
    incident_corridors: Vec<Vec<CorridorId>>,
}

impl Grid {
    /// Build a grid from rows of non-negative integers, where 0 is an empty
    /// cell and any positive value is an island with that target degree.
    ///
    /// All rows must have the same length.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, GridError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(GridError::EmptyMatrix);
        }
        let width = rows[0].len();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridError::RaggedRows {
                    row: r,
                    expected: width,
                    found: row.len(),
                });
            }
        }
        let flat = rows.iter().flatten().copied().collect();
        let matrix = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|_| GridError::EmptyMatrix)?;
        Self::from_matrix(matrix)
    }

    /// Build a grid directly from a matrix, with the same cell semantics as
    /// [`Self::from_rows`].
    pub fn from_matrix(matrix: Array2<u32>) -> Result<Self, GridError> {
        if matrix.is_empty() {
            return Err(GridError::EmptyMatrix);
        }

        let mut islands = Vec::new();
        let mut island_lookup = HashMap::new();
        for (index, &value) in matrix.indexed_iter() {
            if value > 0 {
                let id = islands.len();
                let location = Location::from(index);
                islands.push(Island {
                    id,
                    location,
                    target: value,
                });
                island_lookup.insert(location, id);
            }
        }
        if islands.is_empty() {
            return Err(GridError::NoIslands);
        }

        let mut grid = Self {
            matrix,
            islands,
            corridors: Vec::new(),
            island_lookup,
            incidence: UnGraphMap::new(),
            incident_corridors: Vec::new(),
        };
        grid.build_corridors();
        Ok(grid)
    }

    /// Scan rightward and downward from every island. The first island found
    /// in a direction terminates the scan and registers one corridor; any
    /// other nonzero cell terminates it without registering (an obstacle).
    /// Scanning in forward directions only registers each pair exactly once.
    fn build_corridors(&mut self) {
        let (height, width) = self.matrix.dim();
        self.incident_corridors = vec![Vec::new(); self.islands.len()];
        for id in 0..self.islands.len() {
            self.incidence.add_node(id);
        }

        for origin_id in 0..self.islands.len() {
            let origin = self.islands[origin_id].location;

            let mut cells = Vec::new();
            let mut pos = origin.right();
            while pos.1 < width {
                if let Some(&found) = self.island_lookup.get(&pos) {
                    self.register_corridor(origin_id, found, Orientation::Horizontal, cells);
                    break;
                }
                if self.matrix[pos.as_index()] != 0 {
                    break;
                }
                cells.push(pos);
                pos = pos.right();
            }

            let mut cells = Vec::new();
            let mut pos = origin.below();
            while pos.0 < height {
                if let Some(&found) = self.island_lookup.get(&pos) {
                    self.register_corridor(origin_id, found, Orientation::Vertical, cells);
                    break;
                }
                if self.matrix[pos.as_index()] != 0 {
                    break;
                }
                cells.push(pos);
                pos = pos.below();
            }
        }
    }

    fn register_corridor(
        &mut self,
        island_a: IslandId,
        island_b: IslandId,
        orientation: Orientation,
        cells: Vec<Location>,
    ) {
        let id = self.corridors.len();
        self.corridors.push(Corridor {
            id,
            islands: (island_a, island_b),
            orientation,
            cells,
        });
        self.incidence.add_edge(island_a, island_b, id);
        self.incident_corridors[island_a].push(id);
        self.incident_corridors[island_b].push(id);
    }

    /// All islands, indexable by [`IslandId`].
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// All corridors, indexable by [`CorridorId`].
    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    /// The island with the given id.
    pub fn island(&self, id: IslandId) -> &Island {
        &self.islands[id]
    }

    /// The corridor with the given id.
    pub fn corridor(&self, id: CorridorId) -> &Corridor {
        &self.corridors[id]
    }

    /// Ids of all corridors with `island` as an endpoint.
    pub fn corridors_incident_to(&self, island: IslandId) -> &[CorridorId] {
        &self.incident_corridors[island]
    }

    /// Islands reachable from `island` by a single corridor.
    pub fn neighbors(&self, island: IslandId) -> impl Iterator<Item = IslandId> + '_ {
        self.incidence.neighbors(island)
    }

    /// The corridor joining two specific islands, if one exists.
    pub fn corridor_between(&self, island_a: IslandId, island_b: IslandId) -> Option<&Corridor> {
        self.incidence
            .edge_weight(island_a, island_b)
            .map(|&id| &self.corridors[id])
    }

    /// The island occupying `location`, if any.
    pub fn island_at(&self, location: Location) -> Option<IslandId> {
        self.island_lookup.get(&location).copied()
    }

    /// Width of the input matrix in cells.
    pub fn width(&self) -> usize {
        self.matrix.ncols()
    }

    /// Height of the input matrix in cells.
    pub fn height(&self) -> usize {
        self.matrix.nrows()
    }

    /// The input matrix this grid was built from.
    pub fn matrix(&self) -> &Array2<u32> {
        &self.matrix
    }
}
