use std::collections::HashMap;

use itertools::Itertools;
use varisat::{CnfFormula, ExtendFormula, Lit};

use crate::cardinality;
use crate::grid::{Grid, Orientation};
use crate::location::Location;
use crate::state::PuzzleState;
use crate::vars::{VarKey, VariableRegistry};

/// A fully encoded puzzle: the clause set plus the registry that names its
/// corridor variables, kept so models can be decoded and refinement clauses
/// phrased later.
pub(crate) struct Encoding {
    pub(crate) formula: CnfFormula,
    pub(crate) registry: VariableRegistry,
}

/// Emits the Hashiwokakero rules as CNF over per-corridor booleans.
///
/// # Logical setup
/// Per corridor C there are three variables: `single` (C carries one bridge),
/// `double` (C carries two), and `active` (C carries any).
/// `single` and `double` exclude one another and `active` is their disjunction.
///
/// Per island, the weighted sum of incident `single` (weight 1) and `double`
/// (weight 2) variables must equal the island's target. Each `double` literal
/// is expanded into two duplicate copies, reducing the weighted constraint to
/// plain at-least-target plus at-most-target cardinality constraints over the
/// expanded list.
///
/// Per cell touched by both a horizontal and a vertical corridor, the two
/// `active` variables exclude one another. Non-adjacent corridors never share
/// a cell by construction, so this is the whole crossing rule.
///
/// Connectivity is deliberately absent here; the refinement loop in
/// [`SatSolver`](crate::SatSolver) supplies it lazily.
pub(crate) struct CnfEncoder<'g> {
    grid: &'g Grid,
    registry: VariableRegistry,
    formula: CnfFormula,
}

impl<'g> CnfEncoder<'g> {
    pub(crate) fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            registry: VariableRegistry::new(),
            formula: CnfFormula::new(),
        }
    }

    pub(crate) fn build(mut self) -> Encoding {
        self.encode_corridor_domains();
        self.encode_island_degrees();
        self.encode_crossings();
        Encoding {
            formula: self.formula,
            registry: self.registry,
        }
    }

    fn encode_corridor_domains(&mut self) {
        for corridor in self.grid.corridors() {
            let single = self.registry.var(VarKey::Single(corridor.id));
            let double = self.registry.var(VarKey::Double(corridor.id));
            let active = self.registry.var(VarKey::Active(corridor.id));

            // single and double are mutually exclusive
            self.formula
                .add_clause(&[single.negative(), double.negative()]);
            // active <=> single + double
            self.formula
                .add_clause(&[single.negative(), active.positive()]);
            self.formula
                .add_clause(&[double.negative(), active.positive()]);
            self.formula
                .add_clause(&[active.negative(), single.positive(), double.positive()]);
        }
    }

    fn encode_island_degrees(&mut self) {
        for island_id in 0..self.grid.islands().len() {
            let mut expanded = Vec::new();
            for &corridor in self.grid.corridors_incident_to(island_id) {
                let single = self.registry.var(VarKey::Single(corridor)).positive();
                let double = self.registry.var(VarKey::Double(corridor)).positive();
                // weight 2 as two duplicate literals
                expanded.push(single);
                expanded.push(double);
                expanded.push(double);
            }
            let target = self.grid.island(island_id).target as usize;

            // thread the fresh-variable watermark through both constraints,
            // then advance the registry past any auxiliaries they minted
            let mut watermark = self.registry.watermark();
            for clause in cardinality::at_least(&expanded, target, &mut watermark) {
                self.formula.add_clause(&clause);
            }
            for clause in cardinality::at_most(&expanded, target, &mut watermark) {
                self.formula.add_clause(&clause);
            }
            self.registry.advance_to(watermark);
        }
    }

    fn encode_crossings(&mut self) {
        let mut horizontal_cells: HashMap<Location, Vec<Lit>> = HashMap::new();
        let mut vertical_cells: HashMap<Location, Vec<Lit>> = HashMap::new();
        for corridor in self.grid.corridors() {
            let active = self.registry.var(VarKey::Active(corridor.id)).positive();
            let map = match corridor.orientation {
                Orientation::Horizontal => &mut horizontal_cells,
                Orientation::Vertical => &mut vertical_cells,
            };
            for &cell in &corridor.cells {
                map.entry(cell).or_default().push(active);
            }
        }

        for (cell, horizontal) in horizontal_cells {
            let Some(vertical) = vertical_cells.get(&cell) else {
                continue;
            };
            for (h, v) in horizontal.iter().cartesian_product(vertical) {
                self.formula.add_clause(&[!*h, !*v]);
            }
        }
    }
}

/// Read a satisfying model back into a puzzle state: a positive `double`
/// literal means two bridges, else a positive `single` means one.
pub(crate) fn decode_model<'g>(
    grid: &'g Grid,
    registry: &VariableRegistry,
    model: &[Lit],
) -> PuzzleState<'g> {
    let mut bridges = vec![0u8; grid.corridors().len()];
    for lit in model {
        if !lit.is_positive() {
            continue;
        }
        match registry.lookup(lit.var()) {
            Some(VarKey::Single(corridor)) => {
                if bridges[corridor] == 0 {
                    bridges[corridor] = 1;
                }
            }
            Some(VarKey::Double(corridor)) => bridges[corridor] = 2,
            // active and auxiliary variables carry no multiplicity
            _ => {}
        }
    }
    PuzzleState::with_bridges(grid, bridges)
}
