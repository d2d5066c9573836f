#![warn(missing_docs)]

//! # `hashi`
//!
//! Solvers for [Hashiwokakero](https://en.wikipedia.org/wiki/Hashiwokakero)
//! ("Bridges") puzzles: connect numbered islands with horizontal and vertical
//! bridges, at most two per corridor, so that every island's bridge count
//! matches its number, no two bridges cross, and everything ends up in one
//! connected group.
//!
//! Begin by building a [`Grid`] from the puzzle matrix with
//! [`Grid::from_rows`], then hand it to one of four interchangeable engines:
//!
//! * [`SatSolver`]: a Boolean satisfiability encoding solved by `varisat`,
//!   with connectivity enforced by counterexample-guided refinement;
//! * [`AStarSolver`]: best-first search under one of several admissible
//!   [`Heuristic`]s;
//! * [`BacktrackingSolver`]: depth-first search, optionally with forward
//!   checking ([`Propagation`]);
//! * [`BruteForceSolver`]: exhaustive enumeration, as a baseline.
//!
//! Every engine returns the same [`SolveOutcome`] record: a [`SolveStatus`],
//! optionally the solved [`PuzzleState`], wall time, and an effort metric.
//!
//! # Internals
//! The SAT route expresses each corridor as `single`/`double`/`active`
//! booleans, turns each island's weighted degree requirement into paired
//! cardinality constraints by duplicating double-weight literals, and forbids
//! crossing corridor pairs cell by cell. Global connectivity is not encoded
//! up front: each satisfying model is checked with union-find, and stray
//! components are excluded with blocking clauses until a connected model
//! appears or the formula becomes unsatisfiable.
//!
//! The search engines share one [`ConstraintChecker`] per grid as their
//! validity oracle and pick the most constrained island first; they differ
//! only in how they walk the space and how much they propagate.

pub use astar::{AStarSolver, Heuristic};
pub use backtracking::{BacktrackingSolver, Propagation};
pub use bruteforce::BruteForceSolver;
pub use checker::ConstraintChecker;
pub use grid::{Corridor, CorridorId, Grid, GridError, Island, IslandId, Orientation};
pub use location::Location;
pub use result::{SolveOutcome, SolveStatus};
pub use sat::SatSolver;
pub use state::{PuzzleState, StateError};

pub(crate) mod astar;
pub(crate) mod backtracking;
pub(crate) mod bruteforce;
pub(crate) mod cardinality;
pub(crate) mod checker;
pub(crate) mod encoder;
pub(crate) mod grid;
pub(crate) mod location;
pub(crate) mod result;
pub(crate) mod sat;
pub(crate) mod state;
mod tests;
pub(crate) mod vars;
