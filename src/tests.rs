#[cfg(test)]
mod tests {
    use strum::VariantArray;

    use crate::astar::{AStarSolver, Heuristic};
    use crate::backtracking::{BacktrackingSolver, Propagation};
    use crate::bruteforce::BruteForceSolver;
    use crate::checker::ConstraintChecker;
    use crate::grid::{Grid, GridError};
    use crate::location::Location;
    use crate::result::{SolveOutcome, SolveStatus};
    use crate::sat::SatSolver;
    use crate::state::{PuzzleState, StateError};
    use crate::vars::{VarKey, VariableRegistry};

    fn grid(rows: &[&[u32]]) -> Grid {
        let rows: Vec<Vec<u32>> = rows.iter().map(|row| row.to_vec()).collect();
        Grid::from_rows(&rows).unwrap()
    }

    /// Outcomes from all five engines, in a fixed order: SAT, A* (composite),
    /// plain backtracking, forward checking, brute force.
    fn all_solver_outcomes<'g>(
        grid: &'g Grid,
        checker: &'g ConstraintChecker<'g>,
    ) -> Vec<SolveOutcome<'g>> {
        vec![
            SatSolver::new().solve(grid),
            AStarSolver::new(checker, Heuristic::Composite).solve(PuzzleState::new(grid)),
            BacktrackingSolver::new(checker, Propagation::None).solve(),
            BacktrackingSolver::new(checker, Propagation::ForwardChecking).solve(),
            BruteForceSolver::new(checker).solve(),
        ]
    }

    #[test]
    fn corridors_skip_blocked_pairs() {
        let grid = grid(&[&[2, 0, 2, 0, 2]]);
        assert_eq!(grid.islands().len(), 3);
        assert_eq!(grid.corridors().len(), 2);

        // the outer islands see each other only through the middle one
        assert!(grid.corridor_between(0, 1).is_some());
        assert!(grid.corridor_between(1, 2).is_some());
        assert!(grid.corridor_between(0, 2).is_none());

        let mut around_middle: Vec<_> = grid.neighbors(1).collect();
        around_middle.sort_unstable();
        assert_eq!(around_middle, vec![0, 2]);
        assert_eq!(grid.matrix()[[0, 2]], 2);
        assert_eq!((grid.width(), grid.height()), (5, 1));
    }

    #[test]
    fn corridor_cells_never_contain_islands() {
        let grid = grid(&[
            &[2, 0, 0, 0, 3],
            &[0, 0, 0, 0, 0],
            &[1, 0, 2, 0, 2],
        ]);
        for corridor in grid.corridors() {
            for &cell in &corridor.cells {
                assert!(grid.island_at(cell).is_none());
            }
        }
    }

    #[test]
    fn each_island_pair_has_at_most_one_corridor() {
        let grid = grid(&[&[2, 2], &[2, 2]]);
        assert_eq!(grid.corridors().len(), 4);
        for a in 0..grid.islands().len() {
            for b in (a + 1)..grid.islands().len() {
                let shared = grid
                    .corridors()
                    .iter()
                    .filter(|corridor| corridor.endpoints() == (a, b).into())
                    .count();
                assert!(shared <= 1);
            }
        }
        // adjacent islands get a corridor with an empty cell run
        assert!(grid.corridor_between(0, 1).unwrap().cells.is_empty());
    }

    #[test]
    fn grid_rejects_malformed_matrices() {
        assert_eq!(Grid::from_rows(&[]).err(), Some(GridError::EmptyMatrix));
        assert_eq!(
            Grid::from_rows(&[vec![1, 0], vec![1]]).err(),
            Some(GridError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            Grid::from_rows(&[vec![0, 0], vec![0, 0]]).err(),
            Some(GridError::NoIslands)
        );
    }

    #[test]
    fn state_rejects_illegal_multiplicities() {
        let grid = grid(&[&[1, 0, 1]]);
        let mut state = PuzzleState::new(&grid);
        assert_eq!(
            state.set_corridor_value(0, 3),
            Err(StateError::InvalidMultiplicity {
                corridor: 0,
                value: 3
            })
        );
        state.set_corridor_value(0, 2).unwrap();
        assert_eq!(state.corridor_value(0), 2);
        state.set_corridor_value(0, 0).unwrap();
        assert_eq!(state.corridor_value(0), 0);
    }

    #[test]
    fn remaining_degree_goes_negative_on_overshoot() {
        let grid = grid(&[&[1, 0, 1]]);
        let mut state = PuzzleState::new(&grid);
        state.set_corridor_value(0, 2).unwrap();
        assert_eq!(state.remaining_degree(0), -1);
        let checker = ConstraintChecker::new(&grid);
        assert!(!checker.is_valid(&state));
    }

    #[test]
    fn connectivity_follows_nonzero_corridors() {
        let grid = grid(&[&[1, 0, 1]]);
        let mut state = PuzzleState::new(&grid);
        assert!(!state.is_connected());
        assert!(!state.is_goal());
        state.set_corridor_value(0, 1).unwrap();
        assert!(state.is_connected());
        assert!(state.is_goal());
    }

    #[test]
    fn checker_enforces_the_crossing_rule() {
        let grid = grid(&[&[0, 2, 0], &[2, 0, 2], &[0, 2, 0]]);
        assert_eq!(grid.corridors().len(), 2);
        let checker = ConstraintChecker::new(&grid);
        let mut state = PuzzleState::new(&grid);
        state.set_corridor_value(0, 1).unwrap();
        assert!(checker.is_valid(&state));
        state.set_corridor_value(1, 1).unwrap();
        assert!(!checker.is_valid(&state));
        state.set_corridor_value(0, 0).unwrap();
        assert!(checker.is_valid(&state));
    }

    #[test]
    fn scenario_single_corridor_pair() {
        let grid = grid(&[&[1, 0, 1]]);
        let checker = ConstraintChecker::new(&grid);
        for outcome in all_solver_outcomes(&grid, &checker) {
            assert!(outcome.is_success(), "status {}", outcome.status);
            let state = outcome.state.unwrap();
            assert_eq!(state.bridges(), &[1]);
        }
    }

    #[test]
    fn scenario_unreachable_islands() {
        let grid = grid(&[&[1, 0], &[0, 1]]);
        assert!(grid.corridors().is_empty());
        let checker = ConstraintChecker::new(&grid);
        let statuses: Vec<SolveStatus> = all_solver_outcomes(&grid, &checker)
            .into_iter()
            .map(|outcome| outcome.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                SolveStatus::Unsat,
                SolveStatus::Failed,
                SolveStatus::Failed,
                SolveStatus::Failed,
                SolveStatus::Failed,
            ]
        );
    }

    #[test]
    fn scenario_target_beyond_reach() {
        let grid = grid(&[&[5, 0, 1]]);
        let checker = ConstraintChecker::new(&grid);
        for outcome in all_solver_outcomes(&grid, &checker) {
            assert!(!outcome.is_success(), "status {}", outcome.status);
            assert_ne!(outcome.status, SolveStatus::Error);
        }
    }

    #[test]
    fn cross_validation_on_a_unique_puzzle() {
        // four corners, each of target 2; the only connected solution is a
        // single bridge on all four corridors
        let grid = grid(&[&[2, 0, 2], &[0, 0, 0], &[2, 0, 2]]);
        let checker = ConstraintChecker::new(&grid);
        for outcome in all_solver_outcomes(&grid, &checker) {
            assert!(outcome.is_success(), "status {}", outcome.status);
            assert_eq!(outcome.state.unwrap().bridges(), &[1, 1, 1, 1]);
        }
    }

    #[test]
    fn every_astar_heuristic_finds_the_unique_solution() {
        let grid = grid(&[&[2, 0, 2], &[0, 0, 0], &[2, 0, 2]]);
        let checker = ConstraintChecker::new(&grid);
        for &heuristic in Heuristic::VARIANTS {
            let outcome = AStarSolver::new(&checker, heuristic).solve(PuzzleState::new(&grid));
            assert_eq!(outcome.status, SolveStatus::Solved, "{}", heuristic);
            assert_eq!(outcome.state.unwrap().bridges(), &[1, 1, 1, 1]);
            assert!(outcome.metrics["expanded"] > 0);
        }
    }

    #[test]
    fn solutions_satisfy_all_invariants() {
        // two valid solutions exist here, so engines are only required to
        // produce *a* goal state, not the same one
        let grid = grid(&[
            &[2, 0, 0, 0, 3],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
            &[1, 0, 0, 0, 2],
        ]);
        let checker = ConstraintChecker::new(&grid);
        for outcome in all_solver_outcomes(&grid, &checker) {
            assert!(outcome.is_success(), "status {}", outcome.status);
            let state = outcome.state.unwrap();
            assert!(state.is_goal());
            assert!(checker.is_valid(&state));
            for island in grid.islands() {
                assert_eq!(state.remaining_degree(island.id), 0);
            }
        }
    }

    #[test]
    fn crossing_only_puzzles_are_unsolvable() {
        // the two corridors share their middle cell, and both are forced to
        // carry bridges by the degree rule
        let grid = grid(&[&[0, 2, 0], &[2, 0, 2], &[0, 2, 0]]);
        let checker = ConstraintChecker::new(&grid);
        for outcome in all_solver_outcomes(&grid, &checker) {
            assert!(!outcome.is_success(), "status {}", outcome.status);
            assert_ne!(outcome.status, SolveStatus::Error);
        }
    }

    #[test]
    fn refinement_excludes_disconnected_models() {
        // degrees force the two outer corridors to 2 and the middle one to
        // 0, which is disconnected, so the refinement loop must add a cut
        // before it can prove unsatisfiability
        let grid = grid(&[&[2, 0, 2, 0, 2, 0, 2]]);
        let outcome = SatSolver::new().solve(&grid);
        assert_eq!(outcome.status, SolveStatus::Unsat);
        assert!(outcome.metrics["iterations"] >= 2);
    }

    #[test]
    fn refinement_ceiling_is_reported_as_an_error() {
        let grid = grid(&[&[2, 0, 2, 0, 2, 0, 2]]);
        let outcome = SatSolver::with_refinement_limit(1).solve(&grid);
        assert_eq!(outcome.status, SolveStatus::Error);
        assert!(outcome.detail.unwrap().contains("did not converge"));
    }

    #[test]
    fn heuristics_are_admissible_lower_bounds() {
        // the unique solution needs four increments from the empty state,
        // and exactly one from any state one bridge short of it
        let grid = grid(&[&[2, 0, 2], &[0, 0, 0], &[2, 0, 2]]);
        let empty = PuzzleState::new(&grid);
        for &heuristic in Heuristic::VARIANTS {
            assert!(heuristic.evaluate(&empty) <= 2 * 4, "{}", heuristic);
        }

        let mut solved = PuzzleState::new(&grid);
        for corridor in 0..4 {
            solved.set_corridor_value(corridor, 1).unwrap();
        }
        for corridor in 0..4 {
            let mut one_short = solved.clone();
            one_short.set_corridor_value(corridor, 0).unwrap();
            for &heuristic in Heuristic::VARIANTS {
                assert!(heuristic.evaluate(&one_short) <= 2, "{}", heuristic);
            }
        }
    }

    #[test]
    fn heuristics_vanish_at_the_goal() {
        let grid = grid(&[&[2, 0, 2], &[0, 0, 0], &[2, 0, 2]]);
        let mut solved = PuzzleState::new(&grid);
        for corridor in 0..4 {
            solved.set_corridor_value(corridor, 1).unwrap();
        }
        assert!(solved.is_goal());
        for &heuristic in Heuristic::VARIANTS {
            assert_eq!(heuristic.evaluate(&solved), 0, "{}", heuristic);
        }
    }

    #[test]
    fn composite_heuristic_is_the_pointwise_maximum() {
        let grid = grid(&[&[2, 0, 2], &[0, 0, 0], &[2, 0, 2]]);
        let mut state = PuzzleState::new(&grid);
        for bridges in [&[0, 0, 0, 0], &[1, 0, 0, 0], &[1, 1, 0, 0], &[2, 0, 0, 1]] {
            for (corridor, &value) in bridges.iter().enumerate() {
                state.set_corridor_value(corridor, value).unwrap();
            }
            let parts = [
                Heuristic::Deficit.evaluate(&state),
                Heuristic::MinConnectivity.evaluate(&state),
                Heuristic::Bottleneck.evaluate(&state),
            ];
            assert_eq!(
                Heuristic::Composite.evaluate(&state),
                parts.into_iter().max().unwrap()
            );
        }
    }

    #[test]
    fn astar_expansion_order_is_deterministic() {
        let grid = grid(&[
            &[2, 0, 0, 0, 3],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
            &[0, 0, 0, 0, 0],
            &[1, 0, 0, 0, 2],
        ]);
        let checker = ConstraintChecker::new(&grid);
        let first = AStarSolver::new(&checker, Heuristic::Deficit).solve(PuzzleState::new(&grid));
        let second = AStarSolver::new(&checker, Heuristic::Deficit).solve(PuzzleState::new(&grid));
        assert_eq!(first.metrics["expanded"], second.metrics["expanded"]);
        assert_eq!(
            first.state.unwrap().bridges(),
            second.state.unwrap().bridges()
        );
    }

    #[test]
    fn forward_checking_prunes_before_recursing() {
        let grid = grid(&[&[5, 0, 1]]);
        let checker = ConstraintChecker::new(&grid);
        let plain = BacktrackingSolver::new(&checker, Propagation::None).solve();
        let forward = BacktrackingSolver::new(&checker, Propagation::ForwardChecking).solve();
        assert_eq!(plain.status, SolveStatus::Failed);
        assert_eq!(forward.status, SolveStatus::Failed);
        assert!(forward.metrics["explored"] < plain.metrics["explored"]);
    }

    #[test]
    fn symbol_matrix_round_trips_island_targets() {
        let grid = grid(&[&[2, 0, 2], &[0, 0, 0], &[2, 0, 2]]);
        let outcome = SatSolver::new().solve(&grid);
        let state = outcome.state.unwrap();
        let symbols = state.symbol_matrix();
        for island in grid.islands() {
            let digit = symbols[island.location.as_index()];
            assert_eq!(digit.to_digit(36), Some(island.target));
        }
        // non-island cells never hold a digit that looks like an island
        for (index, &symbol) in symbols.indexed_iter() {
            if grid.island_at(Location::from(index)).is_none() {
                assert!(matches!(symbol, '0' | '-' | '=' | '|' | '$'));
            }
        }
    }

    #[test]
    fn display_uses_bridge_symbols() {
        let grid_h = grid(&[&[2, 0, 2]]);
        let checker = ConstraintChecker::new(&grid_h);
        let outcome = BruteForceSolver::new(&checker).solve();
        assert_eq!(format!("{}", outcome.state.unwrap()), "2=2\n");

        let grid_v = grid(&[&[2], &[0], &[2]]);
        let checker = ConstraintChecker::new(&grid_v);
        let outcome = BruteForceSolver::new(&checker).solve();
        assert_eq!(format!("{}", outcome.state.unwrap()), "2\n$\n2\n");

        let grid_square = grid(&[&[2, 0, 2], &[0, 0, 0], &[2, 0, 2]]);
        let checker = ConstraintChecker::new(&grid_square);
        let outcome = BruteForceSolver::new(&checker).solve();
        assert_eq!(format!("{}", outcome.state.unwrap()), "2-2\n|0|\n2-2\n");
    }

    #[test]
    fn outcome_statuses_render_uppercase() {
        assert_eq!(SolveStatus::Solved.to_string(), "SOLVED");
        assert_eq!(SolveStatus::Unsat.to_string(), "UNSAT");
        assert_eq!(SolveStatus::Skipped.to_string(), "SKIPPED");
    }

    #[test]
    fn skipped_outcomes_carry_their_reason() {
        let outcome = SolveOutcome::skipped("12 corridors exceed the brute-force bound");
        assert_eq!(outcome.status, SolveStatus::Skipped);
        assert!(outcome.state.is_none());
        assert!(outcome.detail.unwrap().contains("brute-force bound"));
    }

    #[test]
    fn registry_ids_are_stable_and_collision_free() {
        let mut registry = VariableRegistry::new();
        let single = registry.var(VarKey::Single(0));
        let double = registry.var(VarKey::Double(0));
        assert_ne!(single, double);
        assert_eq!(registry.var(VarKey::Single(0)), single);
        assert_eq!(registry.lookup(single), Some(VarKey::Single(0)));
        assert_eq!(registry.lookup(double), Some(VarKey::Double(0)));

        // an external generator minted ids up to 10; later allocations skip them
        let watermark = registry.watermark();
        registry.advance_to(10);
        let next = registry.var(VarKey::Active(0));
        assert!(next.index() >= 10);
        assert!(watermark <= 10);
    }

    #[test]
    fn mrv_prefers_the_most_constrained_island() {
        let grid = grid(&[&[1, 0, 3]]);
        let state = PuzzleState::new(&grid);
        assert_eq!(state.most_constrained_island(), Some(0));

        let mut state = state;
        state.set_corridor_value(0, 1).unwrap();
        // island 0 is satisfied; only island 1 still wants bridges
        assert_eq!(state.most_constrained_island(), Some(1));
    }
}
