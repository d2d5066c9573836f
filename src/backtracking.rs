use std::time::Instant;

use crate::checker::ConstraintChecker;
use crate::grid::{CorridorId, Grid, IslandId};
use crate::result::SolveOutcome;
use crate::state::PuzzleState;

/// How much domain reasoning the backtracking search performs after each
/// assignment.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Propagation {
    /// Validate with the constraint checker only, after the fact.
    None,
    /// Additionally maintain per-corridor domains and prune branches whose
    /// domains can no longer satisfy an island.
    ForwardChecking,
}

/// Depth-first search with MRV island selection and ascending value trial.
///
/// Exactly one live state exists for the whole search; every tentative
/// increment is matched by a restoring write before the next candidate is
/// tried and before returning.
pub struct BacktrackingSolver<'c, 'g> {
    grid: &'g Grid,
    checker: &'c ConstraintChecker<'g>,
    propagation: Propagation,
}

/// Domain of a corridor as a bitmask over the values `{0, 1, 2}`.
type Domain = u8;

const FULL_DOMAIN: Domain = 0b111;

fn values_up_to(value: u8) -> Domain {
    (1 << (value + 1)) - 1
}

fn largest_value(domain: Domain) -> Option<u8> {
    if domain == 0 {
        None
    } else {
        Some(7 - domain.leading_zeros() as u8)
    }
}

impl<'c, 'g> BacktrackingSolver<'c, 'g> {
    /// A solver over the checker's grid with the given propagation level.
    pub fn new(checker: &'c ConstraintChecker<'g>, propagation: Propagation) -> Self {
        Self {
            grid: checker.grid(),
            checker,
            propagation,
        }
    }

    /// Search from the empty assignment, reporting `Solved` or `Failed` with
    /// the explored-node count under the `explored` metric.
    pub fn solve(&self) -> SolveOutcome<'g> {
        let started = Instant::now();
        let mut state = PuzzleState::new(self.grid);
        let mut explored: u64 = 0;
        let solution = match self.propagation {
            Propagation::None => self.search(&mut state, &mut explored),
            Propagation::ForwardChecking => {
                let mut domains = vec![FULL_DOMAIN; self.grid.corridors().len()];
                self.search_fc(&mut state, &mut domains, &mut explored)
            }
        };
        match solution {
            Some(solution) => {
                SolveOutcome::solved(solution, started.elapsed()).with_metric("explored", explored)
            }
            None => SolveOutcome::failed(started.elapsed()).with_metric("explored", explored),
        }
    }

    fn search(
        &self,
        state: &mut PuzzleState<'g>,
        explored: &mut u64,
    ) -> Option<PuzzleState<'g>> {
        *explored += 1;
        if state.is_goal() {
            return Some(state.clone());
        }
        let island = state.most_constrained_island()?;
        for &corridor in self.grid.corridors_incident_to(island) {
            let current = state.corridor_value(corridor);
            if current >= 2 {
                continue;
            }
            state.set_corridor_value(corridor, current + 1).unwrap();
            if self.checker.is_valid(state) {
                if let Some(solution) = self.search(state, explored) {
                    state.set_corridor_value(corridor, current).unwrap();
                    return Some(solution);
                }
            }
            state.set_corridor_value(corridor, current).unwrap();
        }
        None
    }

    fn search_fc(
        &self,
        state: &mut PuzzleState<'g>,
        domains: &mut [Domain],
        explored: &mut u64,
    ) -> Option<PuzzleState<'g>> {
        *explored += 1;
        if state.is_goal() {
            return Some(state.clone());
        }
        let island = state.most_constrained_island()?;
        for &corridor in self.grid.corridors_incident_to(island) {
            let current = state.corridor_value(corridor);
            if current >= 2 {
                continue;
            }
            let next = current + 1;
            if domains[corridor] & (1 << next) == 0 {
                continue;
            }

            state.set_corridor_value(corridor, next).unwrap();
            let mut trail: Vec<(CorridorId, Domain)> = Vec::new();
            if self.checker.is_valid(state) && self.propagate(state, corridor, domains, &mut trail)
            {
                if let Some(solution) = self.search_fc(state, domains, explored) {
                    for (changed, mask) in trail.into_iter().rev() {
                        domains[changed] = mask;
                    }
                    state.set_corridor_value(corridor, current).unwrap();
                    return Some(solution);
                }
            }
            for (changed, mask) in trail.into_iter().rev() {
                domains[changed] = mask;
            }
            state.set_corridor_value(corridor, current).unwrap();
        }
        None
    }

    /// After assigning `assigned`, clamp the domains around any island it
    /// exactly satisfied, then look for islands whose best achievable sum
    /// under the shrunk domains falls short of their target (a wipeout).
    /// Returns `false` when the branch is hopeless.
    fn propagate(
        &self,
        state: &PuzzleState<'g>,
        assigned: CorridorId,
        domains: &mut [Domain],
        trail: &mut Vec<(CorridorId, Domain)>,
    ) -> bool {
        let endpoints = self.grid.corridor(assigned).islands;
        let mut affected = vec![endpoints.0, endpoints.1];

        for island in [endpoints.0, endpoints.1] {
            if state.remaining_degree(island) != 0 {
                continue;
            }
            for &other in self.grid.corridors_incident_to(island) {
                if other == assigned {
                    continue;
                }
                let clamped = domains[other] & values_up_to(state.corridor_value(other));
                if clamped != domains[other] {
                    trail.push((other, domains[other]));
                    domains[other] = clamped;
                    affected.push(self.grid.corridor(other).other_endpoint(island));
                }
            }
        }

        affected.sort_unstable();
        affected.dedup();
        affected
            .into_iter()
            .all(|island| self.achievable(domains, island))
    }

    /// Whether `island` can still reach its target if every incident
    /// corridor rises to the largest value its domain allows.
    fn achievable(&self, domains: &[Domain], island: IslandId) -> bool {
        let mut best: i64 = 0;
        for &corridor in self.grid.corridors_incident_to(island) {
            match largest_value(domains[corridor]) {
                Some(value) => best += i64::from(value),
                None => return false,
            }
        }
        best >= i64::from(self.grid.island(island).target)
    }
}

#[cfg(test)]
mod tests {
    use super::{largest_value, values_up_to};

    #[test]
    fn domain_masks() {
        assert_eq!(values_up_to(0), 0b001);
        assert_eq!(values_up_to(1), 0b011);
        assert_eq!(values_up_to(2), 0b111);
        assert_eq!(largest_value(0b001), Some(0));
        assert_eq!(largest_value(0b011), Some(1));
        assert_eq!(largest_value(0b111), Some(2));
        assert_eq!(largest_value(0b100), Some(2));
        assert_eq!(largest_value(0), None);
    }
}
