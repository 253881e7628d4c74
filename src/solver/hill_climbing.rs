use crate::environment::Environment;
use crate::error::PlanError;
use crate::route::Route;
use crate::solver::{local_estimate, path_cost, Solver};
use crate::N_SMALLVEC_SIZE;
use fxhash::FxHashSet;
use grid_util::Point;
use log::debug;
use rand::prelude::*;
use smallvec::SmallVec;

/// Greedy descent on the distance-to-goal estimate: always steps to an
/// improving unvisited neighbour, so it gets stuck on local optima. Stuck
/// walks restart from the request start with seeded stochastic choice among
/// the improving neighbours; a restart cannot re-anchor elsewhere since a
/// valid route must begin at the requested start. Non-optimal and
/// non-complete by design.
#[derive(Clone, Debug)]
pub struct HillClimbingSolver {
    pub seed: u64,
    pub max_restarts: u32,
}

impl Solver for HillClimbingSolver {
    fn solve(
        &self,
        env: &Environment,
        start: Point,
        goal: Point,
        time_offset: u64,
    ) -> Result<Route, PlanError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        // Generous bound; a greedy walk visiting every cell once cannot
        // exceed the grid area anyway.
        let walk_limit = env.width() * env.height();
        let mut expanded = 0usize;
        for attempt in 0..=self.max_restarts {
            let stochastic = attempt > 0;
            let (cells, walk_expanded) =
                self.climb(env, start, goal, time_offset, stochastic, walk_limit, &mut rng);
            expanded += walk_expanded;
            if let Some(cells) = cells {
                let cost = path_cost(env, &cells);
                return Ok(Route::new(cells, cost, expanded));
            }
            debug!(
                "Hill climbing attempt {} stuck on a local optimum, restarting",
                attempt
            );
        }
        Err(PlanError::NoPathFound)
    }
}

impl HillClimbingSolver {
    fn climb(
        &self,
        env: &Environment,
        start: Point,
        goal: Point,
        time_offset: u64,
        stochastic: bool,
        walk_limit: usize,
        rng: &mut StdRng,
    ) -> (Option<Vec<Point>>, usize) {
        let estimate = local_estimate(env);
        let mut visited: FxHashSet<Point> = FxHashSet::default();
        visited.insert(start);
        let mut current = start;
        let mut cells = vec![start];
        let mut expanded = 0usize;
        while current != goal && cells.len() < walk_limit {
            expanded += 1;
            let arrival = time_offset + cells.len() as u64;
            let current_estimate = estimate.estimate(&current, &goal);
            let improving: SmallVec<[Point; N_SMALLVEC_SIZE]> = env
                .neighbors(current)
                .into_iter()
                .filter(|n| !visited.contains(n))
                .filter(|n| !env.is_blocked(*n, arrival))
                .filter(|n| estimate.estimate(n, &goal) < current_estimate)
                .collect();
            let next = match improving.len() {
                0 => return (None, expanded), // local optimum
                _ if stochastic => improving[rng.gen_range(0..improving.len())],
                _ => {
                    // Deterministic first pass: best estimate, neighbour
                    // order breaking ties.
                    improving
                        .iter()
                        .copied()
                        .min_by_key(|n| estimate.estimate(n, &goal))
                        .unwrap()
                }
            };
            visited.insert(next);
            cells.push(next);
            current = next;
        }
        if current == goal {
            (Some(cells), expanded)
        } else {
            (None, expanded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Connectivity;
    use crate::terrain::Terrain;

    fn solver() -> HillClimbingSolver {
        HillClimbingSolver {
            seed: 0,
            max_restarts: 4,
        }
    }

    /// On an open grid greedy descent walks straight to the goal.
    #[test]
    fn reaches_goal_on_open_grid() {
        let mut env = Environment::new(5, 5, Connectivity::Four);
        env.generate_components();
        let route = solver()
            .solve(&env, Point::new(0, 0), Point::new(4, 4), 0)
            .unwrap();
        assert_eq!(*route.start().unwrap(), Point::new(0, 0));
        assert_eq!(*route.goal().unwrap(), Point::new(4, 4));
        assert_eq!(route.edges(), 8);
    }

    /// A wall in front of the goal is a local optimum the greedy walk cannot
    /// escape: every attempt fails. This incompleteness is intended.
    #[test]
    fn stuck_on_local_optimum() {
        //  _____
        // |S.#..|
        // |..#..|
        // |..#E.|  <- gap only at the bottom row
        // |.....|
        //  _____
        let mut env = Environment::new(5, 4, Connectivity::Four);
        env.set_terrain_rect(2, 0, 2, 2, Terrain::Building);
        env.generate_components();
        let result = solver().solve(&env, Point::new(0, 0), Point::new(3, 2), 0);
        assert_eq!(result.unwrap_err(), PlanError::NoPathFound);
    }

    /// The same seed yields the same route.
    #[test]
    fn deterministic_under_fixed_seed() {
        let mut env = Environment::new(6, 6, Connectivity::Four);
        env.set_terrain(Point::new(3, 3), Terrain::Building);
        env.generate_components();
        let first = solver().solve(&env, Point::new(0, 0), Point::new(5, 5), 0);
        let second = solver().solve(&env, Point::new(0, 0), Point::new(5, 5), 0);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                assert_eq!(a.cells, b.cells);
                assert_eq!(a.cost, b.cost);
            }
            (Err(a), Err(b)) => assert_eq!(a, b),
            _ => panic!("runs with the same seed diverged"),
        }
    }
}
