use crate::best_first::{reverse_path, FxIndexMap};
use crate::environment::Environment;
use crate::error::PlanError;
use crate::route::Route;
use crate::solver::{path_cost, Solver};
use grid_util::Point;
use log::{info, warn};
use std::collections::VecDeque;

/// Level-order expansion over the connectivity neighbourhood, treating every
/// traversable cell as unit cost. Finds a minimum edge-count path, which is
/// not cost-optimal on weighted terrain; the returned route still reports the
/// true weighted cost of the cells it visits.
#[derive(Clone, Debug)]
pub struct BfsSolver {
    pub max_expansions: usize,
}

impl Solver for BfsSolver {
    fn solve(
        &self,
        env: &Environment,
        start: Point,
        goal: Point,
        time_offset: u64,
    ) -> Result<Route, PlanError> {
        if env.unreachable(&start, &goal) {
            info!("{} is not reachable from {}", goal, start);
            return Err(PlanError::NoPathFound);
        }
        // Parent indices double as the visited set; depth gives the arrival
        // time of each frontier cell.
        let mut parents: FxIndexMap<Point, (usize, u32)> = FxIndexMap::default();
        parents.insert(start, (usize::MAX, 0));
        let mut queue: VecDeque<usize> = VecDeque::new();
        queue.push_back(0);
        let mut expanded = 0usize;
        while let Some(index) = queue.pop_front() {
            let (&node, &(_, depth)) = parents.get_index(index).unwrap();
            if node == goal {
                let cells = reverse_path(&parents, |&(p, _)| p, index);
                let cost = path_cost(env, &cells);
                return Ok(Route::new(cells, cost, expanded));
            }
            expanded += 1;
            if expanded > self.max_expansions {
                warn!("Search expansion budget of {} exhausted", self.max_expansions);
                return Err(PlanError::NoPathFound);
            }
            let arrival = time_offset + depth as u64 + 1;
            for neighbor in env.neighbors(node) {
                if parents.contains_key(&neighbor) || env.is_blocked(neighbor, arrival) {
                    continue;
                }
                let neighbor_index = parents.len();
                parents.insert(neighbor, (index, depth + 1));
                queue.push_back(neighbor_index);
            }
        }
        Err(PlanError::NoPathFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Connectivity;
    use crate::terrain::Terrain;
    use crate::C;

    /// Asserts that the minimal 4-step detour around the center is found.
    #[test]
    fn solve_simple_problem() {
        //  ___
        // |S..|
        // |.#.|
        // |..E|
        //  ___
        let mut env = Environment::new(3, 3, Connectivity::Four);
        env.set_terrain(Point::new(1, 1), Terrain::Building);
        env.generate_components();
        let solver = BfsSolver {
            max_expansions: usize::MAX,
        };
        let route = solver
            .solve(&env, Point::new(0, 0), Point::new(2, 2), 0)
            .unwrap();
        assert_eq!(route.cells.len(), 5);
        assert_eq!(route.cost, 4 * C);
        assert!(!route.contains(&Point::new(1, 1)));
    }

    /// BFS minimizes edges, not weighted cost: it happily marches through
    /// expensive terrain if that saves no steps either way.
    #[test]
    fn ignores_terrain_weights() {
        let mut env = Environment::new(3, 1, Connectivity::Four);
        env.set_terrain(Point::new(1, 0), Terrain::Mountain);
        env.generate_components();
        let solver = BfsSolver {
            max_expansions: usize::MAX,
        };
        let route = solver
            .solve(&env, Point::new(0, 0), Point::new(2, 0), 0)
            .unwrap();
        assert_eq!(route.edges(), 2);
        // Reported cost is the true weighted cost of the chosen cells.
        assert_eq!(route.cost, 8 * C + C);
    }

    #[test]
    fn walled_off_goal_fails() {
        let mut env = Environment::new(3, 3, Connectivity::Four);
        env.set_terrain_rect(1, 0, 1, 2, Terrain::Building);
        env.generate_components();
        let solver = BfsSolver {
            max_expansions: usize::MAX,
        };
        assert_eq!(
            solver
                .solve(&env, Point::new(0, 0), Point::new(2, 0), 0)
                .unwrap_err(),
            PlanError::NoPathFound
        );
    }
}
