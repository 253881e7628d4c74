use crate::best_first::best_first_search;
use crate::environment::Environment;
use crate::error::PlanError;
use crate::route::Route;
use crate::solver::{timed_successors, Heuristic, Solver};
use grid_util::Point;
use log::info;

/// Priority expansion ordered by `g + h`. With an admissible heuristic the
/// result is cost-optimal; ties are broken towards lower remaining estimate
/// and then insertion order.
#[derive(Clone, Debug)]
pub struct AstarSolver {
    pub heuristic: Heuristic,
    pub max_expansions: usize,
}

impl Solver for AstarSolver {
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
        best_first_search(
            &start,
            |node, depth| timed_successors(env, node, depth, time_offset),
            |node| self.heuristic.estimate(node, &goal),
            |node| *node == goal,
            self.max_expansions,
        )
        .map(|r| Route::new(r.path, r.cost, r.expanded))
        .ok_or(PlanError::NoPathFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Connectivity;
    use crate::terrain::Terrain;
    use crate::{C, D};

    fn solver(heuristic: Heuristic) -> AstarSolver {
        AstarSolver {
            heuristic,
            max_expansions: usize::MAX,
        }
    }

    /// Asserts that the case in which start and goal are equal is handled
    /// correctly.
    #[test]
    fn equal_start_goal() {
        let mut env = Environment::new(1, 1, Connectivity::Four);
        env.generate_components();
        let route = solver(Heuristic::Manhattan)
            .solve(&env, Point::new(0, 0), Point::new(0, 0), 0)
            .unwrap();
        assert_eq!(route.cells.len(), 1);
        assert_eq!(route.cost, 0);
    }

    /// Asserts that the optimal 4-step solution is found around the blocked
    /// center.
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
        let route = solver(Heuristic::Manhattan)
            .solve(&env, Point::new(0, 0), Point::new(2, 2), 0)
            .unwrap();
        assert_eq!(route.cells.len(), 5);
        assert_eq!(route.cost, 4 * C);
    }

    /// On an 8-connected grid the diagonal heuristic finds the all-diagonal
    /// route.
    #[test]
    fn diagonal_movement_on_eight_grid() {
        let mut env = Environment::new(4, 4, Connectivity::Eight);
        env.generate_components();
        let route = solver(Heuristic::Diagonal)
            .solve(&env, Point::new(0, 0), Point::new(3, 3), 0)
            .unwrap();
        assert_eq!(route.edges(), 3);
        assert_eq!(route.cost, 3 * D);
    }

    /// The informed search expands no more nodes than the uninformed one on
    /// the same instance.
    #[test]
    fn expands_fewer_nodes_than_uniform_cost() {
        use crate::solver::uniform_cost::UniformCostSolver;
        let mut env = Environment::new(8, 8, Connectivity::Four);
        env.set_terrain_rect(3, 0, 3, 5, Terrain::Building);
        env.generate_components();
        let astar = solver(Heuristic::Manhattan)
            .solve(&env, Point::new(0, 0), Point::new(7, 7), 0)
            .unwrap();
        let ucs = UniformCostSolver {
            max_expansions: usize::MAX,
        }
        .solve(&env, Point::new(0, 0), Point::new(7, 7), 0)
        .unwrap();
        assert_eq!(astar.cost, ucs.cost);
        assert!(astar.expanded <= ucs.expanded);
    }
}
