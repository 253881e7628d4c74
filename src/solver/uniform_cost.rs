use crate::best_first::best_first_search;
use crate::environment::Environment;
use crate::error::PlanError;
use crate::route::Route;
use crate::solver::{timed_successors, Solver};
use grid_util::Point;
use log::info;

/// Priority expansion ordered by cumulative path cost with insertion-order
/// tie-breaking. Optimal on any non-negative weighted grid.
#[derive(Clone, Debug)]
pub struct UniformCostSolver {
    pub max_expansions: usize,
}

impl Solver for UniformCostSolver {
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
            |_| 0,
            |node| *node == goal,
            self.max_expansions,
        )
        .map(|r| Route::new(r.path, r.cost, r.expanded))
        .ok_or(PlanError::NoPathFound)
    }
}
