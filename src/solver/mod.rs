use crate::environment::{Connectivity, Environment};
use crate::error::PlanError;
use crate::route::Route;
use crate::{C, D, N_SMALLVEC_SIZE};
use core::fmt;
use grid_util::Point;
use smallvec::SmallVec;
use std::time::Instant;

pub mod annealing;
pub mod astar;
pub mod bfs;
pub mod hill_climbing;
pub mod uniform_cost;

pub use annealing::{AnnealingSchedule, AnnealingSolver};
pub use astar::AstarSolver;
pub use bfs::BfsSolver;
pub use hill_climbing::HillClimbingSolver;
pub use uniform_cost::UniformCostSolver;

/// Distance estimate used by the informed strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heuristic {
    /// `|dx| + |dy|`, admissible and consistent for 4-connected movement.
    Manhattan,
    /// `sqrt(dx² + dy²)`, admissible but less informed than Manhattan on
    /// 4-connected grids.
    Euclidean,
    /// Octile distance `max + (√2 − 1)·min`, meant for 8-connected movement
    /// only; requesting it under 4-connected movement is a caller error.
    Diagonal,
}

impl Heuristic {
    /// Scaled integer distance estimate from `pos` to `goal`, a lower bound on
    /// the true remaining cost under the heuristic's movement model (all
    /// traversable terrain costs at least 1 per step).
    pub fn estimate(&self, pos: &Point, goal: &Point) -> i32 {
        match self {
            Heuristic::Manhattan => pos.manhattan_distance(goal) * C,
            Heuristic::Euclidean => {
                let dx = (pos.x - goal.x) as f64;
                let dy = (pos.y - goal.y) as f64;
                (C as f64 * (dx * dx + dy * dy).sqrt()).floor() as i32
            }
            Heuristic::Diagonal => {
                let chebyshev = pos.move_distance(goal);
                let manhattan = pos.manhattan_distance(goal);
                C * chebyshev + (D - C) * (manhattan - chebyshev)
            }
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Heuristic::Manhattan => write!(f, "Manhattan"),
            Heuristic::Euclidean => write!(f, "Euclidean"),
            Heuristic::Diagonal => write!(f, "Diagonal"),
        }
    }
}

/// The closed set of planning strategies the engine dispatches over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Bfs,
    UniformCost,
    AStar(Heuristic),
    HillClimbing,
    SimulatedAnnealing,
}

impl Strategy {
    /// All seven named strategy variants, in comparison-table order.
    pub const ALL: [Strategy; 7] = [
        Strategy::Bfs,
        Strategy::UniformCost,
        Strategy::AStar(Heuristic::Manhattan),
        Strategy::AStar(Heuristic::Euclidean),
        Strategy::AStar(Heuristic::Diagonal),
        Strategy::HillClimbing,
        Strategy::SimulatedAnnealing,
    ];

    /// Whether the strategy is complete: guaranteed to find a path whenever
    /// one exists (within the expansion budget). The local searches are not.
    pub fn is_complete(self) -> bool {
        !matches!(self, Strategy::HillClimbing | Strategy::SimulatedAnnealing)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strategy::Bfs => write!(f, "Breadth-First Search"),
            Strategy::UniformCost => write!(f, "Uniform-Cost Search"),
            Strategy::AStar(h) => write!(f, "A* {}", h),
            Strategy::HillClimbing => write!(f, "Hill Climbing"),
            Strategy::SimulatedAnnealing => write!(f, "Simulated Annealing"),
        }
    }
}

/// A single planning problem; also the plan cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlanRequest {
    pub start: Point,
    pub goal: Point,
    pub strategy: Strategy,
    /// Time step at which the agent stands on `start`; step `i` of the
    /// returned route is occupied at `time_offset + i`.
    pub time_offset: u64,
}

/// Tuning knobs shared by all strategies. A fixed seed makes the local
/// searches reproducible; the expansion budget bounds runaway searches in
/// place of cancellation.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    pub seed: u64,
    pub max_expansions: usize,
    pub max_restarts: u32,
    pub annealing: AnnealingSchedule,
}

impl Default for PlannerConfig {
    fn default() -> PlannerConfig {
        PlannerConfig {
            seed: 0,
            max_expansions: 100_000,
            max_restarts: 8,
            annealing: AnnealingSchedule::default(),
        }
    }
}

/// Common contract of all strategies: a pure function from an environment
/// snapshot, endpoints and a time anchor to a route or a failure.
pub trait Solver {
    fn solve(
        &self,
        env: &Environment,
        start: Point,
        goal: Point,
        time_offset: u64,
    ) -> Result<Route, PlanError>;
}

/// Cost of stepping from `from` onto `to`: the destination terrain cost scaled
/// by the cardinal or diagonal unit. [None] if the destination is impassable
/// or outside the grid.
pub(crate) fn step_cost(env: &Environment, from: &Point, to: &Point) -> Option<i32> {
    let terrain_cost = env.terrain(*to)?.cost()?;
    let diagonal = from.x != to.x && from.y != to.y;
    Some(terrain_cost * if diagonal { D } else { C })
}

/// Total scaled cost of a cell sequence.
pub(crate) fn path_cost(env: &Environment, cells: &[Point]) -> i32 {
    cells
        .windows(2)
        .filter_map(|w| step_cost(env, &w[0], &w[1]))
        .sum()
}

/// Successors of `node` at search depth `depth` from time anchor `t0`:
/// neighbour cells that are not blocked at their estimated arrival time,
/// paired with their step cost.
pub(crate) fn timed_successors(
    env: &Environment,
    node: &Point,
    depth: u32,
    t0: u64,
) -> SmallVec<[(Point, i32); N_SMALLVEC_SIZE]> {
    let arrival = t0 + depth as u64 + 1;
    env.neighbors(*node)
        .into_iter()
        .filter(|n| !env.is_blocked(*n, arrival))
        .filter_map(|n| step_cost(env, node, &n).map(|c| (n, c)))
        .collect()
}

/// Plans a route for `request` on `env`, validating the request first and
/// stamping wall-clock planning time on the result. This is the single entry
/// point the cache and the agent go through.
pub fn plan(
    env: &Environment,
    request: &PlanRequest,
    config: &PlannerConfig,
) -> Result<Route, PlanError> {
    if !env.in_bounds(request.start) {
        return Err(PlanError::OutOfBounds(request.start));
    }
    if !env.in_bounds(request.goal) {
        return Err(PlanError::OutOfBounds(request.goal));
    }
    if request.strategy == Strategy::AStar(Heuristic::Diagonal)
        && env.connectivity() == Connectivity::Four
    {
        return Err(PlanError::InvalidHeuristic);
    }
    let started = Instant::now();
    let result = match request.strategy {
        Strategy::Bfs => BfsSolver {
            max_expansions: config.max_expansions,
        }
        .solve(env, request.start, request.goal, request.time_offset),
        Strategy::UniformCost => UniformCostSolver {
            max_expansions: config.max_expansions,
        }
        .solve(env, request.start, request.goal, request.time_offset),
        Strategy::AStar(heuristic) => AstarSolver {
            heuristic,
            max_expansions: config.max_expansions,
        }
        .solve(env, request.start, request.goal, request.time_offset),
        Strategy::HillClimbing => HillClimbingSolver {
            seed: config.seed,
            max_restarts: config.max_restarts,
        }
        .solve(env, request.start, request.goal, request.time_offset),
        Strategy::SimulatedAnnealing => AnnealingSolver {
            seed: config.seed,
            schedule: config.annealing.clone(),
        }
        .solve(env, request.start, request.goal, request.time_offset),
    };
    result.map(|mut route| {
        route.planning_time = started.elapsed();
        route
    })
}

/// Runs every strategy on the same problem and collects the outcomes for
/// side-by-side comparison. Each call reads the shared environment snapshot
/// only; callers may equally fan the strategies out over scoped threads.
pub fn compare_strategies(
    env: &Environment,
    start: Point,
    goal: Point,
    time_offset: u64,
    config: &PlannerConfig,
) -> Vec<(Strategy, Result<Route, PlanError>)> {
    Strategy::ALL
        .iter()
        .map(|&strategy| {
            let request = PlanRequest {
                start,
                goal,
                strategy,
                time_offset,
            };
            (strategy, plan(env, &request, config))
        })
        .collect()
}

/// The heuristic surface the local searches descend on: octile on 8-connected
/// grids, Manhattan otherwise.
pub(crate) fn local_estimate(env: &Environment) -> Heuristic {
    match env.connectivity() {
        Connectivity::Four => Heuristic::Manhattan,
        Connectivity::Eight => Heuristic::Diagonal,
    }
}
