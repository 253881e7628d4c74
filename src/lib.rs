//! # grid_courier
//!
//! Route planning and execution for a single delivery agent moving on a
//! weighted 2D grid among scheduled moving obstacles. Implements a family of
//! interchangeable search strategies behind one planning contract:
//! breadth-first,
//! [uniform-cost](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm),
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) with several
//! heuristics, [hill climbing](https://en.wikipedia.org/wiki/Hill_climbing)
//! and [simulated annealing](https://en.wikipedia.org/wiki/Simulated_annealing).
//! A bounded LRU plan cache memoizes planner results and a replanning agent
//! loop re-validates each step against the live obstacle timetable.
//! Pre-computes
//! [connected components](https://en.wikipedia.org/wiki/Component_(graph_theory))
//! over static terrain so the complete strategies avoid flood-filling
//! behaviour when no path exists.

pub mod agent;
mod best_first;
pub mod cache;
pub mod environment;
pub mod error;
pub mod route;
pub mod solver;
pub mod terrain;

pub use agent::{
    AgentConfig, AgentEvent, AgentOutcome, AgentStatus, DeliveryAgent, EventTrigger, FailureReason,
};
pub use cache::PlanCache;
pub use environment::{Connectivity, Environment, ObstacleSchedule};
pub use error::PlanError;
pub use route::Route;
pub use solver::{compare_strategies, plan, Heuristic, PlanRequest, PlannerConfig, Strategy};
pub use terrain::Terrain;

/// Cost of a cardinal (straight) step on unit terrain. All move costs are
/// kept in integer form scaled by this unit.
pub const C: i32 = 10;
/// Cost of a diagonal step on unit terrain, an integer approximation of C·√2.
/// Keeping D at or below the true value preserves admissibility of the
/// diagonal heuristic on 8-connected grids.
pub const D: i32 = 14;

/// Inline capacity for neighbourhood successor lists (at most 8 neighbours).
pub const N_SMALLVEC_SIZE: usize = 8;
