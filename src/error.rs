use grid_util::Point;
use thiserror::Error;

/// Failures a planning call can report. All of these are ordinary values
/// returned to the caller; nothing in the planner aborts the process.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Position lies outside the grid dimensions. Rejected before any search
    /// starts.
    #[error("position {0} lies outside the grid")]
    OutOfBounds(Point),
    /// The search space was exhausted (or the search budget ran out) without
    /// reaching the goal.
    #[error("no path to the goal was found")]
    NoPathFound,
    /// The diagonal heuristic was requested under 4-connected movement, which
    /// would break admissibility. Rejected at request validation.
    #[error("diagonal heuristic requires 8-connected movement")]
    InvalidHeuristic,
}
