use crate::environment::Environment;
use crate::error::PlanError;
use crate::route::Route;
use crate::solver::{local_estimate, path_cost, Solver};
use crate::N_SMALLVEC_SIZE;
use grid_util::Point;
use log::debug;
use rand::prelude::*;
use smallvec::SmallVec;

/// Cooling schedule for [AnnealingSolver]: the temperature starts at
/// `initial_temperature` and decays geometrically by `cooling_rate` every
/// step until it underflows `min_temperature` or `max_steps` runs out.
#[derive(Clone, Debug)]
pub struct AnnealingSchedule {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub min_temperature: f64,
    pub max_steps: usize,
}

impl Default for AnnealingSchedule {
    fn default() -> AnnealingSchedule {
        AnnealingSchedule {
            initial_temperature: 50.0,
            cooling_rate: 0.99,
            min_temperature: 0.01,
            max_steps: 5_000,
        }
    }
}

/// Random walk towards the goal: each step draws one random candidate
/// neighbour, accepts it unconditionally if it strictly improves the distance
/// estimate and otherwise with probability `exp(-Δ/T)`. Terminates on the
/// goal, temperature underflow or the step budget, whichever comes first.
/// Reproducible under a fixed seed; non-optimal by design.
#[derive(Clone, Debug)]
pub struct AnnealingSolver {
    pub seed: u64,
    pub schedule: AnnealingSchedule,
}

impl Solver for AnnealingSolver {
    fn solve(
        &self,
        env: &Environment,
        start: Point,
        goal: Point,
        time_offset: u64,
    ) -> Result<Route, PlanError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let estimate = local_estimate(env);
        let mut current = start;
        let mut cells = vec![start];
        let mut temperature = self.schedule.initial_temperature;
        let mut expanded = 0usize;
        for _ in 0..self.schedule.max_steps {
            if current == goal {
                break;
            }
            if temperature < self.schedule.min_temperature {
                debug!("Annealing temperature underflow before reaching the goal");
                break;
            }
            let arrival = time_offset + cells.len() as u64;
            let open: SmallVec<[Point; N_SMALLVEC_SIZE]> = env
                .neighbors(current)
                .into_iter()
                .filter(|n| !env.is_blocked(*n, arrival))
                .collect();
            if open.is_empty() {
                temperature *= self.schedule.cooling_rate;
                continue;
            }
            expanded += 1;
            let candidate = open[rng.gen_range(0..open.len())];
            let delta =
                (estimate.estimate(&candidate, &goal) - estimate.estimate(&current, &goal)) as f64;
            let accept = if delta < 0.0 {
                true
            } else {
                rng.gen::<f64>() < (-delta / temperature).exp()
            };
            if accept {
                cells.push(candidate);
                current = candidate;
            }
            temperature *= self.schedule.cooling_rate;
        }
        if current == goal {
            let cost = path_cost(env, &cells);
            Ok(Route::new(cells, cost, expanded))
        } else {
            debug!("Annealing walk ended at {} without reaching {}", current, goal);
            Err(PlanError::NoPathFound)
        }
    }
}
