//! Stepwise route execution with bounded replanning: the delivery agent
//! follows its plan one cell per tick, re-validates the next cell against the
//! live obstacle timetable and re-invokes the planner (through the plan
//! cache) whenever the step it is about to take has become blocked.

use crate::cache::PlanCache;
use crate::environment::Environment;
use crate::error::PlanError;
use crate::route::Route;
use crate::solver::{step_cost, PlanRequest, PlannerConfig, Strategy};
use grid_util::Point;
use log::{debug, info, warn};
use std::time::Duration;

/// Reason a run ended in [AgentStatus::Failed].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// The replanning budget was exhausted without recovering a route.
    ReplanLimitExceeded,
    /// The step budget ran out before arrival.
    StepBudgetExceeded,
}

/// Execution states of the delivery agent. `Blocked` and `Replanning` are
/// passed through within a tick when recovery succeeds; `Arrived` and
/// `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentStatus {
    Idle,
    Following,
    Blocked,
    Replanning,
    Arrived,
    Failed(FailureReason),
}

impl AgentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentStatus::Arrived | AgentStatus::Failed(_))
    }
}

/// What caused an [AgentEvent].
#[derive(Clone, Debug, PartialEq)]
pub enum EventTrigger {
    /// A planner invocation produced a route the agent adopted.
    PlanAdopted {
        strategy: Strategy,
        cost: i32,
        fallback: bool,
    },
    /// The next planned cell is blocked at its arrival time.
    StepBlocked { cell: Point },
    /// A replanning invocation failed; `attempt` counts invocations so far.
    ReplanFailed { attempt: u32 },
    Arrived,
    Failed { reason: FailureReason },
}

/// One structured entry of the execution log, emitted on every transition for
/// external statistics and visualization consumers.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentEvent {
    /// Time step at which the transition happened.
    pub tick: u64,
    /// Agent position when the transition happened.
    pub position: Point,
    pub trigger: EventTrigger,
}

/// Agent construction parameters: primary strategy, optional complete
/// fallback for local-search failures, and the step/replan budgets.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    pub strategy: Strategy,
    pub fallback: Option<Strategy>,
    pub max_steps: u32,
    pub max_replans: u32,
    pub cache_capacity: usize,
    pub planner: PlannerConfig,
}

impl Default for AgentConfig {
    fn default() -> AgentConfig {
        AgentConfig {
            strategy: Strategy::AStar(crate::solver::Heuristic::Manhattan),
            fallback: None,
            max_steps: 1_000,
            max_replans: 10,
            cache_capacity: 64,
            planner: PlannerConfig::default(),
        }
    }
}

/// Summary of a finished (or still running) agent simulation.
#[derive(Clone, Debug)]
pub struct AgentOutcome {
    pub status: AgentStatus,
    pub position: Point,
    pub time: u64,
    pub steps: u32,
    pub replans: u32,
    /// Accumulated scaled terrain cost of the cells actually traversed.
    pub traveled_cost: i32,
    /// Total wall-clock time spent in adopted planner invocations.
    pub planning_time: Duration,
}

/// The delivery agent: executes one move per tick towards a fixed goal,
/// replanning from its current position and time whenever the next step is
/// invalidated by the obstacle timetable.
#[derive(Clone, Debug)]
pub struct DeliveryAgent {
    goal: Point,
    position: Point,
    time: u64,
    route: Option<Route>,
    next_index: usize,
    status: AgentStatus,
    steps: u32,
    replans: u32,
    traveled_cost: i32,
    planning_time: Duration,
    config: AgentConfig,
    cache: PlanCache,
    events: Vec<AgentEvent>,
}

impl DeliveryAgent {
    /// Creates an idle agent. Start and goal positions outside the grid are
    /// rejected up front.
    pub fn new(
        env: &Environment,
        start: Point,
        goal: Point,
        config: AgentConfig,
    ) -> Result<DeliveryAgent, PlanError> {
        if !env.in_bounds(start) {
            return Err(PlanError::OutOfBounds(start));
        }
        if !env.in_bounds(goal) {
            return Err(PlanError::OutOfBounds(goal));
        }
        let cache = PlanCache::new(config.cache_capacity);
        Ok(DeliveryAgent {
            goal,
            position: start,
            time: 0,
            route: None,
            next_index: 0,
            status: AgentStatus::Idle,
            steps: 0,
            replans: 0,
            traveled_cost: 0,
            planning_time: Duration::ZERO,
            config,
            cache,
            events: Vec::new(),
        })
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn replans(&self) -> u32 {
        self.replans
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// The cell the agent will try to enter on its next tick, if a route is
    /// active.
    pub fn next_cell(&self) -> Option<Point> {
        self.route
            .as_ref()
            .and_then(|r| r.cells.get(self.next_index))
            .copied()
    }

    /// Full execution log so far.
    pub fn events(&self) -> &[AgentEvent] {
        &self.events
    }

    pub fn outcome(&self) -> AgentOutcome {
        AgentOutcome {
            status: self.status,
            position: self.position,
            time: self.time,
            steps: self.steps,
            replans: self.replans,
            traveled_cost: self.traveled_cost,
            planning_time: self.planning_time,
        }
    }

    /// Advances the simulation by one tick and returns the events emitted
    /// during it. A tick either moves the agent one cell, or spends the tick
    /// on (re)planning when no usable route is available. Time advances
    /// exactly once per non-terminal tick.
    pub fn tick(&mut self, env: &Environment) -> &[AgentEvent] {
        let mark = self.events.len();
        if self.status.is_terminal() {
            return &self.events[mark..];
        }
        if self.steps >= self.config.max_steps {
            self.fail(FailureReason::StepBudgetExceeded);
            return &self.events[mark..];
        }
        if self.route_finished() {
            let adopted = if self.status == AgentStatus::Idle {
                self.initial_plan(env)
            } else {
                self.replan(env)
            };
            if !adopted || self.status.is_terminal() {
                self.time += 1;
                return &self.events[mark..];
            }
            // Plan adopted this tick: fall through and take its first step so
            // execution stays aligned with the planned arrival times.
        }
        self.advance(env);
        self.time += 1;
        &self.events[mark..]
    }

    /// Ticks until a terminal state and returns the summary.
    pub fn run(&mut self, env: &Environment) -> AgentOutcome {
        while !self.status.is_terminal() {
            self.tick(env);
        }
        self.outcome()
    }

    fn route_finished(&self) -> bool {
        match &self.route {
            None => true,
            Some(route) => self.next_index >= route.cells.len(),
        }
    }

    /// Moves along the active route, diverting through
    /// `Blocked -> Replanning -> Following` within this tick when the next
    /// cell has become blocked at its arrival time.
    fn advance(&mut self, env: &Environment) {
        let Some(next) = self.next_cell() else {
            return;
        };
        if env.is_blocked(next, self.time + 1) {
            self.status = AgentStatus::Blocked;
            debug!(
                "Next cell {} is blocked at t={}, replanning from {}",
                next,
                self.time + 1,
                self.position
            );
            self.push_event(EventTrigger::StepBlocked { cell: next });
            if !self.replan(env) {
                return;
            }
        }
        self.step(env);
    }

    /// Takes the next step of the active route.
    fn step(&mut self, env: &Environment) {
        let Some(next) = self.next_cell() else {
            return;
        };
        if let Some(cost) = step_cost(env, &self.position, &next) {
            self.traveled_cost += cost;
        }
        self.position = next;
        self.next_index += 1;
        self.steps += 1;
        if self.position == self.goal {
            info!("Arrived at {} after {} steps", self.goal, self.steps);
            self.status = AgentStatus::Arrived;
            self.push_event(EventTrigger::Arrived);
        }
    }

    /// Requests the initial route. Does not consume the replanning budget;
    /// a failure moves the agent into the retrying `Replanning` state.
    fn initial_plan(&mut self, env: &Environment) -> bool {
        match self.request_route(env) {
            Ok((route, fallback)) => {
                self.adopt(route, fallback);
                true
            }
            Err(err) => {
                debug!("Initial planning failed: {}", err);
                self.push_event(EventTrigger::ReplanFailed {
                    attempt: self.replans,
                });
                self.status = AgentStatus::Replanning;
                false
            }
        }
    }

    /// One replanning invocation, anchored at the current position and time.
    /// Consumes the replanning budget and fails the agent when it is
    /// exhausted.
    fn replan(&mut self, env: &Environment) -> bool {
        self.replans += 1;
        self.status = AgentStatus::Replanning;
        match self.request_route(env) {
            Ok((route, fallback)) => {
                self.adopt(route, fallback);
                true
            }
            Err(err) => {
                debug!("Replanning attempt {} failed: {}", self.replans, err);
                // The active route is invalidated; retries re-enter through
                // the planning branch on subsequent ticks.
                self.route = None;
                self.push_event(EventTrigger::ReplanFailed {
                    attempt: self.replans,
                });
                if self.replans >= self.config.max_replans {
                    self.fail(FailureReason::ReplanLimitExceeded);
                }
                false
            }
        }
    }

    /// Plans with the primary strategy, falling back to the configured
    /// alternative (typically a complete strategy backing a local search)
    /// when the primary fails. Returns the route and whether the fallback
    /// produced it.
    fn request_route(&mut self, env: &Environment) -> Result<(Route, bool), PlanError> {
        let request = PlanRequest {
            start: self.position,
            goal: self.goal,
            strategy: self.config.strategy,
            time_offset: self.time,
        };
        match self.cache.get_or_plan(env, &request, &self.config.planner) {
            Ok(route) => Ok((route, false)),
            Err(primary_err) => match self.config.fallback {
                Some(fallback) if fallback != self.config.strategy => {
                    debug!(
                        "{} failed ({}), falling back to {}",
                        self.config.strategy, primary_err, fallback
                    );
                    let request = PlanRequest {
                        strategy: fallback,
                        ..request
                    };
                    let route = self.cache.get_or_plan(env, &request, &self.config.planner)?;
                    Ok((route, true))
                }
                _ => Err(primary_err),
            },
        }
    }

    fn adopt(&mut self, route: Route, fallback: bool) {
        let strategy = if fallback {
            self.config.fallback.unwrap_or(self.config.strategy)
        } else {
            self.config.strategy
        };
        self.planning_time += route.planning_time;
        self.push_event(EventTrigger::PlanAdopted {
            strategy,
            cost: route.cost,
            fallback,
        });
        // Routes start at the current position; the first move is cell 1.
        self.next_index = 1;
        self.status = AgentStatus::Following;
        if route.cells.len() == 1 {
            // Already standing on the goal.
            self.status = AgentStatus::Arrived;
            self.push_event(EventTrigger::Arrived);
        }
        self.route = Some(route);
    }

    fn fail(&mut self, reason: FailureReason) {
        warn!("Agent failed at {}: {:?}", self.position, reason);
        self.status = AgentStatus::Failed(reason);
        self.push_event(EventTrigger::Failed { reason });
    }

    fn push_event(&mut self, trigger: EventTrigger) {
        self.events.push(AgentEvent {
            tick: self.time,
            position: self.position,
            trigger,
        });
    }
}
