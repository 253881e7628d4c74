//! The city grid: static weighted terrain plus a deterministic timetable of
//! moving obstacles, shared read-only between planning calls.

use crate::error::PlanError;
use crate::terrain::Terrain;
use crate::N_SMALLVEC_SIZE;
use core::fmt;
use fxhash::FxHashSet;
use grid_util::Point;
use log::{debug, info};
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

/// Movement model: orthogonal neighbours only, or orthogonal plus diagonal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Connectivity {
    #[default]
    Four,
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &[(1, 0), (-1, 0), (0, -1), (0, 1)],
            Connectivity::Eight => &[
                (1, 0),
                (-1, 0),
                (0, -1),
                (0, 1),
                (1, 1),
                (1, -1),
                (-1, 1),
                (-1, -1),
            ],
        }
    }
}

/// A moving obstacle's deterministic timetable. The obstacle cycles through
/// `route`, occupying `route[t % len]` at time step `t`. An empty route means
/// the obstacle never occupies any cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObstacleSchedule {
    pub name: String,
    pub route: Vec<Point>,
}

impl ObstacleSchedule {
    pub fn new(name: impl Into<String>, route: Vec<Point>) -> ObstacleSchedule {
        ObstacleSchedule {
            name: name.into(),
            route,
        }
    }

    /// A stationary obstacle parked on a single cell at every time step.
    pub fn stationary(name: impl Into<String>, cell: Point) -> ObstacleSchedule {
        ObstacleSchedule::new(name, vec![cell])
    }

    /// The cell this obstacle occupies at time step `t`, if any.
    pub fn position_at(&self, t: u64) -> Option<Point> {
        if self.route.is_empty() {
            return None;
        }
        Some(self.route[(t % self.route.len() as u64) as usize])
    }
}

/// [Environment] holds the immutable terrain grid, the obstacle timetables and
/// a monotonically increasing version counter bumped on every schedule
/// mutation so cached plans computed against older schedules can be detected.
/// Static connected components are maintained with a [UnionFind] structure so
/// the complete strategies can reject unreachable goals without searching.
///
/// The environment is read-mostly: planning calls take `&Environment` and may
/// run concurrently; mutation ([Environment::inject_obstacle], terrain edits)
/// takes `&mut Environment` and is therefore serialized against all reads,
/// with the version bump indivisible from the schedule change.
#[derive(Clone, Debug)]
pub struct Environment {
    width: usize,
    height: usize,
    terrain: Vec<Terrain>,
    obstacles: Vec<ObstacleSchedule>,
    connectivity: Connectivity,
    version: u64,
    components: UnionFind<usize>,
    components_dirty: bool,
}

impl Environment {
    /// Creates an all-[Terrain::Road] environment. Zero-sized dimensions are a
    /// programmer error and fail construction.
    pub fn new(width: usize, height: usize, connectivity: Connectivity) -> Environment {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Environment {
            width,
            height,
            terrain: vec![Terrain::Road; width * height],
            obstacles: Vec::new(),
            connectivity,
            version: 0,
            components: UnionFind::new(width * height),
            components_dirty: true,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Current schedule version. Strictly increases on every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn in_bounds(&self, pos: Point) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn ix(&self, pos: Point) -> usize {
        pos.y as usize * self.width + pos.x as usize
    }

    /// Terrain of the cell, [None] outside the grid.
    pub fn terrain(&self, pos: Point) -> Option<Terrain> {
        if self.in_bounds(pos) {
            Some(self.terrain[self.ix(pos)])
        } else {
            None
        }
    }

    /// The cell's traversal cost in unit terms; `Ok(None)` marks impassable
    /// terrain, [PlanError::OutOfBounds] a position outside the grid.
    pub fn cost(&self, pos: Point) -> Result<Option<i32>, PlanError> {
        match self.terrain(pos) {
            Some(terrain) => Ok(terrain.cost()),
            None => Err(PlanError::OutOfBounds(pos)),
        }
    }

    /// Assigns terrain to a single cell. Out-of-bounds assignments are ignored,
    /// mirroring region assignment. Components are flagged for regeneration.
    pub fn set_terrain(&mut self, pos: Point, terrain: Terrain) {
        if !self.in_bounds(pos) {
            return;
        }
        let ix = self.ix(pos);
        self.terrain[ix] = terrain;
        self.components_dirty = true;
    }

    /// Assigns terrain to the inclusive rectangle (x1,y1)..=(x2,y2), clipped
    /// to the grid.
    pub fn set_terrain_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, terrain: Terrain) {
        for y in y1..=y2 {
            for x in x1..=x2 {
                self.set_terrain(Point::new(x, y), terrain);
            }
        }
    }

    /// True if the cell is impassable terrain, outside the grid, or occupied
    /// by a scheduled obstacle at time step `t`.
    pub fn is_blocked(&self, pos: Point, t: u64) -> bool {
        match self.terrain(pos) {
            None => true,
            Some(terrain) if !terrain.is_passable() => true,
            Some(_) => self.obstacle_at(pos, t),
        }
    }

    fn obstacle_at(&self, pos: Point, t: u64) -> bool {
        self.obstacles.iter().any(|o| o.position_at(t) == Some(pos))
    }

    /// All cells occupied by obstacles at time step `t`.
    pub fn obstacle_positions_at(&self, t: u64) -> FxHashSet<Point> {
        self.obstacles
            .iter()
            .filter_map(|o| o.position_at(t))
            .collect()
    }

    /// Lazy, finite lookahead of the blocked state of `pos` over
    /// `t_start..t_start + horizon`. Obstacle motion is deterministic, so the
    /// sequence is pure and repeatable for a given version.
    pub fn predict(
        &self,
        pos: Point,
        t_start: u64,
        horizon: u64,
    ) -> impl Iterator<Item = (u64, bool)> + '_ {
        (t_start..t_start.saturating_add(horizon)).map(move |t| (t, self.is_blocked(pos, t)))
    }

    /// Adds an obstacle timetable at runtime and bumps the schedule version,
    /// invalidating cached plans computed against older versions.
    pub fn inject_obstacle(&mut self, schedule: ObstacleSchedule) {
        info!(
            "Injecting obstacle '{}' with a {}-cell route, version {} -> {}",
            schedule.name,
            schedule.route.len(),
            self.version,
            self.version + 1
        );
        self.obstacles.push(schedule);
        self.version += 1;
    }

    /// In-bounds neighbour cells of `pos` under the connectivity model, in a
    /// fixed deterministic order. Passability is time-dependent and checked by
    /// callers.
    pub fn neighbors(&self, pos: Point) -> SmallVec<[Point; N_SMALLVEC_SIZE]> {
        self.connectivity
            .offsets()
            .iter()
            .map(|&(dx, dy)| Point::new(pos.x + dx, pos.y + dy))
            .filter(|p| self.in_bounds(*p))
            .collect()
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            debug!("Components are dirty: regenerating components");
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up passable grid
    /// neighbours to the same components. Only static terrain participates;
    /// moving obstacles never partition the grid permanently.
    pub fn generate_components(&mut self) {
        self.components = UnionFind::new(self.width * self.height);
        self.components_dirty = false;
        let forward: &[(i32, i32)] = match self.connectivity {
            Connectivity::Four => &[(1, 0), (0, 1)],
            Connectivity::Eight => &[(1, 0), (0, 1), (1, 1), (1, -1)],
        };
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let point = Point::new(x, y);
                if !self.terrain[self.ix(point)].is_passable() {
                    continue;
                }
                let parent_ix = self.ix(point);
                for &(dx, dy) in forward {
                    let neighbor = Point::new(x + dx, y + dy);
                    if self.in_bounds(neighbor) && self.terrain[self.ix(neighbor)].is_passable() {
                        self.components.union(parent_ix, self.ix(neighbor));
                    }
                }
            }
        }
    }

    /// Checks if start and goal cannot be on the same static component. Falls
    /// back to `false` (no claim) while components are dirty, so searches stay
    /// correct even if [Environment::update] was never called.
    pub fn unreachable(&self, start: &Point, goal: &Point) -> bool {
        if !self.in_bounds(*start) || !self.in_bounds(*goal) {
            return true;
        }
        let start_ix = self.ix(*start);
        let goal_ix = self.ix(*goal);
        if !self.terrain[start_ix].is_passable() || !self.terrain[goal_ix].is_passable() {
            return true;
        }
        if self.components_dirty {
            return false;
        }
        !self.components.equiv(start_ix, goal_ix)
    }

    /// ASCII rendering of the grid at time step `t`: terrain symbols with
    /// obstacle cells drawn as `O`.
    pub fn render_at(&self, t: u64) -> String {
        let occupied = self.obstacle_positions_at(t);
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let pos = Point::new(x, y);
                if occupied.contains(&pos) {
                    out.push('O');
                } else {
                    out.push(self.terrain[self.ix(pos)].symbol());
                }
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render_at(0))
    }
}
