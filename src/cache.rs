use crate::best_first::FxIndexMap;
use crate::environment::Environment;
use crate::error::PlanError;
use crate::route::Route;
use crate::solver::{plan, PlanRequest, PlannerConfig};
use log::debug;

#[derive(Clone, Debug)]
struct CacheEntry {
    route: Route,
    version: u64,
}

/// Bounded, least-recently-used memo of planner results keyed by
/// [PlanRequest]. Every entry records the environment version it was computed
/// against; a version mismatch is treated as a miss and recomputed
/// transparently, so a hit is always indistinguishable from a fresh
/// computation for the same request and version.
#[derive(Clone, Debug)]
pub struct PlanCache {
    capacity: usize,
    entries: FxIndexMap<PlanRequest, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl PlanCache {
    pub fn new(capacity: usize) -> PlanCache {
        assert!(capacity > 0, "cache capacity must be positive");
        PlanCache {
            capacity,
            entries: FxIndexMap::default(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Returns the cached route for `request` if present and current, else
    /// plans, stores and returns the fresh result, evicting the
    /// least-recently-used entry past capacity. Planner failures are not
    /// cached.
    pub fn get_or_plan(
        &mut self,
        env: &Environment,
        request: &PlanRequest,
        config: &PlannerConfig,
    ) -> Result<Route, PlanError> {
        if let Some(index) = self.entries.get_index_of(request) {
            let entry = &self.entries[index];
            if entry.version == env.version() {
                self.hits += 1;
                let route = entry.route.clone();
                // Touch: most recently used entries live at the back.
                let last = self.entries.len() - 1;
                self.entries.move_index(index, last);
                return Ok(route);
            }
            // Stale entry computed against an older schedule; recompute
            // transparently.
            debug!(
                "Stale cache entry for {:?} (version {} != {})",
                request,
                entry.version,
                env.version()
            );
            self.entries.shift_remove_index(index);
        }
        self.misses += 1;
        let route = plan(env, request, config)?;
        self.entries.insert(
            request.clone(),
            CacheEntry {
                route: route.clone(),
                version: env.version(),
            },
        );
        if self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0);
        }
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Connectivity, ObstacleSchedule};
    use crate::solver::Strategy;
    use grid_util::Point;

    fn request(x: i32, y: i32) -> PlanRequest {
        PlanRequest {
            start: Point::new(0, 0),
            goal: Point::new(x, y),
            strategy: Strategy::UniformCost,
            time_offset: 0,
        }
    }

    #[test]
    fn hit_matches_fresh_computation() {
        let mut env = Environment::new(5, 5, Connectivity::Four);
        env.generate_components();
        let config = PlannerConfig::default();
        let mut cache = PlanCache::new(4);
        let first = cache.get_or_plan(&env, &request(4, 4), &config).unwrap();
        let second = cache.get_or_plan(&env, &request(4, 4), &config).unwrap();
        let fresh = plan(&env, &request(4, 4), &config).unwrap();
        assert_eq!(second.cells, first.cells);
        assert_eq!(second.cost, first.cost);
        assert_eq!(second.cells, fresh.cells);
        assert_eq!(second.cost, fresh.cost);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn version_bump_invalidates() {
        let mut env = Environment::new(5, 5, Connectivity::Four);
        env.generate_components();
        let config = PlannerConfig::default();
        let mut cache = PlanCache::new(4);
        let before = cache.get_or_plan(&env, &request(4, 0), &config).unwrap();
        // Park an obstacle on the cached straight-line route.
        env.inject_obstacle(ObstacleSchedule::stationary("cone", Point::new(2, 0)));
        let after = cache.get_or_plan(&env, &request(4, 0), &config).unwrap();
        assert!(before.contains(&Point::new(2, 0)));
        assert!(!after.contains(&Point::new(2, 0)));
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut env = Environment::new(5, 5, Connectivity::Four);
        env.generate_components();
        let config = PlannerConfig::default();
        let mut cache = PlanCache::new(2);
        cache.get_or_plan(&env, &request(1, 0), &config).unwrap();
        cache.get_or_plan(&env, &request(2, 0), &config).unwrap();
        // Touch the first entry so the second becomes least recently used.
        cache.get_or_plan(&env, &request(1, 0), &config).unwrap();
        cache.get_or_plan(&env, &request(3, 0), &config).unwrap();
        assert_eq!(cache.len(), 2);
        // The touched entry survived, the untouched one was evicted.
        cache.get_or_plan(&env, &request(1, 0), &config).unwrap();
        assert_eq!(cache.hits(), 2);
        cache.get_or_plan(&env, &request(2, 0), &config).unwrap();
        assert_eq!(cache.misses(), 4);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut env = Environment::new(3, 1, Connectivity::Four);
        env.set_terrain(Point::new(1, 0), crate::terrain::Terrain::Building);
        env.generate_components();
        let config = PlannerConfig::default();
        let mut cache = PlanCache::new(4);
        assert!(cache.get_or_plan(&env, &request(2, 0), &config).is_err());
        assert!(cache.is_empty());
    }
}
