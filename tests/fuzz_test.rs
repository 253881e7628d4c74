/// Fuzzes the planning strategies by checking on many random weighted grids
/// that the two optimal strategies agree on path cost, that the informed
/// search never expands more nodes, and that every returned route is valid:
/// contiguous, inside the grid, endpoint-correct and free of impassable cells.
use grid_courier::{
    plan, Connectivity, Environment, Heuristic, PlanRequest, PlannerConfig, Strategy, Terrain,
};
use grid_util::Point;
use rand::prelude::*;

fn random_env(w: usize, h: usize, rng: &mut StdRng) -> Environment {
    let mut env = Environment::new(w, h, Connectivity::Four);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let terrain = match rng.gen_range(0..10) {
                0..=2 => Terrain::Building,
                3..=5 => Terrain::Road,
                6..=7 => Terrain::Grass,
                8 => Terrain::Water,
                _ => Terrain::Mountain,
            };
            env.set_terrain(Point::new(x, y), terrain);
        }
    }
    env.set_terrain(Point::new(0, 0), Terrain::Road);
    env.set_terrain(Point::new(w as i32 - 1, h as i32 - 1), Terrain::Road);
    env.generate_components();
    env
}

fn visualize_env(env: &Environment, start: &Point, end: &Point) {
    for y in 0..env.height() as i32 {
        for x in 0..env.width() as i32 {
            let p = Point::new(x, y);
            if *start == p {
                print!("S");
            } else if *end == p {
                print!("G");
            } else {
                print!(
                    "{}",
                    env.terrain(p).map(|t| t.symbol()).unwrap_or('?')
                );
            }
        }
        println!();
    }
}

fn assert_route_valid(env: &Environment, route: &grid_courier::Route, start: Point, goal: Point) {
    assert_eq!(*route.start().unwrap(), start);
    assert_eq!(*route.goal().unwrap(), goal);
    for w in route.cells.windows(2) {
        assert_eq!(w[0].manhattan_distance(&w[1]), 1);
    }
    for cell in &route.cells {
        assert!(env.terrain(*cell).unwrap().is_passable());
    }
}

#[test]
fn fuzz_optimal_strategies_agree() {
    const N: usize = 10;
    const N_GRIDS: usize = 1000;
    let mut rng = StdRng::seed_from_u64(0);
    let config = PlannerConfig::default();
    let start = Point::new(0, 0);
    let end = Point::new(N as i32 - 1, N as i32 - 1);
    for _ in 0..N_GRIDS {
        let env = random_env(N, N, &mut rng);
        let reachable = !env.unreachable(&start, &end);
        let ucs = plan(
            &env,
            &PlanRequest {
                start,
                goal: end,
                strategy: Strategy::UniformCost,
                time_offset: 0,
            },
            &config,
        );
        let astar = plan(
            &env,
            &PlanRequest {
                start,
                goal: end,
                strategy: Strategy::AStar(Heuristic::Manhattan),
                time_offset: 0,
            },
            &config,
        );
        // Show the grid if the outcome disagrees with reachability
        if ucs.is_ok() != reachable || astar.is_ok() != reachable {
            visualize_env(&env, &start, &end);
        }
        assert_eq!(ucs.is_ok(), reachable);
        assert_eq!(astar.is_ok(), reachable);
        if let (Ok(ucs), Ok(astar)) = (ucs, astar) {
            if ucs.cost != astar.cost || astar.expanded > ucs.expanded {
                visualize_env(&env, &start, &end);
            }
            assert_eq!(ucs.cost, astar.cost);
            assert!(astar.expanded <= ucs.expanded);
            assert_route_valid(&env, &ucs, start, end);
            assert_route_valid(&env, &astar, start, end);
        }
    }
}

/// On uniform terrain (roads and buildings only), BFS agrees with
/// uniform-cost search on the number of edges of the optimum.
#[test]
fn fuzz_bfs_edge_counts() {
    const N: usize = 10;
    const N_GRIDS: usize = 1000;
    let mut rng = StdRng::seed_from_u64(1);
    let config = PlannerConfig::default();
    let start = Point::new(0, 0);
    let end = Point::new(N as i32 - 1, N as i32 - 1);
    for _ in 0..N_GRIDS {
        let mut env = Environment::new(N, N, Connectivity::Four);
        for y in 0..N as i32 {
            for x in 0..N as i32 {
                if rng.gen_bool(0.35) {
                    env.set_terrain(Point::new(x, y), Terrain::Building);
                }
            }
        }
        env.set_terrain(start, Terrain::Road);
        env.set_terrain(end, Terrain::Road);
        env.generate_components();
        let bfs = plan(
            &env,
            &PlanRequest {
                start,
                goal: end,
                strategy: Strategy::Bfs,
                time_offset: 0,
            },
            &config,
        );
        let ucs = plan(
            &env,
            &PlanRequest {
                start,
                goal: end,
                strategy: Strategy::UniformCost,
                time_offset: 0,
            },
            &config,
        );
        assert_eq!(bfs.is_ok(), ucs.is_ok());
        if let (Ok(bfs), Ok(ucs)) = (bfs, ucs) {
            if bfs.edges() != ucs.edges() {
                visualize_env(&env, &start, &end);
            }
            assert_eq!(bfs.edges(), ucs.edges());
        }
    }
}
