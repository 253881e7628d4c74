use criterion::{criterion_group, criterion_main, Criterion};
use grid_courier::{plan, Connectivity, Environment, Heuristic, PlanRequest, PlannerConfig, Strategy, Terrain};
use grid_util::Point;
use rand::prelude::*;
use std::hint::black_box;

fn bench_env(n: usize) -> Environment {
    let mut env = Environment::new(n, n, Connectivity::Four);
    let mut rng = StdRng::seed_from_u64(0);
    for y in 0..n as i32 {
        for x in 0..n as i32 {
            let terrain = match rng.gen_range(0..10) {
                0..=1 => Terrain::Building,
                2..=6 => Terrain::Road,
                7..=8 => Terrain::Grass,
                _ => Terrain::Water,
            };
            env.set_terrain(Point::new(x, y), terrain);
        }
    }
    env.set_terrain(Point::new(0, 0), Terrain::Road);
    env.set_terrain(Point::new(n as i32 - 1, n as i32 - 1), Terrain::Road);
    env.generate_components();
    env
}

fn strategy_bench(c: &mut Criterion) {
    const N: usize = 64;
    let env = bench_env(N);
    let config = PlannerConfig::default();
    let start = Point::new(0, 0);
    let goal = Point::new(N as i32 - 1, N as i32 - 1);
    for strategy in [
        Strategy::Bfs,
        Strategy::UniformCost,
        Strategy::AStar(Heuristic::Manhattan),
        Strategy::AStar(Heuristic::Euclidean),
    ] {
        c.bench_function(format!("{N}x{N}, {strategy}").as_str(), |b| {
            b.iter(|| {
                let request = PlanRequest {
                    start,
                    goal,
                    strategy,
                    time_offset: 0,
                };
                black_box(plan(&env, &request, &config))
            })
        });
    }
}

criterion_group!(benches, strategy_bench);
criterion_main!(benches);
