use grid_courier::{
    compare_strategies, Connectivity, Environment, ObstacleSchedule, PlannerConfig, Terrain,
};
use grid_util::Point;

// Builds the 12x12 demo city (two building blocks, a grass strip, a water
// front and two patrolling vehicles), then compares every planning strategy
// on one delivery problem.

fn demo_city() -> Environment {
    let mut env = Environment::new(12, 12, Connectivity::Four);
    env.set_terrain_rect(3, 3, 5, 5, Terrain::Building);
    env.set_terrain_rect(8, 8, 10, 10, Terrain::Building);
    env.set_terrain_rect(0, 0, 11, 1, Terrain::Grass);
    env.set_terrain_rect(10, 0, 11, 11, Terrain::Water);
    let horizontal: Vec<Point> = (1..11)
        .map(|x| Point::new(x, 6))
        .chain((1..11).rev().map(|x| Point::new(x, 6)))
        .collect();
    env.inject_obstacle(ObstacleSchedule::new("horizontal_car", horizontal));
    let vertical: Vec<Point> = (1..11)
        .map(|y| Point::new(6, y))
        .chain((1..11).rev().map(|y| Point::new(6, y)))
        .collect();
    env.inject_obstacle(ObstacleSchedule::new("vertical_car", vertical));
    env.generate_components();
    env
}

fn main() {
    let env = demo_city();
    let start = Point::new(0, 0);
    let goal = Point::new(9, 11);
    println!("City at t=0 (O = vehicle):\n{}", env.render_at(0));
    println!("Comparing strategies from {} to {}:\n", start, goal);
    println!(
        "{:<22} {:>8} {:>8} {:>8} {:>12}",
        "Strategy", "Success", "Cost", "Nodes", "Time"
    );
    for (strategy, result) in compare_strategies(&env, start, goal, 0, &PlannerConfig::default()) {
        match result {
            Ok(route) => println!(
                "{:<22} {:>8} {:>8.1} {:>8} {:>10.2?}",
                strategy.to_string(),
                "yes",
                route.cost_float(),
                route.expanded,
                route.planning_time
            ),
            Err(err) => println!("{:<22} {:>8} ({})", strategy.to_string(), "no", err),
        }
    }
}
