use grid_courier::{
    AgentConfig, Connectivity, DeliveryAgent, Environment, EventTrigger, ObstacleSchedule, Terrain,
};
use grid_util::Point;

// Runs a delivery with a vehicle patrolling the middle avenue, injecting a
// second obstacle mid-run to force a replan. Prints the event log the
// reporting tooling would consume.

fn main() {
    let mut env = Environment::new(9, 9, Connectivity::Four);
    env.set_terrain_rect(4, 2, 4, 6, Terrain::Grass);
    env.inject_obstacle(ObstacleSchedule::new(
        "patrol",
        (0..9)
            .map(|x| Point::new(x, 4))
            .chain((1..8).rev().map(|x| Point::new(x, 4)))
            .collect(),
    ));
    env.generate_components();

    let start = Point::new(0, 0);
    let goal = Point::new(8, 8);
    let mut agent = DeliveryAgent::new(&env, start, goal, AgentConfig::default())
        .expect("endpoints are on the grid");

    println!("City at t=0:\n{}", env.render_at(0));

    // Let the agent get underway, then drop a roadblock on its next cell.
    for _ in 0..3 {
        agent.tick(&env);
    }
    if let Some(cell) = agent.next_cell() {
        println!("Injecting roadblock at {}\n", cell);
        // Lookahead the blocked state the planner will see.
        env.inject_obstacle(ObstacleSchedule::stationary("roadblock", cell));
        let lookahead: Vec<_> = env.predict(cell, agent.time(), 4).collect();
        println!("Blocked lookahead for {}: {:?}\n", cell, lookahead);
    }

    let outcome = agent.run(&env);
    println!("Outcome: {:?}\n", outcome.status);
    println!(
        "steps: {}, replans: {}, traveled cost: {:.1}, planning time: {:.2?}",
        outcome.steps,
        outcome.replans,
        outcome.traveled_cost as f64 / grid_courier::C as f64,
        outcome.planning_time
    );
    println!("\nEvent log:");
    for event in agent.events() {
        match &event.trigger {
            EventTrigger::PlanAdopted {
                strategy,
                cost,
                fallback,
            } => println!(
                "  t={:<3} {} plan adopted: {} (cost {:.1}{})",
                event.tick,
                event.position,
                strategy,
                *cost as f64 / grid_courier::C as f64,
                if *fallback { ", fallback" } else { "" }
            ),
            EventTrigger::StepBlocked { cell } => {
                println!("  t={:<3} {} next step {} blocked", event.tick, event.position, cell)
            }
            EventTrigger::ReplanFailed { attempt } => {
                println!("  t={:<3} {} replan attempt {} failed", event.tick, event.position, attempt)
            }
            EventTrigger::Arrived => println!("  t={:<3} {} arrived", event.tick, event.position),
            EventTrigger::Failed { reason } => {
                println!("  t={:<3} {} failed: {:?}", event.tick, event.position, reason)
            }
        }
    }
}
