//! Headless gradient descent runner.
//!
//! Usage: `descent [goal] [seed]`

use neuroseed::{Config, GradientNetwork};
use rand::Rng;
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let goal: f64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10.0);

    let seed: u64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| rand::thread_rng().gen());

    let config = Config::from_file("config.yaml").unwrap_or_default();

    log::info!("=== NEUROSEED gradient descent ===");
    log::info!("goal: {}", goal);
    log::info!("seed: {}", seed);

    let inputs: Vec<f64> = {
        let mut rng = rand::thread_rng();
        (0..config.topology.num_inputs)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect()
    };
    log::info!("inputs: {:?}", inputs);

    let mut network = GradientNetwork::with_seed(&config, seed);

    let path = config.output.gradient_path.clone();
    match network.evolve_till_tolerance(&inputs, goal, Some(&path)) {
        Ok(outcome) => log::info!("{}", outcome),
        Err(e) => {
            log::error!("training failed: {}", e);
            std::process::exit(1);
        }
    }
}
