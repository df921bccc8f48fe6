//! Headless evolution runner.
//!
//! Usage: `evolve [generations] [seed]`

use neuroseed::{Config, Population};
use rand::Rng;
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let generations: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(15);

    let seed: u64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| rand::thread_rng().gen());

    let config = Config::from_file("config.yaml").unwrap_or_default();

    log::info!("=== NEUROSEED evolution ===");
    log::info!("generations: {}", generations);
    log::info!("seed: {}", seed);
    log::info!("population size: {}", config.evolution.num_individuals);

    let inputs: Vec<f64> = {
        let mut rng = rand::thread_rng();
        (0..config.topology.num_inputs)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect()
    };
    log::info!("inputs: {:?}", inputs);

    // The summed output should land on 5
    let loss = |_inputs: &[f64], outputs: &[f64]| {
        let sum: f64 = outputs.iter().sum();
        (sum - 5.0) * (sum - 5.0)
    };

    let mut population = match Population::with_seed(&config, loss, seed) {
        Ok(population) => population,
        Err(e) => {
            log::error!("failed to build population: {}", e);
            std::process::exit(1);
        }
    };

    let path = config.output.population_path.clone();
    if let Err(e) = population.evolve(&inputs, generations, true, &path) {
        log::error!("evolution failed: {}", e);
        std::process::exit(1);
    }

    log::info!("history written to {}", path);
}
