//! Manual-gradient network variant: closed-form layer-0 training.

use crate::config::{Config, GradientKind};
use crate::error::NetworkError;
use crate::network::Network;
use crate::node::{Activation, UpdatePolicy};
use crate::snapshot::NetworkSnapshot;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Report for one `evolve_till_tolerance` run
#[derive(Debug, Clone)]
pub struct GradientOutcome {
    /// Iteration index at which the loop stopped
    pub iterations: usize,
    /// Scalar network value after the last evaluation
    pub final_value: f64,
    /// Whether the relative-tolerance stop fired before `max_iter`
    pub converged: bool,
    /// `|(value - goal) * 100 / goal|` at the end
    pub percent_off_goal: f64,
}

impl std::fmt::Display for GradientOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "value {:.4} after {} iterations ({:.4} percent off goal, converged: {})",
            self.final_value, self.iterations, self.percent_off_goal, self.converged
        )
    }
}

/// A single long-lived network trained by per-node closed-form gradient
/// steps toward a scalar goal.
///
/// The grid has no separate output layer (`num_layers` x `nodes_in_layer`
/// exactly), and only layer 0 is ever updated: multi-layer gradient
/// training is not implemented. Each node converges on `goal / size`, so
/// the summed output converges on the goal when the grid is one layer deep.
pub struct GradientNetwork {
    pub network: Network,
    pub max_iter: usize,
    pub tolerance: f64,
    print_step: usize,
    store_step: usize,
    rng: ChaCha8Rng,
    seed: u64,
}

impl GradientNetwork {
    /// Create a gradient network with a random seed
    pub fn new(config: &Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::with_seed(config, seed)
    }

    /// Create a gradient network with a specific seed for reproducibility
    pub fn with_seed(config: &Config, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let (activation, update) = match config.gradient.kind {
            GradientKind::Linear => (
                Activation::Identity,
                UpdatePolicy::GradientLinear {
                    learn_rate: config.gradient.learn_rate,
                },
            ),
            GradientKind::Sigmoid => (
                Activation::Sigmoid {
                    steepness: config.gradient.steepness,
                },
                UpdatePolicy::GradientSigmoid {
                    learn_rate: config.gradient.learn_rate,
                    steepness: config.gradient.steepness,
                },
            ),
        };

        let network = Network::rectangular(&config.topology, activation, update, &mut rng);

        Self {
            network,
            max_iter: config.gradient.max_iter,
            tolerance: config.gradient.tolerance,
            print_step: config.output.print_step.max(1),
            store_step: config.output.store_step.max(1),
            rng,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Total number of nodes in the grid
    pub fn size(&self) -> usize {
        self.network.layers.iter().map(|layer| layer.len()).sum()
    }

    /// Forward-propagate and return the scalar network value
    pub fn evaluate(&mut self, inputs: &[f64]) -> Result<f64, NetworkError> {
        self.network.evaluate(inputs)?;
        Ok(self.network.value)
    }

    /// Apply one gradient step to every layer-0 node.
    ///
    /// Later layers are left untouched; the per-node target is
    /// `goal / size`.
    pub fn step_generation(&mut self, inputs: &[f64], goal: f64) {
        let target = goal / self.size() as f64;
        for node in &mut self.network.layers[0] {
            node.apply_update(inputs, target, &mut self.rng);
        }
    }

    /// Train until the relative error drops under the tolerance or
    /// `max_iter` is reached.
    ///
    /// A zero goal is rejected up front: both the stop condition and the
    /// percent-off-goal report divide by it. A non-positive tolerance falls
    /// back to 0.1. When `store_path` is set, the current snapshot is
    /// written (truncating) every `store_step` iterations before
    /// evaluating.
    pub fn evolve_till_tolerance(
        &mut self,
        inputs: &[f64],
        goal: f64,
        store_path: Option<&str>,
    ) -> Result<GradientOutcome, NetworkError> {
        if goal == 0.0 {
            return Err(NetworkError::ZeroGoal);
        }
        let tolerance = if self.tolerance <= 0.0 { 0.1 } else { self.tolerance };

        let mut iteration = 0;
        let mut converged = false;

        while iteration < self.max_iter {
            if let Some(path) = store_path {
                if iteration % self.store_step == 0 {
                    self.network.snapshot().save(path)?;
                }
            }

            self.network.evaluate(inputs)?;

            if iteration % self.print_step == 0 {
                log::info!("value at iteration {}: {:.4}", iteration, self.network.value);
            }

            self.step_generation(inputs, goal);

            // The stop looks at the value observed before this step, so a
            // run always ends with one final adjustment applied
            if (self.network.value - goal).abs() < (tolerance * goal).abs() {
                log::info!("value at iteration {}: {:.4}", iteration, self.network.value);
                converged = true;
                break;
            }

            iteration += 1;
        }

        let percent_off_goal = ((self.network.value - goal) * 100.0 / goal).abs();
        log::info!(
            "reached {:.4} percent off goal after {} iterations",
            percent_off_goal,
            iteration
        );

        Ok(GradientOutcome {
            iterations: iteration,
            final_value: self.network.value,
            converged,
            percent_off_goal,
        })
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.network.snapshot()
    }

    /// Overwrite weights and biases from a snapshot (trainable-variant
    /// responsibility, same contract as the evolvable side)
    pub fn restore(&mut self, snapshot: &NetworkSnapshot) -> Result<(), NetworkError> {
        snapshot.apply(&mut self.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        num_inputs: usize,
        nodes_in_layer: usize,
        num_layers: usize,
        kind: GradientKind,
        learn_rate: f64,
    ) -> Config {
        let mut config = Config::default();
        config.topology.num_inputs = num_inputs;
        config.topology.num_outputs = nodes_in_layer;
        config.topology.nodes_in_layer = nodes_in_layer;
        config.topology.num_layers = num_layers;
        config.gradient.kind = kind;
        config.gradient.learn_rate = learn_rate;
        config
    }

    #[test]
    fn test_grid_has_no_output_layer() {
        let network = GradientNetwork::with_seed(&config(2, 4, 3, GradientKind::Linear, 0.1), 1);
        assert_eq!(network.network.layers.len(), 3);
        assert!(network.network.layers.iter().all(|l| l.len() == 4));
        assert_eq!(network.size(), 12);
    }

    #[test]
    fn test_step_touches_only_layer_zero() {
        let mut network =
            GradientNetwork::with_seed(&config(2, 3, 2, GradientKind::Linear, 0.01), 2);
        let before = network.snapshot();

        network.step_generation(&[1.0, -2.0], 6.0);
        let after = network.snapshot();

        assert_ne!(before.layers[0], after.layers[0]);
        assert_eq!(before.layers[1], after.layers[1]);
    }

    #[test]
    fn test_linear_convergence_single_node() {
        // One node, identity activation: value = w*x + b, plain LMS descent
        let mut network =
            GradientNetwork::with_seed(&config(1, 1, 1, GradientKind::Linear, 0.1), 3);

        let outcome = network
            .evolve_till_tolerance(&[1.0], 10.0, None)
            .unwrap();

        assert!(outcome.converged, "did not converge: {}", outcome);
        assert!((outcome.final_value - 10.0).abs() < 0.1 * 10.0);
        assert!(network.network.is_valid());
    }

    #[test]
    fn test_sigmoid_convergence_single_node() {
        let mut config = config(1, 1, 1, GradientKind::Sigmoid, 0.05);
        config.gradient.steepness = 5.0;
        let mut network = GradientNetwork::with_seed(&config, 4);

        // Start from the sigmoid midpoint
        network.network.layers[0][0].weights[0] = 0.0;
        network.network.layers[0][0].biases[0] = 0.0;

        let outcome = network
            .evolve_till_tolerance(&[1.0], 0.7, None)
            .unwrap();

        assert!(outcome.converged, "did not converge: {}", outcome);
        assert!((outcome.final_value - 0.7).abs() < 0.1 * 0.7);
    }

    #[test]
    fn test_zero_goal_rejected() {
        let mut network =
            GradientNetwork::with_seed(&config(1, 1, 1, GradientKind::Linear, 0.1), 5);
        assert!(matches!(
            network.evolve_till_tolerance(&[1.0], 0.0, None),
            Err(NetworkError::ZeroGoal)
        ));
    }

    #[test]
    fn test_store_writes_snapshot_file() {
        let path = "/tmp/neuroseed_gradient_store_test.json";
        let mut network =
            GradientNetwork::with_seed(&config(1, 2, 1, GradientKind::Linear, 0.05), 6);
        network.max_iter = 20;

        network
            .evolve_till_tolerance(&[1.0], 8.0, Some(path))
            .unwrap();

        let stored = NetworkSnapshot::load(path).unwrap();
        assert_eq!(stored.layers.len(), 1);
        assert_eq!(stored.layers[0].len(), 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_restore_roundtrip() {
        let cfg = config(2, 3, 1, GradientKind::Linear, 0.1);
        let mut a = GradientNetwork::with_seed(&cfg, 7);
        let mut b = GradientNetwork::with_seed(&cfg, 8);

        b.restore(&a.snapshot()).unwrap();

        let inputs = [0.75, -0.25];
        assert_eq!(a.evaluate(&inputs).unwrap(), b.evaluate(&inputs).unwrap());
    }
}
