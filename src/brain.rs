//! Evolvable network variant: named activation, mutation-only updates.

use crate::config::{EvolutionConfig, TopologyConfig};
use crate::error::NetworkError;
use crate::network::Network;
use crate::node::{Activation, UpdatePolicy};
use crate::snapshot::NetworkSnapshot;
use rand_chacha::ChaCha8Rng;

/// Fixed sigmoid steepness for the evolvable variant
pub const BRAIN_SIGMOID_STEEPNESS: f64 = 0.5;

/// One evolvable individual.
///
/// A `Brain` wraps the evaluation engine with an activation selected by
/// name ("relu" or "sigmoid") and a mutation-only update policy. It is the
/// unit the [`Population`](crate::Population) clones, mutates and selects.
#[derive(Clone, Debug)]
pub struct Brain {
    pub network: Network,
    pub activation_name: String,
}

impl Brain {
    /// Create a randomly initialized brain.
    ///
    /// Fails with a configuration error when the activation name is not
    /// recognized.
    pub fn new(
        topology: &TopologyConfig,
        evolution: &EvolutionConfig,
        rng: &mut ChaCha8Rng,
    ) -> Result<Self, NetworkError> {
        let activation = Activation::from_name(&evolution.activation, BRAIN_SIGMOID_STEEPNESS)?;
        let update = UpdatePolicy::Mutate {
            max_mutation: evolution.max_mutation,
        };

        Ok(Self {
            network: Network::new(topology, activation, update, rng),
            activation_name: evolution.activation.clone(),
        })
    }

    /// Forward-propagate one input vector, returning the output layer values
    pub fn evaluate(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        self.network.evaluate(inputs)
    }

    /// Scalar view of the last evaluation
    pub fn value(&self) -> f64 {
        self.network.value
    }

    /// Mutate every weight and bias in place.
    ///
    /// Applied to freshly cloned individuals during regeneration; the
    /// retained champion is never mutated.
    pub fn mutate(&mut self, rng: &mut ChaCha8Rng) {
        self.network.update_all(&[], 0.0, rng);
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.network.snapshot()
    }

    /// Overwrite this brain's weights and biases from a snapshot.
    ///
    /// The snapshot must match the live grid shape exactly.
    pub fn restore(&mut self, snapshot: &NetworkSnapshot) -> Result<(), NetworkError> {
        snapshot.apply(&mut self.network)
    }

    pub fn is_valid(&self) -> bool {
        self.network.is_valid()
    }
}
