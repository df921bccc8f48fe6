//! Fixed-size population: evaluate, select the fittest, regenerate.

use crate::brain::Brain;
use crate::config::Config;
use crate::error::NetworkError;
use crate::snapshot::GenerationHistory;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// A fixed-size collection of [`Brain`] individuals evolved by elitism plus
/// mutation.
///
/// The caller supplies the loss function `loss(inputs, outputs) -> f64`,
/// lower is better, pure and deterministic. Selection keeps the champion
/// unchanged each generation, so the retained lineage's loss never worsens.
pub struct Population<F> {
    pub size: usize,
    pub individuals: Vec<Brain>,
    /// Last observed output vector per individual, parallel to `individuals`
    pub values: Vec<Vec<f64>>,
    loss: F,
    rng: ChaCha8Rng,
    seed: u64,
}

impl<F> Population<F>
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    /// Create a population with a random seed
    pub fn new(config: &Config, loss: F) -> Result<Self, NetworkError> {
        let seed = rand::thread_rng().gen();
        Self::with_seed(config, loss, seed)
    }

    /// Create a population with a specific seed for reproducibility
    pub fn with_seed(config: &Config, loss: F, seed: u64) -> Result<Self, NetworkError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let size = config.evolution.num_individuals;

        let mut individuals = Vec::with_capacity(size);
        for _ in 0..size {
            individuals.push(Brain::new(&config.topology, &config.evolution, &mut rng)?);
        }
        let values = vec![vec![0.0; config.topology.num_outputs]; size];

        Ok(Self {
            size,
            individuals,
            values,
            loss,
            rng,
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run every individual's forward pass against the same input.
    ///
    /// Sequential, independent evaluations; records each output vector in
    /// `values`.
    pub fn evaluate(&mut self, inputs: &[f64]) -> Result<(), NetworkError> {
        for (individual, value) in self.individuals.iter_mut().zip(self.values.iter_mut()) {
            *value = individual.evaluate(inputs)?;
        }
        Ok(())
    }

    /// Index of the minimum-loss individual over the recorded outputs.
    ///
    /// Ties keep the earlier individual: only a strictly smaller loss
    /// displaces the running minimum.
    pub fn find_best(&self, inputs: &[f64]) -> usize {
        let mut smallest = (self.loss)(inputs, &self.values[0]);
        let mut best = 0;

        for (index, value) in self.values.iter().enumerate().skip(1) {
            let loss = (self.loss)(inputs, value);
            if loss < smallest {
                smallest = loss;
                best = index;
            }
        }
        best
    }

    /// Regenerate the population from the champion at `best_index`.
    ///
    /// The next generation is `size - 1` mutated deep copies of the
    /// champion plus the champion itself, moved in unchanged as the last
    /// member. A mutated copy is not guaranteed to improve; the unmutated
    /// champion guarantees the lineage never worsens.
    pub fn from_individual(&mut self, best_index: usize) {
        let best = self.individuals.swap_remove(best_index);

        let mut next = Vec::with_capacity(self.size);
        for _ in 0..self.size - 1 {
            let mut clone = best.clone();
            clone.mutate(&mut self.rng);
            next.push(clone);
        }
        next.push(best);

        self.individuals = next;
    }

    /// Run `num_iterations` generations of {evaluate, select, regenerate}.
    ///
    /// When `write_json` is set, the champion's snapshot is recorded per
    /// generation and the accumulated history is written to `path` as one
    /// truncating JSON document at the end. There is no convergence or
    /// early-stop criterion.
    pub fn evolve(
        &mut self,
        inputs: &[f64],
        num_iterations: usize,
        write_json: bool,
        path: &str,
    ) -> Result<(), NetworkError> {
        let mut history = GenerationHistory::new();

        for generation in 0..num_iterations {
            self.evaluate(inputs)?;
            let best = self.find_best(inputs);

            log::info!(
                "generation {}: best value {}",
                generation,
                self.individuals[best].value()
            );

            if write_json {
                history.push(self.individuals[best].snapshot());
            }

            self.from_individual(best);
        }

        if write_json {
            history.save(path)?;
        }
        Ok(())
    }
}
