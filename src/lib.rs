//! # NEUROSEED
//!
//! A from-scratch experimental learning toolkit: a layered graph of scalar
//! processing nodes evaluated by forward propagation, trained by two
//! independent strategies with no external numerical library.
//!
//! ## Features
//!
//! - **Scalar node graph**: per-node weight/bias vectors, index-pair
//!   topology, column-threaded forward propagation
//! - **Genetic selection**: fixed-size population evolved by elitism plus
//!   multiplicative mutation
//! - **Manual gradient descent**: hand-derived closed-form partials,
//!   layer-0 training with tolerance-based early stop
//! - **Reproducible**: seeded random number generation throughout
//! - **Persistent**: JSON weight/bias snapshots per generation
//!
//! ## Quick start: evolution
//!
//! ```rust,no_run
//! use neuroseed::{Config, Population};
//!
//! let config = Config::default();
//!
//! // Lower is better; pure and deterministic
//! let loss = |_inputs: &[f64], outputs: &[f64]| {
//!     let sum: f64 = outputs.iter().sum();
//!     (sum - 5.0) * (sum - 5.0)
//! };
//!
//! let mut population = Population::with_seed(&config, loss, 42).unwrap();
//! population.evolve(&[1.0, -2.0, 0.5], 15, true, "bestInPopulation.json").unwrap();
//! ```
//!
//! ## Quick start: gradient descent
//!
//! ```rust,no_run
//! use neuroseed::{Config, GradientNetwork};
//!
//! let config = Config::default();
//! let mut network = GradientNetwork::with_seed(&config, 42);
//!
//! let outcome = network
//!     .evolve_till_tolerance(&[1.0, -2.0, 0.5], 10.0, None)
//!     .unwrap();
//! println!("{}", outcome);
//! ```

pub mod brain;
pub mod config;
pub mod error;
pub mod gradient;
pub mod network;
pub mod node;
pub mod population;
pub mod snapshot;

// Re-export main types
pub use brain::Brain;
pub use config::{Config, GradientKind};
pub use error::NetworkError;
pub use gradient::{GradientNetwork, GradientOutcome};
pub use network::Network;
pub use node::{Activation, Node, NodeId, UpdatePolicy};
pub use population::Population;
pub use snapshot::{GenerationHistory, NetworkSnapshot, NodeSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_evolution() {
        let config = Config::default();
        let loss = |_inputs: &[f64], outputs: &[f64]| {
            let sum: f64 = outputs.iter().sum();
            (sum - 5.0) * (sum - 5.0)
        };

        let mut population = Population::with_seed(&config, loss, 42).unwrap();
        population.evolve(&[1.0, -2.0, 0.5], 5, false, "").unwrap();

        assert_eq!(population.individuals.len(), 15);
        assert!(population.individuals.iter().all(|b| b.is_valid()));
    }
}
