//! Configuration for network topology and both training strategies.
//!
//! Supports YAML configuration files with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub topology: TopologyConfig,
    pub evolution: EvolutionConfig,
    pub gradient: GradientConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Network shape shared by both training variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Number of scalar inputs fed to layer 0
    pub num_inputs: usize,
    /// Width of the final (output) layer
    pub num_outputs: usize,
    /// Width of every non-output layer
    pub nodes_in_layer: usize,
    /// Number of non-output layers
    pub num_layers: usize,
}

/// Genetic selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Fixed population size
    pub num_individuals: usize,
    /// Activation selector: "relu" or "sigmoid"
    pub activation: String,
    /// Bound of the multiplicative mutation draw, per weight/bias
    pub max_mutation: f64,
}

/// Which closed-form gradient update a `GradientNetwork` applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    /// No activation, linear squared-error partials
    Linear,
    /// Sigmoid activation with matching partials
    Sigmoid,
}

/// Gradient descent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientConfig {
    pub kind: GradientKind,
    /// Step scale applied to each partial derivative
    pub learn_rate: f64,
    /// Sigmoid steepness (only used by `GradientKind::Sigmoid`)
    pub steepness: f64,
    /// Hard iteration cap for `evolve_till_tolerance`
    pub max_iter: usize,
    /// Relative-error stop threshold; non-positive values fall back to 0.1
    pub tolerance: f64,
}

/// Snapshot and logging cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default file for the per-generation population history
    pub population_path: String,
    /// Default file for gradient descent snapshots
    pub gradient_path: String,
    /// Iterations between value log lines
    pub print_step: usize,
    /// Iterations between gradient snapshot writes
    pub store_step: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topology: TopologyConfig::default(),
            evolution: EvolutionConfig::default(),
            gradient: GradientConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            num_inputs: 3,
            num_outputs: 3,
            nodes_in_layer: 5,
            num_layers: 2,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            num_individuals: 15,
            activation: "relu".to_string(),
            max_mutation: 0.5,
        }
    }
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            kind: GradientKind::Linear,
            learn_rate: 0.1,
            steepness: 5.0,
            max_iter: 1000,
            tolerance: 0.1,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            population_path: "bestInPopulation.json".to_string(),
            gradient_path: "GradientDescentData.json".to_string(),
            print_step: 5,
            store_step: 5,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.topology.num_inputs == 0 || self.topology.num_outputs == 0 {
            return Err("num_inputs and num_outputs must be > 0".to_string());
        }
        if self.topology.nodes_in_layer == 0 || self.topology.num_layers == 0 {
            return Err("nodes_in_layer and num_layers must be > 0".to_string());
        }
        if self.evolution.num_individuals == 0 {
            return Err("num_individuals must be > 0".to_string());
        }
        if self.evolution.max_mutation <= 0.0 {
            return Err("max_mutation must be > 0".to_string());
        }
        if self.gradient.learn_rate <= 0.0 {
            return Err("learn_rate must be > 0".to_string());
        }
        if self.gradient.max_iter == 0 {
            return Err("max_iter must be > 0".to_string());
        }
        Ok(())
    }
}
