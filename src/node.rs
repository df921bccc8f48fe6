//! Scalar processing nodes: weight/bias vectors, activation and update policies.

use crate::error::NetworkError;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Default range for randomly initialized weights
pub const WEIGHT_RANGE: (f64, f64) = (-10.0, 10.0);
/// Default range for randomly initialized biases
pub const BIAS_RANGE: (f64, f64) = (-5.0, 5.0);

/// Position of a node inside the owning network's layer grid.
///
/// Parent/child links are stored as these index pairs instead of direct
/// references, so deep-copying a network is an array clone plus relink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeId {
    pub layer: usize,
    pub index: usize,
}

impl NodeId {
    pub fn new(layer: usize, index: usize) -> Self {
        Self { layer, index }
    }
}

/// Activation applied to each weighted input term
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    /// Pass-through, used by the linear gradient variant
    Identity,
    /// `max(0, x)`
    Relu,
    /// `1 / (1 + e^{-steepness * x})`, exponent argument clamped to [-25, 25]
    Sigmoid { steepness: f64 },
}

impl Activation {
    /// Resolve an activation by name ("relu" or "sigmoid")
    pub fn from_name(name: &str, steepness: f64) -> Result<Self, NetworkError> {
        match name {
            "relu" => Ok(Self::Relu),
            "sigmoid" => Ok(Self::Sigmoid { steepness }),
            other => Err(NetworkError::UnknownActivation(other.to_string())),
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        match *self {
            Self::Identity => x,
            Self::Relu => x.max(0.0),
            Self::Sigmoid { steepness } => {
                // Clamp keeps the exponential from overflowing for
                // extreme-magnitude inputs
                let exponent = (-steepness * x).clamp(-25.0, 25.0);
                1.0 / (1.0 + exponent.exp())
            }
        }
    }
}

/// Per-node update policy, dispatched at the update call site
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum UpdatePolicy {
    /// No-op; the node never trains
    Frozen,
    /// Multiplicative perturbation: `v' = v * (1 - r)`, `r ~ U(-max, max)`,
    /// drawn independently for every weight and bias
    Mutate { max_mutation: f64 },
    /// Closed-form squared-error partials, no activation
    GradientLinear { learn_rate: f64 },
    /// Closed-form partials through a sigmoid activation
    GradientSigmoid { learn_rate: f64, steepness: f64 },
}

/// Partials of the squared error `(wx + b - g)^2` with respect to w and b
pub(crate) fn linear_partials(weight: f64, bias: f64, x: f64, goal: f64) -> (f64, f64) {
    let dw = 2.0 * x * (weight * x + bias - goal);
    let db = 2.0 * (bias + weight * x - goal);
    (dw, db)
}

/// Partials of the squared error through a sigmoid of steepness `s`.
///
/// The `num_inputs` divisor scales the convergence rate and is part of the
/// derivation, not a normalization knob.
pub(crate) fn sigmoid_partials(
    weight: f64,
    bias: f64,
    x: f64,
    goal: f64,
    steepness: f64,
    num_inputs: usize,
) -> (f64, f64) {
    let n = num_inputs as f64;
    let a = weight * x + bias;
    let denom = (-a * steepness).exp() + 1.0;
    let c = 1.0 / (denom * n);

    let db = 2.0 * steepness * denom * (c - goal) / (denom * denom * n);
    let dw = db * x;
    (dw, db)
}

/// Atomic scalar transformer.
///
/// A node holds one weight and one bias per input index. `accumulate` is
/// called once per input index; index 0 starts a fresh pass. Propagation to
/// children is orchestrated by the owning [`Network`](crate::Network) over
/// the `children` index list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub num_inputs: usize,
    pub weights: Vec<f64>,
    pub biases: Vec<f64>,
    pub layer_number: usize,
    pub node_in_layer: usize,
    pub parents: Vec<NodeId>,
    pub children: Vec<NodeId>,
    /// Last accumulated scalar value
    pub value: f64,
    pub activation: Activation,
    pub update: UpdatePolicy,
}

impl Node {
    /// Create a node with random weights in [-10, 10] and biases in [-5, 5]
    pub fn random(
        num_inputs: usize,
        layer_number: usize,
        node_in_layer: usize,
        activation: Activation,
        update: UpdatePolicy,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let weights = (0..num_inputs)
            .map(|_| rng.gen_range(WEIGHT_RANGE.0..WEIGHT_RANGE.1))
            .collect();
        let biases = (0..num_inputs)
            .map(|_| rng.gen_range(BIAS_RANGE.0..BIAS_RANGE.1))
            .collect();

        Self {
            num_inputs,
            weights,
            biases,
            layer_number,
            node_in_layer,
            parents: Vec::new(),
            children: Vec::new(),
            value: 0.0,
            activation,
            update,
        }
    }

    /// Create a node with explicit weight/bias vectors.
    ///
    /// Fails fast when either vector does not match `num_inputs`.
    pub fn with_values(
        num_inputs: usize,
        weights: Vec<f64>,
        biases: Vec<f64>,
        layer_number: usize,
        node_in_layer: usize,
        activation: Activation,
        update: UpdatePolicy,
    ) -> Result<Self, NetworkError> {
        if weights.len() != num_inputs || biases.len() != num_inputs {
            return Err(NetworkError::WeightBiasMismatch {
                num_inputs,
                weights: weights.len(),
                biases: biases.len(),
            });
        }

        Ok(Self {
            num_inputs,
            weights,
            biases,
            layer_number,
            node_in_layer,
            parents: Vec::new(),
            children: Vec::new(),
            value: 0.0,
            activation,
            update,
        })
    }

    /// Wire this node's parents; count must equal the input arity.
    /// Layer-0 nodes take their inputs from the caller and keep an empty list.
    pub fn set_parents(&mut self, parents: Vec<NodeId>) -> Result<(), NetworkError> {
        if !parents.is_empty() && parents.len() != self.num_inputs {
            return Err(NetworkError::ParentCountMismatch {
                expected: self.num_inputs,
                found: parents.len(),
            });
        }
        self.parents = parents;
        Ok(())
    }

    pub fn set_children(&mut self, children: Vec<NodeId>) {
        self.children = children;
    }

    /// Fold one scalar into the running value.
    ///
    /// Index 0 marks the start of a fresh input pass and resets the
    /// accumulator before adding `activation(weights[index] * input +
    /// biases[index])`.
    pub fn accumulate(&mut self, input: f64, index: usize) {
        if index == 0 {
            self.value = 0.0;
        }

        let raw = self.weights[index] * input + self.biases[index];
        self.value += self.activation.apply(raw);
    }

    /// Apply this node's update policy in place.
    ///
    /// Mutation ignores `inputs`/`goal`; the gradient policies ignore `rng`.
    pub fn apply_update(&mut self, inputs: &[f64], goal: f64, rng: &mut ChaCha8Rng) {
        match self.update {
            UpdatePolicy::Frozen => {}
            UpdatePolicy::Mutate { max_mutation } => {
                for index in 0..self.num_inputs {
                    // Bias first, then weight: keeps the draw order stable
                    // for seeded runs
                    let change = rng.gen_range(-max_mutation..max_mutation);
                    self.biases[index] *= 1.0 - change;

                    let change = rng.gen_range(-max_mutation..max_mutation);
                    self.weights[index] *= 1.0 - change;
                }
            }
            UpdatePolicy::GradientLinear { learn_rate } => {
                let target = goal / inputs.len() as f64;
                for (index, &x) in inputs.iter().enumerate() {
                    let (dw, db) =
                        linear_partials(self.weights[index], self.biases[index], x, target);
                    self.weights[index] -= learn_rate * dw;
                    self.biases[index] -= learn_rate * db;
                }
            }
            UpdatePolicy::GradientSigmoid {
                learn_rate,
                steepness,
            } => {
                let target = goal / inputs.len() as f64;
                for (index, &x) in inputs.iter().enumerate() {
                    let (dw, db) = sigmoid_partials(
                        self.weights[index],
                        self.biases[index],
                        x,
                        target,
                        steepness,
                        self.num_inputs,
                    );
                    self.weights[index] -= learn_rate * dw;
                    self.biases[index] -= learn_rate * db;
                }
            }
        }
    }

    /// Check that all weights and biases are finite
    pub fn is_valid(&self) -> bool {
        self.weights.iter().all(|w| w.is_finite()) && self.biases.iter().all(|b| b.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_random_node_lengths() {
        let mut rng = rng();
        for num_inputs in 1..=50 {
            let node = Node::random(
                num_inputs,
                0,
                0,
                Activation::Relu,
                UpdatePolicy::Frozen,
                &mut rng,
            );
            assert_eq!(node.weights.len(), num_inputs);
            assert_eq!(node.biases.len(), num_inputs);
            assert!(node.is_valid());
            assert!(node.weights.iter().all(|w| (-10.0..10.0).contains(w)));
            assert!(node.biases.iter().all(|b| (-5.0..5.0).contains(b)));
        }
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let result = Node::with_values(
            3,
            vec![1.0, 2.0],
            vec![0.0, 0.0, 0.0],
            0,
            0,
            Activation::Identity,
            UpdatePolicy::Frozen,
        );
        assert!(matches!(
            result,
            Err(NetworkError::WeightBiasMismatch {
                num_inputs: 3,
                weights: 2,
                biases: 3
            })
        ));
    }

    #[test]
    fn test_parent_count_checked() {
        let mut node = Node::with_values(
            2,
            vec![1.0, 1.0],
            vec![0.0, 0.0],
            1,
            0,
            Activation::Identity,
            UpdatePolicy::Frozen,
        )
        .unwrap();

        let bad = vec![NodeId::new(0, 0)];
        assert!(matches!(
            node.set_parents(bad),
            Err(NetworkError::ParentCountMismatch {
                expected: 2,
                found: 1
            })
        ));

        let good = vec![NodeId::new(0, 0), NodeId::new(0, 1)];
        assert!(node.set_parents(good).is_ok());
    }

    #[test]
    fn test_accumulate_resets_on_index_zero() {
        let mut node = Node::with_values(
            2,
            vec![2.0, 3.0],
            vec![1.0, -1.0],
            0,
            0,
            Activation::Identity,
            UpdatePolicy::Frozen,
        )
        .unwrap();

        node.accumulate(1.0, 0);
        assert_eq!(node.value, 3.0); // 2*1 + 1
        node.accumulate(2.0, 1);
        assert_eq!(node.value, 8.0); // + 3*2 - 1

        // A new pass starts over
        node.accumulate(1.0, 0);
        assert_eq!(node.value, 3.0);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut rng = rng();
        let original = Node::random(
            4,
            0,
            0,
            Activation::Relu,
            UpdatePolicy::Mutate { max_mutation: 0.5 },
            &mut rng,
        );
        let mut copy = original.clone();

        copy.weights[0] += 100.0;
        copy.biases[0] += 100.0;

        assert_ne!(original.weights[0], copy.weights[0]);
        assert_ne!(original.biases[0], copy.biases[0]);
    }

    #[test]
    fn test_mutation_preserves_shape_and_finiteness() {
        let mut rng = rng();
        let mut node = Node::random(
            10,
            0,
            0,
            Activation::Relu,
            UpdatePolicy::Mutate { max_mutation: 0.5 },
            &mut rng,
        );

        for _ in 0..200 {
            node.apply_update(&[], 0.0, &mut rng);
        }

        assert_eq!(node.weights.len(), 10);
        assert_eq!(node.biases.len(), 10);
        assert!(node.is_valid());
    }

    #[test]
    fn test_linear_gradient_step() {
        let mut rng = rng();
        let mut node = Node::with_values(
            1,
            vec![2.0],
            vec![1.0],
            0,
            0,
            Activation::Identity,
            UpdatePolicy::GradientLinear { learn_rate: 0.1 },
        )
        .unwrap();

        // partials = (2*3*(2*3+1-10), 2*(1+2*3-10)) = (-18, -6)
        node.apply_update(&[3.0], 10.0, &mut rng);

        assert!((node.weights[0] - 3.8).abs() < 1e-9);
        assert!((node.biases[0] - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_linear_partials_values() {
        let (dw, db) = linear_partials(2.0, 1.0, 3.0, 10.0);
        assert!((dw - -18.0).abs() < 1e-9);
        assert!((db - -6.0).abs() < 1e-9);
    }

    #[test]
    fn test_sigmoid_partials_relationship() {
        // dw must equal db * x for any operating point
        let (dw, db) = sigmoid_partials(0.7, -0.2, 1.5, 0.3, 5.0, 4);
        assert!((dw - db * 1.5).abs() < 1e-12);
        assert!(dw.is_finite() && db.is_finite());
    }

    #[test]
    fn test_sigmoid_clamp_extremes() {
        let sigmoid = Activation::Sigmoid { steepness: 0.5 };

        for &x in &[-1e9, -1e6, -100.0, 0.0, 100.0, 1e6, 1e9] {
            let y = sigmoid.apply(x);
            assert!(y.is_finite());
            assert!(y > 0.0 && y < 1.0, "sigmoid({}) = {} left (0,1)", x, y);
        }
    }

    #[test]
    fn test_relu() {
        let relu = Activation::Relu;
        assert_eq!(relu.apply(-3.5), 0.0);
        assert_eq!(relu.apply(2.25), 2.25);
    }

    #[test]
    fn test_unknown_activation_name() {
        assert!(matches!(
            Activation::from_name("tanh", 1.0),
            Err(NetworkError::UnknownActivation(_))
        ));
        assert_eq!(Activation::from_name("relu", 1.0).unwrap(), Activation::Relu);
    }
}
