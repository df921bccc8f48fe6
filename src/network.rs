//! Layered node-graph engine: grid construction, wiring and forward evaluation.

use crate::config::TopologyConfig;
use crate::error::NetworkError;
use crate::node::{Activation, Node, NodeId, UpdatePolicy};
use crate::snapshot::{NetworkSnapshot, NodeSnapshot};
use rand_chacha::ChaCha8Rng;

/// Policy-agnostic evaluation engine.
///
/// The grid holds `num_layers` layers of `nodes_in_layer` nodes plus a final
/// output layer of `num_outputs` nodes. Layer 0 takes the caller's inputs;
/// every later layer's input arity equals the previous layer's width.
#[derive(Clone, Debug)]
pub struct Network {
    pub layers: Vec<Vec<Node>>,
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub nodes_in_layer: usize,
    pub num_layers: usize,
    /// Scalar view of the last evaluation: sum of the output layer values
    pub value: f64,
}

impl Network {
    /// Build a randomly initialized grid with the given policies injected
    /// into every node: `num_layers` layers of `nodes_in_layer` nodes plus
    /// a final output layer of `num_outputs` nodes.
    pub fn new(
        topology: &TopologyConfig,
        activation: Activation,
        update: UpdatePolicy,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut widths = vec![topology.nodes_in_layer; topology.num_layers];
        widths.push(topology.num_outputs);
        Self::build(topology, widths, activation, update, rng)
    }

    /// Build a bare `num_layers` x `nodes_in_layer` grid with no separate
    /// output layer: the last grid layer IS the output layer. This is the
    /// shape the gradient variant trains, so that layer-0 updates reach the
    /// output under the column-threaded cascade.
    pub fn rectangular(
        topology: &TopologyConfig,
        activation: Activation,
        update: UpdatePolicy,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let widths = vec![topology.nodes_in_layer; topology.num_layers];
        Self::build(topology, widths, activation, update, rng)
    }

    fn build(
        topology: &TopologyConfig,
        widths: Vec<usize>,
        activation: Activation,
        update: UpdatePolicy,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut layers = Vec::with_capacity(widths.len());
        for (layer_number, &width) in widths.iter().enumerate() {
            let arity = if layer_number == 0 {
                topology.num_inputs
            } else {
                widths[layer_number - 1]
            };

            let layer = (0..width)
                .map(|pos| Node::random(arity, layer_number, pos, activation, update, rng))
                .collect();
            layers.push(layer);
        }

        let num_outputs = widths[widths.len() - 1];
        let mut network = Self {
            layers,
            num_inputs: topology.num_inputs,
            num_outputs,
            nodes_in_layer: topology.nodes_in_layer,
            num_layers: topology.num_layers,
            value: 0.0,
        };
        network.wire();
        network
    }

    /// Build a network around explicitly supplied nodes.
    ///
    /// Validates every node's arity against the grid shape, then rewires
    /// parent/child links and positions.
    pub fn from_layers(layers: Vec<Vec<Node>>, num_inputs: usize) -> Result<Self, NetworkError> {
        if layers.len() < 2 || layers.iter().any(|layer| layer.is_empty()) {
            return Err(NetworkError::Shape(
                "a network needs at least one non-empty layer plus an output layer".to_string(),
            ));
        }

        for (layer_number, layer) in layers.iter().enumerate() {
            let expected = if layer_number == 0 {
                num_inputs
            } else {
                layers[layer_number - 1].len()
            };
            for node in layer {
                if node.num_inputs != expected {
                    return Err(NetworkError::ParentCountMismatch {
                        expected,
                        found: node.num_inputs,
                    });
                }
            }
        }

        let num_layers = layers.len() - 1;
        let nodes_in_layer = layers[0].len();
        let num_outputs = layers[num_layers].len();

        let mut network = Self {
            layers,
            num_inputs,
            num_outputs,
            nodes_in_layer,
            num_layers,
            value: 0.0,
        };
        network.wire();
        Ok(network)
    }

    /// Rebuild parent/child index links across consecutive layers
    fn wire(&mut self) {
        let ids: Vec<Vec<NodeId>> = self
            .layers
            .iter()
            .enumerate()
            .map(|(layer, nodes)| {
                (0..nodes.len()).map(|pos| NodeId::new(layer, pos)).collect()
            })
            .collect();

        for (layer_number, layer) in self.layers.iter_mut().enumerate() {
            for (pos, node) in layer.iter_mut().enumerate() {
                node.layer_number = layer_number;
                node.node_in_layer = pos;
                node.parents = if layer_number == 0 {
                    Vec::new()
                } else {
                    ids[layer_number - 1].clone()
                };
                node.children = if layer_number + 1 < ids.len() {
                    ids[layer_number + 1].clone()
                } else {
                    Vec::new()
                };
            }
        }
    }

    /// Forward-propagate one input vector.
    ///
    /// Each input index is handed to every layer-0 node, which cascades the
    /// SAME scalar to its children with the index reinterpreted as the
    /// forwarding node's own position in its layer. This is the original
    /// column-threaded topology, preserved as-is; children never receive a
    /// full vector from a single parent.
    ///
    /// Returns the `value` array of the final layer. Fails before touching
    /// any node when the input length is wrong.
    pub fn evaluate(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.num_inputs {
            return Err(NetworkError::InputLength {
                expected: self.num_inputs,
                found: inputs.len(),
            });
        }

        let entry_width = self.layers[0].len();
        for (index, &input) in inputs.iter().enumerate() {
            for pos in 0..entry_width {
                self.feed(NodeId::new(0, pos), input, index, true);
            }
        }

        let outputs: Vec<f64> = self.output_layer().iter().map(|node| node.value).collect();
        self.value = outputs.iter().sum();
        Ok(outputs)
    }

    fn feed(&mut self, id: NodeId, input: f64, index: usize, propagate: bool) {
        let node = &mut self.layers[id.layer][id.index];
        node.accumulate(input, index);

        if !propagate || node.children.is_empty() {
            return;
        }

        let from = node.node_in_layer;
        let children = node.children.clone();
        for child in children {
            self.feed(child, input, from, propagate);
        }
    }

    /// Apply every node's update policy in place
    pub fn update_all(&mut self, inputs: &[f64], goal: f64, rng: &mut ChaCha8Rng) {
        for layer in &mut self.layers {
            for node in layer {
                node.apply_update(inputs, goal, rng);
            }
        }
    }

    pub fn output_layer(&self) -> &[Node] {
        &self.layers[self.layers.len() - 1]
    }

    /// Nested weight/bias snapshot of the whole grid
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            layers: self
                .layers
                .iter()
                .map(|layer| {
                    layer
                        .iter()
                        .map(|node| NodeSnapshot {
                            weights: node.weights.clone(),
                            biases: node.biases.clone(),
                        })
                        .collect()
                })
                .collect(),
        }
    }

    /// Check that every node holds finite weights and biases
    pub fn is_valid(&self) -> bool {
        self.layers.iter().flatten().all(|node| node.is_valid())
    }
}
