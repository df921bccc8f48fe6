//! Persisted snapshot documents.
//!
//! The on-disk JSON contract is fixed:
//! `{"Layer <l>": {"Node <n>": {"Weights": [...], "Biases": [...]}}}` for a
//! single network, wrapped in `{"Generation <i>": ...}` for a population
//! history. Writes always truncate the target file.

use crate::error::NetworkError;
use crate::network::Network;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Weight/bias state of one node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    #[serde(rename = "Weights")]
    pub weights: Vec<f64>,
    #[serde(rename = "Biases")]
    pub biases: Vec<f64>,
}

/// Weight/bias state of an entire network, ordered layer-major
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkSnapshot {
    pub layers: Vec<Vec<NodeSnapshot>>,
}

struct LayerEntry<'a>(&'a [NodeSnapshot]);

impl Serialize for LayerEntry<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (n, node) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("Node {}", n), node)?;
        }
        map.end()
    }
}

impl Serialize for NetworkSnapshot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.layers.len()))?;
        for (l, layer) in self.layers.iter().enumerate() {
            map.serialize_entry(&format!("Layer {}", l), &LayerEntry(layer))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NetworkSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: HashMap<String, HashMap<String, NodeSnapshot>> =
            HashMap::deserialize(deserializer)?;

        let mut layers = Vec::with_capacity(raw.len());
        for l in 0..raw.len() {
            let layer = raw
                .get(&format!("Layer {}", l))
                .ok_or_else(|| serde::de::Error::custom(format!("missing \"Layer {}\"", l)))?;

            let mut nodes = Vec::with_capacity(layer.len());
            for n in 0..layer.len() {
                let node = layer
                    .get(&format!("Node {}", n))
                    .ok_or_else(|| serde::de::Error::custom(format!("missing \"Node {}\"", n)))?;
                nodes.push(node.clone());
            }
            layers.push(nodes);
        }

        Ok(NetworkSnapshot { layers })
    }
}

impl NetworkSnapshot {
    /// Write this snapshot as one pretty-printed JSON document,
    /// truncating any existing file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), NetworkError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read a snapshot document back from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NetworkError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Copy this snapshot's weights and biases into a live network.
    ///
    /// The snapshot must match the network's grid shape exactly; restore is
    /// invoked by the trainable variants, never by the engine itself.
    pub(crate) fn apply(&self, network: &mut Network) -> Result<(), NetworkError> {
        if self.layers.len() != network.layers.len() {
            return Err(NetworkError::Shape(format!(
                "snapshot has {} layers, network has {}",
                self.layers.len(),
                network.layers.len()
            )));
        }

        for (l, (snap_layer, live_layer)) in
            self.layers.iter().zip(network.layers.iter()).enumerate()
        {
            if snap_layer.len() != live_layer.len() {
                return Err(NetworkError::Shape(format!(
                    "layer {} has {} nodes in the snapshot, {} in the network",
                    l,
                    snap_layer.len(),
                    live_layer.len()
                )));
            }
            for (n, (snap, live)) in snap_layer.iter().zip(live_layer.iter()).enumerate() {
                if snap.weights.len() != live.num_inputs || snap.biases.len() != live.num_inputs {
                    return Err(NetworkError::Shape(format!(
                        "node {}/{} carries {} weights and {} biases, expected {}",
                        l,
                        n,
                        snap.weights.len(),
                        snap.biases.len(),
                        live.num_inputs
                    )));
                }
            }
        }

        for (snap_layer, live_layer) in self.layers.iter().zip(network.layers.iter_mut()) {
            for (snap, live) in snap_layer.iter().zip(live_layer.iter_mut()) {
                live.weights.copy_from_slice(&snap.weights);
                live.biases.copy_from_slice(&snap.biases);
            }
        }
        Ok(())
    }
}

/// Per-generation champion snapshots accumulated by the evolutionary loop
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationHistory {
    pub generations: Vec<NetworkSnapshot>,
}

impl Serialize for GenerationHistory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.generations.len()))?;
        for (i, snapshot) in self.generations.iter().enumerate() {
            map.serialize_entry(&format!("Generation {}", i), snapshot)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GenerationHistory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw: HashMap<String, NetworkSnapshot> = HashMap::deserialize(deserializer)?;

        let mut generations = Vec::with_capacity(raw.len());
        for i in 0..raw.len() {
            let snapshot = raw.get(&format!("Generation {}", i)).ok_or_else(|| {
                serde::de::Error::custom(format!("missing \"Generation {}\"", i))
            })?;
            generations.push(snapshot.clone());
        }

        Ok(GenerationHistory { generations })
    }
}

impl GenerationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: NetworkSnapshot) {
        self.generations.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Write the accumulated history as one JSON document, truncating
    /// any existing file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), NetworkError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NetworkError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NetworkSnapshot {
        NetworkSnapshot {
            layers: vec![
                vec![
                    NodeSnapshot {
                        weights: vec![1.0, -2.5],
                        biases: vec![0.5, 0.0],
                    },
                    NodeSnapshot {
                        weights: vec![3.0, 4.0],
                        biases: vec![-1.0, 2.0],
                    },
                ],
                vec![NodeSnapshot {
                    weights: vec![0.25, 0.75],
                    biases: vec![0.0, 1.0],
                }],
            ],
        }
    }

    #[test]
    fn test_document_key_format() {
        let value = serde_json::to_value(sample()).unwrap();

        assert!(value.get("Layer 0").is_some());
        assert!(value.get("Layer 1").is_some());
        assert!(value["Layer 0"].get("Node 1").is_some());
        assert_eq!(value["Layer 0"]["Node 0"]["Weights"][1], -2.5);
        assert_eq!(value["Layer 1"]["Node 0"]["Biases"][1], 1.0);
    }

    #[test]
    fn test_snapshot_roundtrip_exact() {
        let snapshot = sample();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: NetworkSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, parsed);
    }

    #[test]
    fn test_missing_layer_key_rejected() {
        let json = r#"{"Layer 1": {"Node 0": {"Weights": [1.0], "Biases": [0.0]}}}"#;
        assert!(serde_json::from_str::<NetworkSnapshot>(json).is_err());
    }

    #[test]
    fn test_history_key_format_and_roundtrip() {
        let mut history = GenerationHistory::new();
        history.push(sample());
        history.push(sample());

        let value = serde_json::to_value(&history).unwrap();
        assert!(value.get("Generation 0").is_some());
        assert!(value.get("Generation 1").is_some());
        assert!(value["Generation 1"].get("Layer 0").is_some());

        let json = serde_json::to_string(&history).unwrap();
        let parsed: GenerationHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(history, parsed);
    }

    #[test]
    fn test_file_roundtrip_truncates() {
        let path = "/tmp/neuroseed_snapshot_test.json";

        // First write something longer, then overwrite with the snapshot
        std::fs::write(path, "x".repeat(100_000)).unwrap();
        let snapshot = sample();
        snapshot.save(path).unwrap();

        let loaded = NetworkSnapshot::load(path).unwrap();
        assert_eq!(snapshot, loaded);

        std::fs::remove_file(path).ok();
    }
}
