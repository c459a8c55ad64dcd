// SPDX-License-Identifier: MIT OR Apache-2.0
//! Human-writable circuit documents.
//!
//! A document names each node with a label and describes wires by label, so
//! it can be written by hand:
//!
//! ```ron
//! (
//!     name: "half adder",
//!     nodes: [
//!         (label: "a", kind: input, on: true),
//!         (label: "b", kind: input),
//!         (label: "sum", kind: xor),
//!         (label: "carry", kind: and),
//!         (label: "s", kind: output),
//!         (label: "c", kind: output),
//!     ],
//!     wires: [
//!         (from: "a", to: "sum.0"),
//!         (from: "b", to: "sum.1"),
//!         (from: "a", to: "carry.0"),
//!         (from: "b", to: "carry.1"),
//!         (from: "sum", to: "s"),
//!         (from: "carry", to: "c"),
//!     ],
//! )
//! ```
//!
//! The circuit is built through the regular mutation methods, so every
//! structural rule applies. Unlike interactive edits, an illegal wire in a
//! document is reported as an error.

use gatesim_graph::{Circuit, CircuitError, ConnectionError, NodeId, NodeKind, PortId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current document format version
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    DOCUMENT_FORMAT_VERSION
}

/// A circuit description keyed by node labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitDocument {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Circuit name
    #[serde(default)]
    pub name: String,
    /// Nodes in creation order
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    /// Wires in creation order
    #[serde(default)]
    pub wires: Vec<WireSpec>,
}

/// One node in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique label, also used as the node name
    pub label: String,
    /// Node kind
    pub kind: NodeKind,
    /// Input count for variadic gates
    #[serde(default)]
    pub inputs: Option<usize>,
    /// Canvas position
    #[serde(default)]
    pub position: [f32; 2],
    /// Initial switch state (`input` nodes only)
    #[serde(default)]
    pub on: bool,
}

/// One wire in a document.
///
/// `from` is a node label. `to` is `label.N` for input port `N`, or just
/// `label` for port 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSpec {
    /// Source node label
    pub from: String,
    /// Target node label and input index
    pub to: String,
}

/// Label to node mapping produced by [`CircuitDocument::build`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    by_label: IndexMap<String, NodeId>,
    by_node: IndexMap<NodeId, String>,
}

impl Labels {
    fn insert(&mut self, label: String, node: NodeId) {
        self.by_node.insert(node, label.clone());
        self.by_label.insert(label, node);
    }

    fn contains(&self, label: &str) -> bool {
        self.by_label.contains_key(label)
    }

    /// Look up a node by label
    pub fn get(&self, label: &str) -> Option<NodeId> {
        self.by_label.get(label).copied()
    }

    /// Label of a node
    pub fn label_of(&self, node: NodeId) -> Option<&str> {
        self.by_node.get(&node).map(String::as_str)
    }

    /// All labels in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.by_label.iter().map(|(label, id)| (label.as_str(), *id))
    }

    /// Number of labelled nodes
    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    /// Whether no nodes are labelled
    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

/// Error loading or building a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Document could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] ron::Error),

    /// Written by a newer version
    #[error("Document version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },

    /// Two nodes share a label
    #[error("Duplicate node label '{0}'")]
    DuplicateLabel(String),

    /// Wire refers to a label that was never declared
    #[error("Unknown node label '{0}'")]
    UnknownLabel(String),

    /// Malformed or out-of-range port reference
    #[error("Invalid port reference '{0}'")]
    BadPort(String),

    /// Node could not be created or configured
    #[error("Node '{label}': {source}")]
    Node {
        /// Offending label
        label: String,
        /// Underlying error
        #[source]
        source: CircuitError,
    },

    /// Wire was rejected by the circuit
    #[error("Wire {from} -> {to}: {source}")]
    Wire {
        /// Source endpoint as written
        from: String,
        /// Target endpoint as written
        to: String,
        /// Underlying error
        #[source]
        source: ConnectionError,
    },
}

impl CircuitDocument {
    /// Create an empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: DOCUMENT_FORMAT_VERSION,
            name: name.into(),
            nodes: Vec::new(),
            wires: Vec::new(),
        }
    }

    /// Parse a document from RON text
    pub fn from_ron(text: &str) -> Result<Self, DocumentError> {
        let document: CircuitDocument = ron::from_str(text)?;
        if document.version > DOCUMENT_FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: document.version,
                supported: DOCUMENT_FORMAT_VERSION,
            });
        }
        Ok(document)
    }

    /// Load a document from a file
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        let document = Self::from_ron(&content)?;
        tracing::debug!("Loaded circuit document {:?}", path);
        Ok(document)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, DocumentError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Save the document to a file
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved circuit document to {:?}", path);
        Ok(())
    }

    /// Build the circuit described by this document
    pub fn build(&self) -> Result<(Circuit, Labels), DocumentError> {
        let mut circuit = Circuit::new(self.name.clone());
        let mut labels = Labels::default();

        for spec in &self.nodes {
            if labels.contains(&spec.label) {
                return Err(DocumentError::DuplicateLabel(spec.label.clone()));
            }
            let node_error = |source: CircuitError| DocumentError::Node {
                label: spec.label.clone(),
                source,
            };

            let id = match spec.inputs {
                Some(inputs) if inputs != spec.kind.default_input_count() => circuit
                    .add_gate(spec.kind, inputs, spec.position)
                    .map_err(node_error)?,
                _ => circuit.add_node(spec.kind, spec.position),
            };
            circuit.rename_node(id, spec.label.clone());
            if spec.on {
                circuit.set_input_value(id, true).map_err(node_error)?;
            }
            labels.insert(spec.label.clone(), id);
        }

        for wire in &self.wires {
            let (from_node, from_port) = resolve(&circuit, &labels, &wire.from, Side::Source)?;
            let (to_node, to_port) = resolve(&circuit, &labels, &wire.to, Side::Target)?;
            circuit
                .connect(from_node, from_port, to_node, to_port)
                .map_err(|source| DocumentError::Wire {
                    from: wire.from.clone(),
                    to: wire.to.clone(),
                    source,
                })?;
        }

        tracing::debug!(
            "Built circuit '{}' with {} node(s) and {} wire(s)",
            circuit.name,
            circuit.node_count(),
            circuit.connection_count()
        );
        Ok((circuit, labels))
    }

    /// Describe an existing circuit as a document.
    ///
    /// Node names become labels. Names that are empty, collide, contain a
    /// `.` or carry surrounding whitespace are replaced by the first free
    /// `kindN`.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut labels = Labels::default();
        let mut nodes = Vec::with_capacity(circuit.node_count());

        for (index, node) in circuit.nodes().enumerate() {
            let usable = !node.name.is_empty()
                && node.name.trim() == node.name
                && !node.name.contains('.')
                && !labels.contains(&node.name);
            let label = if usable {
                node.name.clone()
            } else {
                (index..)
                    .map(|n| format!("{}{n}", node.kind))
                    .find(|candidate| !labels.contains(candidate))
                    .unwrap_or_default()
            };
            let inputs = (node.kind.is_variadic() && node.inputs().len() != node.kind.default_input_count())
                .then_some(node.inputs().len());

            nodes.push(NodeSpec {
                label: label.clone(),
                kind: node.kind,
                inputs,
                position: node.position,
                on: node.switch_state().unwrap_or(false),
            });
            labels.insert(label, node.id);
        }

        let wires = circuit
            .connections()
            .filter_map(|c| {
                let from = labels.label_of(c.from_node)?;
                let to = labels.label_of(c.to_node)?;
                let index = circuit
                    .node(c.to_node)?
                    .inputs()
                    .iter()
                    .position(|p| p.id == c.to_port)?;
                Some(WireSpec {
                    from: from.to_string(),
                    to: format!("{to}.{index}"),
                })
            })
            .collect();

        Self {
            nodes,
            wires,
            ..Self::new(circuit.name.clone())
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Source,
    Target,
}

/// Resolve `label` or `label.N` to a node and port
fn resolve(
    circuit: &Circuit,
    labels: &Labels,
    endpoint: &str,
    side: Side,
) -> Result<(NodeId, PortId), DocumentError> {
    let (label, index) = match endpoint.rsplit_once('.') {
        Some((label, index)) => {
            let index = index
                .trim()
                .parse::<usize>()
                .map_err(|_| DocumentError::BadPort(endpoint.to_string()))?;
            (label.trim(), index)
        }
        None => (endpoint.trim(), 0),
    };

    let node_id = labels
        .get(label)
        .ok_or_else(|| DocumentError::UnknownLabel(label.to_string()))?;
    let node = circuit
        .node(node_id)
        .ok_or_else(|| DocumentError::UnknownLabel(label.to_string()))?;
    let port = match side {
        Side::Source => node.output(index),
        Side::Target => node.input(index),
    };
    let port = port.ok_or_else(|| DocumentError::BadPort(endpoint.to_string()))?;
    Ok((node_id, port.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatesim_graph::propagate;

    const HALF_ADDER: &str = r#"(
        name: "half adder",
        nodes: [
            (label: "a", kind: input, on: true),
            (label: "b", kind: input),
            (label: "sum", kind: xor),
            (label: "carry", kind: and),
            (label: "s", kind: output),
            (label: "c", kind: output),
        ],
        wires: [
            (from: "a", to: "sum.0"),
            (from: "b", to: "sum.1"),
            (from: "a", to: "carry.0"),
            (from: "b", to: "carry.1"),
            (from: "sum", to: "s"),
            (from: "carry", to: "c"),
        ],
    )"#;

    #[test]
    fn test_build_half_adder() {
        let document = CircuitDocument::from_ron(HALF_ADDER).unwrap();
        assert_eq!(document.version, DOCUMENT_FORMAT_VERSION);

        let (circuit, labels) = document.build().unwrap();
        assert_eq!(circuit.node_count(), 6);
        assert_eq!(circuit.connection_count(), 6);
        assert_eq!(labels.len(), 6);

        let a = labels.get("a").unwrap();
        assert_eq!(circuit.switch(a), Some(true));
        assert_eq!(circuit.node(a).unwrap().name, "a");
        assert_eq!(labels.label_of(a), Some("a"));

        let updated = propagate(&circuit);
        assert_eq!(updated.indicator(labels.get("s").unwrap()), Some(true));
        assert_eq!(updated.indicator(labels.get("c").unwrap()), Some(false));
    }

    #[test]
    fn test_variadic_node() {
        let text = r#"(
            name: "wide",
            nodes: [(label: "g", kind: or, inputs: Some(5))],
        )"#;
        let (circuit, labels) = CircuitDocument::from_ron(text).unwrap().build().unwrap();
        let g = labels.get("g").unwrap();
        assert_eq!(circuit.node(g).unwrap().inputs().len(), 5);
    }

    #[test]
    fn test_duplicate_label() {
        let text = r#"(nodes: [(label: "x", kind: input), (label: "x", kind: not)])"#;
        let err = CircuitDocument::from_ron(text).unwrap().build().unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateLabel(label) if label == "x"));
    }

    #[test]
    fn test_unknown_label_and_bad_port() {
        let text = r#"(
            nodes: [(label: "a", kind: input), (label: "n", kind: not)],
            wires: [(from: "a", to: "m")],
        )"#;
        let err = CircuitDocument::from_ron(text).unwrap().build().unwrap_err();
        assert!(matches!(err, DocumentError::UnknownLabel(label) if label == "m"));

        let text = r#"(
            nodes: [(label: "a", kind: input), (label: "n", kind: not)],
            wires: [(from: "a", to: "n.1")],
        )"#;
        let err = CircuitDocument::from_ron(text).unwrap().build().unwrap_err();
        assert!(matches!(err, DocumentError::BadPort(_)));
    }

    #[test]
    fn test_second_source_rejected() {
        let text = r#"(
            nodes: [(label: "a", kind: input), (label: "b", kind: input), (label: "l", kind: output)],
            wires: [(from: "a", to: "l"), (from: "b", to: "l.0")],
        )"#;
        let err = CircuitDocument::from_ron(text).unwrap().build().unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Wire { source: ConnectionError::PortAlreadyConnected(_), .. }
        ));
    }

    #[test]
    fn test_switch_on_non_input() {
        let text = r#"(nodes: [(label: "g", kind: and, on: true)])"#;
        let err = CircuitDocument::from_ron(text).unwrap().build().unwrap_err();
        assert!(matches!(err, DocumentError::Node { source: CircuitError::NotAnInput(_), .. }));
    }

    #[test]
    fn test_newer_version_rejected() {
        let text = r#"(version: 99, name: "future")"#;
        assert!(matches!(
            CircuitDocument::from_ron(text),
            Err(DocumentError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_from_circuit_round_trip() {
        let (circuit, _) = CircuitDocument::from_ron(HALF_ADDER).unwrap().build().unwrap();
        let document = CircuitDocument::from_circuit(&circuit);
        assert_eq!(document, CircuitDocument::from_ron(&document.to_ron().unwrap()).unwrap());

        let (rebuilt, labels) = document.build().unwrap();
        assert_eq!(rebuilt.connection_count(), circuit.connection_count());
        assert_eq!(propagate(&rebuilt).indicator(labels.get("s").unwrap()), Some(true));
    }

    #[test]
    fn test_from_circuit_fixes_labels() {
        let mut circuit = Circuit::new("clash");
        circuit.add_node(NodeKind::Not, [0.0, 0.0]);
        circuit.add_node(NodeKind::Not, [0.0, 0.0]);
        let dotted = circuit.add_node(NodeKind::Input, [0.0, 0.0]);
        circuit.rename_node(dotted, "a.b");

        let document = CircuitDocument::from_circuit(&circuit);
        let labels: Vec<_> = document.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["NOT", "not1", "input2"]);
    }

    #[test]
    fn test_from_circuit_labels_rebuild() {
        let mut circuit = Circuit::new("clash");
        let first = circuit.add_node(NodeKind::Not, [0.0, 0.0]);
        let second = circuit.add_node(NodeKind::Not, [0.0, 0.0]);
        let switch = circuit.add_node(NodeKind::Input, [0.0, 0.0]);
        let lamp = circuit.add_node(NodeKind::Output, [0.0, 0.0]);
        circuit.rename_node(first, "not1");
        circuit.rename_node(second, "not1");
        circuit.rename_node(switch, "not2");
        circuit.rename_node(lamp, " y ");

        let port = |node: NodeId, input: bool| {
            let node = circuit.node(node).unwrap();
            if input { node.inputs()[0].id } else { node.outputs()[0].id }
        };
        let wires = [(switch, first), (first, second), (second, lamp)];
        let wires: Vec<_> = wires.iter().map(|&(a, b)| (a, port(a, false), b, port(b, true))).collect();
        for (a, out, b, inp) in wires {
            circuit.connect(a, out, b, inp).unwrap();
        }

        let document = CircuitDocument::from_circuit(&circuit);
        let labels: Vec<_> = document.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["not1", "not2", "input2", "output3"]);

        let (mut rebuilt, labels) = document.build().unwrap();
        assert_eq!(rebuilt.connection_count(), 3);
        rebuilt.set_input_value(labels.get("input2").unwrap(), true).unwrap();
        assert_eq!(propagate(&rebuilt).indicator(labels.get("output3").unwrap()), Some(true));
        assert_eq!(labels.label_of(labels.get("not2").unwrap()), Some("not2"));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("gatesim-doc-{}.ron", std::process::id()));
        let document = CircuitDocument::from_ron(HALF_ADDER).unwrap();
        document.save(&path).unwrap();
        let loaded = CircuitDocument::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, document);
    }

    #[test]
    fn test_demo_document() {
        let document = CircuitDocument::from_ron(include_str!("../../../demos/half_adder.ron")).unwrap();
        let (mut circuit, labels) = document.build().unwrap();
        circuit.set_input_value(labels.get("a").unwrap(), true).unwrap();
        circuit.set_input_value(labels.get("b").unwrap(), true).unwrap();
        let circuit = propagate(&circuit);
        assert_eq!(circuit.indicator(labels.get("sum").unwrap()), Some(false));
        assert_eq!(circuit.indicator(labels.get("carry").unwrap()), Some(true));
    }
}
