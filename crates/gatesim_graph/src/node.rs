// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions: switches, indicators and logic gates.

use crate::port::{Port, PortId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node kind category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Circuit boundary (switches and indicators)
    Io,
    /// Combinational logic gate
    Gate,
}

/// The closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Input switch, drives its output port from the switch state
    Input,
    /// Output indicator, shows the value on its input port
    Output,
    /// Logical AND
    And,
    /// Logical OR
    Or,
    /// Inverter
    Not,
    /// Negated AND
    Nand,
    /// Negated OR
    Nor,
    /// Odd parity
    Xor,
    /// Even parity
    Xnor,
}

impl NodeKind {
    /// Every node kind, in palette order
    pub const ALL: [NodeKind; 9] = [
        Self::Input,
        Self::Output,
        Self::And,
        Self::Or,
        Self::Not,
        Self::Nand,
        Self::Nor,
        Self::Xor,
        Self::Xnor,
    ];

    /// Lowercase identifier, as used in documents
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Nand => "nand",
            Self::Nor => "nor",
            Self::Xor => "xor",
            Self::Xnor => "xnor",
        }
    }

    /// Default display name for new nodes
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Input => "Switch",
            Self::Output => "Lamp",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Xor => "XOR",
            Self::Xnor => "XNOR",
        }
    }

    /// Short description of the node's behavior
    pub fn description(&self) -> &'static str {
        match self {
            Self::Input => "Toggle switch driving a single output",
            Self::Output => "Indicator showing its single input",
            Self::And => "High when every input is high",
            Self::Or => "High when any input is high",
            Self::Not => "High when its input is low",
            Self::Nand => "Low only when every input is high",
            Self::Nor => "High only when every input is low",
            Self::Xor => "High when an odd number of inputs are high",
            Self::Xnor => "High when an even number of inputs are high",
        }
    }

    /// Category of this kind
    pub fn category(&self) -> NodeCategory {
        if self.is_gate() {
            NodeCategory::Gate
        } else {
            NodeCategory::Io
        }
    }

    /// Whether nodes of this kind are recomputed during propagation
    pub fn is_gate(&self) -> bool {
        !matches!(self, Self::Input | Self::Output)
    }

    /// Whether this gate accepts any number (N >= 1) of inputs
    pub fn is_variadic(&self) -> bool {
        self.is_gate() && *self != Self::Not
    }

    /// Number of input ports a freshly created node gets
    pub fn default_input_count(&self) -> usize {
        match self {
            Self::Input => 0,
            Self::Output | Self::Not => 1,
            _ => 2,
        }
    }

    /// Number of output ports
    pub fn output_count(&self) -> usize {
        match self {
            Self::Output => 0,
            _ => 1,
        }
    }

    /// Compute the output signal from the given input signals.
    ///
    /// Returns `None` for `input` and `output` nodes, which are never
    /// evaluated. Unconnected inputs are expected to be passed as `false`.
    /// XNOR over zero high inputs is `true` (even parity).
    pub fn evaluate(&self, inputs: impl IntoIterator<Item = bool>) -> Option<bool> {
        let mut count = 0usize;
        let mut high = 0usize;
        let mut first = None;
        for value in inputs {
            if first.is_none() {
                first = Some(value);
            }
            count += 1;
            high += usize::from(value);
        }

        let all = count > 0 && high == count;
        let any = high > 0;

        match self {
            Self::Input | Self::Output => None,
            Self::And => Some(all),
            Self::Or => Some(any),
            Self::Not => Some(first == Some(false)),
            Self::Nand => Some(!all),
            Self::Nor => Some(!any),
            Self::Xor => Some(high % 2 == 1),
            Self::Xnor => Some(high % 2 == 0),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error when parsing an unknown node kind name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown node kind: {0}")]
pub struct UnknownNodeKind(pub String);

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == lower)
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}

/// A node instance in the circuit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node kind
    pub kind: NodeKind,
    /// Display name
    pub name: String,
    /// Position on the canvas
    pub position: [f32; 2],
    /// Input ports
    pub(crate) inputs: Vec<Port>,
    /// Output ports
    pub(crate) outputs: Vec<Port>,
    /// Switch state, only present on `input` nodes
    pub(crate) switch_state: Option<bool>,
}

impl Node {
    /// Create a new node with the kind's default port set
    pub fn new(kind: NodeKind) -> Self {
        Self::build(kind, kind.default_input_count())
    }

    /// Create a gate with `inputs` input ports.
    ///
    /// Only variadic gates accept a custom input count, and it must be at
    /// least one.
    pub fn with_inputs(kind: NodeKind, inputs: usize) -> Option<Self> {
        if !kind.is_variadic() || inputs == 0 {
            return None;
        }
        Some(Self::build(kind, inputs))
    }

    fn build(kind: NodeKind, input_count: usize) -> Self {
        let id = NodeId::new();
        Self {
            id,
            kind,
            name: kind.display_name().to_string(),
            position: [0.0, 0.0],
            inputs: (0..input_count).map(|i| Port::input(id, i)).collect(),
            outputs: (0..kind.output_count()).map(|_| Port::output(id)).collect(),
            switch_state: (kind == NodeKind::Input).then_some(false),
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Input ports
    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    /// Output ports
    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Get an input port by index
    pub fn input(&self, index: usize) -> Option<&Port> {
        self.inputs.get(index)
    }

    /// Get an output port by index
    pub fn output(&self, index: usize) -> Option<&Port> {
        self.outputs.get(index)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: PortId) -> Option<&Port> {
        self.ports().find(|p| p.id == port_id)
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Switch state for `input` nodes
    pub fn switch_state(&self) -> Option<bool> {
        self.switch_state
    }

    /// Drive an `input` node's switch and output port.
    ///
    /// Returns `false` (and changes nothing) for any other kind.
    pub(crate) fn set_switch(&mut self, value: bool) -> bool {
        if self.kind != NodeKind::Input {
            return false;
        }
        self.switch_state = Some(value);
        for port in &mut self.outputs {
            port.value = value;
        }
        true
    }

    /// Recompute a gate's outputs from its current input values.
    ///
    /// Does nothing for `input` and `output` nodes.
    pub(crate) fn evaluate(&mut self) {
        let Some(value) = self.kind.evaluate(self.inputs.iter().map(|p| p.value)) else {
            return;
        };
        for port in &mut self.outputs {
            port.value = value;
        }
    }
}
