// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.
//!
//! Every port carries exactly one boolean signal and belongs to exactly one
//! node. Port IDs are unique across the whole circuit.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port, driven by at most one connection
    Input,
    /// Output port, may drive any number of connections
    Output,
}

impl PortDirection {
    /// Whether several connections may share this port
    pub fn allows_fan_out(&self) -> bool {
        matches!(self, Self::Output)
    }
}

/// A single-bit signal terminal on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Owning node
    pub node: NodeId,
    /// Port name (`in0`, `in1`, ..., `out`)
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Current signal value
    pub value: bool,
}

impl Port {
    /// Create a new input port for `node`
    pub fn input(node: NodeId, index: usize) -> Self {
        Self {
            id: PortId::new(),
            node,
            name: format!("in{index}"),
            direction: PortDirection::Input,
            value: false,
        }
    }

    /// Create a new output port for `node`
    pub fn output(node: NodeId) -> Self {
        Self {
            id: PortId::new(),
            node,
            name: "out".to_string(),
            direction: PortDirection::Output,
            value: false,
        }
    }

    /// Whether this is an input port
    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    /// Whether this is an output port
    pub fn is_output(&self) -> bool {
        self.direction == PortDirection::Output
    }

    /// Check if a wire from this port to `other` is directionally valid.
    ///
    /// Wires always run from an output port to an input port.
    pub fn can_connect(&self, other: &Port) -> bool {
        self.is_output() && other.is_input()
    }
}
