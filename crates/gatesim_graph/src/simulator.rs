// SPDX-License-Identifier: MIT OR Apache-2.0
//! A circuit that keeps its signals up to date.
//!
//! [`Simulator`] wraps a [`Circuit`] and runs one complete propagation after
//! every mutation that changed something, so readers never observe a circuit
//! whose port values lag behind its structure.

use crate::circuit::{Circuit, CircuitError, ConnectionError};
use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId, NodeKind};
use crate::port::PortId;
use crate::propagation::{propagate_in_place_with, PropagationConfig, PropagationStats};

/// Live circuit with automatic re-propagation
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    circuit: Circuit,
    config: PropagationConfig,
    last_run: PropagationStats,
}

impl Simulator {
    /// Wrap a circuit, propagating it once
    pub fn new(circuit: Circuit) -> Self {
        Self::with_config(circuit, PropagationConfig::default())
    }

    /// Wrap a circuit with a specific propagation configuration
    pub fn with_config(circuit: Circuit, config: PropagationConfig) -> Self {
        let mut simulator = Self {
            circuit,
            config,
            last_run: PropagationStats::default(),
        };
        simulator.refresh();
        simulator
    }

    /// The current circuit
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Unwrap into the circuit
    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    /// Propagation configuration
    pub fn config(&self) -> PropagationConfig {
        self.config
    }

    /// Change the configuration and re-propagate
    pub fn set_config(&mut self, config: PropagationConfig) {
        self.config = config;
        self.refresh();
    }

    /// Stats from the most recent run
    pub fn last_run(&self) -> PropagationStats {
        self.last_run
    }

    /// Run a full propagation now
    pub fn refresh(&mut self) -> PropagationStats {
        self.last_run = propagate_in_place_with(&mut self.circuit, self.config);
        self.last_run
    }

    /// Add a node and re-propagate
    pub fn add_node(&mut self, kind: NodeKind, position: [f32; 2]) -> NodeId {
        let id = self.circuit.add_node(kind, position);
        self.refresh();
        id
    }

    /// Add a variadic gate and re-propagate
    pub fn add_gate(
        &mut self,
        kind: NodeKind,
        inputs: usize,
        position: [f32; 2],
    ) -> Result<NodeId, CircuitError> {
        let id = self.circuit.add_gate(kind, inputs, position)?;
        self.refresh();
        Ok(id)
    }

    /// Remove a node with its connections and re-propagate
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let removed = self.circuit.remove_node(node_id)?;
        self.refresh();
        Some(removed)
    }

    /// Connect two ports and re-propagate
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<ConnectionId, ConnectionError> {
        let id = self.circuit.connect(from_node, from_port, to_node, to_port)?;
        self.refresh();
        Ok(id)
    }

    /// Remove a connection and re-propagate
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let removed = self.circuit.disconnect(connection_id)?;
        self.refresh();
        Some(removed)
    }

    /// Set an input switch and re-propagate
    pub fn set_input_value(&mut self, node_id: NodeId, value: bool) -> Result<(), CircuitError> {
        self.circuit.set_input_value(node_id, value)?;
        self.refresh();
        Ok(())
    }

    /// Flip an input switch and re-propagate
    pub fn toggle_input(&mut self, node_id: NodeId) -> Result<bool, CircuitError> {
        let value = self.circuit.toggle_input(node_id)?;
        self.refresh();
        Ok(value)
    }

    /// Move a node. Layout does not affect signals, so nothing is re-run.
    pub fn move_node(&mut self, node_id: NodeId, position: [f32; 2]) -> bool {
        self.circuit.move_node(node_id, position)
    }

    /// Rename a node
    pub fn rename_node(&mut self, node_id: NodeId, name: impl Into<String>) -> bool {
        self.circuit.rename_node(node_id, name)
    }

    /// Value shown by an `output` node
    pub fn indicator(&self, node_id: NodeId) -> Option<bool> {
        self.circuit.indicator(node_id)
    }
}

impl From<Circuit> for Simulator {
    fn from(circuit: Circuit) -> Self {
        Self::new(circuit)
    }
}
