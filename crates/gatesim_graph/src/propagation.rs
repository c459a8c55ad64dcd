// SPDX-License-Identifier: MIT OR Apache-2.0
//! Signal propagation by bounded relaxation.
//!
//! A run resets every input port to `false`, then performs a fixed number of
//! passes. Each pass copies every output value across its wires and then
//! re-evaluates every gate. A final copy step makes the last gate outputs
//! visible on downstream inputs.
//!
//! With the default budget of one pass per node, any acyclic circuit settles
//! regardless of insertion order. Circuits with feedback always terminate,
//! but the result is only the state after the last pass, not a proven fixed
//! point.

use crate::circuit::Circuit;
use crate::port::PortId;
use std::collections::HashMap;

/// How many relaxation passes a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassBudget {
    /// One pass per node in the circuit
    #[default]
    NodeCount,
    /// A fixed number of passes
    Fixed(usize),
}

impl PassBudget {
    /// Resolve the budget for a circuit with `node_count` nodes
    pub fn passes(&self, node_count: usize) -> usize {
        match self {
            Self::NodeCount => node_count,
            Self::Fixed(passes) => *passes,
        }
    }
}

/// Configuration for a propagation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropagationConfig {
    /// Number of relaxation passes
    pub budget: PassBudget,
}

impl PropagationConfig {
    /// Configuration with a fixed pass count
    pub fn fixed(passes: usize) -> Self {
        Self {
            budget: PassBudget::Fixed(passes),
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropagationStats {
    /// Relaxation passes performed
    pub passes: usize,
    /// Wires copied per propagate step
    pub connections: usize,
}

/// A wire resolved to arena positions
#[derive(Debug, Clone, Copy)]
struct Wire {
    from_node: usize,
    from_port: usize,
    to_node: usize,
    to_port: usize,
}

/// Propagate signals and return an independent, updated circuit.
///
/// The input circuit is left untouched.
pub fn propagate(circuit: &Circuit) -> Circuit {
    propagate_with(circuit, PropagationConfig::default())
}

/// [`propagate`] with an explicit configuration
pub fn propagate_with(circuit: &Circuit, config: PropagationConfig) -> Circuit {
    let mut updated = circuit.clone();
    propagate_in_place_with(&mut updated, config);
    updated
}

/// Propagate signals, updating the circuit's port values in place
pub fn propagate_in_place(circuit: &mut Circuit) -> PropagationStats {
    propagate_in_place_with(circuit, PropagationConfig::default())
}

/// [`propagate_in_place`] with an explicit configuration
pub fn propagate_in_place_with(circuit: &mut Circuit, config: PropagationConfig) -> PropagationStats {
    let wires = resolve_wires(circuit);
    let passes = config.budget.passes(circuit.node_count());

    reset_inputs(circuit);
    for _ in 0..passes {
        apply_wires(circuit, &wires);
        evaluate_gates(circuit);
    }
    apply_wires(circuit, &wires);

    tracing::trace!(
        "Propagated {} node(s) over {} wire(s) in {} pass(es)",
        circuit.node_count(),
        wires.len(),
        passes
    );

    PropagationStats {
        passes,
        connections: wires.len(),
    }
}

/// Map every connection to (node index, port index) pairs.
///
/// Wires whose endpoints cannot be found are skipped; they can only come
/// from a circuit that was deserialized without validation.
fn resolve_wires(circuit: &Circuit) -> Vec<Wire> {
    let mut outputs: HashMap<PortId, (usize, usize)> = HashMap::new();
    let mut inputs: HashMap<PortId, (usize, usize)> = HashMap::new();
    for (node_index, node) in circuit.nodes.values().enumerate() {
        for (port_index, port) in node.inputs.iter().enumerate() {
            inputs.insert(port.id, (node_index, port_index));
        }
        for (port_index, port) in node.outputs.iter().enumerate() {
            outputs.insert(port.id, (node_index, port_index));
        }
    }

    circuit
        .connections
        .values()
        .filter_map(|connection| {
            let from = outputs.get(&connection.from_port);
            let to = inputs.get(&connection.to_port);
            match (from, to) {
                (Some(&(from_node, from_port)), Some(&(to_node, to_port))) => Some(Wire {
                    from_node,
                    from_port,
                    to_node,
                    to_port,
                }),
                _ => {
                    tracing::warn!("Skipping dangling connection {:?}", connection.id);
                    None
                }
            }
        })
        .collect()
}

fn reset_inputs(circuit: &mut Circuit) {
    for node in circuit.nodes.values_mut() {
        for port in &mut node.inputs {
            port.value = false;
        }
    }
}

/// Copy each wire's source value into its target input.
///
/// Every input has at most one source, so the order of wires within a step
/// does not affect the result of that step.
fn apply_wires(circuit: &mut Circuit, wires: &[Wire]) {
    for wire in wires {
        let value = circuit.nodes[wire.from_node].outputs[wire.from_port].value;
        circuit.nodes[wire.to_node].inputs[wire.to_port].value = value;
    }
}

fn evaluate_gates(circuit: &mut Circuit) {
    for node in circuit.nodes.values_mut() {
        node.evaluate();
    }
}
