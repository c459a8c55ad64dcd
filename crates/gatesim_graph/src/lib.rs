// SPDX-License-Identifier: MIT OR Apache-2.0
//! Logic circuit graph and signal propagation for gatesim.
//!
//! This crate provides the simulation core behind the circuit editor:
//! - Switches, indicators and the seven basic gates
//! - Wiring rules (output to input, one source per input)
//! - Bounded, deterministic signal propagation
//!
//! ## Architecture
//!
//! A [`Circuit`] owns its nodes and wires in insertion order. Each node owns
//! its ports exclusively. Propagation resolves wires to arena indices and
//! relaxes for one pass per node, which settles any acyclic circuit and
//! terminates on circuits with feedback.
//!
//! ```
//! use gatesim_graph::{propagate, Circuit, NodeKind};
//!
//! let mut circuit = Circuit::new("inverter");
//! let switch = circuit.add_node(NodeKind::Input, [0.0, 0.0]);
//! let not = circuit.add_node(NodeKind::Not, [100.0, 0.0]);
//! let lamp = circuit.add_node(NodeKind::Output, [200.0, 0.0]);
//!
//! let out = circuit.node(switch).unwrap().outputs()[0].id;
//! let inp = circuit.node(not).unwrap().inputs()[0].id;
//! circuit.connect(switch, out, not, inp).unwrap();
//! let out = circuit.node(not).unwrap().outputs()[0].id;
//! let inp = circuit.node(lamp).unwrap().inputs()[0].id;
//! circuit.connect(not, out, lamp, inp).unwrap();
//!
//! circuit.set_input_value(switch, true).unwrap();
//! assert_eq!(propagate(&circuit).indicator(lamp), Some(false));
//! ```

pub mod node;
pub mod port;
pub mod connection;
pub mod circuit;
pub mod propagation;
pub mod simulator;
pub mod shared;

pub use node::{Node, NodeCategory, NodeId, NodeKind, UnknownNodeKind};
pub use port::{Port, PortDirection, PortId};
pub use connection::{Connection, ConnectionId};
pub use circuit::{Circuit, CircuitError, ConnectionError};
pub use propagation::{
    propagate, propagate_in_place, propagate_in_place_with, propagate_with, PassBudget,
    PropagationConfig, PropagationStats,
};
pub use simulator::Simulator;
pub use shared::SharedCircuit;
