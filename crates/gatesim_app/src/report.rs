// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text reports of circuit state.

use crate::document::Labels;
use gatesim_graph::{propagate_in_place_with, Circuit, Node, NodeId, PropagationConfig};
use std::fmt::Write as _;

/// Error producing a report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Too many switches to enumerate
    #[error("Circuit has {found} switches; truth tables are limited to {limit}")]
    TooManyInputs {
        /// Switches in the circuit
        found: usize,
        /// Configured limit
        limit: usize,
    },
}

fn display_name<'a>(node: &'a Node, labels: &'a Labels) -> &'a str {
    labels.label_of(node.id).unwrap_or(node.name.as_str())
}

fn bit(value: bool) -> char {
    if value {
        '1'
    } else {
        '0'
    }
}

/// One line per indicator: `label = 0|1`
pub fn render_indicators(circuit: &Circuit, labels: &Labels) -> String {
    let mut out = String::new();
    for node in circuit.indicators() {
        let value = circuit.indicator(node.id).unwrap_or(false);
        let _ = writeln!(out, "{} = {}", display_name(node, labels), bit(value));
    }
    out
}

/// Every node with all of its port values
pub fn render_ports(circuit: &Circuit, labels: &Labels) -> String {
    let mut out = String::new();
    for node in circuit.nodes() {
        let _ = writeln!(out, "{} ({})", display_name(node, labels), node.kind);
        for port in node.ports() {
            let _ = writeln!(out, "  {} = {}", port.name, bit(port.value));
        }
    }
    out
}

/// Indicator values for every combination of switch states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    /// Switch names, most significant first
    pub inputs: Vec<String>,
    /// Indicator names
    pub outputs: Vec<String>,
    /// `(switch values, indicator values)` in counting order
    pub rows: Vec<(Vec<bool>, Vec<bool>)>,
}

impl TruthTable {
    /// Enumerate all switch combinations.
    ///
    /// Each row is computed on a private copy of the circuit, which is left
    /// untouched.
    pub fn build(
        circuit: &Circuit,
        labels: &Labels,
        config: PropagationConfig,
        limit: usize,
    ) -> Result<Self, ReportError> {
        let switches: Vec<NodeId> = circuit.switches().map(|n| n.id).collect();
        let lamps: Vec<NodeId> = circuit.indicators().map(|n| n.id).collect();
        if switches.len() > limit {
            return Err(ReportError::TooManyInputs {
                found: switches.len(),
                limit,
            });
        }

        let names = |ids: &[NodeId]| -> Vec<String> {
            ids.iter()
                .filter_map(|id| circuit.node(*id))
                .map(|n| display_name(n, labels).to_string())
                .collect()
        };

        let width = switches.len();
        let mut scratch = circuit.clone();
        let mut rows = Vec::with_capacity(1 << width);
        for combination in 0..(1usize << width) {
            let values: Vec<bool> = (0..width)
                .map(|i| combination & (1 << (width - 1 - i)) != 0)
                .collect();
            for (id, value) in switches.iter().zip(&values) {
                // Switch IDs come from this circuit, so the write cannot fail
                let _ = scratch.set_input_value(*id, *value);
            }
            propagate_in_place_with(&mut scratch, config);
            let outputs: Vec<bool> = lamps
                .iter()
                .map(|id| scratch.indicator(*id).unwrap_or(false))
                .collect();
            rows.push((values, outputs));
        }

        tracing::debug!("Built truth table with {} row(s)", rows.len());
        Ok(Self {
            inputs: names(&switches),
            outputs: names(&lamps),
            rows,
        })
    }

    /// Render as an aligned text table
    pub fn render(&self) -> String {
        let header_in: Vec<&str> = self.inputs.iter().map(String::as_str).collect();
        let header_out: Vec<&str> = self.outputs.iter().map(String::as_str).collect();

        let mut out = String::new();
        let _ = writeln!(out, "{} | {}", header_in.join(" "), header_out.join(" "));
        for (inputs, outputs) in &self.rows {
            let left = cells(inputs, &header_in);
            let right = cells(outputs, &header_out);
            let _ = writeln!(out, "{left} | {right}");
        }
        out
    }
}

/// Bits padded to their column headers
fn cells(values: &[bool], headers: &[&str]) -> String {
    values
        .iter()
        .zip(headers)
        .map(|(value, header)| format!("{:<width$}", bit(*value), width = header.len().max(1)))
        .collect::<Vec<_>>()
        .join(" ")
}
