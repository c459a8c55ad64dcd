// SPDX-License-Identifier: MIT OR Apache-2.0
//! Thread-safe handle to a live circuit.
//!
//! A mutation and the propagation that follows it happen under one write
//! lock, so no reader can see a structural change without its signals.

use crate::circuit::Circuit;
use crate::simulator::Simulator;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, lock-guarded [`Simulator`]
#[derive(Debug, Clone, Default)]
pub struct SharedCircuit {
    inner: Arc<RwLock<Simulator>>,
}

impl SharedCircuit {
    /// Share a circuit, propagating it once
    pub fn new(circuit: Circuit) -> Self {
        Self::from_simulator(Simulator::new(circuit))
    }

    /// Share an existing simulator
    pub fn from_simulator(simulator: Simulator) -> Self {
        Self {
            inner: Arc::new(RwLock::new(simulator)),
        }
    }

    /// Apply an edit with exclusive access.
    ///
    /// Every [`Simulator`] mutation re-propagates before returning, so the
    /// lock is released only once signals are consistent again.
    pub fn edit<R>(&self, f: impl FnOnce(&mut Simulator) -> R) -> R {
        let mut guard = self.inner.write();
        f(&mut *guard)
    }

    /// Read the current circuit under a shared lock
    pub fn read<R>(&self, f: impl FnOnce(&Circuit) -> R) -> R {
        let guard = self.inner.read();
        f(guard.circuit())
    }

    /// Owned copy of the current circuit
    pub fn snapshot(&self) -> Circuit {
        self.read(Circuit::clone)
    }
}
