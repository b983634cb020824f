//! Retargeting onto single-qudit gates plus CZ

use super::{lay_out, OptimizationPass};
use rhosim_core::{Circuit, Operation, QuantumError, Result};
use rhosim_gates::matrices::{self, flatten};
use rhosim_gates::matrix_ops::approx_eq_up_to_phase;
use rhosim_gates::CZ;
use std::sync::Arc;
use tracing::debug;

/// Nested decompositions deeper than this are treated as unsupported
pub const MAX_DECOMPOSITION_DEPTH: usize = 64;

/// Whether `op` is a two-qubit unitary equal to CZ up to global phase
pub(crate) fn is_cz(op: &Operation, atol: f64) -> bool {
    if op.num_qudits() != 2 || !op.qudits().iter().all(|q| q.is_qubit()) {
        return false;
    }
    op.matrix()
        .map_or(false, |m| approx_eq_up_to_phase(&m, &flatten(&matrices::CZ), atol))
}

/// Rewrites every operation into the CZ gate set
///
/// The gate set is: measurements, channels, single-qudit unitaries and CZ.
/// Any other operation is replaced by its decomposition, recursively; the
/// replacement is laid out over new moments in place of the original one.
/// Two-qubit unitaries equal to CZ up to phase become CZ directly.
///
/// This pass is always strict: an operation outside the gate set without a
/// decomposition is an error.
///
/// # Example
/// ```
/// use rhosim_compiler::passes::{CzTargetGateset, OptimizationPass};
/// use rhosim_core::{Circuit, QuditId};
/// use rhosim_gates::CNot;
/// use std::sync::Arc;
///
/// let mut circuit = Circuit::new();
/// circuit.append_gate(Arc::new(CNot), &QuditId::range(0, 2)).unwrap();
///
/// assert!(CzTargetGateset::default().apply(&mut circuit).unwrap());
/// assert_eq!(circuit.num_moments(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct CzTargetGateset {
    atol: f64,
}

impl CzTargetGateset {
    pub fn new(atol: f64) -> Self {
        Self { atol }
    }

    /// Whether `op` needs no rewriting
    pub fn is_in_gateset(&self, op: &Operation) -> bool {
        let gate = op.gate();
        if gate.measurement_key().is_some() {
            return true;
        }
        if !gate.is_unitary() {
            return gate.kraus().is_some();
        }
        op.num_qudits() == 1 || (gate.name() == "CZ" && is_cz(op, self.atol))
    }

    fn retarget(&self, op: &Operation, depth: usize) -> Result<Vec<Operation>> {
        if self.is_in_gateset(op) {
            return Ok(vec![op.clone()]);
        }
        if is_cz(op, self.atol) {
            return Ok(vec![Operation::new(Arc::new(CZ), op.qudits())?]);
        }
        if depth >= MAX_DECOMPOSITION_DEPTH {
            return Err(QuantumError::unsupported(
                op,
                format!("decomposition deeper than {}", MAX_DECOMPOSITION_DEPTH),
            ));
        }
        let parts = op
            .decompose()
            .ok_or_else(|| QuantumError::unsupported(op, "no decomposition into the CZ gate set"))?;

        let mut retargeted = Vec::with_capacity(parts.len());
        for part in &parts {
            retargeted.extend(self.retarget(part, depth + 1)?);
        }
        Ok(retargeted)
    }
}

impl Default for CzTargetGateset {
    fn default() -> Self {
        Self::new(1e-8)
    }
}

impl OptimizationPass for CzTargetGateset {
    fn name(&self) -> &str {
        "cz-target-gateset"
    }

    fn apply(&self, circuit: &mut Circuit) -> Result<bool> {
        let mut modified = false;
        let mut moments = Vec::with_capacity(circuit.num_moments());

        for moment in circuit.moments() {
            let mut replacements = Vec::with_capacity(moment.len());
            for op in moment.operations() {
                if self.is_in_gateset(op) {
                    replacements.push(vec![op.clone()]);
                    continue;
                }
                let retargeted = self.retarget(op, 0)?;
                debug!(operation = %op, replacement = retargeted.len(), "retargeted");
                replacements.push(retargeted);
                modified = true;
            }
            moments.extend(lay_out(replacements)?);
        }

        if modified {
            *circuit = Circuit::from_moments(moments);
        }
        Ok(modified)
    }

    fn description(&self) -> Option<&str> {
        Some("Rewrites operations into single-qudit gates, channels, measurements and CZ")
    }
}
