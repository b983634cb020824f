//! Conversion of single-qubit unitaries into Pauli-string phasors
//!
//! Every single-qubit unitary that is not already in canonical form is
//! rewritten as Z, X, Z rotations ([`PauliStringPhasorGate`]s). With
//! `keep_clifford` set, Clifford unitaries become one
//! [`SingleQubitCliffordGate`] and quarter or half turns in the rotation
//! sequence are emitted as Clifford gates as well.

use super::target_gateset::is_cz;
use super::{lay_out, OptimizationPass};
use crate::matrix_utils::{to_2x2, zxz_decomposition};
use rhosim_core::{Circuit, FailurePolicy, Operation, QuantumError, QuditId, Result};
use rhosim_gates::{Pauli, PauliString, SingleQubitCliffordGate};
use std::sync::Arc;
use tracing::{debug, warn};

/// What the pass does with one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    /// Left as is
    Keep,
    /// Single-qubit unitary to rewrite
    Convert,
    /// Nothing this pass can express
    Unsupported,
}

/// Rewrites single-qubit unitaries as Pauli-string phasor rotations
///
/// CZ, measurements, channels and gates already in canonical form pass
/// through unchanged. Anything else is unsupported: an error under
/// [`FailurePolicy::Strict`], left in place under
/// [`FailurePolicy::BestEffort`].
///
/// # Example
/// ```
/// use rhosim_compiler::passes::{ConvertToPauliStringPhasors, OptimizationPass};
/// use rhosim_core::{Circuit, QuditId};
/// use rhosim_gates::TGate;
/// use std::sync::Arc;
///
/// let mut circuit = Circuit::new();
/// circuit.append_gate(Arc::new(TGate), &[QuditId::new(0)]).unwrap();
///
/// let pass = ConvertToPauliStringPhasors::new();
/// assert!(pass.apply(&mut circuit).unwrap());
/// assert_eq!(circuit.operations().next().unwrap().gate().name(), "Phasor[Z]");
/// ```
#[derive(Debug, Clone)]
pub struct ConvertToPauliStringPhasors {
    keep_clifford: bool,
    atol: f64,
    failure_policy: FailurePolicy,
}

impl ConvertToPauliStringPhasors {
    pub fn new() -> Self {
        Self {
            keep_clifford: true,
            atol: 1e-8,
            failure_policy: FailurePolicy::Strict,
        }
    }

    /// Emit Clifford gates for Clifford unitaries and quarter turns
    pub fn with_keep_clifford(mut self, keep_clifford: bool) -> Self {
        self.keep_clifford = keep_clifford;
        self
    }

    /// Tolerance for Clifford detection and dropping negligible rotations
    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    fn is_canonical(&self, op: &Operation) -> bool {
        let name = op.gate().name();
        name.starts_with("Phasor[") || (self.keep_clifford && name.starts_with("Clifford("))
    }

    fn classify(&self, op: &Operation) -> Conversion {
        let gate = op.gate();
        if gate.measurement_key().is_some() || self.is_canonical(op) || is_cz(op, self.atol) {
            return Conversion::Keep;
        }
        if !gate.is_unitary() {
            return match gate.kraus() {
                Some(_) => Conversion::Keep,
                None => Conversion::Unsupported,
            };
        }
        match op.qudits() {
            [q] if q.is_qubit() => Conversion::Convert,
            _ => Conversion::Unsupported,
        }
    }

    /// Rewrite one single-qubit unitary
    fn convert(&self, op: &Operation) -> Result<Vec<Operation>> {
        let qubit = op.qudits()[0];
        let unitary = op
            .matrix()
            .ok_or_else(|| QuantumError::unsupported(op, "unitary has no matrix"))?;
        let u = to_2x2(&unitary)
            .ok_or_else(|| QuantumError::invalid_matrix(op.gate().name(), "expected a 2x2 matrix"))?;

        if self.keep_clifford {
            if let Some(clifford) = SingleQubitCliffordGate::from_unitary(&unitary, self.atol) {
                if clifford.is_identity() {
                    return Ok(Vec::new());
                }
                return Ok(vec![Operation::new(Arc::new(clifford), &[qubit])?]);
            }
        }

        let angles = zxz_decomposition(&u, self.atol);
        let mut rotations = Vec::with_capacity(3);
        for (pauli, half_turns) in [
            (Pauli::Z, angles.before),
            (Pauli::X, angles.x),
            (Pauli::Z, angles.after),
        ] {
            if let Some(rotation) = self.rotation(qubit, pauli, half_turns)? {
                rotations.push(rotation);
            }
        }
        Ok(rotations)
    }

    fn rotation(&self, qubit: QuditId, pauli: Pauli, half_turns: f64) -> Result<Option<Operation>> {
        if half_turns.abs() <= self.atol {
            return Ok(None);
        }
        if self.keep_clifford {
            let quarter_turns = (2.0 * half_turns).round();
            if (half_turns - quarter_turns / 2.0).abs() <= self.atol {
                if let Some(clifford) =
                    SingleQubitCliffordGate::from_quarter_turns(pauli, quarter_turns as i32)
                {
                    return Ok(Some(Operation::new(Arc::new(clifford), &[qubit])?));
                }
            }
        }
        PauliString::single(qubit, pauli)?
            .rotation(half_turns)
            .map(Some)
    }
}

impl Default for ConvertToPauliStringPhasors {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationPass for ConvertToPauliStringPhasors {
    fn name(&self) -> &str {
        "convert-to-pauli-string-phasors"
    }

    fn apply(&self, circuit: &mut Circuit) -> Result<bool> {
        let mut modified = false;
        let mut moments = Vec::with_capacity(circuit.num_moments());

        for moment in circuit.moments() {
            let mut replacements = Vec::with_capacity(moment.len());
            for op in moment.operations() {
                match self.classify(op) {
                    Conversion::Keep => replacements.push(vec![op.clone()]),
                    Conversion::Convert => {
                        let converted = self.convert(op)?;
                        debug!(operation = %op, rotations = converted.len(), "converted");
                        replacements.push(converted);
                        modified = true;
                    }
                    Conversion::Unsupported if self.failure_policy.ignores_failures() => {
                        warn!(operation = %op, "left unconverted");
                        replacements.push(vec![op.clone()]);
                    }
                    Conversion::Unsupported => {
                        return Err(QuantumError::unsupported(
                            op,
                            "not a single-qubit unitary, CZ, channel or measurement",
                        ));
                    }
                }
            }
            moments.extend(lay_out(replacements)?);
        }

        if modified {
            *circuit = Circuit::from_moments(moments);
        }
        Ok(modified)
    }

    fn description(&self) -> Option<&str> {
        Some("Rewrites single-qubit unitaries as Pauli-string phasors and Clifford gates")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhosim_core::gate::Gate;
    use rhosim_gates::matrix_ops::{approx_eq_up_to_phase, identity, multiply};
    use rhosim_gates::{
        CNot, DepolarizingChannel, Hadamard, MeasurementGate, PauliStringPhasorGate, QuditShift,
        RotationY, SGate, CZ,
    };

    fn single(gate: impl Gate + 'static) -> Circuit {
        let mut circuit = Circuit::new();
        circuit
            .append_gate(Arc::new(gate), &[QuditId::new(0)])
            .unwrap();
        circuit
    }

    fn names(circuit: &Circuit) -> Vec<String> {
        circuit
            .operations()
            .map(|op| op.gate().name().to_string())
            .collect()
    }

    /// Product of a single-qubit circuit's matrices
    fn unitary_of(circuit: &Circuit) -> Vec<num_complex::Complex64> {
        circuit.operations().fold(identity(2), |acc, op| {
            multiply(&op.matrix().unwrap(), &acc, 2)
        })
    }

    #[test]
    fn test_clifford_kept_whole() {
        let mut circuit = single(Hadamard);
        assert!(ConvertToPauliStringPhasors::new().apply(&mut circuit).unwrap());
        assert_eq!(names(&circuit), vec!["Clifford(X:+Z, Z:+X)"]);
    }

    #[test]
    fn test_hadamard_without_clifford() {
        let mut circuit = single(Hadamard);
        let pass = ConvertToPauliStringPhasors::new().with_keep_clifford(false);
        assert!(pass.apply(&mut circuit).unwrap());
        assert_eq!(names(&circuit), vec!["Phasor[Z]", "Phasor[X]", "Phasor[Z]"]);
        assert_eq!(circuit.num_moments(), 3);
        assert!(approx_eq_up_to_phase(
            &unitary_of(&circuit),
            &Hadamard.matrix().unwrap(),
            1e-9
        ));
    }

    #[test]
    fn test_general_rotation() {
        let original = single(RotationY::new(0.8));
        let mut circuit = original.clone();
        ConvertToPauliStringPhasors::new().apply(&mut circuit).unwrap();
        assert!(approx_eq_up_to_phase(
            &unitary_of(&circuit),
            &unitary_of(&original),
            1e-9
        ));
        assert!(names(&circuit).iter().any(|n| n == "Phasor[X]"));
    }

    #[test]
    fn test_quarter_turns_become_clifford() {
        // S·RX(0.3π)·S has quarter-turn Z rotations around a generic X rotation
        let s = SGate.matrix().unwrap();
        let rx = PauliStringPhasorGate::rotation(vec![Pauli::X], 0.3)
            .matrix()
            .unwrap();
        let u = multiply(&s, &multiply(&rx, &s, 2), 2);
        let original = single(rhosim_gates::MatrixGate::new(u, vec![2]).unwrap());

        let mut circuit = original.clone();
        ConvertToPauliStringPhasors::new().apply(&mut circuit).unwrap();
        let names = names(&circuit);
        assert_eq!(names.len(), 3);
        assert!(names[0].starts_with("Clifford("));
        assert_eq!(names[1], "Phasor[X]");
        assert!(names[2].starts_with("Clifford("));
        assert!(approx_eq_up_to_phase(
            &unitary_of(&circuit),
            &unitary_of(&original),
            1e-9
        ));
    }

    #[test]
    fn test_identity_dropped() {
        let mut circuit = single(rhosim_gates::Identity);
        assert!(ConvertToPauliStringPhasors::new().apply(&mut circuit).unwrap());
        assert!(circuit.is_empty());

        let mut circuit = single(rhosim_gates::Identity);
        let pass = ConvertToPauliStringPhasors::new().with_keep_clifford(false);
        pass.apply(&mut circuit).unwrap();
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_pass_through() {
        let q = QuditId::range(0, 2);
        let mut circuit = Circuit::new();
        circuit.append_gate(Arc::new(CZ), &q).unwrap();
        circuit
            .append_gate(Arc::new(DepolarizingChannel::new(0.05).unwrap()), &[q[0]])
            .unwrap();
        circuit.append(MeasurementGate::on("m", &q).unwrap());
        circuit.append(PauliString::single(q[1], Pauli::Y).unwrap().rotation(0.2).unwrap());
        let before = circuit.clone();

        assert!(!ConvertToPauliStringPhasors::new().apply(&mut circuit).unwrap());
        assert!(circuit.approx_eq(&before, 0.0));
    }

    #[test]
    fn test_unsupported_policy() {
        let q = QuditId::range(0, 2);
        let mut circuit = Circuit::new();
        circuit.append_gate(Arc::new(CNot), &q).unwrap();
        let qutrit = QuditId::with_dimension(2, 3).unwrap();
        circuit.append_gate(Arc::new(QuditShift::new(3)), &[qutrit]).unwrap();

        let strict = ConvertToPauliStringPhasors::new();
        let err = strict.apply(&mut circuit.clone()).unwrap_err();
        assert!(err.to_string().contains("CNOT(q0, q1)"));

        let lenient = strict.with_failure_policy(FailurePolicy::BestEffort);
        let before = circuit.clone();
        assert!(!lenient.apply(&mut circuit).unwrap());
        assert!(circuit.approx_eq(&before, 0.0));
    }
}
