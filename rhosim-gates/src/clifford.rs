//! Single-qubit Clifford gates
//!
//! A single-qubit Clifford is determined, up to global phase, by where its
//! conjugation action sends X and Z. That pair is the identity of the gate;
//! the stored matrix is normalized so two gates with the same action carry
//! the same matrix.

use crate::matrices::flatten;
use crate::matrix_ops::{adjoint, approx_eq, is_unitary, multiply};
use crate::pauli::{Pauli, PauliStringPhasorGate};
use num_complex::Complex64;
use rhosim_core::gate::Gate;
use std::fmt;

/// A Pauli with a sign, `(-1)^flip · P`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignedPauli {
    pub pauli: Pauli,
    pub flip: bool,
}

impl fmt::Display for SignedPauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.flip { '-' } else { '+' }, self.pauli)
    }
}

/// Single-qubit Clifford gate
#[derive(Debug, Clone)]
pub struct SingleQubitCliffordGate {
    x_to: SignedPauli,
    z_to: SignedPauli,
    matrix: Vec<Complex64>,
    name: String,
}

impl SingleQubitCliffordGate {
    /// Identify `unitary` (flattened 2x2) as a Clifford, if it is one
    ///
    /// Returns `None` when `unitary` is not a unitary 2x2 matrix or does not
    /// map Paulis to signed Paulis within `atol`.
    pub fn from_unitary(unitary: &[Complex64], atol: f64) -> Option<Self> {
        if unitary.len() != 4 || !is_unitary(unitary, 2, atol) {
            return None;
        }
        let x_to = conjugate_pauli(unitary, Pauli::X, atol)?;
        let z_to = conjugate_pauli(unitary, Pauli::Z, atol)?;
        Some(Self {
            name: format!("Clifford(X:{}, Z:{})", x_to, z_to),
            x_to,
            z_to,
            matrix: normalize_phase(unitary),
        })
    }

    /// Quarter-turn rotation `exp(-iπ·q/4·P)` as a Clifford
    pub fn from_quarter_turns(pauli: Pauli, quarter_turns: i32) -> Option<Self> {
        let rotation = PauliStringPhasorGate::rotation(vec![pauli], quarter_turns as f64 / 2.0);
        Self::from_unitary(&rotation.matrix()?, 1e-10)
    }

    /// Where this gate sends X under conjugation
    pub fn x_to(&self) -> SignedPauli {
        self.x_to
    }

    /// Where this gate sends Z under conjugation
    pub fn z_to(&self) -> SignedPauli {
        self.z_to
    }

    pub fn is_identity(&self) -> bool {
        self.x_to
            == SignedPauli {
                pauli: Pauli::X,
                flip: false,
            }
            && self.z_to
                == SignedPauli {
                    pauli: Pauli::Z,
                    flip: false,
                }
    }
}

impl PartialEq for SingleQubitCliffordGate {
    fn eq(&self, other: &Self) -> bool {
        self.x_to == other.x_to && self.z_to == other.z_to
    }
}

impl Eq for SingleQubitCliffordGate {}

impl Gate for SingleQubitCliffordGate {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qudits(&self) -> usize {
        1
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        Some(self.matrix.clone())
    }
}

fn conjugate_pauli(unitary: &[Complex64], pauli: Pauli, atol: f64) -> Option<SignedPauli> {
    let conjugated = multiply(
        &multiply(unitary, &flatten(&pauli.matrix()), 2),
        &adjoint(unitary, 2),
        2,
    );
    Pauli::ALL.iter().find_map(|&candidate| {
        let m = flatten(&candidate.matrix());
        if approx_eq(&conjugated, &m, atol) {
            return Some(SignedPauli {
                pauli: candidate,
                flip: false,
            });
        }
        let negated: Vec<_> = m.iter().map(|v| -v).collect();
        approx_eq(&conjugated, &negated, atol).then_some(SignedPauli {
            pauli: candidate,
            flip: true,
        })
    })
}

/// Rotate the global phase so the first entry of magnitude ≥ 1/2 is real
/// and positive. Clifford entries have magnitudes in {0, 1/√2, 1}, so the
/// chosen entry does not depend on rounding.
fn normalize_phase(unitary: &[Complex64]) -> Vec<Complex64> {
    let pivot = unitary
        .iter()
        .find(|v| v.norm() >= 0.5)
        .copied()
        .unwrap_or(Complex64::new(1.0, 0.0));
    let correction = pivot.conj() / pivot.norm();
    unitary.iter().map(|v| v * correction).collect()
}
