//! Standard quantum gate implementations with pre-computed matrices

use crate::matrices::{self, flatten};
use num_complex::Complex64;
use rhosim_core::gate::Gate;
use rhosim_core::{Operation, QuditId};
use std::sync::Arc;

/// Implements a fixed-matrix gate
macro_rules! fixed_gate {
    ($(#[$meta:meta])* $gate_type:ident, $name:expr, $matrix:expr, $arity:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $gate_type;

        impl $gate_type {
            /// Returns the pre-computed gate matrix
            #[inline]
            pub const fn const_matrix() -> &'static [[Complex64; 1 << $arity]; 1 << $arity] {
                $matrix
            }
        }

        impl Gate for $gate_type {
            fn name(&self) -> &str {
                $name
            }

            fn num_qudits(&self) -> usize {
                $arity
            }

            fn matrix(&self) -> Option<Vec<Complex64>> {
                Some(flatten(Self::const_matrix()))
            }
        }
    };
}

// ============================================================================
// Single-Qubit Gates
// ============================================================================

fixed_gate!(
    /// Identity gate (no-op)
    Identity,
    "I",
    &matrices::IDENTITY,
    1
);

fixed_gate!(
    /// Pauli-X gate (bit flip)
    PauliX,
    "X",
    &matrices::PAULI_X,
    1
);

fixed_gate!(
    /// Pauli-Y gate
    PauliY,
    "Y",
    &matrices::PAULI_Y,
    1
);

fixed_gate!(
    /// Pauli-Z gate (phase flip)
    PauliZ,
    "Z",
    &matrices::PAULI_Z,
    1
);

fixed_gate!(
    /// Hadamard gate
    ///
    /// Creates superposition: H|0⟩ = (|0⟩ + |1⟩)/√2
    Hadamard,
    "H",
    &matrices::HADAMARD,
    1
);

fixed_gate!(
    /// S gate (√Z)
    SGate,
    "S",
    &matrices::S_GATE,
    1
);

fixed_gate!(
    /// T gate (√S)
    TGate,
    "T",
    &matrices::T_GATE,
    1
);

/// Rotation about the X axis: RX(θ) = exp(-iθX/2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationX {
    theta: f64,
}

impl RotationX {
    pub fn new(theta: f64) -> Self {
        Self { theta }
    }

    pub fn angle(&self) -> f64 {
        self.theta
    }
}

impl Gate for RotationX {
    fn name(&self) -> &str {
        "RX"
    }

    fn num_qudits(&self) -> usize {
        1
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        let c = Complex64::new((self.theta / 2.0).cos(), 0.0);
        let s = Complex64::new(0.0, -(self.theta / 2.0).sin());
        Some(vec![c, s, s, c])
    }

    fn description(&self) -> String {
        format!("RX({})", self.theta)
    }
}

/// Rotation about the Y axis: RY(θ) = exp(-iθY/2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationY {
    theta: f64,
}

impl RotationY {
    pub fn new(theta: f64) -> Self {
        Self { theta }
    }

    pub fn angle(&self) -> f64 {
        self.theta
    }
}

impl Gate for RotationY {
    fn name(&self) -> &str {
        "RY"
    }

    fn num_qudits(&self) -> usize {
        1
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        let c = Complex64::new((self.theta / 2.0).cos(), 0.0);
        let s = Complex64::new((self.theta / 2.0).sin(), 0.0);
        Some(vec![c, -s, s, c])
    }

    fn description(&self) -> String {
        format!("RY({})", self.theta)
    }
}

/// Rotation about the Z axis: RZ(θ) = exp(-iθZ/2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationZ {
    theta: f64,
}

impl RotationZ {
    pub fn new(theta: f64) -> Self {
        Self { theta }
    }

    pub fn angle(&self) -> f64 {
        self.theta
    }
}

impl Gate for RotationZ {
    fn name(&self) -> &str {
        "RZ"
    }

    fn num_qudits(&self) -> usize {
        1
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        let half = self.theta / 2.0;
        Some(vec![
            Complex64::from_polar(1.0, -half),
            matrices::ZERO,
            matrices::ZERO,
            Complex64::from_polar(1.0, half),
        ])
    }

    fn description(&self) -> String {
        format!("RZ({})", self.theta)
    }
}

// ============================================================================
// Two-Qubit Gates
// ============================================================================

fixed_gate!(
    /// Controlled-Z gate, the interaction gate of the canonical gate set
    CZ,
    "CZ",
    &matrices::CZ,
    2
);

/// Controlled-NOT gate, control first
///
/// Applies directly through its matrix and also decomposes into `H·CZ·H`
/// on the target for gate-set retargeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CNot;

impl CNot {
    #[inline]
    pub const fn const_matrix() -> &'static [[Complex64; 4]; 4] {
        &matrices::CNOT
    }
}

impl Gate for CNot {
    fn name(&self) -> &str {
        "CNOT"
    }

    fn num_qudits(&self) -> usize {
        2
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        Some(flatten(Self::const_matrix()))
    }

    fn decompose(&self, qudits: &[QuditId]) -> Option<Vec<Operation>> {
        let &[control, target] = qudits else {
            return None;
        };
        Some(vec![
            Operation::new(Arc::new(Hadamard), &[target]).ok()?,
            Operation::new(Arc::new(CZ), &[control, target]).ok()?,
            Operation::new(Arc::new(Hadamard), &[target]).ok()?,
        ])
    }
}

/// SWAP gate; decomposes into three CNOTs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Swap;

impl Swap {
    #[inline]
    pub const fn const_matrix() -> &'static [[Complex64; 4]; 4] {
        &matrices::SWAP
    }
}

impl Gate for Swap {
    fn name(&self) -> &str {
        "SWAP"
    }

    fn num_qudits(&self) -> usize {
        2
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        Some(flatten(Self::const_matrix()))
    }

    fn decompose(&self, qudits: &[QuditId]) -> Option<Vec<Operation>> {
        let &[a, b] = qudits else {
            return None;
        };
        Some(vec![
            Operation::new(Arc::new(CNot), &[a, b]).ok()?,
            Operation::new(Arc::new(CNot), &[b, a]).ok()?,
            Operation::new(Arc::new(CNot), &[a, b]).ok()?,
        ])
    }
}

// ============================================================================
// Qudit Gates
// ============================================================================

/// Cyclic increment on a d-level qudit: |k⟩ → |k+1 mod d⟩
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuditShift {
    dimension: usize,
}

impl QuditShift {
    /// # Panics
    /// Panics if `dimension < 2`
    pub fn new(dimension: usize) -> Self {
        assert!(dimension >= 2, "Qudit dimension must be at least 2");
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Gate for QuditShift {
    fn name(&self) -> &str {
        "SHIFT"
    }

    fn num_qudits(&self) -> usize {
        1
    }

    fn qid_shape(&self) -> Vec<usize> {
        vec![self.dimension]
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        let d = self.dimension;
        let mut m = vec![matrices::ZERO; d * d];
        for k in 0..d {
            m[((k + 1) % d) * d + k] = matrices::ONE;
        }
        Some(m)
    }
}
