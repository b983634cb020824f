//! Pauli strings and the rotations they generate

use crate::matrices::{flatten, PAULI_X, PAULI_Y, PAULI_Z};
use crate::matrix_ops::{identity, tensor_product};
use crate::standard::{CNot, Hadamard};
use num_complex::Complex64;
use rhosim_core::gate::Gate;
use rhosim_core::{Operation, QuantumError, QuditId, Result};
use std::fmt;
use std::sync::Arc;

/// Single-qubit Pauli operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pauli {
    X,
    Y,
    Z,
}

impl Pauli {
    pub const ALL: [Pauli; 3] = [Pauli::X, Pauli::Y, Pauli::Z];

    /// The 2x2 matrix of this Pauli
    pub fn matrix(self) -> [[Complex64; 2]; 2] {
        match self {
            Pauli::X => PAULI_X,
            Pauli::Y => PAULI_Y,
            Pauli::Z => PAULI_Z,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Tensor product of Paulis on distinct qubits
///
/// # Example
/// ```
/// use rhosim_core::QuditId;
/// use rhosim_gates::pauli::{Pauli, PauliString};
///
/// let zz = PauliString::new(vec![(QuditId::new(0), Pauli::Z), (QuditId::new(1), Pauli::Z)]).unwrap();
/// assert_eq!(zz.to_string(), "Z(q0)*Z(q1)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauliString {
    terms: Vec<(QuditId, Pauli)>,
}

impl PauliString {
    /// # Errors
    /// Returns error on an empty string, a repeated qubit or a non-qubit qudit
    pub fn new(terms: Vec<(QuditId, Pauli)>) -> Result<Self> {
        if terms.is_empty() {
            return Err(QuantumError::InvalidParameter(
                "Pauli string must act on at least one qubit".to_string(),
            ));
        }
        for (i, &(q, _)) in terms.iter().enumerate() {
            if !q.is_qubit() {
                return Err(QuantumError::DimensionMismatch {
                    gate: "PauliString".to_string(),
                    qudit: q,
                    expected: 2,
                    actual: q.dimension(),
                });
            }
            if terms[..i].iter().any(|&(other, _)| other == q) {
                return Err(QuantumError::DuplicateQudit(q));
            }
        }
        Ok(Self { terms })
    }

    /// Single-qubit Pauli string
    pub fn single(qubit: QuditId, pauli: Pauli) -> Result<Self> {
        Self::new(vec![(qubit, pauli)])
    }

    pub fn qudits(&self) -> Vec<QuditId> {
        self.terms.iter().map(|&(q, _)| q).collect()
    }

    pub fn paulis(&self) -> Vec<Pauli> {
        self.terms.iter().map(|&(_, p)| p).collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Rotation `exp(-iπ·t/2·P)` generated by this string
    pub fn rotation(&self, half_turns: f64) -> Result<Operation> {
        let gate = PauliStringPhasorGate::rotation(self.paulis(), half_turns);
        Operation::new(Arc::new(gate), &self.qudits())
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (q, p)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            write!(f, "{}({})", p, q)?;
        }
        Ok(())
    }
}

/// Phase rotation in the eigenspaces of a Pauli string
///
/// The +1 eigenspace picks up `e^{iπ·exponent_pos}` and the -1 eigenspace
/// `e^{iπ·exponent_neg}`:
///
/// ```text
/// U = e^{iπ·pos} (I + P)/2 + e^{iπ·neg} (I - P)/2
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PauliStringPhasorGate {
    paulis: Vec<Pauli>,
    exponent_neg: f64,
    exponent_pos: f64,
    name: String,
}

impl PauliStringPhasorGate {
    pub fn new(paulis: Vec<Pauli>, exponent_neg: f64, exponent_pos: f64) -> Self {
        let letters: String = paulis.iter().map(|p| p.letter()).collect();
        Self {
            name: format!("Phasor[{}]", letters),
            paulis,
            exponent_neg,
            exponent_pos,
        }
    }

    /// `exp(-iπ·t/2·P)`, i.e. a rotation by `π·t` radians about `P`
    pub fn rotation(paulis: Vec<Pauli>, half_turns: f64) -> Self {
        Self::new(paulis, half_turns / 2.0, -half_turns / 2.0)
    }

    pub fn paulis(&self) -> &[Pauli] {
        &self.paulis
    }

    pub fn exponent_neg(&self) -> f64 {
        self.exponent_neg
    }

    pub fn exponent_pos(&self) -> f64 {
        self.exponent_pos
    }

    /// Relative phase between the eigenspaces, in half turns
    pub fn half_turns(&self) -> f64 {
        self.exponent_neg - self.exponent_pos
    }

    fn pauli_product(&self) -> (Vec<Complex64>, usize) {
        self.paulis
            .iter()
            .fold((identity(1), 1), |(acc, n), p| {
                (tensor_product(&acc, n, &flatten(&p.matrix()), 2), n * 2)
            })
    }
}

impl Gate for PauliStringPhasorGate {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qudits(&self) -> usize {
        self.paulis.len()
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        let (p, n) = self.pauli_product();
        let id = identity(n);
        let pos = Complex64::from_polar(1.0, std::f64::consts::PI * self.exponent_pos);
        let neg = Complex64::from_polar(1.0, std::f64::consts::PI * self.exponent_neg);
        Some(
            id.iter()
                .zip(&p)
                .map(|(&i, &pv)| pos * (i + pv) * 0.5 + neg * (i - pv) * 0.5)
                .collect(),
        )
    }

    /// Basis change onto Z, a CNOT parity ladder and one Z phasor on the
    /// last qubit. Single-qubit phasors do not decompose.
    fn decompose(&self, qudits: &[QuditId]) -> Option<Vec<Operation>> {
        if qudits.len() < 2 || qudits.len() != self.paulis.len() {
            return None;
        }

        let mut into_z = Vec::new();
        let mut out_of_z = Vec::new();
        for (&q, &pauli) in qudits.iter().zip(&self.paulis) {
            match pauli {
                Pauli::X => {
                    into_z.push(Operation::new(Arc::new(Hadamard), &[q]).ok()?);
                    out_of_z.push(Operation::new(Arc::new(Hadamard), &[q]).ok()?);
                }
                Pauli::Y => {
                    let to_z = Self::rotation(vec![Pauli::X], 0.5);
                    let from_z = Self::rotation(vec![Pauli::X], -0.5);
                    into_z.push(Operation::new(Arc::new(to_z), &[q]).ok()?);
                    out_of_z.push(Operation::new(Arc::new(from_z), &[q]).ok()?);
                }
                Pauli::Z => {}
            }
        }

        let ladder = qudits
            .windows(2)
            .map(|pair| Operation::new(Arc::new(CNot), pair).ok())
            .collect::<Option<Vec<_>>>()?;
        let last = qudits[qudits.len() - 1];
        let phase = Self::new(vec![Pauli::Z], self.exponent_neg, self.exponent_pos);

        let mut ops = into_z;
        ops.extend(ladder.iter().cloned());
        ops.push(Operation::new(Arc::new(phase), &[last]).ok()?);
        ops.extend(ladder.into_iter().rev());
        ops.extend(out_of_z);
        Some(ops)
    }

    fn description(&self) -> String {
        format!("{}**{}", self.name, self.half_turns())
    }
}
