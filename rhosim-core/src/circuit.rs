//! Quantum circuit representation
//!
//! A [`Circuit`] is an ordered sequence of [`Moment`]s. Operations in one
//! moment act on pairwise-disjoint qudits and are considered simultaneous.

use crate::gate::Gate;
use crate::{Operation, QuantumError, QuditId, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Operations scheduled at the same time step
#[derive(Clone, Debug, Default)]
pub struct Moment {
    operations: Vec<Operation>,
}

impl Moment {
    /// Create an empty moment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a moment from operations
    ///
    /// # Errors
    /// Returns error if two operations share a qudit
    pub fn from_operations(operations: impl IntoIterator<Item = Operation>) -> Result<Self> {
        let mut moment = Self::new();
        for op in operations {
            moment.push(op)?;
        }
        Ok(moment)
    }

    /// Add an operation to this moment
    ///
    /// # Errors
    /// Returns error if the operation touches a qudit already in use
    pub fn push(&mut self, op: Operation) -> Result<()> {
        if let Some(&qudit) = op.qudits().iter().find(|&&q| self.operates_on(q)) {
            return Err(QuantumError::OverlappingMoment {
                operation: op.to_string(),
                qudit,
            });
        }
        self.operations.push(op);
        Ok(())
    }

    /// Whether any operation in this moment touches `qudit`
    pub fn operates_on(&self, qudit: QuditId) -> bool {
        self.operations.iter().any(|op| op.acts_on(qudit))
    }

    /// Whether any operation in this moment touches any of `qudits`
    pub fn operates_on_any(&self, qudits: &[QuditId]) -> bool {
        qudits.iter().any(|&q| self.operates_on(q))
    }

    /// The operation touching `qudit`, if any
    pub fn operation_at(&self, qudit: QuditId) -> Option<&Operation> {
        self.operations.iter().find(|op| op.acts_on(qudit))
    }

    /// Operations in this moment
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Remove operations for which `keep` returns false
    pub fn retain(&mut self, keep: impl FnMut(&Operation) -> bool) {
        self.operations.retain(keep);
    }

    /// Number of operations
    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the moment has no operations
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Compare operations pairwise with [`Operation::approx_eq`]
    pub fn approx_eq(&self, other: &Moment, atol: f64) -> bool {
        self.operations.len() == other.operations.len()
            && self
                .operations
                .iter()
                .zip(&other.operations)
                .all(|(a, b)| a.approx_eq(b, atol))
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", op)?;
        }
        write!(f, "]")
    }
}

/// A quantum circuit
///
/// # Example
/// ```
/// use rhosim_core::Circuit;
///
/// let circuit = Circuit::new();
/// assert_eq!(circuit.num_moments(), 0);
/// assert!(circuit.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    moments: Vec<Moment>,
}

impl Circuit {
    /// Create an empty circuit
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a circuit from a sequence of moments
    pub fn from_moments(moments: Vec<Moment>) -> Self {
        Self { moments }
    }

    /// Create a circuit by appending each operation with [`Circuit::append`]
    pub fn from_operations(operations: impl IntoIterator<Item = Operation>) -> Self {
        let mut circuit = Self::new();
        for op in operations {
            circuit.append(op);
        }
        circuit
    }

    /// Append an operation at the earliest moment after every moment that
    /// already touches one of its qudits
    pub fn append(&mut self, op: Operation) {
        let earliest = self
            .moments
            .iter()
            .rposition(|m| m.operates_on_any(op.qudits()))
            .map_or(0, |i| i + 1);

        if earliest == self.moments.len() {
            self.moments.push(Moment::new());
        }
        // The target moment is disjoint from op's qudits by construction.
        self.moments[earliest].operations.push(op);
    }

    /// Build an operation and append it
    ///
    /// # Errors
    /// Returns error if the operation is invalid
    pub fn append_gate(&mut self, gate: Arc<dyn Gate>, qudits: &[QuditId]) -> Result<()> {
        self.append(Operation::new(gate, qudits)?);
        Ok(())
    }

    /// Append a whole moment at the end
    pub fn push_moment(&mut self, moment: Moment) {
        self.moments.push(moment);
    }

    /// Moments in order
    pub fn moments(&self) -> &[Moment] {
        &self.moments
    }

    /// Take the moments out, leaving the circuit empty
    pub fn take_moments(&mut self) -> Vec<Moment> {
        std::mem::take(&mut self.moments)
    }

    /// Get an iterator over all operations, moment by moment
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.moments.iter().flat_map(|m| m.operations.iter())
    }

    /// Every qudit touched by the circuit, sorted
    pub fn all_qudits(&self) -> Vec<QuditId> {
        self.operations()
            .flat_map(|op| op.qudits().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of moments, including empty ones
    #[inline]
    pub fn num_moments(&self) -> usize {
        self.moments.len()
    }

    /// Number of operations across all moments
    pub fn num_operations(&self) -> usize {
        self.moments.iter().map(Moment::len).sum()
    }

    /// Check if the circuit has no operations
    pub fn is_empty(&self) -> bool {
        self.moments.iter().all(Moment::is_empty)
    }

    /// Remove moments without operations; returns how many were removed
    pub fn drop_empty_moments(&mut self) -> usize {
        let before = self.moments.len();
        self.moments.retain(|m| !m.is_empty());
        before - self.moments.len()
    }

    /// Validate that every moment is disjoint
    pub fn validate(&self) -> Result<()> {
        for (i, moment) in self.moments.iter().enumerate() {
            let mut seen = BTreeSet::new();
            for op in moment.operations() {
                for &q in op.qudits() {
                    if !seen.insert(q) {
                        return Err(QuantumError::ValidationError(format!(
                            "Moment {} uses qudit {} more than once",
                            i, q
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Compare moment by moment with [`Moment::approx_eq`]
    pub fn approx_eq(&self, other: &Circuit, atol: f64) -> bool {
        self.moments.len() == other.moments.len()
            && self
                .moments
                .iter()
                .zip(&other.moments)
                .all(|(a, b)| a.approx_eq(b, atol))
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, moment) in self.moments.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", i, moment)?;
        }
        Ok(())
    }
}
