//! Gate capability trait and gate operations
//!
//! A [`Gate`] is queried at runtime for the effects it supports: a unitary
//! matrix, a channel in Kraus form, a decomposition into simpler operations,
//! or a measurement key. Consumers such as the density-matrix dispatcher try
//! these in a fixed order and never guess at a strategy a gate does not expose.

use crate::{QuantumError, QuditId, Result};
use num_complex::Complex64;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Trait for quantum gate operations
///
/// All capability methods default to `None`, so a gate only advertises what
/// it actually supports.
///
/// # Example
/// ```
/// use rhosim_core::gate::Gate;
///
/// #[derive(Debug)]
/// struct Marker;
///
/// impl Gate for Marker {
///     fn name(&self) -> &str { "MARKER" }
///     fn num_qudits(&self) -> usize { 1 }
/// }
///
/// assert!(Marker.matrix().is_none());
/// assert!(Marker.kraus().is_none());
/// assert_eq!(Marker.qid_shape(), vec![2]);
/// ```
pub trait Gate: Send + Sync + fmt::Debug {
    /// The name of the gate (e.g., "H", "CZ", "Z**0.25")
    fn name(&self) -> &str;

    /// Number of qudits this gate acts on
    fn num_qudits(&self) -> usize;

    /// Dimension of each qudit this gate acts on, in order
    fn qid_shape(&self) -> Vec<usize> {
        vec![2; self.num_qudits()]
    }

    /// Get the unitary matrix for this gate as a flattened vector
    ///
    /// The matrix is stored in row-major order with the first qudit as the
    /// most significant index. For a gate with `qid_shape` `[d0, d1, ...]`
    /// the matrix has dimension `D × D` where `D = d0·d1·…`.
    fn matrix(&self) -> Option<Vec<Complex64>> {
        None
    }

    /// Get the Kraus operators of the channel this gate implements
    ///
    /// Each operator is a flattened `D × D` matrix. Unitary gates report
    /// their matrix as a single operator.
    fn kraus(&self) -> Option<Vec<Vec<Complex64>>> {
        self.matrix().map(|m| vec![m])
    }

    /// Express this gate, applied to `qudits`, as simpler operations
    ///
    /// The returned operations are applied left to right.
    fn decompose(&self, _qudits: &[QuditId]) -> Option<Vec<Operation>> {
        None
    }

    /// Measurement key, if this gate is a computational-basis measurement
    fn measurement_key(&self) -> Option<&str> {
        None
    }

    /// Whether this gate is a unitary operation
    fn is_unitary(&self) -> bool {
        self.matrix().is_some()
    }

    /// Get a description of this gate
    fn description(&self) -> String {
        format!("{}-qudit gate '{}'", self.num_qudits(), self.name())
    }
}

/// A gate applied to specific qudits
///
/// # Example
/// ```
/// # use rhosim_core::{QuditId, Operation};
/// # use std::sync::Arc;
/// # #[derive(Debug)]
/// # struct DummyGate;
/// # impl rhosim_core::gate::Gate for DummyGate {
/// #     fn name(&self) -> &str { "DUMMY" }
/// #     fn num_qudits(&self) -> usize { 1 }
/// # }
/// let op = Operation::new(Arc::new(DummyGate), &[QuditId::new(0)]).unwrap();
/// assert_eq!(op.to_string(), "DUMMY(q0)");
/// ```
#[derive(Clone)]
pub struct Operation {
    gate: Arc<dyn Gate>,
    qudits: SmallVec<[QuditId; 2]>,
}

impl Operation {
    /// Create a new gate operation
    ///
    /// # Errors
    /// Returns error if:
    /// - Qudit count doesn't match gate requirements
    /// - Duplicate qudits specified
    /// - A qudit's dimension differs from the gate's `qid_shape`
    pub fn new(gate: Arc<dyn Gate>, qudits: &[QuditId]) -> Result<Self> {
        if qudits.len() != gate.num_qudits() {
            return Err(QuantumError::invalid_qudit_count(
                gate.name(),
                gate.num_qudits(),
                qudits.len(),
            ));
        }

        for i in 0..qudits.len() {
            for j in (i + 1)..qudits.len() {
                if qudits[i] == qudits[j] {
                    return Err(QuantumError::DuplicateQudit(qudits[i]));
                }
            }
        }

        for (&qudit, expected) in qudits.iter().zip(gate.qid_shape()) {
            if qudit.dimension() != expected {
                return Err(QuantumError::DimensionMismatch {
                    gate: gate.name().to_string(),
                    qudit,
                    expected,
                    actual: qudit.dimension(),
                });
            }
        }

        Ok(Self {
            gate,
            qudits: SmallVec::from_slice(qudits),
        })
    }

    /// Get the gate
    #[inline]
    pub fn gate(&self) -> &Arc<dyn Gate> {
        &self.gate
    }

    /// Get the qudits this operation acts on
    #[inline]
    pub fn qudits(&self) -> &[QuditId] {
        &self.qudits
    }

    /// Get the number of qudits
    #[inline]
    pub fn num_qudits(&self) -> usize {
        self.qudits.len()
    }

    /// Whether this operation touches `qudit`
    #[inline]
    pub fn acts_on(&self, qudit: QuditId) -> bool {
        self.qudits.contains(&qudit)
    }

    /// Unitary matrix of the underlying gate
    pub fn matrix(&self) -> Option<Vec<Complex64>> {
        self.gate.matrix()
    }

    /// Decomposition of the underlying gate onto this operation's qudits
    pub fn decompose(&self) -> Option<Vec<Operation>> {
        self.gate.decompose(&self.qudits)
    }

    /// Compare two operations by gate name, qudits and effect
    ///
    /// Unitaries and Kraus operators are compared entrywise within `atol`.
    /// Gates without either effect compare by measurement key.
    pub fn approx_eq(&self, other: &Operation, atol: f64) -> bool {
        if self.gate.name() != other.gate.name() || self.qudits != other.qudits {
            return false;
        }
        if self.gate.measurement_key() != other.gate.measurement_key() {
            return false;
        }
        match (self.gate.kraus(), other.gate.kraus()) {
            (Some(a), Some(b)) => {
                a.len() == b.len()
                    && a.iter().zip(&b).all(|(ka, kb)| {
                        ka.len() == kb.len()
                            && ka.iter().zip(kb).all(|(x, y)| (x - y).norm() <= atol)
                    })
            }
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.gate.name())?;
        for (i, q) in self.qudits.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", q)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct MockGate {
        name: String,
        shape: Vec<usize>,
        matrix: Option<Vec<Complex64>>,
    }

    impl Gate for MockGate {
        fn name(&self) -> &str {
            &self.name
        }

        fn num_qudits(&self) -> usize {
            self.shape.len()
        }

        fn qid_shape(&self) -> Vec<usize> {
            self.shape.clone()
        }

        fn matrix(&self) -> Option<Vec<Complex64>> {
            self.matrix.clone()
        }
    }

    fn mock(name: &str, shape: &[usize]) -> Arc<MockGate> {
        Arc::new(MockGate {
            name: name.to_string(),
            shape: shape.to_vec(),
            matrix: None,
        })
    }

    #[test]
    fn test_operation_creation() {
        let q0 = QuditId::new(0);
        let op = Operation::new(mock("H", &[2]), &[q0]).unwrap();

        assert_eq!(op.num_qudits(), 1);
        assert_eq!(op.qudits()[0], q0);
        assert!(op.acts_on(q0));
    }

    #[test]
    fn test_operation_invalid_qudit_count() {
        let result = Operation::new(mock("CZ", &[2, 2]), &[QuditId::new(0)]);

        if let Err(QuantumError::InvalidQuditCount {
            gate,
            expected,
            actual,
        }) = result
        {
            assert_eq!(gate, "CZ");
            assert_eq!(expected, 2);
            assert_eq!(actual, 1);
        } else {
            panic!("Expected InvalidQuditCount error");
        }
    }

    #[test]
    fn test_operation_duplicate_qudits() {
        let q0 = QuditId::new(0);
        let result = Operation::new(mock("CZ", &[2, 2]), &[q0, q0]);
        assert!(matches!(result, Err(QuantumError::DuplicateQudit(_))));
    }

    #[test]
    fn test_operation_dimension_mismatch() {
        let qutrit = QuditId::with_dimension(0, 3).unwrap();
        let result = Operation::new(mock("X", &[2]), &[qutrit]);
        assert!(matches!(
            result,
            Err(QuantumError::DimensionMismatch { expected: 2, actual: 3, .. })
        ));
    }

    #[test]
    fn test_default_kraus_wraps_matrix() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let gate = MockGate {
            name: "I".to_string(),
            shape: vec![2],
            matrix: Some(vec![one, zero, zero, one]),
        };
        let kraus = gate.kraus().unwrap();
        assert_eq!(kraus.len(), 1);
        assert_eq!(kraus[0], vec![one, zero, zero, one]);
        assert!(gate.is_unitary());
    }

    #[test]
    fn test_approx_eq() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let a = Arc::new(MockGate {
            name: "I".to_string(),
            shape: vec![2],
            matrix: Some(vec![one, zero, zero, one]),
        });
        let b = Arc::new(MockGate {
            name: "I".to_string(),
            shape: vec![2],
            matrix: Some(vec![one + 1e-12, zero, zero, one]),
        });
        let q0 = QuditId::new(0);
        let op_a = Operation::new(a, &[q0]).unwrap();
        let op_b = Operation::new(b, &[q0]).unwrap();
        assert!(op_a.approx_eq(&op_b, 1e-9));
        assert!(!op_a.approx_eq(&Operation::new(mock("I", &[2]), &[q0]).unwrap(), 1e-9));
    }

    #[test]
    fn test_operation_display() {
        let op = Operation::new(mock("CZ", &[2, 2]), &[QuditId::new(0), QuditId::new(1)]).unwrap();
        assert_eq!(format!("{}", op), "CZ(q0, q1)");
    }
}
