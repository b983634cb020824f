//! Gates defined directly by a unitary matrix

use crate::matrix_ops::{is_unitary, square_dim};
use num_complex::Complex64;
use rhosim_core::gate::Gate;
use rhosim_core::{QuantumError, Result};

/// Tolerance used to accept a matrix as unitary
pub const UNITARY_TOLERANCE: f64 = 1e-8;

/// Arbitrary unitary on qudits of any shape
///
/// # Example
/// ```
/// use num_complex::Complex64;
/// use rhosim_core::gate::Gate;
/// use rhosim_gates::MatrixGate;
///
/// let zero = Complex64::new(0.0, 0.0);
/// let one = Complex64::new(1.0, 0.0);
/// let x = MatrixGate::new(vec![zero, one, one, zero], vec![2]).unwrap();
/// assert_eq!(x.num_qudits(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixGate {
    name: String,
    qid_shape: Vec<usize>,
    matrix: Vec<Complex64>,
}

impl MatrixGate {
    /// # Errors
    /// Returns error if `matrix` is not `D × D` for `D = Π qid_shape` or is
    /// not unitary within [`UNITARY_TOLERANCE`]
    pub fn new(matrix: Vec<Complex64>, qid_shape: Vec<usize>) -> Result<Self> {
        Self::named("MATRIX", matrix, qid_shape)
    }

    /// Like [`MatrixGate::new`] with a custom name
    pub fn named(
        name: impl Into<String>,
        matrix: Vec<Complex64>,
        qid_shape: Vec<usize>,
    ) -> Result<Self> {
        let name = name.into();
        if qid_shape.is_empty() || qid_shape.iter().any(|&d| d < 2) {
            return Err(QuantumError::invalid_matrix(
                &name,
                format!("invalid qid shape {:?}", qid_shape),
            ));
        }
        let dim: usize = qid_shape.iter().product();
        if square_dim(matrix.len()) != Some(dim) {
            return Err(QuantumError::invalid_matrix(
                &name,
                format!(
                    "{} entries do not form a {}x{} matrix",
                    matrix.len(),
                    dim,
                    dim
                ),
            ));
        }
        if !is_unitary(&matrix, dim, UNITARY_TOLERANCE) {
            return Err(QuantumError::invalid_matrix(&name, "matrix is not unitary"));
        }
        Ok(Self {
            name,
            qid_shape,
            matrix,
        })
    }

    pub fn unitary(&self) -> &[Complex64] {
        &self.matrix
    }
}

impl Gate for MatrixGate {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qudits(&self) -> usize {
        self.qid_shape.len()
    }

    fn qid_shape(&self) -> Vec<usize> {
        self.qid_shape.clone()
    }

    fn matrix(&self) -> Option<Vec<Complex64>> {
        Some(self.matrix.clone())
    }
}
