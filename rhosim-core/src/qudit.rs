//! Qudit addressing and identification

use crate::{QuantumError, Result};
use std::fmt;

/// Type-safe identifier for a qudit
///
/// A qudit is named by an index and carries its dimension. Two ids with the
/// same index but different dimensions are different qudits.
///
/// # Example
/// ```
/// use rhosim_core::QuditId;
///
/// let q0 = QuditId::new(0);
/// let q1 = QuditId::new(1);
/// assert!(q0 < q1);
/// assert_eq!(q0.dimension(), 2);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct QuditId {
    index: usize,
    dimension: usize,
}

impl QuditId {
    /// Create a qubit (dimension 2)
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            dimension: 2,
        }
    }

    /// Create a qudit of the given dimension
    ///
    /// # Errors
    /// Returns error if `dimension < 2`
    ///
    /// # Example
    /// ```
    /// use rhosim_core::QuditId;
    /// let q = QuditId::with_dimension(3, 3).unwrap();
    /// assert_eq!(q.dimension(), 3);
    /// assert!(QuditId::with_dimension(0, 1).is_err());
    /// ```
    pub fn with_dimension(index: usize, dimension: usize) -> Result<Self> {
        if dimension < 2 {
            return Err(QuantumError::InvalidDimension(dimension));
        }
        Ok(Self { index, dimension })
    }

    /// Consecutive qubits `q{start}..q{start+count}`
    pub fn range(start: usize, count: usize) -> Vec<Self> {
        (start..start + count).map(Self::new).collect()
    }

    /// Get the underlying index
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Get the dimension of this qudit
    #[inline]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Whether this is a two-level qudit
    #[inline]
    pub const fn is_qubit(&self) -> bool {
        self.dimension == 2
    }
}

impl fmt::Display for QuditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_qubit() {
            write!(f, "q{}", self.index)
        } else {
            write!(f, "q{}(d{})", self.index, self.dimension)
        }
    }
}

impl From<usize> for QuditId {
    #[inline]
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}
