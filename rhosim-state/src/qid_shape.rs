//! Per-qudit dimensions of a state

use crate::error::{Result, StateError};
use rhosim_core::QuditId;
use std::fmt;

/// Ordered qudit dimensions, every entry at least 2
///
/// The density tensor over a shape `[d0, .., dn-1]` has rank `2n` with axes
/// `[d0, .., dn-1, d0, .., dn-1]`; flattened in row-major order it is the
/// `D × D` matrix with `D = Π dᵢ`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuditShape {
    dims: Vec<usize>,
    dimension: usize,
}

impl QuditShape {
    /// # Errors
    /// Returns [`StateError::Configuration`] if `dims` is empty, holds a
    /// dimension below 2, or describes a space too large to address
    pub fn new(dims: Vec<usize>) -> Result<Self> {
        if dims.is_empty() {
            return Err(StateError::Configuration(
                "qid_shape must be provided".to_string(),
            ));
        }
        if let Some(&bad) = dims.iter().find(|&&d| d < 2) {
            return Err(StateError::Configuration(format!(
                "qid_shape dimensions must be at least 2, got {} in {:?}",
                bad, dims
            )));
        }
        let dimension = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .filter(|d| d.checked_mul(*d).is_some())
            .ok_or_else(|| {
                StateError::Configuration(format!("qid_shape {:?} is too large", dims))
            })?;
        Ok(Self { dims, dimension })
    }

    /// Shape following the dimensions of `qudits`
    pub fn of_qudits(qudits: &[QuditId]) -> Result<Self> {
        Self::new(qudits.iter().map(|q| q.dimension()).collect())
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of qudits
    #[inline]
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Hilbert-space dimension `D`
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of elements of the density tensor, `D²`
    #[inline]
    pub fn tensor_len(&self) -> usize {
        self.dimension * self.dimension
    }

    /// Axes of the density tensor, the dims repeated twice
    pub fn tensor_shape(&self) -> Vec<usize> {
        self.dims.iter().chain(&self.dims).copied().collect()
    }

    /// Shape of these qudits followed by `other`
    pub fn concat(&self, other: &QuditShape) -> Result<Self> {
        Self::new(self.dims.iter().chain(&other.dims).copied().collect())
    }

    /// Shape reordered so that axis `i` is old axis `perm[i]`
    pub fn permuted(&self, perm: &[usize]) -> Result<Self> {
        Self::new(perm.iter().map(|&p| self.dims[p]).collect())
    }
}

impl fmt::Display for QuditShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_dimensions() {
        let shape = QuditShape::new(vec![2, 3]).unwrap();
        assert_eq!(shape.dimension(), 6);
        assert_eq!(shape.tensor_len(), 36);
        assert_eq!(shape.tensor_shape(), vec![2, 3, 2, 3]);
        assert_eq!(shape.to_string(), "(2, 3)");
    }

    #[test]
    fn test_missing_shape_is_configuration_error() {
        let err = QuditShape::new(vec![]).unwrap_err();
        assert!(matches!(err, StateError::Configuration(_)));
        assert!(err.to_string().contains("qid_shape must be provided"));
        assert!(matches!(
            QuditShape::new(vec![2, 1]),
            Err(StateError::Configuration(_))
        ));
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(QuditShape::new(vec![1 << 20; 8]).is_err());
    }

    #[test]
    fn test_of_qudits_and_permute() {
        let qudits = [QuditId::new(0), QuditId::with_dimension(1, 3).unwrap()];
        let shape = QuditShape::of_qudits(&qudits).unwrap();
        assert_eq!(shape.dims(), &[2, 3]);
        assert_eq!(shape.permuted(&[1, 0]).unwrap().dims(), &[3, 2]);
        let joined = shape.concat(&QuditShape::new(vec![4]).unwrap()).unwrap();
        assert_eq!(joined.dims(), &[2, 3, 4]);
    }
}
