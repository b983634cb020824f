//! Error types for rhosim circuits and gates

use crate::QuditId;
use thiserror::Error;

/// Errors that can occur while building or rewriting circuits
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuantumError {
    /// Gate applied to wrong number of qudits
    #[error("Gate '{gate}' requires {expected} qudits, but {actual} were provided")]
    InvalidQuditCount {
        gate: String,
        expected: usize,
        actual: usize,
    },

    /// Duplicate qudit in gate operation
    #[error("Duplicate qudit {0} in gate operation")]
    DuplicateQudit(QuditId),

    /// Qudit dimension does not match what the gate expects
    #[error("Gate '{gate}' expects dimension {expected} on {qudit}, found {actual}")]
    DimensionMismatch {
        gate: String,
        qudit: QuditId,
        expected: usize,
        actual: usize,
    },

    /// Qudit dimension below 2
    #[error("Qudit dimension must be at least 2, got {0}")]
    InvalidDimension(usize),

    /// Two operations in one moment touch the same qudit
    #[error("Operation {operation} overlaps qudit {qudit} already used in this moment")]
    OverlappingMoment { operation: String, qudit: QuditId },

    /// Matrix has the wrong size or is not unitary
    #[error("Invalid matrix for '{gate}': {reason}")]
    InvalidMatrix { gate: String, reason: String },

    /// Gate parameter out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No rewrite or effect is known for this operation
    #[error("Cannot convert operation {operation}: {reason}")]
    UnsupportedOperation { operation: String, reason: String },

    /// Generic circuit validation error
    #[error("Circuit validation failed: {0}")]
    ValidationError(String),
}

impl QuantumError {
    /// Create an invalid qudit count error
    pub fn invalid_qudit_count(gate: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::InvalidQuditCount {
            gate: gate.into(),
            expected,
            actual,
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(operation: impl ToString, reason: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an invalid matrix error
    pub fn invalid_matrix(gate: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMatrix {
            gate: gate.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_qudit_count_error() {
        let err = QuantumError::invalid_qudit_count("CNOT", 2, 1);
        let msg = format!("{}", err);
        assert!(msg.contains("CNOT"));
        assert!(msg.contains("2"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn test_dimension_mismatch_names_qudit() {
        let err = QuantumError::DimensionMismatch {
            gate: "X".to_string(),
            qudit: QuditId::with_dimension(4, 3).unwrap(),
            expected: 2,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("q4(d3)"));
        assert!(msg.contains("expects dimension 2"));
    }

    #[test]
    fn test_unsupported_operation_error() {
        let err = QuantumError::unsupported("CCZ(q0, q1, q2)", "no decomposition");
        let msg = err.to_string();
        assert!(msg.contains("CCZ(q0, q1, q2)"));
        assert!(msg.contains("no decomposition"));
    }
}
