//! Error types for density-matrix state operations

use rhosim_core::{QuantumError, QuditId};
use thiserror::Error;

/// Errors that can occur while building or evolving a density-matrix state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Required construction input is missing or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Initial state does not match any accepted form for the qid shape
    #[error("Invalid quantum state of shape {shape:?} for qid_shape {qid_shape:?}")]
    InvalidState {
        shape: Vec<usize>,
        qid_shape: Vec<usize>,
    },

    /// Computational-basis index outside the state space
    #[error("Basis state {index} out of range for dimension {dimension}")]
    InvalidBasisState { index: usize, dimension: usize },

    /// Operation exposes no effect and no decomposition
    #[error(
        "Can't simulate operation {operation}: it has no unitary, channel, measurement or decomposition"
    )]
    UnsupportedOperation { operation: String },

    /// Tensor or matrix size inconsistent with the qid shape
    #[error("Shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Qudit is not part of the state
    #[error("Qudit {0} is not part of the state")]
    UnknownQudit(QuditId),

    /// Qudit listed twice, or already part of the state
    #[error("Qudit {0} appears more than once")]
    DuplicateQudit(QuditId),

    /// Two measurements wrote to the same key
    #[error("Measurement key '{0}' was already recorded")]
    DuplicateMeasurementKey(String),

    /// Validation found a state that is not a density matrix
    #[error("Invalid density matrix: {reason}")]
    InvalidDensityMatrix { reason: String },

    /// Error raised by the circuit layer
    #[error(transparent)]
    Core(#[from] QuantumError),
}

impl StateError {
    /// Whether [`FailurePolicy::BestEffort`](rhosim_core::FailurePolicy) may
    /// skip past this error
    ///
    /// Only a missing effect is recoverable. Shape, configuration and
    /// validation errors always abort.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StateError::UnsupportedOperation { .. })
    }
}

/// Result type for density-matrix state operations
pub type Result<T> = std::result::Result<T, StateError>;
