//! Core types and traits for the rhosim density-matrix simulator
//!
//! This crate provides the vocabulary shared by the other rhosim crates:
//! - [`QuditId`]: Type-safe qudit addressing with per-qudit dimension
//! - [`Gate`]: Capability trait queried for unitary, channel, decomposition and measurement effects
//! - [`Operation`]: A gate bound to qudits
//! - [`Circuit`] and [`Moment`]: Time-ordered operations
//! - [`FailurePolicy`]: Strict vs. best-effort handling of unsupported operations
//!
//! # Example
//! ```
//! use rhosim_core::{Circuit, QuditId};
//!
//! let circuit = Circuit::new();
//! let q0 = QuditId::new(0);
//! assert!(circuit.is_empty());
//! assert_eq!(q0.dimension(), 2);
//! ```

pub mod circuit;
pub mod device;
pub mod error;
pub mod gate;
pub mod policy;
pub mod qudit;

// Re-exports for convenience
pub use circuit::{Circuit, Moment};
pub use device::{Device, UnconstrainedDevice, UNCONSTRAINED_DEVICE};
pub use error::QuantumError;
pub use gate::{Gate, Operation};
pub use num_complex::Complex64;
pub use policy::FailurePolicy;
pub use qudit::QuditId;

/// Type alias for results in rhosim-core
pub type Result<T> = std::result::Result<T, QuantumError>;
