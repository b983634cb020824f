//! Quantum gate library for rhosim
//!
//! This crate provides the gates, channels and canonical gate forms that the
//! density-matrix simulator and the canonicalization pipeline operate on.
//! Every type implements the [`Gate`](rhosim_core::Gate) capability trait from
//! `rhosim-core` and advertises exactly the effects it supports.
//!
//! # Features
//!
//! - **Standard gates**: Paulis, H, S, T, rotations, CZ, CNOT, SWAP and a
//!   cyclic shift for d-level qudits, with compile-time constant matrices
//! - **Noise channels**: depolarizing, amplitude and phase damping, and
//!   arbitrary Kraus channels on any qid shape
//! - **Measurement**: computational-basis measurement under a key
//! - **Canonical forms**: [`PauliStringPhasorGate`] rotations and
//!   [`SingleQubitCliffordGate`] identified by their Pauli tableau
//!
//! # Examples
//!
//! ```
//! use rhosim_core::gate::Gate;
//! use rhosim_gates::standard::{CNot, Hadamard};
//! use rhosim_gates::matrices;
//!
//! assert_eq!(Hadamard.matrix().unwrap().len(), 4);
//! assert_eq!(CNot.num_qudits(), 2);
//! assert_eq!(matrices::SWAP.len(), 4);
//! ```

pub mod channels;
pub mod clifford;
pub mod matrices;
pub mod matrix_gate;
pub mod matrix_ops;
pub mod measurement;
pub mod pauli;
pub mod standard;

// Re-export commonly used items
pub use channels::{AmplitudeDamping, DepolarizingChannel, KrausChannel, PhaseDamping};
pub use clifford::{SignedPauli, SingleQubitCliffordGate};
pub use matrix_gate::{MatrixGate, UNITARY_TOLERANCE};
pub use measurement::MeasurementGate;
pub use pauli::{Pauli, PauliString, PauliStringPhasorGate};
pub use standard::*;
