//! Gate-set canonicalization for rhosim circuits
//!
//! This crate rewrites circuits into the restricted instruction set the
//! density-matrix simulator is tuned for:
//! - Retargeting onto single-qudit gates plus CZ
//! - Merging runs of single-qudit unitaries
//! - Conversion into Pauli-string phasors, optionally keeping Clifford gates
//! - Dropping emptied moments
//!
//! # Example
//! ```
//! use rhosim_compiler::converted_gate_set;
//! use rhosim_core::{Circuit, QuditId};
//! use rhosim_gates::{Swap, TGate};
//! use std::sync::Arc;
//!
//! let q = QuditId::range(0, 2);
//! let mut circuit = Circuit::new();
//! circuit.append_gate(Arc::new(TGate), &[q[0]]).unwrap();
//! circuit.append_gate(Arc::new(Swap), &q).unwrap();
//!
//! let once = converted_gate_set(&circuit, false, 1e-8).unwrap();
//! let twice = converted_gate_set(&once, false, 1e-8).unwrap();
//! assert!(once.approx_eq(&twice, 1e-8));
//! ```

pub mod matrix_utils;
pub mod passes;
pub mod pipeline;

pub use passes::{OptimizationPass, OptimizationResult, PassStatistics};
pub use pipeline::{converted_gate_set, Pipeline, PipelineConfig};
