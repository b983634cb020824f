//! Density-matrix state and operation dispatch for rhosim
//!
//! This crate holds an evolving mixed state over qudits of arbitrary,
//! possibly mixed, dimensions and applies circuit operations to it.
//!
//! # Layers
//!
//! - [`BufferedDensityMatrix`]: the rank-`2n` density tensor plus a pool of
//!   three scratch buffers; unitaries and channels are applied by writing
//!   into the pool and swapping the result into place
//! - [`DensityMatrixArgs`]: maps [`QuditId`](rhosim_core::QuditId)s to tensor
//!   axes and dispatches operations (measurement, unitary, channel,
//!   decomposition, failure)
//! - [`DensityMatrixSimulator`]: drives a whole circuit through the dispatcher
//!
//! # Example
//!
//! ```
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use rhosim_core::{FailurePolicy, Operation, QuditId};
//! use rhosim_gates::PauliX;
//! use rhosim_state::{DensityMatrixArgs, Dispatch, InitialState};
//! use std::sync::Arc;
//!
//! let q = QuditId::range(0, 2);
//! let mut args = DensityMatrixArgs::<f64, _>::new(&q, &InitialState::Basis(0), StdRng::seed_from_u64(0)).unwrap();
//! let op = Operation::new(Arc::new(PauliX), &[q[1]]).unwrap();
//! assert_eq!(args.act_on(&op, FailurePolicy::Strict).unwrap(), Dispatch::DirectlyApplied);
//! assert_eq!(args.density_matrix()[1 * 4 + 1].re, 1.0);
//! ```

pub mod args;
pub mod buffered;
pub mod error;
pub mod initial_state;
pub mod precision;
pub mod qid_shape;
pub mod simulator;
pub mod tensor;
pub mod validation;

pub use args::{DensityMatrixArgs, Dispatch, MAX_DECOMPOSITION_DEPTH};
pub use buffered::{BufferedDensityMatrix, BUFFER_COUNT};
pub use error::{Result, StateError};
pub use initial_state::InitialState;
pub use precision::Precision;
pub use qid_shape::QuditShape;
pub use simulator::{DensityMatrixSimulator, SimulationConfig, SimulationResult, SimulationStats};
pub use tensor::density_matrix_kronecker_product;
pub use validation::{is_valid_density_matrix, validate_density_matrix, DensityMatrixReport};
