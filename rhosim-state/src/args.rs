//! Qudit-addressed density-matrix state and the operation dispatcher
//!
//! [`DensityMatrixArgs`] maps logical qudits to tensor axes and applies
//! [`Operation`]s to the state it owns. For each operation the dispatcher
//! asks the gate, in order, for:
//!
//! 1. a measurement key: sample, project and record the outcome
//! 2. a unitary: `ρ → U ρ U†`
//! 3. a channel: `ρ → Σ K ρ K†`
//! 4. a decomposition: apply each constituent through this same procedure
//!
//! and fails with [`StateError::UnsupportedOperation`] when none is offered.
//! Under [`FailurePolicy::BestEffort`] that failure is logged and the
//! operation skipped instead.

use crate::buffered::BufferedDensityMatrix;
use crate::error::{Result, StateError};
use crate::initial_state::InitialState;
use crate::precision::{narrow_all, Precision};
use crate::qid_shape::QuditShape;
use crate::tensor;
use indexmap::IndexMap;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::Rng;
use rhosim_core::{FailurePolicy, Operation, QuditId};
use tracing::{debug, warn};

/// Decomposition nesting beyond which an operation counts as unsupported
pub const MAX_DECOMPOSITION_DEPTH: usize = 64;

/// How an operation reached the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Applied through its own measurement, unitary or channel
    DirectlyApplied,
    /// Applied through its decomposition
    Decomposed,
    /// Not applied; only returned under [`FailurePolicy::BestEffort`]
    Skipped,
}

/// Density-matrix state addressed by qudit, with its random source and
/// measurement record
pub struct DensityMatrixArgs<F: Precision = f64, R: Rng = StdRng> {
    qudit_map: IndexMap<QuditId, usize>,
    state: BufferedDensityMatrix<F>,
    rng: R,
    log_of_measurement_results: IndexMap<String, Vec<usize>>,
}

fn axis_map(qudits: &[QuditId]) -> Result<IndexMap<QuditId, usize>> {
    let mut map = IndexMap::with_capacity(qudits.len());
    for (axis, &q) in qudits.iter().enumerate() {
        if map.insert(q, axis).is_some() {
            return Err(StateError::DuplicateQudit(q));
        }
    }
    Ok(map)
}

impl<F: Precision, R: Rng> DensityMatrixArgs<F, R> {
    /// Create a state over `qudits`, in that axis order
    ///
    /// # Errors
    /// [`StateError::Configuration`] for an empty qudit list,
    /// [`StateError::DuplicateQudit`] for a repeated qudit and the
    /// [`InitialState`] errors for an initial state that does not fit
    pub fn new(qudits: &[QuditId], initial_state: &InitialState<F>, rng: R) -> Result<Self> {
        let qudit_map = axis_map(qudits)?;
        let shape: Vec<usize> = qudits.iter().map(|q| q.dimension()).collect();
        let state = BufferedDensityMatrix::create(initial_state, &shape)?;
        Ok(Self::from_parts(qudit_map, state, rng))
    }

    /// Wrap an existing state whose qid shape follows `qudits`
    pub fn from_state(qudits: &[QuditId], state: BufferedDensityMatrix<F>, rng: R) -> Result<Self> {
        let qudit_map = axis_map(qudits)?;
        let expected = QuditShape::of_qudits(qudits)?;
        if &expected != state.qid_shape() {
            return Err(StateError::ShapeMismatch {
                expected: expected.tensor_len(),
                actual: state.tensor().len(),
            });
        }
        Ok(Self::from_parts(qudit_map, state, rng))
    }

    fn from_parts(qudit_map: IndexMap<QuditId, usize>, state: BufferedDensityMatrix<F>, rng: R) -> Self {
        Self {
            qudit_map,
            state,
            rng,
            log_of_measurement_results: IndexMap::new(),
        }
    }

    /// Qudits in axis order
    pub fn qudits(&self) -> Vec<QuditId> {
        self.qudit_map.keys().copied().collect()
    }

    pub fn qudit_map(&self) -> &IndexMap<QuditId, usize> {
        &self.qudit_map
    }

    pub fn contains(&self, qudit: QuditId) -> bool {
        self.qudit_map.contains_key(&qudit)
    }

    pub fn state(&self) -> &BufferedDensityMatrix<F> {
        &self.state
    }

    pub fn into_state(self) -> BufferedDensityMatrix<F> {
        self.state
    }

    /// Flat `D × D` density matrix in axis order
    pub fn density_matrix(&self) -> &[Complex<F>] {
        self.state.tensor()
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Recorded measurement outcomes by key
    pub fn log_of_measurement_results(&self) -> &IndexMap<String, Vec<usize>> {
        &self.log_of_measurement_results
    }

    /// Axis positions of `qudits`
    ///
    /// # Errors
    /// Returns [`StateError::UnknownQudit`] for a qudit not in this state
    pub fn axes_of(&self, qudits: &[QuditId]) -> Result<Vec<usize>> {
        qudits
            .iter()
            .map(|q| {
                self.qudit_map
                    .get(q)
                    .copied()
                    .ok_or(StateError::UnknownQudit(*q))
            })
            .collect()
    }

    /// Apply `op` to the state
    ///
    /// Every target of `op` must already be part of the state; this never
    /// extends the state implicitly. If a decomposition fails part way under
    /// [`FailurePolicy::Strict`], the constituents applied before the failure
    /// remain applied.
    ///
    /// # Errors
    /// - [`StateError::UnsupportedOperation`] if `op` offers no effect and no
    ///   decomposition and `policy` is strict
    /// - [`StateError::UnknownQudit`] and [`StateError::ShapeMismatch`]
    ///   regardless of `policy`
    pub fn act_on(&mut self, op: &Operation, policy: FailurePolicy) -> Result<Dispatch> {
        self.dispatch(op, policy, 0)
    }

    fn dispatch(&mut self, op: &Operation, policy: FailurePolicy, depth: usize) -> Result<Dispatch> {
        let axes = self.axes_of(op.qudits())?;

        if self.apply_effect(op, &axes)? {
            debug!(operation = %op, depth, "applied directly");
            return Ok(Dispatch::DirectlyApplied);
        }

        if depth < MAX_DECOMPOSITION_DEPTH {
            if let Some(constituents) = op.decompose() {
                for constituent in &constituents {
                    self.dispatch(constituent, policy, depth + 1)?;
                }
                debug!(operation = %op, depth, parts = constituents.len(), "applied by decomposition");
                return Ok(Dispatch::Decomposed);
            }
        }

        let error = StateError::UnsupportedOperation {
            operation: op.to_string(),
        };
        if policy.ignores_failures() {
            warn!(operation = %op, "skipping operation: {}", error);
            Ok(Dispatch::Skipped)
        } else {
            Err(error)
        }
    }

    /// Apply the first direct effect `op` offers; `false` if it has none
    fn apply_effect(&mut self, op: &Operation, axes: &[usize]) -> Result<bool> {
        let gate = op.gate();
        if let Some(key) = gate.measurement_key() {
            if self.log_of_measurement_results.contains_key(key) {
                return Err(StateError::DuplicateMeasurementKey(key.to_string()));
            }
            let outcome = self.state.measure(axes, &mut self.rng)?;
            self.log_of_measurement_results
                .insert(key.to_string(), outcome);
            return Ok(true);
        }
        if let Some(unitary) = gate.matrix() {
            self.state.apply_unitary(&narrow_all::<F>(&unitary), axes)?;
            return Ok(true);
        }
        if let Some(kraus) = gate.kraus() {
            let kraus: Vec<Vec<Complex<F>>> = kraus.iter().map(|k| narrow_all(k)).collect();
            self.state.apply_channel(&kraus, axes)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Partial trace over every qudit not in `keep`, ordered like `keep`
    pub fn reduced_density_matrix(&self, keep: &[QuditId]) -> Result<Vec<Complex<F>>> {
        let axes = self.axes_of(keep)?;
        for (i, q) in keep.iter().enumerate() {
            if keep[..i].contains(q) {
                return Err(StateError::DuplicateQudit(*q));
            }
        }
        self.state.partial_trace(&axes)
    }
}

impl<F: Precision, R: Rng + Clone> DensityMatrixArgs<F, R> {
    /// Copy the state; see [`BufferedDensityMatrix::copy`] for buffer sharing
    pub fn copy(&self, deep_copy_buffers: bool) -> Self {
        Self {
            qudit_map: self.qudit_map.clone(),
            state: self.state.copy(deep_copy_buffers),
            rng: self.rng.clone(),
            log_of_measurement_results: self.log_of_measurement_results.clone(),
        }
    }

    /// New state spanning these qudits followed by `extra`, each extra qudit
    /// in its zero state
    ///
    /// # Errors
    /// Returns [`StateError::DuplicateQudit`] if an extra qudit is already
    /// present or listed twice
    pub fn with_qudits(&self, extra: &[QuditId]) -> Result<Self> {
        if extra.is_empty() {
            return Ok(self.copy(true));
        }
        let mut qudit_map = self.qudit_map.clone();
        for &q in extra {
            let axis = qudit_map.len();
            if qudit_map.insert(q, axis).is_some() {
                return Err(StateError::DuplicateQudit(q));
            }
        }
        let dims: Vec<usize> = extra.iter().map(|q| q.dimension()).collect();
        let state = self.state.with_zero_qudits(&dims)?;
        debug!(added = extra.len(), total = qudit_map.len(), "extended state with zero qudits");
        Ok(Self {
            qudit_map,
            state,
            rng: self.rng.clone(),
            log_of_measurement_results: self.log_of_measurement_results.clone(),
        })
    }

    /// New state whose axes follow `order`, a permutation of the qudits
    pub fn transpose_to_qudit_order(&self, order: &[QuditId]) -> Result<Self> {
        if order.len() != self.qudit_map.len() {
            return Err(StateError::ShapeMismatch {
                expected: self.qudit_map.len(),
                actual: order.len(),
            });
        }
        let perm = self.axes_of(order)?;
        let qudit_map = axis_map(order)?;
        Ok(Self {
            qudit_map,
            state: self.state.transposed(&perm)?,
            rng: self.rng.clone(),
            log_of_measurement_results: self.log_of_measurement_results.clone(),
        })
    }

    /// Joint state of two disjoint states, `self`'s qudits first
    ///
    /// The random source and measurement log are taken from `self`.
    pub fn kronecker_product(&self, other: &Self) -> Result<Self> {
        let mut qudits = self.qudits();
        qudits.extend(other.qudits());
        let qudit_map = axis_map(&qudits)?;
        let qid_shape = self.state.qid_shape().concat(other.state.qid_shape())?;
        let joined = tensor::density_matrix_kronecker_product(
            self.state.tensor(),
            self.state.dimension(),
            other.state.tensor(),
            other.state.dimension(),
        );
        Ok(Self {
            qudit_map,
            state: BufferedDensityMatrix::from_tensor(joined, qid_shape)?,
            rng: self.rng.clone(),
            log_of_measurement_results: self.log_of_measurement_results.clone(),
        })
    }
}

impl<F: Precision, R: Rng> std::fmt::Debug for DensityMatrixArgs<F, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DensityMatrixArgs")
            .field("qudits", &self.qudits())
            .field("state", &self.state)
            .field("measurements", &self.log_of_measurement_results)
            .finish()
    }
}
