//! Circuit-level density matrix simulation
//!
//! The simulator walks a [`Circuit`] moment by moment and hands every
//! operation to the [`DensityMatrixArgs`] dispatcher. Noise is expressed as
//! channel gates inside the circuit; the simulator adds none of its own.

use crate::args::{DensityMatrixArgs, Dispatch};
use crate::error::{Result, StateError};
use crate::initial_state::InitialState;
use crate::precision::Precision;
use crate::validation::validate_density_matrix;
use indexmap::IndexMap;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rhosim_core::{Circuit, FailurePolicy, QuditId};
use std::marker::PhantomData;
use tracing::debug;

/// Configuration for density matrix simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Random seed for reproducible measurements
    pub seed: Option<u64>,

    /// What to do with operations that cannot be applied
    pub failure_policy: FailurePolicy,

    /// Whether to validate the density matrix initially and after each operation
    pub validate_state: bool,

    /// Tolerance for validation checks; never tighter than the element
    /// precision's own [`Precision::TOLERANCE`]
    pub tolerance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            failure_policy: FailurePolicy::Strict,
            validate_state: false,
            tolerance: 1e-8,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate_state = enabled;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Counts of how operations were dispatched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Operations applied through their own effect
    pub applied: usize,
    /// Operations applied through a decomposition
    pub decomposed: usize,
    /// Operations skipped under best-effort policy
    pub skipped: usize,
    /// Qudits added to the state while simulating
    pub qudits_added: usize,
}

impl SimulationStats {
    fn record(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::DirectlyApplied => self.applied += 1,
            Dispatch::Decomposed => self.decomposed += 1,
            Dispatch::Skipped => self.skipped += 1,
        }
    }
}

/// Final state of a simulation
#[derive(Debug, Clone)]
pub struct SimulationResult<F: Precision = f64> {
    /// Flat `D × D` density matrix, qudits ordered as in `qudits`
    pub density_matrix: Vec<Complex<F>>,
    pub qudits: Vec<QuditId>,
    pub measurements: IndexMap<String, Vec<usize>>,
    pub stats: SimulationStats,
}

/// Density matrix simulator
///
/// # Example
///
/// ```
/// use rhosim_core::{Circuit, QuditId};
/// use rhosim_gates::{CNot, Hadamard};
/// use rhosim_state::{DensityMatrixSimulator, InitialState, SimulationConfig};
/// use std::sync::Arc;
///
/// let q = QuditId::range(0, 2);
/// let mut circuit = Circuit::new();
/// circuit.append_gate(Arc::new(Hadamard), &[q[0]]).unwrap();
/// circuit.append_gate(Arc::new(CNot), &[q[0], q[1]]).unwrap();
///
/// let sim = DensityMatrixSimulator::<f64>::new(SimulationConfig::default().with_seed(7));
/// let result = sim.simulate(&circuit, &InitialState::Basis(0)).unwrap();
/// assert!((result.density_matrix[3 * 4 + 3].re - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DensityMatrixSimulator<F: Precision = f64> {
    config: SimulationConfig,
    _precision: PhantomData<F>,
}

impl<F: Precision> DensityMatrixSimulator<F> {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            _precision: PhantomData,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate over the circuit's qudits in sorted order
    pub fn simulate(
        &self,
        circuit: &Circuit,
        initial_state: &InitialState<F>,
    ) -> Result<SimulationResult<F>> {
        self.simulate_with_qudit_order(circuit, &circuit.all_qudits(), initial_state)
    }

    /// Simulate with the initial state defined over `qudit_order`
    ///
    /// Qudits the circuit touches that are not in `qudit_order` are appended
    /// in their zero state when first used.
    ///
    /// # Errors
    /// Any dispatcher error not skipped by the configured policy, and
    /// [`StateError::InvalidDensityMatrix`] when validation is on and fails
    pub fn simulate_with_qudit_order(
        &self,
        circuit: &Circuit,
        qudit_order: &[QuditId],
        initial_state: &InitialState<F>,
    ) -> Result<SimulationResult<F>> {
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut args = DensityMatrixArgs::new(qudit_order, initial_state, rng)?;
        self.validate(&args)?;

        let mut stats = SimulationStats::default();
        for (index, moment) in circuit.moments().iter().enumerate() {
            for op in moment.operations() {
                let missing: Vec<QuditId> = op
                    .qudits()
                    .iter()
                    .copied()
                    .filter(|&q| !args.contains(q))
                    .collect();
                if !missing.is_empty() {
                    stats.qudits_added += missing.len();
                    args = args.with_qudits(&missing)?;
                }
                let dispatch = args.act_on(op, self.config.failure_policy)?;
                stats.record(dispatch);
                self.validate(&args)?;
            }
            debug!(moment = index, operations = moment.len(), "simulated moment");
        }

        let qudits = args.qudits();
        let measurements = args.log_of_measurement_results().clone();
        Ok(SimulationResult {
            density_matrix: args.into_state().into_tensor(),
            qudits,
            measurements,
            stats,
        })
    }

    /// Configured tolerance, widened to what `F` can resolve
    fn validation_tolerance(&self) -> f64 {
        self.config.tolerance.max(F::TOLERANCE)
    }

    fn validate(&self, args: &DensityMatrixArgs<F, StdRng>) -> Result<()> {
        if !self.config.validate_state {
            return Ok(());
        }
        let report = validate_density_matrix(
            args.density_matrix(),
            args.state().dimension(),
            self.validation_tolerance(),
        );
        match report.failure() {
            Some(reason) => Err(StateError::InvalidDensityMatrix { reason }),
            None => Ok(()),
        }
    }
}
