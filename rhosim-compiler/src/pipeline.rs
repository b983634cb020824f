//! Canonicalization pipeline
//!
//! A [`Pipeline`] runs an ordered list of passes once each. The canonical
//! pipeline retargets onto the CZ gate set, merges single-qudit unitaries,
//! converts what remains into Pauli-string phasors and finally drops the
//! moments the rewriting emptied. Merging runs before conversion so that as
//! much of the circuit as possible collapses into one rotation sequence per
//! qubit.

use crate::passes::{
    ConvertToPauliStringPhasors, CzTargetGateset, DropEmptyMoments, MergeSingleQuditUnitaries,
    OptimizationPass, OptimizationResult, PassStatistics,
};
use rhosim_core::{Circuit, FailurePolicy, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Configuration for the canonical pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Emit single-qubit Clifford gates instead of Clifford rotations
    pub keep_clifford: bool,
    /// Tolerance for matrix comparisons and negligible rotations
    pub atol: f64,
    /// Policy of the Pauli-string conversion pass
    pub failure_policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            keep_clifford: true,
            atol: 1e-8,
            failure_policy: FailurePolicy::BestEffort,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keep_clifford(mut self, keep_clifford: bool) -> Self {
        self.keep_clifford = keep_clifford;
        self
    }

    pub fn with_atol(mut self, atol: f64) -> Self {
        self.atol = atol;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }
}

/// An ordered sequence of passes, each run once
///
/// # Example
/// ```
/// use rhosim_compiler::{Pipeline, PipelineConfig};
/// use rhosim_core::{Circuit, QuditId};
/// use rhosim_gates::{CNot, Hadamard};
/// use std::sync::Arc;
///
/// let q = QuditId::range(0, 2);
/// let mut circuit = Circuit::new();
/// circuit.append_gate(Arc::new(Hadamard), &[q[0]]).unwrap();
/// circuit.append_gate(Arc::new(CNot), &q).unwrap();
///
/// let pipeline = Pipeline::canonical(&PipelineConfig::default());
/// let result = pipeline.run(&mut circuit).unwrap();
/// assert!(result.modified);
/// assert_eq!(result.pass_stats.len(), 4);
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    passes: Vec<Arc<dyn OptimizationPass>>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// The four canonicalization passes in their required order
    pub fn canonical(config: &PipelineConfig) -> Self {
        Self::new()
            .with_pass(Arc::new(CzTargetGateset::new(config.atol)))
            .with_pass(Arc::new(MergeSingleQuditUnitaries::new(config.atol)))
            .with_pass(Arc::new(
                ConvertToPauliStringPhasors::new()
                    .with_keep_clifford(config.keep_clifford)
                    .with_atol(config.atol)
                    .with_failure_policy(config.failure_policy),
            ))
            .with_pass(Arc::new(DropEmptyMoments::new()))
    }

    /// Append a pass; passes run in the order they are added
    pub fn add_pass(&mut self, pass: Arc<dyn OptimizationPass>) {
        self.passes.push(pass);
    }

    pub fn with_pass(mut self, pass: Arc<dyn OptimizationPass>) -> Self {
        self.add_pass(pass);
        self
    }

    pub fn num_passes(&self) -> usize {
        self.passes.len()
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass once, in order
    ///
    /// # Errors
    /// The first error returned by a pass; the circuit is left as that pass
    /// found it
    pub fn run(&self, circuit: &mut Circuit) -> Result<OptimizationResult> {
        let start = Instant::now();
        let mut result = OptimizationResult::new();

        for pass in &self.passes {
            let pass_start = Instant::now();
            let modified = pass.apply(circuit)?;

            let mut stats = PassStatistics::new(pass.name().to_string());
            stats.modified = modified;
            stats.time_us = pass_start.elapsed().as_micros() as u64;
            debug!(
                pass = pass.name(),
                modified,
                time_us = stats.time_us,
                moments = circuit.num_moments(),
                "ran pass"
            );
            result.add_pass_stats(stats);
        }

        result.total_time_us = start.elapsed().as_micros() as u64;
        Ok(result)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("passes", &self.pass_names())
            .finish()
    }
}

/// Rewrite `circuit` into the canonical gate set
///
/// The result uses only single-qubit Clifford gates (unless
/// `no_clifford_gates`), CZ, Pauli-string phasors, channels and
/// measurements, plus whatever the conversion could not express. Running it
/// again on its own output gives an [`approx_eq`](Circuit::approx_eq)
/// circuit.
///
/// # Errors
/// An operation outside the CZ gate set that has no decomposition
pub fn converted_gate_set(circuit: &Circuit, no_clifford_gates: bool, atol: f64) -> Result<Circuit> {
    let config = PipelineConfig::new()
        .with_keep_clifford(!no_clifford_gates)
        .with_atol(atol)
        .with_failure_policy(FailurePolicy::BestEffort);

    let mut converted = circuit.clone();
    Pipeline::canonical(&config).run(&mut converted)?;
    Ok(converted)
}
