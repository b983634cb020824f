//! Circuit rewriting pass trait and implementations

use rhosim_core::{Circuit, Moment, Operation, Result};

/// Trait for circuit rewriting passes
///
/// A pass transforms a circuit in place, for example by retargeting it onto
/// a smaller gate set or by merging gates.
///
/// # Example
/// ```
/// use rhosim_compiler::passes::OptimizationPass;
/// use rhosim_core::{Circuit, Result};
///
/// struct Noop;
///
/// impl OptimizationPass for Noop {
///     fn name(&self) -> &str {
///         "noop"
///     }
///
///     fn apply(&self, _circuit: &mut Circuit) -> Result<bool> {
///         Ok(false)
///     }
/// }
///
/// assert!(!Noop.apply(&mut Circuit::new()).unwrap());
/// ```
pub trait OptimizationPass: Send + Sync {
    /// The name of this pass
    fn name(&self) -> &str;

    /// Apply the pass to a circuit
    ///
    /// # Returns
    /// * `Ok(true)` if the circuit was modified
    /// * `Ok(false)` if the circuit was not modified
    ///
    /// # Errors
    /// Returns an error if an operation cannot be rewritten and the pass is
    /// not allowed to leave it in place
    fn apply(&self, circuit: &mut Circuit) -> Result<bool>;

    /// Optional description of what this pass does
    fn description(&self) -> Option<&str> {
        None
    }
}

/// Statistics about a pass execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassStatistics {
    /// The name of the pass
    pub pass_name: String,
    /// Whether the pass modified the circuit
    pub modified: bool,
    /// Time spent in this pass (microseconds)
    pub time_us: u64,
}

impl PassStatistics {
    pub fn new(pass_name: String) -> Self {
        Self {
            pass_name,
            modified: false,
            time_us: 0,
        }
    }
}

/// Result of running a sequence of passes
#[derive(Debug, Clone, Default)]
pub struct OptimizationResult {
    /// Whether any pass modified the circuit
    pub modified: bool,
    /// Statistics for each pass, in run order
    pub pass_stats: Vec<PassStatistics>,
    /// Total time (microseconds)
    pub total_time_us: u64,
}

impl OptimizationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add statistics for a pass
    pub fn add_pass_stats(&mut self, stats: PassStatistics) {
        self.modified |= stats.modified;
        self.total_time_us += stats.time_us;
        self.pass_stats.push(stats);
    }
}

/// Lay out per-operation replacements of one moment
///
/// Replacement `k` of every sequence goes into new moment `k`. Sequences
/// coming from one moment act on disjoint qudits, so each new moment stays
/// disjoint. At least one moment is produced, possibly empty.
///
/// # Errors
/// Returns an error if a replacement touches a qudit claimed by another
/// sequence of the same moment
pub(crate) fn lay_out(replacements: Vec<Vec<Operation>>) -> Result<Vec<Moment>> {
    let depth = replacements.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let mut moments = vec![Moment::new(); depth];
    for sequence in replacements {
        for (moment, op) in moments.iter_mut().zip(sequence) {
            moment.push(op)?;
        }
    }
    Ok(moments)
}

mod drop_empty_moments;
mod merge_single_qudit;
mod pauli_string_phasors;
mod target_gateset;

pub use drop_empty_moments::DropEmptyMoments;
pub use merge_single_qudit::MergeSingleQuditUnitaries;
pub use pauli_string_phasors::ConvertToPauliStringPhasors;
pub use target_gateset::CzTargetGateset;
