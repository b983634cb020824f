//! Merging of consecutive single-qudit unitaries
//!
//! Sequences of unitary single-qudit operations on one qudit with no
//! intervening operation on that qudit are multiplied into one
//! [`MatrixGate`]. The merged gate takes the place of the chain's first
//! operation, so the moment structure around it is unchanged.

use super::OptimizationPass;
use ahash::AHashMap;
use num_complex::Complex64;
use rhosim_core::{Circuit, Moment, Operation, QuditId, Result};
use rhosim_gates::matrix_ops::{approx_eq_up_to_phase, identity, multiply};
use rhosim_gates::MatrixGate;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

/// Position of an operation: (moment index, operation index)
type Position = (usize, usize);

/// A run of mergeable operations on one qudit, in time order
type Chain = SmallVec<[Position; 4]>;

/// Merge pass for single-qudit unitaries
///
/// Chains of at least two operations are merged; a chain whose product is
/// the identity up to global phase is removed.
///
/// # Example
/// ```
/// use rhosim_compiler::passes::{MergeSingleQuditUnitaries, OptimizationPass};
/// use rhosim_core::{Circuit, QuditId};
/// use rhosim_gates::{Hadamard, TGate};
/// use std::sync::Arc;
///
/// let q = QuditId::new(0);
/// let mut circuit = Circuit::new();
/// circuit.append_gate(Arc::new(Hadamard), &[q]).unwrap();
/// circuit.append_gate(Arc::new(TGate), &[q]).unwrap();
///
/// assert!(MergeSingleQuditUnitaries::default().apply(&mut circuit).unwrap());
/// assert_eq!(circuit.num_operations(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MergeSingleQuditUnitaries {
    atol: f64,
    min_merge_size: usize,
}

impl MergeSingleQuditUnitaries {
    pub fn new(atol: f64) -> Self {
        Self {
            atol,
            min_merge_size: 2,
        }
    }

    /// Set the minimum number of operations a chain needs to be merged
    pub fn with_min_merge_size(mut self, min_size: usize) -> Self {
        self.min_merge_size = min_size.max(2);
        self
    }

    fn is_mergeable(op: &Operation) -> bool {
        op.num_qudits() == 1 && op.gate().measurement_key().is_none() && op.gate().is_unitary()
    }

    /// Find chains of mergeable operations, qudit by qudit
    fn find_chains(&self, circuit: &Circuit) -> Vec<Chain> {
        let mut open: AHashMap<QuditId, Chain> = AHashMap::new();
        let mut chains = Vec::new();

        let close = |chain: Option<Chain>, chains: &mut Vec<Chain>| {
            if let Some(chain) = chain {
                if chain.len() >= self.min_merge_size {
                    chains.push(chain);
                }
            }
        };

        for (m, moment) in circuit.moments().iter().enumerate() {
            for (i, op) in moment.operations().iter().enumerate() {
                if Self::is_mergeable(op) {
                    open.entry(op.qudits()[0]).or_default().push((m, i));
                } else {
                    for q in op.qudits() {
                        close(open.remove(q), &mut chains);
                    }
                }
            }
        }

        // Finish in qudit order so the result does not depend on hashing
        let mut rest: Vec<_> = open.into_iter().collect();
        rest.sort_by_key(|(q, _)| *q);
        for (_, chain) in rest {
            close(Some(chain), &mut chains);
        }
        chains
    }

    /// Product of the chain's matrices, later operations on the left
    fn chain_product(circuit: &Circuit, chain: &Chain) -> Option<(Vec<Complex64>, usize)> {
        let op_at = |&(m, i): &Position| &circuit.moments()[m].operations()[i];
        let first = op_at(&chain[0]);
        let dim = first.qudits()[0].dimension();
        let mut product = first.matrix()?;
        for position in &chain[1..] {
            product = multiply(&op_at(position).matrix()?, &product, dim);
        }
        Some((product, dim))
    }
}

impl Default for MergeSingleQuditUnitaries {
    fn default() -> Self {
        Self::new(1e-8)
    }
}

impl OptimizationPass for MergeSingleQuditUnitaries {
    fn name(&self) -> &str {
        "merge-single-qudit-unitaries"
    }

    fn apply(&self, circuit: &mut Circuit) -> Result<bool> {
        let chains = self.find_chains(circuit);
        if chains.is_empty() {
            return Ok(false);
        }

        // None marks an operation for removal
        let mut replacements: AHashMap<Position, Option<Operation>> = AHashMap::new();
        for chain in &chains {
            let Some((product, dim)) = Self::chain_product(circuit, chain) else {
                continue;
            };
            let (m, i) = chain[0];
            let qudit = circuit.moments()[m].operations()[i].qudits()[0];

            let merged = if approx_eq_up_to_phase(&product, &identity(dim), self.atol) {
                None
            } else {
                let gate = MatrixGate::new(product, vec![dim])?;
                Some(Operation::new(Arc::new(gate), &[qudit])?)
            };
            debug!(
                qudit = %qudit,
                merged = chain.len(),
                identity = merged.is_none(),
                "merged single-qudit chain"
            );
            replacements.insert(chain[0], merged);
            for &position in &chain[1..] {
                replacements.insert(position, None);
            }
        }

        let mut moments = Vec::with_capacity(circuit.num_moments());
        for (m, moment) in circuit.moments().iter().enumerate() {
            let mut rebuilt = Moment::new();
            for (i, op) in moment.operations().iter().enumerate() {
                match replacements.remove(&(m, i)) {
                    Some(Some(merged)) => rebuilt.push(merged)?,
                    Some(None) => {}
                    None => rebuilt.push(op.clone())?,
                }
            }
            moments.push(rebuilt);
        }
        *circuit = Circuit::from_moments(moments);
        Ok(true)
    }

    fn description(&self) -> Option<&str> {
        Some("Multiplies runs of single-qudit unitaries on the same qudit into one gate")
    }
}
