//! Computational-basis measurement

use rhosim_core::gate::Gate;
use rhosim_core::{Operation, QuditId, Result};
use std::sync::Arc;

/// Measures its qudits in the computational basis and records the outcome
/// under a key
///
/// # Example
/// ```
/// use rhosim_core::{gate::Gate, QuditId};
/// use rhosim_gates::MeasurementGate;
///
/// let op = MeasurementGate::on("m", &QuditId::range(0, 2)).unwrap();
/// assert_eq!(op.gate().measurement_key(), Some("m"));
/// assert!(op.gate().kraus().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementGate {
    key: String,
    qid_shape: Vec<usize>,
}

impl MeasurementGate {
    pub fn new(key: impl Into<String>, qid_shape: Vec<usize>) -> Self {
        Self {
            key: key.into(),
            qid_shape,
        }
    }

    /// Measurement operation on `qudits`, shaped after their dimensions
    pub fn on(key: impl Into<String>, qudits: &[QuditId]) -> Result<Operation> {
        let shape = qudits.iter().map(|q| q.dimension()).collect();
        Operation::new(Arc::new(Self::new(key, shape)), qudits)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Gate for MeasurementGate {
    fn name(&self) -> &str {
        "M"
    }

    fn num_qudits(&self) -> usize {
        self.qid_shape.len()
    }

    fn qid_shape(&self) -> Vec<usize> {
        self.qid_shape.clone()
    }

    fn measurement_key(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn description(&self) -> String {
        format!("measure('{}')", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_of_mixed_dimensions() {
        let qudits = [QuditId::new(0), QuditId::with_dimension(1, 3).unwrap()];
        let op = MeasurementGate::on("result", &qudits).unwrap();
        assert_eq!(op.gate().qid_shape(), vec![2, 3]);
        assert!(!op.gate().is_unitary());
        assert!(op.decompose().is_none());
    }
}
