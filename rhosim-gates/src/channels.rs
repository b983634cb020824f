//! Noise channels in Kraus form
//!
//! These gates have no unitary; they expose only [`Gate::kraus`], so the
//! density-matrix dispatcher applies them as `ρ → Σᵢ Kᵢ ρ Kᵢ†`.

use crate::matrices::{flatten, IDENTITY, PAULI_X, PAULI_Y, PAULI_Z};
use crate::matrix_ops::{is_trace_preserving, square_dim};
use num_complex::Complex64;
use rhosim_core::gate::Gate;
use rhosim_core::{QuantumError, Result};

fn scaled(matrix: &[[Complex64; 2]; 2], factor: f64) -> Vec<Complex64> {
    flatten(matrix).into_iter().map(|x| x * factor).collect()
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(QuantumError::InvalidParameter(format!(
            "{} probability must be in [0,1], got {}",
            name, p
        )));
    }
    Ok(())
}

/// Depolarizing noise channel
///
/// # Kraus Operators
/// ```text
/// K₀ = √(1-p) I
/// K₁ = √(p/3) X
/// K₂ = √(p/3) Y
/// K₃ = √(p/3) Z
/// ```
///
/// # Example
/// ```
/// # use rhosim_gates::channels::DepolarizingChannel;
/// let channel = DepolarizingChannel::new(0.01).unwrap();
/// assert_eq!(channel.error_probability(), 0.01);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepolarizingChannel {
    error_probability: f64,
}

impl DepolarizingChannel {
    /// # Errors
    /// Returns error if probability is not in [0, 1]
    pub fn new(error_probability: f64) -> Result<Self> {
        check_probability("Depolarizing", error_probability)?;
        Ok(Self { error_probability })
    }

    pub fn error_probability(&self) -> f64 {
        self.error_probability
    }
}

impl Gate for DepolarizingChannel {
    fn name(&self) -> &str {
        "DEPOLARIZE"
    }

    fn num_qudits(&self) -> usize {
        1
    }

    fn kraus(&self) -> Option<Vec<Vec<Complex64>>> {
        let p = self.error_probability;
        let pauli_weight = (p / 3.0).sqrt();
        Some(vec![
            scaled(&IDENTITY, (1.0 - p).sqrt()),
            scaled(&PAULI_X, pauli_weight),
            scaled(&PAULI_Y, pauli_weight),
            scaled(&PAULI_Z, pauli_weight),
        ])
    }

    fn description(&self) -> String {
        format!("depolarize(p={})", self.error_probability)
    }
}

/// Amplitude damping (T1 relaxation)
///
/// ```text
/// K₀ = [[1, 0], [0, √(1-γ)]]
/// K₁ = [[0, √γ], [0, 0]]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeDamping {
    gamma: f64,
}

impl AmplitudeDamping {
    /// # Errors
    /// Returns error if `gamma` is not in [0, 1]
    pub fn new(gamma: f64) -> Result<Self> {
        check_probability("Amplitude damping", gamma)?;
        Ok(Self { gamma })
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Gate for AmplitudeDamping {
    fn name(&self) -> &str {
        "AMPLITUDE_DAMP"
    }

    fn num_qudits(&self) -> usize {
        1
    }

    fn kraus(&self) -> Option<Vec<Vec<Complex64>>> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        Some(vec![
            vec![one, zero, zero, Complex64::new((1.0 - self.gamma).sqrt(), 0.0)],
            vec![zero, Complex64::new(self.gamma.sqrt(), 0.0), zero, zero],
        ])
    }

    fn description(&self) -> String {
        format!("amplitude_damp(gamma={})", self.gamma)
    }
}

/// Phase damping (pure dephasing)
///
/// ```text
/// K₀ = [[1, 0], [0, √(1-λ)]]
/// K₁ = [[0, 0], [0, √λ]]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseDamping {
    lambda: f64,
}

impl PhaseDamping {
    /// # Errors
    /// Returns error if `lambda` is not in [0, 1]
    pub fn new(lambda: f64) -> Result<Self> {
        check_probability("Phase damping", lambda)?;
        Ok(Self { lambda })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl Gate for PhaseDamping {
    fn name(&self) -> &str {
        "PHASE_DAMP"
    }

    fn num_qudits(&self) -> usize {
        1
    }

    fn kraus(&self) -> Option<Vec<Vec<Complex64>>> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        Some(vec![
            vec![one, zero, zero, Complex64::new((1.0 - self.lambda).sqrt(), 0.0)],
            vec![zero, zero, zero, Complex64::new(self.lambda.sqrt(), 0.0)],
        ])
    }

    fn description(&self) -> String {
        format!("phase_damp(lambda={})", self.lambda)
    }
}

/// Arbitrary trace-preserving channel on qudits of any dimension
#[derive(Debug, Clone)]
pub struct KrausChannel {
    name: String,
    qid_shape: Vec<usize>,
    operators: Vec<Vec<Complex64>>,
}

impl KrausChannel {
    /// Create a channel from flattened Kraus operators
    ///
    /// # Errors
    /// Returns error if an operator has the wrong size for `qid_shape` or
    /// the operators do not satisfy `Σ K† K = I` within `1e-8`
    pub fn new(
        name: impl Into<String>,
        qid_shape: Vec<usize>,
        operators: Vec<Vec<Complex64>>,
    ) -> Result<Self> {
        let name = name.into();
        let dim: usize = qid_shape.iter().product();
        if operators.is_empty() {
            return Err(QuantumError::invalid_matrix(&name, "no Kraus operators"));
        }
        if let Some(bad) = operators.iter().find(|k| square_dim(k.len()) != Some(dim)) {
            return Err(QuantumError::invalid_matrix(
                &name,
                format!("Kraus operator of length {} does not act on dimension {}", bad.len(), dim),
            ));
        }
        if !is_trace_preserving(&operators, dim, 1e-8) {
            return Err(QuantumError::invalid_matrix(&name, "channel is not trace preserving"));
        }
        Ok(Self {
            name,
            qid_shape,
            operators,
        })
    }
}

impl Gate for KrausChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qudits(&self) -> usize {
        self.qid_shape.len()
    }

    fn qid_shape(&self) -> Vec<usize> {
        self.qid_shape.clone()
    }

    fn kraus(&self) -> Option<Vec<Vec<Complex64>>> {
        Some(self.operators.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_are_trace_preserving() {
        let channels: Vec<Box<dyn Gate>> = vec![
            Box::new(DepolarizingChannel::new(0.2).unwrap()),
            Box::new(AmplitudeDamping::new(0.3).unwrap()),
            Box::new(PhaseDamping::new(0.4).unwrap()),
        ];
        for channel in channels {
            assert!(channel.matrix().is_none());
            assert!(!channel.is_unitary());
            let kraus = channel.kraus().unwrap();
            assert!(is_trace_preserving(&kraus, 2, 1e-12), "{}", channel.name());
        }
    }

    #[test]
    fn test_invalid_probability() {
        assert!(DepolarizingChannel::new(1.5).is_err());
        assert!(AmplitudeDamping::new(-0.1).is_err());
        assert!(PhaseDamping::new(2.0).is_err());
    }

    #[test]
    fn test_kraus_channel_validation() {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);

        // Full dephasing on a qutrit
        let projectors: Vec<Vec<Complex64>> = (0..3)
            .map(|k| {
                let mut p = vec![zero; 9];
                p[k * 3 + k] = one;
                p
            })
            .collect();
        let channel = KrausChannel::new("DEPHASE3", vec![3], projectors.clone()).unwrap();
        assert_eq!(channel.qid_shape(), vec![3]);
        assert_eq!(channel.kraus().unwrap().len(), 3);

        assert!(KrausChannel::new("BAD", vec![3], projectors[..2].to_vec()).is_err());
        assert!(KrausChannel::new("BAD", vec![2], projectors).is_err());
        assert!(KrausChannel::new("EMPTY", vec![2], vec![]).is_err());
    }
}
