//! Density-matrix validity checks
//!
//! A density matrix has unit trace, is Hermitian and is positive
//! semi-definite. Positivity is tested by a Cholesky factorization of
//! `ρ + atol·I`, which succeeds exactly when no eigenvalue of `ρ` lies
//! below `-atol`.

use crate::precision::{widen, Precision};
use num_complex::{Complex, Complex64};
use std::fmt;

/// Outcome of [`validate_density_matrix`] with diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMatrixReport {
    /// Real part of the trace
    pub trace: f64,
    /// Largest `|ρ_ij - conj(ρ_ji)|`
    pub hermiticity_error: f64,
    pub hermitian: bool,
    pub positive_semidefinite: bool,
    pub valid: bool,
}

impl DensityMatrixReport {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// First failed property, for error messages
    pub fn failure(&self) -> Option<String> {
        if self.valid {
            None
        } else if !self.hermitian {
            Some(format!(
                "not Hermitian (error {:.2e})",
                self.hermiticity_error
            ))
        } else if !self.positive_semidefinite {
            Some("not positive semi-definite".to_string())
        } else {
            Some(format!("trace is {} instead of 1", self.trace))
        }
    }
}

impl fmt::Display for DensityMatrixReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DensityMatrixReport(valid={}, trace={:.6}, hermitian={}, psd={})",
            self.valid, self.trace, self.hermitian, self.positive_semidefinite
        )
    }
}

/// Check a flat `dim × dim` matrix against every density-matrix property
///
/// A matrix of the wrong size is reported invalid on all counts.
pub fn validate_density_matrix<F: Precision>(
    matrix: &[Complex<F>],
    dim: usize,
    atol: f64,
) -> DensityMatrixReport {
    if dim == 0 || matrix.len() != dim * dim {
        return DensityMatrixReport {
            trace: 0.0,
            hermiticity_error: f64::INFINITY,
            hermitian: false,
            positive_semidefinite: false,
            valid: false,
        };
    }
    let rho: Vec<Complex64> = matrix.iter().map(|&v| widen(v)).collect();

    let trace: f64 = (0..dim).map(|i| rho[i * dim + i].re).sum();
    let hermiticity_error = (0..dim)
        .flat_map(|i| (0..dim).map(move |j| (i, j)))
        .map(|(i, j)| (rho[i * dim + j] - rho[j * dim + i].conj()).norm())
        .fold(0.0, f64::max);
    let hermitian = hermiticity_error <= atol;
    let positive_semidefinite = hermitian && cholesky_succeeds(&rho, dim, atol);
    let valid = hermitian && positive_semidefinite && (trace - 1.0).abs() <= atol;

    DensityMatrixReport {
        trace,
        hermiticity_error,
        hermitian,
        positive_semidefinite,
        valid,
    }
}

/// Whether `matrix` is a valid `dim × dim` density matrix within `atol`
///
/// # Example
/// ```
/// use num_complex::Complex64;
/// use rhosim_state::is_valid_density_matrix;
///
/// let mixed = vec![
///     Complex64::new(0.5, 0.0), Complex64::new(0.0, 0.0),
///     Complex64::new(0.0, 0.0), Complex64::new(0.5, 0.0),
/// ];
/// assert!(is_valid_density_matrix(&mixed, 2, 1e-8));
/// ```
pub fn is_valid_density_matrix<F: Precision>(matrix: &[Complex<F>], dim: usize, atol: f64) -> bool {
    validate_density_matrix(matrix, dim, atol).valid
}

/// Cholesky factorization of the Hermitian matrix `ρ + atol·I`
fn cholesky_succeeds(rho: &[Complex64], dim: usize, atol: f64) -> bool {
    let mut l = vec![Complex64::new(0.0, 0.0); dim * dim];
    for j in 0..dim {
        let mut diag = rho[j * dim + j].re + atol;
        for k in 0..j {
            diag -= l[j * dim + k].norm_sqr();
        }
        if diag <= 0.0 {
            return false;
        }
        let pivot = diag.sqrt();
        l[j * dim + j] = Complex64::new(pivot, 0.0);
        for i in (j + 1)..dim {
            let mut sum = rho[i * dim + j];
            for k in 0..j {
                sum -= l[i * dim + k] * l[j * dim + k].conj();
            }
            l[i * dim + j] = sum / pivot;
        }
    }
    true
}
