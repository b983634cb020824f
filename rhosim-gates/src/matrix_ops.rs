//! Operations on flattened square gate matrices
//!
//! Every matrix here is a row-major `Vec<Complex64>` of length `n²`.

use num_complex::Complex64;

/// Side length of a flattened square matrix, if `len` is a perfect square
pub fn square_dim(len: usize) -> Option<usize> {
    let n = (len as f64).sqrt().round() as usize;
    (n * n == len).then_some(n)
}

/// The `n × n` identity
pub fn identity(n: usize) -> Vec<Complex64> {
    let mut m = vec![Complex64::new(0.0, 0.0); n * n];
    for i in 0..n {
        m[i * n + i] = Complex64::new(1.0, 0.0);
    }
    m
}

/// Matrix product `A · B` of two `n × n` matrices
pub fn multiply(a: &[Complex64], b: &[Complex64], n: usize) -> Vec<Complex64> {
    let mut result = vec![Complex64::new(0.0, 0.0); n * n];
    for i in 0..n {
        for k in 0..n {
            let a_ik = a[i * n + k];
            if a_ik == Complex64::new(0.0, 0.0) {
                continue;
            }
            for j in 0..n {
                result[i * n + j] += a_ik * b[k * n + j];
            }
        }
    }
    result
}

/// Conjugate transpose of an `n × n` matrix
pub fn adjoint(a: &[Complex64], n: usize) -> Vec<Complex64> {
    let mut result = vec![Complex64::new(0.0, 0.0); n * n];
    for i in 0..n {
        for j in 0..n {
            result[j * n + i] = a[i * n + j].conj();
        }
    }
    result
}

/// Tensor product `A ⊗ B` with `A` on the most significant index
pub fn tensor_product(a: &[Complex64], n_a: usize, b: &[Complex64], n_b: usize) -> Vec<Complex64> {
    let n = n_a * n_b;
    let mut result = vec![Complex64::new(0.0, 0.0); n * n];
    for i in 0..n_a {
        for j in 0..n_a {
            let a_ij = a[i * n_a + j];
            for k in 0..n_b {
                for l in 0..n_b {
                    result[(i * n_b + k) * n + j * n_b + l] = a_ij * b[k * n_b + l];
                }
            }
        }
    }
    result
}

/// Entrywise comparison within `atol`
pub fn approx_eq(a: &[Complex64], b: &[Complex64], atol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).norm() <= atol)
}

/// Whether `a = e^{iφ} b` for some global phase φ, within `atol`
pub fn approx_eq_up_to_phase(a: &[Complex64], b: &[Complex64], atol: f64) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let Some(pivot) = (0..b.len()).max_by(|&i, &j| b[i].norm().total_cmp(&b[j].norm())) else {
        return true;
    };
    if b[pivot].norm() <= atol {
        return a.iter().all(|x| x.norm() <= atol);
    }
    let phase = a[pivot] / b[pivot];
    if (phase.norm() - 1.0).abs() > atol {
        return false;
    }
    a.iter().zip(b).all(|(x, y)| (x - phase * y).norm() <= atol)
}

/// Whether `U† U = I` within `atol`
pub fn is_unitary(m: &[Complex64], n: usize, atol: f64) -> bool {
    m.len() == n * n && approx_eq(&multiply(&adjoint(m, n), m, n), &identity(n), atol)
}

/// Whether `Σ K† K = I` within `atol`
pub fn is_trace_preserving(kraus: &[Vec<Complex64>], n: usize, atol: f64) -> bool {
    let mut sum = vec![Complex64::new(0.0, 0.0); n * n];
    for k in kraus {
        if k.len() != n * n {
            return false;
        }
        for (acc, v) in sum.iter_mut().zip(multiply(&adjoint(k, n), k, n)) {
            *acc += v;
        }
    }
    approx_eq(&sum, &identity(n), atol)
}
