//! Element precision of the density tensor
//!
//! Gates report their effects in `Complex64`. The state itself may be kept in
//! single or double precision; matrices are narrowed on the way in and
//! probabilities widened on the way out.

use num_complex::{Complex, Complex64};
use num_traits::{Float, NumAssign};
use std::fmt::{Debug, Display};

/// Floating-point type usable as the real part of the density tensor
pub trait Precision:
    Float + NumAssign + Debug + Display + Default + Send + Sync + 'static
{
    /// Tolerance at which two tensors of this precision count as equal
    const TOLERANCE: f64;

    fn from_f64(value: f64) -> Self;

    fn as_f64(self) -> f64;
}

impl Precision for f32 {
    const TOLERANCE: f64 = 1e-6;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Precision for f64 {
    const TOLERANCE: f64 = 1e-12;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }
}

/// Narrow a `Complex64` to the state precision
#[inline]
pub fn narrow<F: Precision>(value: Complex64) -> Complex<F> {
    Complex::new(F::from_f64(value.re), F::from_f64(value.im))
}

/// Widen a state element to `Complex64`
#[inline]
pub fn widen<F: Precision>(value: Complex<F>) -> Complex64 {
    Complex64::new(value.re.as_f64(), value.im.as_f64())
}

/// Narrow a whole matrix
pub fn narrow_all<F: Precision>(values: &[Complex64]) -> Vec<Complex<F>> {
    values.iter().map(|&v| narrow(v)).collect()
}
