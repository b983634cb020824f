//! Matrix utilities for single-qubit gate rewriting
//!
//! Angles produced here are measured in half turns: a rotation by `t` half
//! turns is a rotation by `π·t` radians, matching
//! [`PauliStringPhasorGate::rotation`](rhosim_gates::PauliStringPhasorGate::rotation).

use num_complex::Complex64;
use std::f64::consts::PI;

/// View a flattened 2x2 matrix as rows
///
/// Returns `None` unless `matrix` has exactly four entries.
#[inline]
pub fn to_2x2(matrix: &[Complex64]) -> Option<[[Complex64; 2]; 2]> {
    match *matrix {
        [a, b, c, d] => Some([[a, b], [c, d]]),
        _ => None,
    }
}

/// Wrap a half-turn count into `(-1, 1]`
///
/// Values within `atol` of `-1` are snapped to `1` so that a half turn has a
/// single representation.
///
/// # Example
/// ```
/// use rhosim_compiler::matrix_utils::normalize_half_turns;
///
/// assert_eq!(normalize_half_turns(2.5, 1e-9), 0.5);
/// assert_eq!(normalize_half_turns(-1.0, 1e-9), 1.0);
/// assert!((normalize_half_turns(1.25, 1e-9) + 0.75).abs() < 1e-12);
/// ```
pub fn normalize_half_turns(half_turns: f64, atol: f64) -> f64 {
    let mut t = half_turns.rem_euclid(2.0);
    if t > 1.0 {
        t -= 2.0;
    }
    if (t + 1.0).abs() <= atol {
        1.0
    } else {
        t
    }
}

/// Euler angles of a single-qubit unitary, `U ∝ Rz(after)·Rx(x)·Rz(before)`
///
/// Applied in time order the rotations are `Z^before`, `X^x`, `Z^after`.
/// `x` lies in `[0, 1]`; `before` and `after` lie in `(-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZxzAngles {
    pub before: f64,
    pub x: f64,
    pub after: f64,
}

/// Decompose a single-qubit unitary into Z, X, Z rotations
///
/// The decomposition is deterministic and stable under recomposition:
/// decomposing the product of the returned rotations yields the same
/// angles again. When the X rotation is within `atol` of zero the unitary is
/// treated as diagonal and expressed as one Z rotation; when it is within
/// `atol` of a half turn the leading Z rotation is fixed to zero.
pub fn zxz_decomposition(u: &[[Complex64; 2]; 2], atol: f64) -> ZxzAngles {
    let x = 2.0 * u[1][0].norm().atan2(u[0][0].norm()) / PI;

    let (before, x, after) = if x <= atol {
        (0.0, 0.0, (u[1][1] * u[0][0].conj()).arg())
    } else if 1.0 - x <= atol {
        (0.0, x, (u[1][0] * u[0][1].conj()).arg())
    } else {
        let after = (Complex64::i() * u[1][0] * u[0][0].conj()).arg();
        let sum = (u[1][1] * u[0][0].conj()).arg();
        (sum - after, x, after)
    };

    ZxzAngles {
        before: normalize_half_turns(before / PI, atol),
        x,
        after: normalize_half_turns(after / PI, atol),
    }
}
