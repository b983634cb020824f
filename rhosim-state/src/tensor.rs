//! Index kernels over flat row-major tensors
//!
//! A density tensor over qid shape `[d0, .., dn-1]` is stored flat with axes
//! `[d0, .., dn-1, d0, .., dn-1]`. Qudit `i` owns row axis `i` and column
//! axis `i + n`.

use crate::precision::Precision;
use num_complex::Complex;
use num_traits::Zero;

/// Row-major strides of a tensor with the given axis dimensions
pub fn strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }
    strides
}

/// Offsets of every index combination over `axes`, first axis most
/// significant
fn axis_offsets(dims: &[usize], strides: &[usize], axes: &[usize]) -> Vec<usize> {
    let mut offsets = vec![0usize];
    for &axis in axes {
        offsets = offsets
            .iter()
            .flat_map(|&base| (0..dims[axis]).map(move |k| base + k * strides[axis]))
            .collect();
    }
    offsets
}

/// Left-multiply `matrix` into the given `axes` of `src`, writing to `dst`
///
/// `matrix` is square over the product of the targeted dimensions, its
/// row/column index ordered like `axes`. Every element of `dst` is written.
/// Only offset tables the size of `matrix`'s side are allocated; the
/// untargeted axes are walked in place.
pub fn targeted_left_multiply<F: Precision>(
    matrix: &[Complex<F>],
    dims: &[usize],
    axes: &[usize],
    src: &[Complex<F>],
    dst: &mut [Complex<F>],
) {
    let strides = strides(dims);
    let sub = axis_offsets(dims, &strides, axes);
    let k = sub.len();
    let others: Vec<usize> = (0..dims.len()).filter(|a| !axes.contains(a)).collect();
    let count: usize = others.iter().map(|&a| dims[a]).product();

    let mut index = vec![0usize; others.len()];
    let mut base = 0usize;
    for _ in 0..count {
        for (r, &out) in sub.iter().enumerate() {
            let row = &matrix[r * k..(r + 1) * k];
            let mut acc = Complex::<F>::zero();
            for (m, &inp) in row.iter().zip(&sub) {
                acc += *m * src[base + inp];
            }
            dst[base + out] = acc;
        }
        // odometer increment over the untargeted axes, last axis fastest
        for (i, &axis) in others.iter().enumerate().rev() {
            index[i] += 1;
            base += strides[axis];
            if index[i] < dims[axis] {
                break;
            }
            base -= strides[axis] * dims[axis];
            index[i] = 0;
        }
    }
}

/// Kronecker product of two flat density matrices of dimension `da` and `db`
///
/// The result has dimension `da·db`, with `a`'s qudits first.
pub fn density_matrix_kronecker_product<F: Precision>(
    a: &[Complex<F>],
    da: usize,
    b: &[Complex<F>],
    db: usize,
) -> Vec<Complex<F>> {
    let d = da * db;
    let mut out = vec![Complex::<F>::zero(); d * d];
    for ra in 0..da {
        for ca in 0..da {
            let va = a[ra * da + ca];
            if va.is_zero() {
                continue;
            }
            for rb in 0..db {
                let row = (ra * db + rb) * d + ca * db;
                for cb in 0..db {
                    out[row + cb] = va * b[rb * db + cb];
                }
            }
        }
    }
    out
}

/// Permute tensor axes: output axis `i` is input axis `perm[i]`
pub fn transpose<F: Precision>(src: &[Complex<F>], dims: &[usize], perm: &[usize]) -> Vec<Complex<F>> {
    let src_strides = strides(dims);
    let out_dims: Vec<usize> = perm.iter().map(|&p| dims[p]).collect();
    // stride in `src` of each output axis
    let gather: Vec<usize> = perm.iter().map(|&p| src_strides[p]).collect();

    let mut out = Vec::with_capacity(src.len());
    let mut index = vec![0usize; out_dims.len()];
    let mut offset = 0usize;
    for _ in 0..src.len() {
        out.push(src[offset]);
        // odometer increment, last axis fastest
        for axis in (0..out_dims.len()).rev() {
            index[axis] += 1;
            offset += gather[axis];
            if index[axis] < out_dims[axis] {
                break;
            }
            offset -= gather[axis] * out_dims[axis];
            index[axis] = 0;
        }
    }
    out
}

/// Partial trace of a flat density matrix over every qudit not in `keep`
///
/// Returns the `(D_keep, D_keep)` matrix whose qudits follow the order of
/// `keep` (positions into `qid_shape`).
pub fn partial_trace<F: Precision>(
    rho: &[Complex<F>],
    qid_shape: &[usize],
    keep: &[usize],
) -> Vec<Complex<F>> {
    let dim: usize = qid_shape.iter().product();
    let traced: Vec<usize> = (0..qid_shape.len()).filter(|q| !keep.contains(q)).collect();
    let qudit_strides = strides(qid_shape);

    let keep_offsets = axis_offsets(qid_shape, &qudit_strides, keep);
    let traced_offsets = axis_offsets(qid_shape, &qudit_strides, &traced);
    let kept_dim = keep_offsets.len();

    let mut out = vec![Complex::<F>::zero(); kept_dim * kept_dim];
    for (r, &row) in keep_offsets.iter().enumerate() {
        for (c, &col) in keep_offsets.iter().enumerate() {
            let mut acc = Complex::<F>::zero();
            for &t in &traced_offsets {
                acc += rho[(row + t) * dim + col + t];
            }
            out[r * kept_dim + c] = acc;
        }
    }
    out
}

/// Trace of a flat `dim × dim` matrix
pub fn trace<F: Precision>(rho: &[Complex<F>], dim: usize) -> Complex<F> {
    (0..dim).fold(Complex::<F>::zero(), |acc, i| acc + rho[i * dim + i])
}
