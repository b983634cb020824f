//! Density tensor with a pool of scratch buffers
//!
//! Unitaries and channels write into scratch buffers of the same shape as
//! the state and then swap the result into place, so applying them never
//! allocates a tensor-sized buffer.
//!
//! # Buffer sharing
//!
//! [`BufferedDensityMatrix::copy`] always duplicates the state tensor. The
//! scratch pool is duplicated only for a deep copy; a shallow copy shares the
//! pool through an [`Arc`]. Buffers hold no state between calls, so sharing is
//! sound as long as only one of the copies is being mutated at a time.
//! Interleaving updates on two shallow copies is a contract violation.
//!
//! The pool is never waited on. If it is locked when an update starts, for
//! example because the guard from [`BufferedDensityMatrix::available_buffer`]
//! of a shallow copy is still alive, that update allocates private scratch
//! buffers instead of blocking.

use crate::error::{Result, StateError};
use crate::initial_state::InitialState;
use crate::precision::Precision;
use crate::qid_shape::QuditShape;
use crate::tensor;
use num_complex::Complex;
use num_traits::{One, Zero};
use parking_lot::{Mutex, MutexGuard};
use rand::Rng;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{trace, warn};

/// Number of scratch buffers owned by a state
pub const BUFFER_COUNT: usize = 3;

type Buffers<F> = [Vec<Complex<F>>; BUFFER_COUNT];
type BufferPool<F> = Arc<Mutex<Buffers<F>>>;

fn zeroed_buffers<F: Precision>(len: usize) -> Buffers<F> {
    std::array::from_fn(|_| vec![Complex::<F>::zero(); len])
}

fn new_pool<F: Precision>(len: usize) -> BufferPool<F> {
    Arc::new(Mutex::new(zeroed_buffers(len)))
}

/// Scratch space for one update: the shared pool, or private buffers when
/// the pool is held elsewhere
enum Scratch<'a, F: Precision> {
    Pooled(MutexGuard<'a, Buffers<F>>),
    Private(Buffers<F>),
}

impl<'a, F: Precision> Scratch<'a, F> {
    fn acquire(pool: &'a BufferPool<F>, len: usize) -> Self {
        match pool.try_lock() {
            Some(guard) => Scratch::Pooled(guard),
            None => {
                warn!(len, "scratch buffers are locked, using private buffers");
                Scratch::Private(zeroed_buffers(len))
            }
        }
    }
}

impl<F: Precision> Deref for Scratch<'_, F> {
    type Target = Buffers<F>;

    fn deref(&self) -> &Buffers<F> {
        match self {
            Scratch::Pooled(guard) => &**guard,
            Scratch::Private(buffers) => buffers,
        }
    }
}

impl<F: Precision> DerefMut for Scratch<'_, F> {
    fn deref_mut(&mut self) -> &mut Buffers<F> {
        match self {
            Scratch::Pooled(guard) => &mut **guard,
            Scratch::Private(buffers) => buffers,
        }
    }
}

/// Evolving density matrix plus its scratch buffers
pub struct BufferedDensityMatrix<F: Precision = f64> {
    tensor: Vec<Complex<F>>,
    buffers: BufferPool<F>,
    qid_shape: QuditShape,
}

impl<F: Precision> BufferedDensityMatrix<F> {
    /// Create a state from an initial value
    ///
    /// # Errors
    /// - [`StateError::Configuration`] if `qid_shape` is empty or holds a
    ///   dimension below 2
    /// - [`StateError::InvalidState`] / [`StateError::InvalidBasisState`] if
    ///   `initial_state` does not fit `qid_shape`
    ///
    /// # Example
    /// ```
    /// use rhosim_state::{BufferedDensityMatrix, InitialState};
    ///
    /// let state = BufferedDensityMatrix::<f64>::create(&InitialState::Basis(1), &[2, 3]).unwrap();
    /// assert_eq!(state.dimension(), 6);
    /// assert_eq!(state.tensor()[1 * 6 + 1].re, 1.0);
    /// ```
    pub fn create(initial_state: &InitialState<F>, qid_shape: &[usize]) -> Result<Self> {
        let qid_shape = QuditShape::new(qid_shape.to_vec())?;
        let tensor = initial_state.to_density_matrix(&qid_shape)?;
        Self::from_tensor(tensor, qid_shape)
    }

    /// Wrap an existing flat tensor, allocating fresh buffers
    ///
    /// # Errors
    /// Returns [`StateError::ShapeMismatch`] if `tensor` does not hold `D²`
    /// elements
    pub fn from_tensor(tensor: Vec<Complex<F>>, qid_shape: QuditShape) -> Result<Self> {
        if tensor.len() != qid_shape.tensor_len() {
            return Err(StateError::ShapeMismatch {
                expected: qid_shape.tensor_len(),
                actual: tensor.len(),
            });
        }
        Ok(Self {
            buffers: new_pool(tensor.len()),
            tensor,
            qid_shape,
        })
    }

    /// Copy the state, duplicating the buffers only when `deep_copy_buffers`
    pub fn copy(&self, deep_copy_buffers: bool) -> Self {
        let buffers = if deep_copy_buffers {
            Arc::new(Mutex::new(self.buffers.lock().clone()))
        } else {
            Arc::clone(&self.buffers)
        };
        Self {
            tensor: self.tensor.clone(),
            buffers,
            qid_shape: self.qid_shape.clone(),
        }
    }

    /// Read access to the scratch buffers
    ///
    /// While the guard lives, updates on any state sharing this pool use
    /// private scratch buffers.
    pub fn available_buffer(&self) -> MutexGuard<'_, Buffers<F>> {
        self.buffers.lock()
    }

    /// Whether both states use the very same buffer pool
    pub fn shares_buffers_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.buffers, &other.buffers)
    }

    /// Flat density tensor, equal to the row-major `D × D` matrix
    #[inline]
    pub fn tensor(&self) -> &[Complex<F>] {
        &self.tensor
    }

    pub fn into_tensor(self) -> Vec<Complex<F>> {
        self.tensor
    }

    #[inline]
    pub fn qid_shape(&self) -> &QuditShape {
        &self.qid_shape
    }

    /// Hilbert-space dimension `D`
    #[inline]
    pub fn dimension(&self) -> usize {
        self.qid_shape.dimension()
    }

    /// Real part of the trace
    pub fn trace(&self) -> F {
        tensor::trace(&self.tensor, self.dimension()).re
    }

    /// `Tr(ρ²)`
    pub fn purity(&self) -> F {
        let dim = self.dimension();
        // Tr(ρ²) = Σ ρ_ij ρ_ji
        (0..dim)
            .flat_map(|i| (0..dim).map(move |j| (i, j)))
            .fold(F::zero(), |acc, (i, j)| {
                acc + (self.tensor[i * dim + j] * self.tensor[j * dim + i]).re
            })
    }

    /// Sub-matrix size for `axes`, validating the matrix length against it
    fn check_operator(&self, operator: &[Complex<F>], axes: &[usize]) -> Result<()> {
        let sub: usize = axes.iter().map(|&a| self.qid_shape.dims()[a]).product();
        if operator.len() != sub * sub {
            return Err(StateError::ShapeMismatch {
                expected: sub * sub,
                actual: operator.len(),
            });
        }
        Ok(())
    }

    fn check_axes(&self, axes: &[usize]) -> Result<()> {
        let n = self.qid_shape.len();
        if let Some(&bad) = axes.iter().find(|&&a| a >= n) {
            return Err(StateError::ShapeMismatch {
                expected: n,
                actual: bad + 1,
            });
        }
        Ok(())
    }

    /// `ρ → U ρ U†` on the qudits at positions `axes`
    ///
    /// # Errors
    /// Returns [`StateError::ShapeMismatch`] if `unitary` is not square over
    /// the dimensions of `axes`
    pub fn apply_unitary(&mut self, unitary: &[Complex<F>], axes: &[usize]) -> Result<()> {
        self.check_axes(axes)?;
        self.check_operator(unitary, axes)?;
        let dims = self.qid_shape.tensor_shape();
        let cols = self.column_axes(axes);
        let conj: Vec<Complex<F>> = unitary.iter().map(|u| u.conj()).collect();

        let mut pool = Scratch::acquire(&self.buffers, self.tensor.len());
        let [rows_done, both_done, _] = &mut *pool;
        tensor::targeted_left_multiply(unitary, &dims, axes, &self.tensor, rows_done);
        tensor::targeted_left_multiply(&conj, &dims, &cols, rows_done, both_done);
        std::mem::swap(both_done, &mut self.tensor);
        trace!(axes = ?axes, "swapped unitary result into state");
        Ok(())
    }

    /// `ρ → Σ K ρ K†` on the qudits at positions `axes`
    ///
    /// # Errors
    /// Returns [`StateError::ShapeMismatch`] if any Kraus operator is not
    /// square over the dimensions of `axes`
    pub fn apply_channel(&mut self, kraus: &[Vec<Complex<F>>], axes: &[usize]) -> Result<()> {
        self.check_axes(axes)?;
        for operator in kraus {
            self.check_operator(operator, axes)?;
        }
        let dims = self.qid_shape.tensor_shape();
        let cols = self.column_axes(axes);

        let mut pool = Scratch::acquire(&self.buffers, self.tensor.len());
        let [rows_done, both_done, sum] = &mut *pool;
        sum.iter_mut().for_each(|v| *v = Complex::zero());
        for operator in kraus {
            let conj: Vec<Complex<F>> = operator.iter().map(|k| k.conj()).collect();
            tensor::targeted_left_multiply(operator, &dims, axes, &self.tensor, rows_done);
            tensor::targeted_left_multiply(&conj, &dims, &cols, rows_done, both_done);
            for (acc, v) in sum.iter_mut().zip(both_done.iter()) {
                *acc += *v;
            }
        }
        std::mem::swap(sum, &mut self.tensor);
        trace!(axes = ?axes, operators = kraus.len(), "swapped channel result into state");
        Ok(())
    }

    /// Measure the qudits at `axes` in the computational basis
    ///
    /// Samples an outcome from the diagonal with `rng`, projects onto it and
    /// renormalizes. Returns the outcome digit of each measured qudit.
    pub fn measure<R: Rng>(&mut self, axes: &[usize], rng: &mut R) -> Result<Vec<usize>> {
        self.check_axes(axes)?;
        let dims = self.qid_shape.dims().to_vec();
        let dim = self.dimension();
        let strides = tensor::strides(&dims);
        let digit = |index: usize, axis: usize| (index / strides[axis]) % dims[axis];

        let probabilities: Vec<f64> = (0..dim)
            .map(|i| self.tensor[i * dim + i].re.as_f64().max(0.0))
            .collect();
        let total: f64 = probabilities.iter().sum();
        let mut chosen = probabilities
            .iter()
            .rposition(|&p| p > 0.0)
            .ok_or_else(|| StateError::InvalidDensityMatrix {
                reason: "cannot measure a state with zero trace".to_string(),
            })?;
        let threshold = rng.gen::<f64>() * total;
        let mut cumulative = 0.0;
        for (i, p) in probabilities.iter().enumerate() {
            cumulative += p;
            if *p > 0.0 && threshold < cumulative {
                chosen = i;
                break;
            }
        }
        let outcome: Vec<usize> = axes.iter().map(|&a| digit(chosen, a)).collect();
        let matches = |index: usize| {
            axes.iter()
                .zip(&outcome)
                .all(|(&a, &o)| digit(index, a) == o)
        };

        let weight: f64 = (0..dim)
            .filter(|&i| matches(i))
            .map(|i| probabilities[i])
            .sum();
        let scale = F::from_f64(1.0 / weight);
        for r in 0..dim {
            let row_matches = matches(r);
            for c in 0..dim {
                let entry = &mut self.tensor[r * dim + c];
                if row_matches && matches(c) {
                    *entry = *entry * scale;
                } else {
                    *entry = Complex::zero();
                }
            }
        }
        trace!(axes = ?axes, outcome = ?outcome, probability = weight / total, "sampled measurement");
        Ok(outcome)
    }

    /// New state with zero-state qudits of `dims` appended
    ///
    /// The result is `ρ ⊗ |0⟩⟨0|` with freshly allocated buffers.
    pub fn with_zero_qudits(&self, dims: &[usize]) -> Result<Self> {
        let extra = QuditShape::new(dims.to_vec())?;
        let qid_shape = self.qid_shape.concat(&extra)?;
        let mut zero = vec![Complex::<F>::zero(); extra.tensor_len()];
        zero[0] = Complex::one();
        let tensor = tensor::density_matrix_kronecker_product(
            &self.tensor,
            self.dimension(),
            &zero,
            extra.dimension(),
        );
        Self::from_tensor(tensor, qid_shape)
    }

    /// New state with qudit `i` of the result taken from position `perm[i]`
    pub fn transposed(&self, perm: &[usize]) -> Result<Self> {
        let n = self.qid_shape.len();
        let mut seen = vec![false; n];
        for &p in perm {
            if p >= n || std::mem::replace(&mut seen[p], true) {
                return Err(StateError::ShapeMismatch {
                    expected: n,
                    actual: perm.len(),
                });
            }
        }
        if perm.len() != n {
            return Err(StateError::ShapeMismatch {
                expected: n,
                actual: perm.len(),
            });
        }
        let full: Vec<usize> = perm.iter().copied().chain(perm.iter().map(|p| p + n)).collect();
        let tensor = tensor::transpose(&self.tensor, &self.qid_shape.tensor_shape(), &full);
        Self::from_tensor(tensor, self.qid_shape.permuted(perm)?)
    }

    /// Partial trace keeping the qudits at positions `keep`, in that order
    pub fn partial_trace(&self, keep: &[usize]) -> Result<Vec<Complex<F>>> {
        self.check_axes(keep)?;
        Ok(tensor::partial_trace(&self.tensor, self.qid_shape.dims(), keep))
    }

    fn column_axes(&self, axes: &[usize]) -> Vec<usize> {
        let n = self.qid_shape.len();
        axes.iter().map(|a| a + n).collect()
    }
}

impl<F: Precision> std::fmt::Debug for BufferedDensityMatrix<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedDensityMatrix")
            .field("qid_shape", &self.qid_shape.dims())
            .field("trace", &self.trace())
            .finish()
    }
}
