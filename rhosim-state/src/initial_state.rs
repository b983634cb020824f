//! Accepted forms of an initial state

use crate::error::{Result, StateError};
use crate::precision::Precision;
use crate::qid_shape::QuditShape;
use num_complex::Complex;
use num_traits::{One, Zero};

/// Initial value of a density-matrix state
///
/// An array is interpreted by its shape against the declared qid shape
/// `[d0, .., dn-1]` with `D = Π dᵢ`, checked in this order:
///
/// | shape                          | meaning                      |
/// |--------------------------------|------------------------------|
/// | `[D]` or `[d0, .., dn-1]`      | state vector `|ψ⟩`, ρ = `|ψ⟩⟨ψ|` |
/// | `[D, D]` or `[d0, .., d0, ..]` | density matrix, used as is   |
///
/// Any other shape is rejected with [`StateError::InvalidState`].
#[derive(Debug, Clone, PartialEq)]
pub enum InitialState<F: Precision = f64> {
    /// Computational-basis state `|k⟩⟨k|`
    Basis(usize),
    /// Row-major array with an explicit shape
    Array {
        data: Vec<Complex<F>>,
        shape: Vec<usize>,
    },
}

impl<F: Precision> Default for InitialState<F> {
    fn default() -> Self {
        InitialState::Basis(0)
    }
}

impl<F: Precision> From<usize> for InitialState<F> {
    fn from(index: usize) -> Self {
        InitialState::Basis(index)
    }
}

impl<F: Precision> InitialState<F> {
    /// Flat state vector, shape `[len]`
    pub fn vector(data: Vec<Complex<F>>) -> Self {
        let shape = vec![data.len()];
        InitialState::Array { data, shape }
    }

    /// Flat `dim × dim` matrix, shape `[dim, dim]`
    pub fn matrix(data: Vec<Complex<F>>, dim: usize) -> Self {
        InitialState::Array {
            data,
            shape: vec![dim, dim],
        }
    }

    /// Array with an explicit shape
    pub fn array(data: Vec<Complex<F>>, shape: Vec<usize>) -> Self {
        InitialState::Array { data, shape }
    }

    /// Materialize the flat `D × D` density matrix for `qid_shape`
    ///
    /// # Errors
    /// Returns [`StateError::InvalidBasisState`] for a basis index `≥ D` and
    /// [`StateError::InvalidState`] for an array whose shape is not one of
    /// the accepted forms, or whose data length disagrees with its shape
    pub fn to_density_matrix(&self, qid_shape: &QuditShape) -> Result<Vec<Complex<F>>> {
        let dim = qid_shape.dimension();
        match self {
            InitialState::Basis(index) => {
                if *index >= dim {
                    return Err(StateError::InvalidBasisState {
                        index: *index,
                        dimension: dim,
                    });
                }
                let mut rho = vec![Complex::<F>::zero(); dim * dim];
                rho[index * dim + index] = Complex::one();
                Ok(rho)
            }
            InitialState::Array { data, shape } => {
                let invalid = || StateError::InvalidState {
                    shape: shape.clone(),
                    qid_shape: qid_shape.dims().to_vec(),
                };
                if shape.iter().product::<usize>() != data.len() {
                    return Err(invalid());
                }
                if shape.as_slice() == [dim] || shape.as_slice() == qid_shape.dims() {
                    Ok(outer_product(data))
                } else if shape.as_slice() == [dim, dim]
                    || shape.as_slice() == qid_shape.tensor_shape().as_slice()
                {
                    Ok(data.clone())
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

/// `|ψ⟩⟨ψ|` as a flat matrix
fn outer_product<F: Precision>(psi: &[Complex<F>]) -> Vec<Complex<F>> {
    psi.iter()
        .flat_map(|&a| psi.iter().map(move |&b| a * b.conj()))
        .collect()
}
