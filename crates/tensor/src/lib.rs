#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! # Tensor
//!
//! Fixed-shape, row-major arrays and the handful of primitives the rest of
//! the workspace is written against.
//!
//! Every operation here is a pure function from input values to a freshly
//! allocated output whose shape depends only on the input shapes, never on
//! the element values. That keeps the numeric paths built on top of this
//! crate (advantage estimation, batching) free of data-dependent control
//! flow.
//!
//! ## Key Components
//!
//! -   [`Tensor`]: the array type, generic over its element (`f32` values,
//!     `bool` flags, `usize` indices).
//! -   [`axis`]: gather, slicing, concatenation and reversal along the
//!     leading axis.
//! -   [`scan`]: a sequential fold that stacks its per-step outputs.
//! -   [`tree`]: the [`Tree`] trait for structured values whose leaves share
//!     a leading axis.
//! -   [`random`]: the move-only splittable [`Key`].

pub mod axis;
pub mod error;
pub mod ops;
pub mod random;
pub mod scan;
pub mod tree;

pub use error::TensorError;
pub use random::{split_optional, Key};
pub use scan::{scan, try_scan};
pub use tree::Tree;

/// A dense, row-major array.
///
/// `data.len()` always equals the product of `shape`. A rank-0 tensor holds
/// exactly one element.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T = f32> {
    data: Vec<T>,
    shape: Vec<usize>,
}

impl<T: Copy> Tensor<T> {
    /// Builds a tensor, checking that `data` fills `shape` exactly.
    pub fn from_vec(shape: Vec<usize>, data: Vec<T>) -> Result<Self, TensorError> {
        let expected = shape.iter().product::<usize>();
        if expected != data.len() {
            return Err(TensorError::ElementCount {
                shape,
                found: data.len(),
            });
        }
        Ok(Self { data, shape })
    }

    #[must_use]
    pub fn full(shape: Vec<usize>, value: T) -> Self {
        let len = shape.iter().product::<usize>();
        Self {
            data: vec![value; len],
            shape,
        }
    }

    #[must_use]
    pub fn scalar(value: T) -> Self {
        Self {
            data: vec![value],
            shape: Vec::new(),
        }
    }

    #[must_use]
    pub fn vector(data: Vec<T>) -> Self {
        let shape = vec![data.len()];
        Self { data, shape }
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Size of axis 0, or `None` for a scalar.
    #[must_use]
    pub fn leading_dim(&self) -> Option<usize> {
        self.shape.first().copied()
    }

    /// Shape of one slice along axis 0.
    #[must_use]
    pub fn row_shape(&self) -> &[usize] {
        self.shape.get(1..).unwrap_or(&[])
    }

    /// Number of elements in one slice along axis 0.
    #[must_use]
    pub fn row_len(&self) -> usize {
        self.row_shape().iter().product()
    }

    /// The single element of a one-element tensor.
    #[must_use]
    pub fn item(&self) -> Option<T> {
        match self.data.as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }

    pub fn reshape(&self, shape: Vec<usize>) -> Result<Self, TensorError> {
        if shape.iter().product::<usize>() != self.data.len() {
            return Err(TensorError::ElementCount {
                shape,
                found: self.data.len(),
            });
        }
        Ok(Self {
            data: self.data.clone(),
            shape,
        })
    }

    #[must_use]
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Tensor<U> {
        Tensor {
            data: self.data.iter().map(|&v| f(v)).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Element-wise combination of two tensors of identical shape.
    ///
    /// There is no broadcasting: a shape difference is always an error.
    pub fn zip_with<U: Copy, V: Copy>(
        &self,
        other: &Tensor<U>,
        f: impl Fn(T, U) -> V,
    ) -> Result<Tensor<V>, TensorError> {
        if self.shape != other.shape {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape.clone(),
                found: other.shape.clone(),
            });
        }
        Ok(Tensor {
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            shape: self.shape.clone(),
        })
    }
}

impl Tensor<f32> {
    #[must_use]
    pub fn zeros(shape: Vec<usize>) -> Self {
        Self::full(shape, 0.0)
    }

    /// NaN-filled tensor with the same shape as `self`.
    #[must_use]
    pub fn nan_like(&self) -> Self {
        Self::full(self.shape.clone(), f32::NAN)
    }
}

impl Tensor<usize> {
    /// `[0, 1, ..., n - 1]`.
    #[must_use]
    pub fn arange(n: usize) -> Self {
        Self::vector((0..n).collect())
    }
}

impl From<f32> for Tensor<f32> {
    fn from(value: f32) -> Self {
        Self::scalar(value)
    }
}

impl From<bool> for Tensor<bool> {
    fn from(value: bool) -> Self {
        Self::scalar(value)
    }
}

impl From<Vec<f32>> for Tensor<f32> {
    fn from(data: Vec<f32>) -> Self {
        Self::vector(data)
    }
}

impl From<Vec<bool>> for Tensor<bool> {
    fn from(data: Vec<bool>) -> Self {
        Self::vector(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_wrong_element_count() {
        let result = Tensor::from_vec(vec![2, 3], vec![0.0f32; 5]);
        assert!(
            matches!(result, Err(TensorError::ElementCount { found: 5, .. })),
            "Expected ElementCount error, got {result:?}"
        );
    }

    #[test]
    fn scalar_has_rank_zero() {
        let t = Tensor::scalar(3.5f32);
        assert_eq!(t.rank(), 0);
        assert_eq!(t.len(), 1);
        assert_eq!(t.leading_dim(), None);
        assert_eq!(t.item(), Some(3.5));
    }

    #[test]
    fn row_shape_drops_leading_axis() {
        let t = Tensor::<f32>::zeros(vec![4, 2, 3]);
        assert_eq!(t.leading_dim(), Some(4));
        assert_eq!(t.row_shape(), &[2, 3]);
        assert_eq!(t.row_len(), 6);
    }

    #[test]
    fn zip_with_requires_identical_shapes() {
        let a = Tensor::<f32>::zeros(vec![3]);
        let b = Tensor::<f32>::zeros(vec![3, 1]);
        assert!(matches!(
            a.zip_with(&b, |x, y| x + y),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn reshape_keeps_data_order() {
        let t = Tensor::vector(vec![1.0f32, 2.0, 3.0, 4.0]);
        let r = t.reshape(vec![2, 2]).unwrap();
        assert_eq!(r.shape(), &[2, 2]);
        assert_eq!(r.data(), t.data());
        assert!(t.reshape(vec![3]).is_err());
    }

    #[test]
    fn nan_like_matches_shape() {
        let t = Tensor::<f32>::zeros(vec![2, 2]);
        let n = t.nan_like();
        assert_eq!(n.shape(), t.shape());
        assert!(n.data().iter().all(|v| v.is_nan()));
    }
}
