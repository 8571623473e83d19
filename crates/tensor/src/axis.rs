//! Operations along the leading axis.
//!
//! These are the only structural primitives the buffers need: gathering rows
//! by index, slicing and joining along axis 0, and reversing it.

use crate::{Tensor, TensorError};
use std::ops::Range;

impl<T: Copy> Tensor<T> {
    fn require_axis(&self) -> Result<usize, TensorError> {
        self.leading_dim().ok_or(TensorError::Scalar)
    }

    /// Gathers rows along axis 0.
    ///
    /// `indices` may have any shape; the output has shape
    /// `indices.shape() ++ self.row_shape()`. A rank-0 index selects a single
    /// row and drops the axis.
    pub fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError> {
        let len = self.require_axis()?;
        let row_len = self.row_len();
        let mut data = Vec::with_capacity(indices.len() * row_len);
        for &index in indices.data() {
            if index >= len {
                return Err(TensorError::IndexOutOfBounds { index, len });
            }
            let start = index * row_len;
            data.extend_from_slice(&self.data()[start..start + row_len]);
        }
        let mut shape = indices.shape().to_vec();
        shape.extend_from_slice(self.row_shape());
        Tensor::from_vec(shape, data)
    }

    /// Row `index` along axis 0.
    pub fn row(&self, index: usize) -> Result<Self, TensorError> {
        self.take(&Tensor::scalar(index))
    }

    /// All rows along axis 0, in order.
    pub fn rows(&self) -> Result<Vec<Self>, TensorError> {
        let len = self.require_axis()?;
        (0..len).map(|i| self.row(i)).collect()
    }

    /// Contiguous rows `range` along axis 0.
    pub fn slice0(&self, range: Range<usize>) -> Result<Self, TensorError> {
        let len = self.require_axis()?;
        if range.start > range.end {
            return Err(TensorError::IndexOutOfBounds {
                index: range.start,
                len: range.end,
            });
        }
        if range.end > len {
            return Err(TensorError::IndexOutOfBounds {
                index: range.end,
                len,
            });
        }
        let row_len = self.row_len();
        let data = self.data()[range.start * row_len..range.end * row_len].to_vec();
        let mut shape = vec![range.end - range.start];
        shape.extend_from_slice(self.row_shape());
        Tensor::from_vec(shape, data)
    }

    /// Reverses axis 0.
    pub fn flip0(&self) -> Result<Self, TensorError> {
        let len = self.require_axis()?;
        let indices = Tensor::vector((0..len).rev().collect());
        self.take(&indices)
    }

    /// Adds a leading axis of length one.
    #[must_use]
    pub fn expand0(&self) -> Self {
        let mut shape = Vec::with_capacity(self.rank() + 1);
        shape.push(1);
        shape.extend_from_slice(self.shape());
        Self {
            data: self.data().to_vec(),
            shape,
        }
    }

    /// Joins tensors along axis 0. All parts must agree on their row shape.
    pub fn concat0(parts: &[&Self]) -> Result<Self, TensorError> {
        let first = parts.first().ok_or(TensorError::Empty)?;
        first.require_axis()?;
        let row_shape = first.row_shape().to_vec();
        let mut leading = 0;
        let mut data = Vec::new();
        for part in parts {
            part.require_axis()?;
            if part.row_shape() != row_shape.as_slice() {
                return Err(TensorError::ShapeMismatch {
                    expected: row_shape,
                    found: part.row_shape().to_vec(),
                });
            }
            leading += part.shape()[0];
            data.extend_from_slice(part.data());
        }
        let mut shape = vec![leading];
        shape.extend_from_slice(&row_shape);
        Tensor::from_vec(shape, data)
    }

    /// Stacks equally shaped tensors along a new leading axis.
    pub fn stack(items: &[Self]) -> Result<Self, TensorError> {
        let first = items.first().ok_or(TensorError::Empty)?;
        let mut data = Vec::with_capacity(items.len() * first.len());
        for item in items {
            if item.shape() != first.shape() {
                return Err(TensorError::ShapeMismatch {
                    expected: first.shape().to_vec(),
                    found: item.shape().to_vec(),
                });
            }
            data.extend_from_slice(item.data());
        }
        let mut shape = vec![items.len()];
        shape.extend_from_slice(first.shape());
        Tensor::from_vec(shape, data)
    }
}
