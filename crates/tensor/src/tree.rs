//! Structured values whose leaves are tensors sharing a leading axis.
//!
//! Observations, actions and captured states can be arbitrarily nested. A
//! [`Tree`] exposes just enough of that structure to validate leaf shapes
//! and to gather every leaf with one index tensor, so that index `i` of every
//! leaf keeps referring to the same original row.

use crate::{Tensor, TensorError};
use std::collections::BTreeMap;

pub trait Tree: Sized {
    /// Visits the shape of every leaf, in a fixed order.
    fn for_each_shape(&self, f: &mut dyn FnMut(&[usize]));

    /// Gathers every leaf along axis 0 (see [`Tensor::take`]).
    fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError>;

    /// Shapes of all leaves, in visiting order.
    fn leaf_shapes(&self) -> Vec<Vec<usize>> {
        let mut shapes = Vec::new();
        self.for_each_shape(&mut |shape| shapes.push(shape.to_vec()));
        shapes
    }
}

impl<T: Copy> Tree for Tensor<T> {
    fn for_each_shape(&self, f: &mut dyn FnMut(&[usize])) {
        f(self.shape());
    }

    fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError> {
        Tensor::<T>::take(self, indices)
    }
}

impl Tree for () {
    fn for_each_shape(&self, _f: &mut dyn FnMut(&[usize])) {}

    fn take(&self, _indices: &Tensor<usize>) -> Result<Self, TensorError> {
        Ok(())
    }
}

impl<T: Tree> Tree for Option<T> {
    fn for_each_shape(&self, f: &mut dyn FnMut(&[usize])) {
        if let Some(inner) = self {
            inner.for_each_shape(f);
        }
    }

    fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError> {
        self.as_ref().map(|inner| inner.take(indices)).transpose()
    }
}

impl<T: Tree> Tree for Box<T> {
    fn for_each_shape(&self, f: &mut dyn FnMut(&[usize])) {
        self.as_ref().for_each_shape(f);
    }

    fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError> {
        self.as_ref().take(indices).map(Box::new)
    }
}

/// A list of subtrees, each gathered independently (not a batch axis).
impl<T: Tree> Tree for Vec<T> {
    fn for_each_shape(&self, f: &mut dyn FnMut(&[usize])) {
        for item in self {
            item.for_each_shape(f);
        }
    }

    fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError> {
        self.iter().map(|item| item.take(indices)).collect()
    }
}

impl<K: Ord + Clone, V: Tree> Tree for BTreeMap<K, V> {
    fn for_each_shape(&self, f: &mut dyn FnMut(&[usize])) {
        for value in self.values() {
            value.for_each_shape(f);
        }
    }

    fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError> {
        self.iter()
            .map(|(k, v)| Ok((k.clone(), v.take(indices)?)))
            .collect()
    }
}

impl<A: Tree, B: Tree> Tree for (A, B) {
    fn for_each_shape(&self, f: &mut dyn FnMut(&[usize])) {
        self.0.for_each_shape(f);
        self.1.for_each_shape(f);
    }

    fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError> {
        Ok((self.0.take(indices)?, self.1.take(indices)?))
    }
}

impl<A: Tree, B: Tree, C: Tree> Tree for (A, B, C) {
    fn for_each_shape(&self, f: &mut dyn FnMut(&[usize])) {
        self.0.for_each_shape(f);
        self.1.for_each_shape(f);
        self.2.for_each_shape(f);
    }

    fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError> {
        Ok((
            self.0.take(indices)?,
            self.1.take(indices)?,
            self.2.take(indices)?,
        ))
    }
}
