//! Regrouping a buffer into minibatches.

use crate::{BufferError, RolloutBuffer};
use tensor::{Key, Tensor, Tree};

impl<O: Tree, A: Tree, S: Tree> RolloutBuffer<O, A, S> {
    /// Regroups the leading axis `N` into `(N / batch_size, batch_size)`.
    ///
    /// Every field is gathered with the same index tensor, so entry `[i, j]`
    /// of every field refers to the same original step. Without a key the
    /// batches are contiguous slices in order; with one the steps are
    /// shuffled by a permutation drawn from it.
    pub fn batches(&self, batch_size: usize, key: Option<Key>) -> Result<Self, BufferError> {
        let len = self.len();
        if len == 0 {
            return Err(BufferError::EmptyRollout);
        }
        if batch_size == 0 || len % batch_size != 0 {
            return Err(BufferError::BatchSize { len, batch_size });
        }
        let shuffled = key.is_some();
        let order = match key {
            Some(key) => key.permutation(len),
            None => Tensor::arange(len),
        };
        let indices = order.reshape(vec![len / batch_size, batch_size])?;
        tracing::debug!(
            batches = len / batch_size,
            batch_size,
            shuffled,
            "regrouped rollout"
        );
        Ok(self.take(&indices)?)
    }

    /// Batch `index` of a buffer produced by [`RolloutBuffer::batches`].
    ///
    /// Buffers without a second axis have no batches and are rejected.
    pub fn batch(&self, index: usize) -> Result<Self, BufferError> {
        if self.shape().len() < 2 {
            return Err(BufferError::Unbatched {
                shape: self.shape().to_vec(),
            });
        }
        Ok(self.take(&Tensor::scalar(index))?)
    }
}
