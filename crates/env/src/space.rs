//! Legal domains of actions and observations.

use tensor::{Key, Tensor, TensorError};

/// A set of values an action or observation may take.
pub trait Space {
    type Item;

    fn contains(&self, item: &Self::Item) -> bool;

    /// Draws one element. Deterministic in `key`.
    fn sample(&self, key: Key) -> Self::Item;
}

/// Element-wise bounded box of `f32` tensors. Bounds may be infinite.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxSpace {
    low: Tensor,
    high: Tensor,
}

impl BoxSpace {
    /// Builds a box from per-element bounds of identical shape.
    pub fn new(low: Tensor, high: Tensor) -> Result<Self, TensorError> {
        if low.shape() != high.shape() {
            return Err(TensorError::ShapeMismatch {
                expected: low.shape().to_vec(),
                found: high.shape().to_vec(),
            });
        }
        Ok(Self { low, high })
    }

    /// Same scalar bounds for every element.
    #[must_use]
    pub fn uniform(shape: Vec<usize>, low: f32, high: f32) -> Self {
        Self {
            low: Tensor::full(shape.clone(), low),
            high: Tensor::full(shape, high),
        }
    }

    #[must_use]
    pub fn unbounded(shape: Vec<usize>) -> Self {
        Self::uniform(shape, f32::NEG_INFINITY, f32::INFINITY)
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.low.shape()
    }

    #[must_use]
    pub fn low(&self) -> &Tensor {
        &self.low
    }

    #[must_use]
    pub fn high(&self) -> &Tensor {
        &self.high
    }

    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.low.all_finite() && self.high.all_finite()
    }

    /// Projects `value` into the box.
    pub fn clip(&self, value: &Tensor) -> Result<Tensor, TensorError> {
        value.clamp(&self.low, &self.high)
    }
}

impl Space for BoxSpace {
    type Item = Tensor;

    fn contains(&self, item: &Tensor) -> bool {
        item.shape() == self.shape()
            && item
                .data()
                .iter()
                .zip(self.low.data().iter().zip(self.high.data()))
                .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }

    /// Uniform inside finite bounds, shifted exponential-like tails on a
    /// half-open side, standard normal where both sides are unbounded.
    fn sample(&self, key: Key) -> Tensor {
        let (uniform_key, normal_key) = key.split();
        let shape = self.shape().to_vec();
        let u = uniform_key.uniform(shape.clone(), 0.0, 1.0);
        let n = normal_key.normal(shape);
        let data = u
            .data()
            .iter()
            .zip(n.data())
            .zip(self.low.data().iter().zip(self.high.data()))
            .map(|((&u, &n), (&lo, &hi))| match (lo.is_finite(), hi.is_finite()) {
                (true, true) => lo + (hi - lo) * u,
                (true, false) => lo + n.abs(),
                (false, true) => hi - n.abs(),
                (false, false) => n,
            })
            .collect();
        Tensor::vector(data)
            .reshape(self.shape().to_vec())
            .unwrap_or_else(|_| self.low.clone())
    }
}

/// The integers `0..n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Discrete {
    n: usize,
}

impl Discrete {
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }
}

impl Space for Discrete {
    type Item = usize;

    fn contains(&self, item: &usize) -> bool {
        *item < self.n
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn sample(&self, key: Key) -> usize {
        let u = key.uniform(Vec::new(), 0.0, 1.0).item().unwrap_or(0.0);
        ((u * self.n as f32) as usize).min(self.n.saturating_sub(1))
    }
}
