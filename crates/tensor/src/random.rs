//! Splittable randomness keys.
//!
//! A [`Key`] is a single-use token: every consuming method takes `self`, and
//! the type is neither `Clone` nor `Copy`, so a key cannot be read again
//! after it has been split or used to draw samples. All derivations are pure
//! functions of the seed, so equal seeds always reproduce equal results.

use crate::Tensor;
use fastrand::Rng;

const SPLIT_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "a key does nothing unless it is split or sampled from"]
pub struct Key(u64);

impl Key {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Raw seed, for logging and reproducibility reports.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.0
    }

    fn rng(self) -> Rng {
        Rng::with_seed(self.0)
    }

    /// Consumes the key and returns two independent children.
    pub fn split(self) -> (Key, Key) {
        let rng = Rng::with_seed(self.0 ^ SPLIT_STREAM);
        (Key(rng.u64(..)), Key(rng.u64(..)))
    }

    /// Consumes the key and returns `n` independent children.
    #[must_use]
    pub fn split_n(self, n: usize) -> Vec<Key> {
        let rng = Rng::with_seed(self.0 ^ SPLIT_STREAM);
        (0..n).map(|_| Key(rng.u64(..))).collect()
    }

    /// Uniform random permutation of `[0, n)`.
    #[must_use]
    pub fn permutation(self, n: usize) -> Tensor<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        self.rng().shuffle(&mut indices);
        Tensor::vector(indices)
    }

    /// Samples uniformly from `[low, high)`.
    #[must_use]
    pub fn uniform(self, shape: Vec<usize>, low: f32, high: f32) -> Tensor<f32> {
        let rng = self.rng();
        let len = shape.iter().product::<usize>();
        let data = (0..len).map(|_| low + (high - low) * rng.f32()).collect();
        Tensor { data, shape }
    }

    /// Standard normal samples (Box–Muller).
    #[must_use]
    pub fn normal(self, shape: Vec<usize>) -> Tensor<f32> {
        let rng = self.rng();
        let len = shape.iter().product::<usize>();
        let data = (0..len)
            .map(|_| {
                // 1 - f32() lies in (0, 1], keeping ln finite.
                let u1 = 1.0 - rng.f32();
                let u2 = rng.f32();
                (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
            })
            .collect();
        Tensor { data, shape }
    }
}

/// Splits an optional key in two; no key yields two absent halves.
pub fn split_optional(key: Option<Key>) -> (Option<Key>, Option<Key>) {
    match key {
        Some(key) => {
            let (a, b) = key.split();
            (Some(a), Some(b))
        }
        None => (None, None),
    }
}
