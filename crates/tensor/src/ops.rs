//! Element-wise arithmetic.
//!
//! Binary operations require identical shapes; callers that need a scalar
//! operand use the `*_scalar`/`scale` forms instead of broadcasting.

use crate::{Tensor, TensorError};

impl Tensor<f32> {
    pub fn add(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn mul(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, |a, b| a * b)
    }

    pub fn div(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, |a, b| a / b)
    }

    #[must_use]
    pub fn scale(&self, factor: f32) -> Self {
        self.map(|v| v * factor)
    }

    #[must_use]
    pub fn add_scalar(&self, value: f32) -> Self {
        self.map(|v| v + value)
    }

    #[must_use]
    pub fn sqrt(&self) -> Self {
        self.map(f32::sqrt)
    }

    /// Element-wise clamp into `[low, high]`.
    pub fn clamp(&self, low: &Self, high: &Self) -> Result<Self, TensorError> {
        self.zip_with(low, f32::max)?.zip_with(high, f32::min)
    }

    #[must_use]
    pub fn sum(&self) -> f32 {
        self.data().iter().sum()
    }

    /// Mean of all elements; NaN for an empty tensor.
    #[must_use]
    pub fn mean(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let n = self.len() as f32;
        self.sum() / n
    }

    #[must_use]
    pub fn all_finite(&self) -> bool {
        self.data().iter().all(|v| v.is_finite())
    }
}

impl Tensor<bool> {
    pub fn or(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, |a, b| a || b)
    }

    #[must_use]
    pub fn not(&self) -> Self {
        self.map(|v| !v)
    }

    /// `1.0` where true, `0.0` where false.
    #[must_use]
    pub fn to_f32(&self) -> Tensor<f32> {
        self.map(|v| f32::from(u8::from(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_element_wise() {
        let a = Tensor::vector(vec![1.0f32, 2.0, 3.0]);
        let b = Tensor::vector(vec![4.0f32, 5.0, 6.0]);
        assert_eq!(a.add(&b).unwrap().data(), &[5.0, 7.0, 9.0]);
        assert_eq!(b.sub(&a).unwrap().data(), &[3.0, 3.0, 3.0]);
        assert_eq!(a.mul(&b).unwrap().data(), &[4.0, 10.0, 18.0]);
        assert_eq!(a.scale(2.0).data(), &[2.0, 4.0, 6.0]);
    }

    #[test]
    fn clamp_respects_per_element_bounds() {
        let x = Tensor::vector(vec![-5.0f32, 0.5, 5.0]);
        let low = Tensor::vector(vec![-1.0f32, -1.0, 0.0]);
        let high = Tensor::vector(vec![1.0f32, 1.0, 2.0]);
        assert_eq!(x.clamp(&low, &high).unwrap().data(), &[-1.0, 0.5, 2.0]);
    }

    #[test]
    fn bool_mask_converts_to_float() {
        let a = Tensor::vector(vec![true, false, false]);
        let b = Tensor::vector(vec![false, false, true]);
        let either = a.or(&b).unwrap();
        assert_eq!(either.data(), &[true, false, true]);
        assert_eq!(either.not().to_f32().data(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn mean_of_values() {
        let a = Tensor::vector(vec![1.0f32, 2.0, 3.0, 6.0]);
        assert!((a.mean() - 3.0).abs() < 1e-6);
        assert!(a.all_finite());
        assert!(!a.nan_like().all_finite());
    }
}
