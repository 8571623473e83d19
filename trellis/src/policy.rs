//! A small linear-Gaussian policy for driving collection.

use buffers::{Decision, Policy};
use tensor::{Key, Tensor, TensorError};

const LOG_SQRT_TAU: f32 = 0.918_938_5;

/// One-dimensional Gaussian policy with a linear mean and a linear value head.
///
/// Without a key `act` returns the mean action, with one it samples.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGaussian {
    policy_weights: Tensor,
    policy_bias: f32,
    value_weights: Tensor,
    value_bias: f32,
    std: f32,
}

impl LinearGaussian {
    /// A policy for observations of `observation_len` features, with all
    /// weights initialised uniformly in `[-0.1, 0.1)` from `key`.
    #[must_use]
    pub fn new(observation_len: usize, std: f32, key: Key) -> Self {
        let (policy_key, value_key) = key.split();
        Self {
            policy_weights: policy_key.uniform(vec![observation_len], -0.1, 0.1),
            policy_bias: 0.0,
            value_weights: value_key.uniform(vec![observation_len], -0.1, 0.1),
            value_bias: 0.0,
            std,
        }
    }

    /// Builds a policy from explicit parameters.
    #[must_use]
    pub fn from_parts(
        policy_weights: Tensor,
        policy_bias: f32,
        value_weights: Tensor,
        value_bias: f32,
        std: f32,
    ) -> Self {
        Self {
            policy_weights,
            policy_bias,
            value_weights,
            value_bias,
            std,
        }
    }

    fn mean(&self, observation: &Tensor) -> Result<f32, TensorError> {
        Ok(self.policy_weights.mul(observation)?.sum() + self.policy_bias)
    }

    fn log_prob(&self, action: f32, mean: f32) -> f32 {
        if self.std <= 0.0 {
            return 0.0;
        }
        let z = (action - mean) / self.std;
        -0.5 * z * z - self.std.ln() - LOG_SQRT_TAU
    }
}

impl Policy for LinearGaussian {
    fn act(&self, observation: &Tensor, key: Option<Key>) -> Result<Decision, TensorError> {
        let mean = self.mean(observation)?;
        let action = match key {
            Some(key) => mean + self.std * key.normal(Vec::new()).data()[0],
            None => mean,
        };
        Ok(Decision {
            action: Tensor::vector(vec![action]),
            log_prob: self.log_prob(action, mean),
            value: self.value(observation)?,
        })
    }

    fn value(&self, observation: &Tensor) -> Result<f32, TensorError> {
        Ok(self.value_weights.mul(observation)?.sum() + self.value_bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> LinearGaussian {
        LinearGaussian::from_parts(
            Tensor::vector(vec![2.0]),
            1.0,
            Tensor::vector(vec![-1.0]),
            0.5,
            1.0,
        )
    }

    #[test]
    fn keyless_action_is_the_mean() {
        let decision = policy().act(&Tensor::vector(vec![3.0]), None).unwrap();
        assert_eq!(decision.action.data(), &[7.0]);
        assert_eq!(decision.value, -2.5);
        assert!((decision.log_prob + LOG_SQRT_TAU).abs() < 1e-6);
    }

    #[test]
    fn keyed_action_is_reproducible() {
        let p = policy();
        let obs = Tensor::vector(vec![0.0]);
        let a = p.act(&obs, Some(Key::new(8))).unwrap();
        let b = p.act(&obs, Some(Key::new(8))).unwrap();
        assert_eq!(a, b);
        assert!(a.log_prob < -LOG_SQRT_TAU + 1e-6);
    }

    #[test]
    fn observation_length_must_match() {
        let result = policy().act(&Tensor::vector(vec![1.0, 2.0]), None);
        assert!(matches!(result, Err(TensorError::ShapeMismatch { .. })));
    }
}
