use crate::{EnvError, RewardTransform};
use state::{State, Stateful};
use tensor::Key;

/// Multiplies every reward by a constant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleReward {
    pub scale: f32,
}

impl ScaleReward {
    #[must_use]
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }
}

impl Stateful for ScaleReward {}

impl RewardTransform for ScaleReward {
    fn reward(&self, _state: &State, reward: f32, _key: Option<Key>) -> Result<f32, EnvError> {
        Ok(reward * self.scale)
    }
}

/// Clamps every reward into `[low, high]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipReward {
    pub low: f32,
    pub high: f32,
}

impl ClipReward {
    #[must_use]
    pub fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }
}

impl Stateful for ClipReward {}

impl RewardTransform for ClipReward {
    fn reward(&self, _state: &State, reward: f32, _key: Option<Key>) -> Result<f32, EnvError> {
        Ok(reward.max(self.low).min(self.high))
    }
}
