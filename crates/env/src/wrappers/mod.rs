//! Ready-made transforms for the three wrapper variants.

mod clip_action;
mod noise;
mod normalize;
mod reward;
mod transform;

pub use clip_action::ClipAction;
pub use noise::NoisyObservation;
pub use normalize::NormalizeObservation;
pub use reward::{ClipReward, ScaleReward};
pub use transform::{TransformObservation, TransformReward};
