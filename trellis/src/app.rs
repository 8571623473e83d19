//! # Trellis Application Logic
//!
//! Wires the library crates into one pass of the on-policy data pipeline:
//! build a wrapped environment, collect a rollout with a policy, compute
//! returns and advantages, and regroup the result into minibatches.
//!
//! The environment stack, from the inside out:
//!
//! 1.  [`RollingSphere`], the reference task.
//! 2.  [`NoisyObservation`], sensor noise drawn from the wrapper's key.
//! 3.  [`NormalizeObservation`], running statistics kept in state.
//! 4.  [`ClipAction`], bounding the policy's force.
//! 5.  [`ScaleReward`].

use crate::config::RunConfig;
use crate::policy::LinearGaussian;
use anyhow::Result;
use buffers::collect;
use env::envs::RollingSphere;
use env::wrappers::{ClipAction, NoisyObservation, NormalizeObservation, ScaleReward};
use env::{ActionWrapper, EnvLike, ObservationWrapper, RewardWrapper};
use state::State;
use tensor::{Key, Tensor};

/// The wrapper stack driven by [`run`].
pub type SphereStack = RewardWrapper<
    ActionWrapper<
        ObservationWrapper<ObservationWrapper<RollingSphere, NoisyObservation>, NormalizeObservation>,
        ClipAction,
    >,
    ScaleReward,
>;

/// Outcome of one pipeline pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub steps: usize,
    pub episodes: usize,
    pub batches: usize,
    pub batch_size: usize,
    pub total_reward: f32,
    pub mean_return: f32,
    pub mean_advantage: f32,
    pub final_position: f32,
}

#[must_use]
pub fn build_env(config: &RunConfig) -> SphereStack {
    let sphere =
        RollingSphere::new(config.max_episode_steps).with_reset_noise(config.reset_noise);
    let clip = ClipAction::for_env(&sphere);
    let noisy = ObservationWrapper::new(sphere, NoisyObservation::new(config.observation_noise));
    let normalize = NormalizeObservation::for_env(&noisy, 1e-4);
    let normalized = ObservationWrapper::new(noisy, normalize);
    let clipped = ActionWrapper::new(normalized, clip);
    RewardWrapper::new(clipped, ScaleReward::new(config.reward_scale))
}

/// Runs collection, target computation and batching once.
///
/// # Errors
///
/// Returns an error when the configuration is invalid or any stage fails.
pub fn run(config: &RunConfig) -> Result<Summary> {
    config.validate()?;

    let mut keys = config.seed.map(|seed| Key::new(seed).split_n(4).into_iter());
    let mut next_key = || keys.as_mut().and_then(Iterator::next);

    let env = build_env(config);
    let observation_len: usize = env.observation_space().shape().iter().product();
    let policy = match next_key() {
        Some(key) => LinearGaussian::new(observation_len, config.action_std, key),
        None => LinearGaussian::from_parts(
            Tensor::zeros(vec![observation_len]),
            1.0,
            Tensor::zeros(vec![observation_len]),
            0.0,
            config.action_std,
        ),
    };

    tracing::info!(
        steps = config.steps,
        seeded = config.seed.is_some(),
        "collecting rollout"
    );
    let reset = env.reset(State::new(&env), next_key())?;
    let rollout = collect(
        &env,
        &policy,
        reset.state,
        reset.observation,
        config.steps,
        next_key(),
    )?;

    let trained = rollout.buffer.compute_returns_and_advantages(
        rollout.last_value,
        rollout.done,
        config.gae_lambda,
        config.gamma,
    )?;
    let batched = trained.batches(config.batch_size, next_key())?;

    let final_position = env.unwrapped().position(&rollout.state)?;
    if let Some(frame) = env.render(&rollout.state)? {
        tracing::info!(%frame, "final state");
    }
    env.close()?;

    let summary = Summary {
        steps: trained.len(),
        episodes: rollout.episodes,
        batches: batched.len(),
        batch_size: config.batch_size,
        total_reward: trained.rewards().sum(),
        mean_return: trained.returns().mean(),
        mean_advantage: trained.advantages().mean(),
        final_position,
    };
    tracing::info!(?summary, "pipeline finished");
    Ok(summary)
}
