//! Filling a buffer by interacting with an environment.

use crate::{BufferError, RolloutBuffer};
use env::EnvLike;
use state::State;
use tensor::{try_scan, Key, Tensor, TensorError};

/// What a policy decides for one observation.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub action: Tensor,
    pub log_prob: f32,
    pub value: f32,
}

/// Black-box model mapping observations to actions and value estimates.
pub trait Policy {
    fn act(&self, observation: &Tensor, key: Option<Key>) -> Result<Decision, TensorError>;

    fn value(&self, observation: &Tensor) -> Result<f32, TensorError>;
}

/// A filled buffer and everything needed to continue or bootstrap from it.
#[derive(Clone, Debug, PartialEq)]
pub struct Rollout {
    pub buffer: RolloutBuffer<Tensor, Tensor>,
    /// Environment state after the last step.
    pub state: State,
    /// Observation to act on next.
    pub observation: Tensor,
    /// Value estimate of `observation`.
    pub last_value: f32,
    /// Whether the last recorded step ended its episode.
    pub done: bool,
    /// Number of episodes that ended during the rollout.
    pub episodes: usize,
}

struct Transition {
    observation: Tensor,
    action: Tensor,
    reward: f32,
    terminated: bool,
    truncated: bool,
    log_prob: f32,
    value: f32,
    state: State,
}

/// Steps `env` for `num_steps` steps, starting from `state` and `observation`.
///
/// Episodes that end are reset immediately, so the buffer may span several
/// of them. `states` in the buffer holds the environment state each recorded
/// observation was made in. With a key, every step receives its own
/// sub-keys for the policy, the step and a possible reset.
pub fn collect<E, P>(
    env: &E,
    policy: &P,
    state: State,
    observation: Tensor,
    num_steps: usize,
    key: Option<Key>,
) -> Result<Rollout, BufferError>
where
    E: EnvLike<Action = Tensor, Observation = Tensor>,
    P: Policy,
{
    if num_steps == 0 {
        return Err(BufferError::EmptyRollout);
    }
    let step_keys: Vec<Option<Key>> = match key {
        Some(key) => key.split_n(num_steps).into_iter().map(Some).collect(),
        None => (0..num_steps).map(|_| None).collect(),
    };

    let ((state, observation, done, episodes), transitions) = try_scan(
        (state, observation, false, 0usize),
        step_keys,
        |(state, observation, _, episodes), key| {
            let (policy_key, env_key, reset_key) = match key {
                Some(key) => {
                    let mut keys = key.split_n(3).into_iter();
                    (keys.next(), keys.next(), keys.next())
                }
                None => (None, None, None),
            };

            let decision = policy.act(&observation, policy_key)?;
            let step = env.step(state.clone(), decision.action.clone(), env_key)?;
            let done = step.done();
            let transition = Transition {
                observation,
                action: decision.action,
                reward: step.reward,
                terminated: step.terminated,
                truncated: step.truncated,
                log_prob: decision.log_prob,
                value: decision.value,
                state,
            };

            let (state, observation, episodes) = if done {
                let reset = env.reset(step.state, reset_key)?;
                (reset.state, reset.observation, episodes + 1)
            } else {
                (step.state, step.observation, episodes)
            };
            Ok::<_, BufferError>(((state, observation, done, episodes), transition))
        },
    )?;

    let last_value = policy.value(&observation)?;
    let buffer = stack(transitions)?;
    tracing::debug!(
        steps = num_steps,
        episodes,
        total_reward = buffer.rewards().sum(),
        "collected rollout"
    );

    Ok(Rollout {
        buffer,
        state,
        observation,
        last_value,
        done,
        episodes,
    })
}

fn stack(transitions: Vec<Transition>) -> Result<RolloutBuffer<Tensor, Tensor>, BufferError> {
    let len = transitions.len();
    let mut observations = Vec::with_capacity(len);
    let mut actions = Vec::with_capacity(len);
    let mut rewards = Vec::with_capacity(len);
    let mut terminations = Vec::with_capacity(len);
    let mut truncations = Vec::with_capacity(len);
    let mut log_probs = Vec::with_capacity(len);
    let mut values = Vec::with_capacity(len);
    let mut states = Vec::with_capacity(len);
    for t in transitions {
        observations.push(t.observation);
        actions.push(t.action);
        rewards.push(t.reward);
        terminations.push(t.terminated);
        truncations.push(t.truncated);
        log_probs.push(t.log_prob);
        values.push(t.value);
        states.push(t.state);
    }

    RolloutBuffer::builder()
        .observations(Tensor::stack(&observations)?)
        .actions(Tensor::stack(&actions)?)
        .rewards(rewards)
        .terminations(terminations)
        .truncations(truncations)
        .log_probs(log_probs)
        .values(values)
        .states(State::stack(&states)?)
        .build()
}
