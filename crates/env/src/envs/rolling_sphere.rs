use crate::{BoxSpace, EnvError, EnvLike, Info, Reset, Step};
use serde_json::json;
use state::{State, StateIndex, Stateful};
use tensor::{Key, Tensor};

const FORCE_LIMIT: f32 = 10.0;
const DT: f32 = 0.02;
const POSITION_LIMIT: f32 = 5.0;

/// A sphere on a line, pushed by a clamped force.
///
/// The observation is the sphere's position and the reward is the distance it
/// moved during the step. The episode terminates once the sphere leaves
/// `[-5, 5]` and is truncated after `max_steps` steps.
#[derive(Clone, Debug)]
pub struct RollingSphere {
    position: StateIndex,
    elapsed: StateIndex,
    max_steps: usize,
    reset_noise: f32,
}

impl RollingSphere {
    #[must_use]
    pub fn new(max_steps: usize) -> Self {
        Self {
            position: StateIndex::new(Tensor::zeros(vec![1])),
            elapsed: StateIndex::new(Tensor::scalar(0.0)),
            max_steps,
            reset_noise: 0.0,
        }
    }

    /// Start positions are drawn uniformly from `[-noise, noise)` when a key
    /// is supplied to `reset`.
    #[must_use]
    pub fn with_reset_noise(mut self, noise: f32) -> Self {
        self.reset_noise = noise;
        self
    }

    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn position(&self, state: &State) -> Result<f32, EnvError> {
        Ok(state.get(&self.position)?.data()[0])
    }

    pub fn elapsed(&self, state: &State) -> Result<f32, EnvError> {
        Ok(state.get(&self.elapsed)?.data()[0])
    }
}

impl Stateful for RollingSphere {
    fn state_indices(&self) -> Vec<StateIndex> {
        vec![self.position.clone(), self.elapsed.clone()]
    }
}

impl EnvLike for RollingSphere {
    type Action = Tensor;
    type Observation = Tensor;
    type ActionSpace = BoxSpace;
    type ObservationSpace = BoxSpace;
    type Unwrapped = Self;

    fn reset(&self, state: State, key: Option<Key>) -> Result<Reset<Tensor>, EnvError> {
        let position = match key {
            Some(key) => key.uniform(vec![1], -self.reset_noise, self.reset_noise),
            None => Tensor::zeros(vec![1]),
        };
        let state = state
            .set(&self.position, position.clone())?
            .set(&self.elapsed, Tensor::scalar(0.0))?;
        Ok(Reset {
            state,
            observation: position,
            info: Info::new(),
        })
    }

    fn step(&self, state: State, action: Tensor, _key: Option<Key>) -> Result<Step<Tensor>, EnvError> {
        if action.shape() != [1] {
            return Err(EnvError::InvalidAction(format!(
                "expected a force of shape [1], got {:?}",
                action.shape()
            )));
        }
        let force = action.data()[0].clamp(-FORCE_LIMIT, FORCE_LIMIT);
        let old = self.position(&state)?;
        let new = old + force * DT;
        let elapsed = self.elapsed(&state)? + 1.0;

        #[allow(clippy::cast_precision_loss)]
        let truncated = elapsed >= self.max_steps as f32;
        let terminated = new.abs() > POSITION_LIMIT;

        let observation = Tensor::vector(vec![new]);
        let state = state
            .set(&self.position, observation.clone())?
            .set(&self.elapsed, Tensor::scalar(elapsed))?;

        let mut info = Info::new();
        info.insert("x_position".into(), json!(new));
        info.insert("elapsed_steps".into(), json!(elapsed));

        Ok(Step {
            state,
            observation,
            reward: new - old,
            terminated,
            truncated,
            info,
        })
    }

    fn render(&self, state: &State) -> Result<Option<String>, EnvError> {
        let x = self.position(state)?;
        let t = self.elapsed(state)?;
        Ok(Some(format!("RollingSphere(x={x:.3}, t={t})")))
    }

    fn action_space(&self) -> BoxSpace {
        BoxSpace::uniform(vec![1], -FORCE_LIMIT, FORCE_LIMIT)
    }

    fn observation_space(&self) -> BoxSpace {
        BoxSpace::unbounded(vec![1])
    }

    fn unwrapped(&self) -> &Self {
        self
    }
}
