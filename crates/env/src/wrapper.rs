//! The three wrapper variants.
//!
//! A wrapper owns its child environment and one transform. The orchestration
//! of `reset`/`step` is fixed here; a transform only supplies its hook.
//!
//! Every call that receives a key splits it in two: the first half goes to
//! the child, the second to the transform. Without a key both halves are
//! absent. The child's state slice is lent out of the incoming container for
//! the duration of the delegated call and merged back before returning.

use crate::{EnvError, EnvLike, Reset, Space, Step};
use state::{State, StateIndex, Stateful};
use tensor::{split_optional, Key};

/// Hook of an [`ObservationWrapper`].
pub trait ObservationTransform<E: EnvLike>: Stateful {
    type Observation;
    type Space: Space<Item = Self::Observation>;

    /// Transforms an observation produced by the child.
    ///
    /// `state` is the wrapper's container with the child's slots lent out, so
    /// only the transform's own slots are readable.
    fn observation(
        &self,
        state: State,
        observation: E::Observation,
        key: Option<Key>,
    ) -> Result<(State, Self::Observation), EnvError>;

    /// Space of the transformed observations.
    fn observation_space(&self, env: &E) -> Self::Space;
}

/// Hook of an [`ActionWrapper`].
pub trait ActionTransform<E: EnvLike>: Stateful {
    type Action;
    type Space: Space<Item = Self::Action>;

    /// Maps an outer action to the child's action before delegating.
    fn action(
        &self,
        state: State,
        action: Self::Action,
        key: Option<Key>,
    ) -> Result<(State, E::Action), EnvError>;

    /// Space of the actions accepted by the wrapper.
    fn action_space(&self, env: &E) -> Self::Space;
}

/// Hook of a [`RewardWrapper`].
pub trait RewardTransform: Stateful {
    /// Transforms the child's reward. `state` is the merged container.
    fn reward(&self, state: &State, reward: f32, key: Option<Key>) -> Result<f32, EnvError>;
}

fn indices(transform: &impl Stateful, env: &impl Stateful) -> Vec<StateIndex> {
    let mut indices = transform.state_indices();
    indices.extend(env.state_indices());
    indices
}

macro_rules! wrapper_accessors {
    ($name:ident) => {
        impl<E, T> $name<E, T> {
            #[must_use]
            pub fn new(env: E, transform: T) -> Self {
                Self { env, transform }
            }

            /// The immediate child.
            #[must_use]
            pub fn env(&self) -> &E {
                &self.env
            }

            #[must_use]
            pub fn transform(&self) -> &T {
                &self.transform
            }
        }

        impl<E: Stateful, T: Stateful> Stateful for $name<E, T> {
            fn state_indices(&self) -> Vec<StateIndex> {
                indices(&self.transform, &self.env)
            }
        }
    };
}

/// Transforms observations after `reset` and `step`.
#[derive(Clone, Debug)]
pub struct ObservationWrapper<E, T> {
    env: E,
    transform: T,
}

wrapper_accessors!(ObservationWrapper);

impl<E, T> EnvLike for ObservationWrapper<E, T>
where
    E: EnvLike,
    T: ObservationTransform<E>,
{
    type Action = E::Action;
    type Observation = T::Observation;
    type ActionSpace = E::ActionSpace;
    type ObservationSpace = T::Space;
    type Unwrapped = E::Unwrapped;

    fn reset(&self, state: State, key: Option<Key>) -> Result<Reset<Self::Observation>, EnvError> {
        let (env_key, wrapper_key) = split_optional(key);
        let (state, substate) = state.substate(&self.env)?;
        let reset = self.env.reset(substate, env_key)?;
        let (state, observation) = self
            .transform
            .observation(state, reset.observation, wrapper_key)?;
        let state = state.update(reset.state)?;
        tracing::trace!("observation wrapper reset");
        Ok(Reset {
            state,
            observation,
            info: reset.info,
        })
    }

    fn step(
        &self,
        state: State,
        action: Self::Action,
        key: Option<Key>,
    ) -> Result<Step<Self::Observation>, EnvError> {
        let (env_key, wrapper_key) = split_optional(key);
        let (state, substate) = state.substate(&self.env)?;
        let step = self.env.step(substate, action, env_key)?;
        let (state, observation) = self
            .transform
            .observation(state, step.observation, wrapper_key)?;
        let state = state.update(step.state)?;
        tracing::trace!("observation wrapper step");
        Ok(Step {
            state,
            observation,
            reward: step.reward,
            terminated: step.terminated,
            truncated: step.truncated,
            info: step.info,
        })
    }

    fn render(&self, state: &State) -> Result<Option<String>, EnvError> {
        self.env.render(state)
    }

    fn close(&self) -> Result<(), EnvError> {
        self.env.close()
    }

    fn action_space(&self) -> Self::ActionSpace {
        self.env.action_space()
    }

    fn observation_space(&self) -> Self::ObservationSpace {
        self.transform.observation_space(&self.env)
    }

    fn unwrapped(&self) -> &Self::Unwrapped {
        self.env.unwrapped()
    }
}

/// Transforms actions before they reach the child.
#[derive(Clone, Debug)]
pub struct ActionWrapper<E, T> {
    env: E,
    transform: T,
}

wrapper_accessors!(ActionWrapper);

impl<E, T> EnvLike for ActionWrapper<E, T>
where
    E: EnvLike,
    T: ActionTransform<E>,
{
    type Action = T::Action;
    type Observation = E::Observation;
    type ActionSpace = T::Space;
    type ObservationSpace = E::ObservationSpace;
    type Unwrapped = E::Unwrapped;

    fn reset(&self, state: State, key: Option<Key>) -> Result<Reset<Self::Observation>, EnvError> {
        let (env_key, _wrapper_key) = split_optional(key);
        let (state, substate) = state.substate(&self.env)?;
        let reset = self.env.reset(substate, env_key)?;
        let state = state.update(reset.state)?;
        Ok(Reset { state, ..reset })
    }

    fn step(
        &self,
        state: State,
        action: Self::Action,
        key: Option<Key>,
    ) -> Result<Step<Self::Observation>, EnvError> {
        let (env_key, wrapper_key) = split_optional(key);
        let (state, action) = self.transform.action(state, action, wrapper_key)?;
        let (state, substate) = state.substate(&self.env)?;
        let step = self.env.step(substate, action, env_key)?;
        let state = state.update(step.state)?;
        tracing::trace!("action wrapper step");
        Ok(Step { state, ..step })
    }

    fn render(&self, state: &State) -> Result<Option<String>, EnvError> {
        self.env.render(state)
    }

    fn close(&self) -> Result<(), EnvError> {
        self.env.close()
    }

    fn action_space(&self) -> Self::ActionSpace {
        self.transform.action_space(&self.env)
    }

    fn observation_space(&self) -> Self::ObservationSpace {
        self.env.observation_space()
    }

    fn unwrapped(&self) -> &Self::Unwrapped {
        self.env.unwrapped()
    }
}

/// Transforms the reward after the child has stepped.
#[derive(Clone, Debug)]
pub struct RewardWrapper<E, T> {
    env: E,
    transform: T,
}

wrapper_accessors!(RewardWrapper);

impl<E, T> EnvLike for RewardWrapper<E, T>
where
    E: EnvLike,
    T: RewardTransform,
{
    type Action = E::Action;
    type Observation = E::Observation;
    type ActionSpace = E::ActionSpace;
    type ObservationSpace = E::ObservationSpace;
    type Unwrapped = E::Unwrapped;

    fn reset(&self, state: State, key: Option<Key>) -> Result<Reset<Self::Observation>, EnvError> {
        let (env_key, _wrapper_key) = split_optional(key);
        let (state, substate) = state.substate(&self.env)?;
        let reset = self.env.reset(substate, env_key)?;
        let state = state.update(reset.state)?;
        Ok(Reset { state, ..reset })
    }

    fn step(
        &self,
        state: State,
        action: Self::Action,
        key: Option<Key>,
    ) -> Result<Step<Self::Observation>, EnvError> {
        let (env_key, wrapper_key) = split_optional(key);
        let (state, substate) = state.substate(&self.env)?;
        let step = self.env.step(substate, action, env_key)?;
        let state = state.update(step.state)?;
        let reward = self.transform.reward(&state, step.reward, wrapper_key)?;
        tracing::trace!(reward, "reward wrapper step");
        Ok(Step {
            state,
            reward,
            ..step
        })
    }

    fn render(&self, state: &State) -> Result<Option<String>, EnvError> {
        self.env.render(state)
    }

    fn close(&self) -> Result<(), EnvError> {
        self.env.close()
    }

    fn action_space(&self) -> Self::ActionSpace {
        self.env.action_space()
    }

    fn observation_space(&self) -> Self::ObservationSpace {
        self.env.observation_space()
    }

    fn unwrapped(&self) -> &Self::Unwrapped {
        self.env.unwrapped()
    }
}
