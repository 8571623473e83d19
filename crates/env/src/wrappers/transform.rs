use crate::{EnvError, EnvLike, ObservationTransform, RewardTransform, Space};
use state::{State, Stateful};
use tensor::Key;

/// Applies a stateless function to every observation.
///
/// The function may change the observation type, so the resulting space is
/// supplied up front.
#[derive(Clone)]
pub struct TransformObservation<F, S> {
    f: F,
    space: S,
}

impl<F, S> TransformObservation<F, S> {
    pub fn new(f: F, space: S) -> Self {
        Self { f, space }
    }
}

impl<F, S> Stateful for TransformObservation<F, S> {}

impl<E, F, S> ObservationTransform<E> for TransformObservation<F, S>
where
    E: EnvLike,
    S: Space + Clone,
    F: Fn(E::Observation) -> S::Item,
{
    type Observation = S::Item;
    type Space = S;

    fn observation(
        &self,
        state: State,
        observation: E::Observation,
        _key: Option<Key>,
    ) -> Result<(State, S::Item), EnvError> {
        Ok((state, (self.f)(observation)))
    }

    fn observation_space(&self, _env: &E) -> S {
        self.space.clone()
    }
}

/// Applies a stateless function to every reward.
#[derive(Clone)]
pub struct TransformReward<F> {
    f: F,
}

impl<F: Fn(f32) -> f32> TransformReward<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Stateful for TransformReward<F> {}

impl<F: Fn(f32) -> f32> RewardTransform for TransformReward<F> {
    fn reward(&self, _state: &State, reward: f32, _key: Option<Key>) -> Result<f32, EnvError> {
        Ok((self.f)(reward))
    }
}
