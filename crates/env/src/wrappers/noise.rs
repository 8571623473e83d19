use crate::{BoxSpace, EnvError, EnvLike, ObservationTransform};
use state::{State, Stateful};
use tensor::{Key, Tensor};

/// Adds Gaussian noise drawn from the wrapper's own key.
///
/// Without a key the observation passes through unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoisyObservation {
    pub std: f32,
}

impl NoisyObservation {
    #[must_use]
    pub fn new(std: f32) -> Self {
        Self { std }
    }
}

impl Stateful for NoisyObservation {}

impl<E> ObservationTransform<E> for NoisyObservation
where
    E: EnvLike<Observation = Tensor, ObservationSpace = BoxSpace>,
{
    type Observation = Tensor;
    type Space = BoxSpace;

    fn observation(
        &self,
        state: State,
        observation: Tensor,
        key: Option<Key>,
    ) -> Result<(State, Tensor), EnvError> {
        let Some(key) = key else {
            return Ok((state, observation));
        };
        let noise = key.normal(observation.shape().to_vec()).scale(self.std);
        let noisy = observation.add(&noise)?;
        Ok((state, noisy))
    }

    fn observation_space(&self, env: &E) -> BoxSpace {
        BoxSpace::unbounded(env.observation_space().shape().to_vec())
    }
}
