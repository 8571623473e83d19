use crate::{BoxSpace, EnvError, EnvLike, ObservationTransform};
use state::{State, StateIndex, Stateful};
use tensor::{Key, Tensor, TensorError};

/// Added to the variance before taking its square root.
const VAR_EPSILON: f32 = 1e-8;

/// Normalizes observations with a running mean and variance.
///
/// The statistics live in the wrapper's own state slots and are updated on
/// every `reset` and `step`, one observation at a time.
#[derive(Clone, Debug)]
pub struct NormalizeObservation {
    mean: StateIndex,
    var: StateIndex,
    count: StateIndex,
}

impl NormalizeObservation {
    /// Statistics for observations of `shape`, with the running count
    /// starting at `initial_count`. A small positive count weights the unit
    /// prior variance into the first updates; zero discards it.
    #[must_use]
    pub fn new(shape: Vec<usize>, initial_count: f32) -> Self {
        Self {
            mean: StateIndex::new(Tensor::zeros(shape.clone())),
            var: StateIndex::new(Tensor::full(shape, 1.0)),
            count: StateIndex::new(Tensor::scalar(initial_count)),
        }
    }

    /// Statistics shaped like `env`'s observations.
    #[must_use]
    pub fn for_env<E: EnvLike<ObservationSpace = BoxSpace>>(env: &E, initial_count: f32) -> Self {
        Self::new(env.observation_space().shape().to_vec(), initial_count)
    }

    pub fn mean<'a>(&self, state: &'a State) -> Result<&'a Tensor, EnvError> {
        Ok(state.get(&self.mean)?)
    }

    pub fn var<'a>(&self, state: &'a State) -> Result<&'a Tensor, EnvError> {
        Ok(state.get(&self.var)?)
    }

    pub fn count(&self, state: &State) -> Result<f32, EnvError> {
        let count = state.get(&self.count)?;
        count.item().ok_or_else(|| {
            TensorError::ShapeMismatch {
                expected: Vec::new(),
                found: count.shape().to_vec(),
            }
            .into()
        })
    }
}

impl Stateful for NormalizeObservation {
    fn state_indices(&self) -> Vec<StateIndex> {
        vec![self.mean.clone(), self.var.clone(), self.count.clone()]
    }
}

impl<E> ObservationTransform<E> for NormalizeObservation
where
    E: EnvLike<Observation = Tensor, ObservationSpace = BoxSpace>,
{
    type Observation = Tensor;
    type Space = BoxSpace;

    fn observation(
        &self,
        state: State,
        observation: Tensor,
        _key: Option<Key>,
    ) -> Result<(State, Tensor), EnvError> {
        let mean = self.mean(&state)?;
        let var = self.var(&state)?;
        let count = self.count(&state)?;

        // Parallel-moments update with a batch of one.
        let total = count + 1.0;
        let delta = observation.sub(mean)?;
        let mean = mean.add(&delta.scale(1.0 / total))?;
        let m2 = var.scale(count).add(&delta.mul(&delta)?.scale(count / total))?;
        let var = m2.scale(1.0 / total);

        let normalized = observation
            .sub(&mean)?
            .div(&var.add_scalar(VAR_EPSILON).sqrt())?;

        let state = state
            .set(&self.mean, mean)?
            .set(&self.var, var)?
            .set(&self.count, Tensor::scalar(total))?;
        Ok((state, normalized))
    }

    fn observation_space(&self, env: &E) -> BoxSpace {
        BoxSpace::unbounded(env.observation_space().shape().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl Stateful for Fixed {}

    impl EnvLike for Fixed {
        type Action = Tensor;
        type Observation = Tensor;
        type ActionSpace = BoxSpace;
        type ObservationSpace = BoxSpace;
        type Unwrapped = Self;

        fn reset(
            &self,
            state: State,
            _key: Option<Key>,
        ) -> Result<crate::Reset<Tensor>, EnvError> {
            Ok(crate::Reset {
                state,
                observation: Tensor::vector(vec![0.0, 0.0]),
                info: crate::Info::new(),
            })
        }

        fn step(
            &self,
            state: State,
            action: Tensor,
            _key: Option<Key>,
        ) -> Result<crate::Step<Tensor>, EnvError> {
            Ok(crate::Step {
                state,
                observation: action,
                reward: 0.0,
                terminated: false,
                truncated: false,
                info: crate::Info::new(),
            })
        }

        fn action_space(&self) -> BoxSpace {
            BoxSpace::unbounded(vec![2])
        }

        fn observation_space(&self) -> BoxSpace {
            BoxSpace::unbounded(vec![2])
        }

        fn unwrapped(&self) -> &Self {
            self
        }
    }

    #[test]
    fn running_statistics_track_observations() {
        let norm = NormalizeObservation::for_env(&Fixed, 0.0);
        let mut state = State::new(&norm);
        let mut outputs = Vec::new();
        for value in [1.0, 3.0] {
            let obs = Tensor::vector(vec![value, -value]);
            let (next, normalized) =
                ObservationTransform::<Fixed>::observation(&norm, state, obs, None).unwrap();
            state = next;
            outputs.push(normalized);
        }
        // The first observation is its own mean, with zero variance.
        assert_eq!(outputs[0].data(), &[0.0, 0.0]);
        assert!(outputs[1].all_finite());
        assert_eq!(norm.count(&state).unwrap(), 2.0);
        assert_eq!(norm.mean(&state).unwrap().data(), &[2.0, -2.0]);
        assert_eq!(norm.var(&state).unwrap().data(), &[1.0, 1.0]);
    }

    #[test]
    fn small_initial_count_keeps_prior_variance() {
        let norm = NormalizeObservation::for_env(&Fixed, 1e-4);
        let state = State::new(&norm);
        let obs = Tensor::vector(vec![2.0, -2.0]);
        let (state, normalized) =
            ObservationTransform::<Fixed>::observation(&norm, state, obs, None).unwrap();
        assert!(normalized.all_finite());
        assert!(norm.var(&state).unwrap().data().iter().all(|&v| v > 0.0));
        assert!((norm.count(&state).unwrap() - 1.0001).abs() < 1e-6);
    }
}
