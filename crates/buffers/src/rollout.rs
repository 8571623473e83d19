use crate::BufferError;
use state::State;
use tensor::{Tensor, TensorError, Tree};

/// One recorded trajectory, shaped `*size` along its leading axes.
///
/// The leading axis is time; any further axes of `rewards` are batch axes
/// (for example parallel environments). Every per-step field has exactly the
/// `*size` shape, and every leaf of `observations`, `actions` and `states`
/// starts with it.
///
/// A buffer is never modified in place. [`compute_returns_and_advantages`]
/// and [`batches`] return new buffers.
///
/// [`compute_returns_and_advantages`]: RolloutBuffer::compute_returns_and_advantages
/// [`batches`]: RolloutBuffer::batches
#[derive(Clone, Debug, PartialEq)]
pub struct RolloutBuffer<O, A, S = State> {
    pub(crate) observations: O,
    pub(crate) actions: A,
    pub(crate) rewards: Tensor,
    pub(crate) terminations: Tensor<bool>,
    pub(crate) truncations: Tensor<bool>,
    pub(crate) log_probs: Tensor,
    pub(crate) values: Tensor,
    pub(crate) returns: Tensor,
    pub(crate) advantages: Tensor,
    pub(crate) states: S,
}

impl<O: Tree, A: Tree, S: Tree> RolloutBuffer<O, A, S> {
    #[must_use]
    pub fn builder() -> RolloutBufferBuilder<O, A, S> {
        RolloutBufferBuilder::default()
    }

    /// The `*size` shape shared by every per-step field.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.rewards.shape()
    }

    /// Number of entries along the leading axis, zero for a single step.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rewards.leading_dim().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether returns and advantages have been computed.
    ///
    /// Until then both are filled with NaN.
    #[must_use]
    pub fn has_targets(&self) -> bool {
        !self.returns.data().iter().any(|v| v.is_nan())
            && !self.advantages.data().iter().any(|v| v.is_nan())
    }

    #[must_use]
    pub fn observations(&self) -> &O {
        &self.observations
    }

    #[must_use]
    pub fn actions(&self) -> &A {
        &self.actions
    }

    #[must_use]
    pub fn rewards(&self) -> &Tensor {
        &self.rewards
    }

    #[must_use]
    pub fn terminations(&self) -> &Tensor<bool> {
        &self.terminations
    }

    #[must_use]
    pub fn truncations(&self) -> &Tensor<bool> {
        &self.truncations
    }

    #[must_use]
    pub fn log_probs(&self) -> &Tensor {
        &self.log_probs
    }

    #[must_use]
    pub fn values(&self) -> &Tensor {
        &self.values
    }

    #[must_use]
    pub fn returns(&self) -> &Tensor {
        &self.returns
    }

    #[must_use]
    pub fn advantages(&self) -> &Tensor {
        &self.advantages
    }

    #[must_use]
    pub fn states(&self) -> &S {
        &self.states
    }

    fn validate(&self) -> Result<(), BufferError> {
        let size = self.shape();
        if size.first().map_or(true, |&len| len == 0) {
            return Err(BufferError::EmptyRollout);
        }
        let fields: [(&'static str, &[usize]); 6] = [
            ("terminations", self.terminations.shape()),
            ("truncations", self.truncations.shape()),
            ("log_probs", self.log_probs.shape()),
            ("values", self.values.shape()),
            ("returns", self.returns.shape()),
            ("advantages", self.advantages.shape()),
        ];
        for (field, shape) in fields {
            if shape != size {
                return Err(shape_mismatch(field, size, shape));
            }
        }
        check_prefix("observations", &self.observations, size)?;
        check_prefix("actions", &self.actions, size)?;
        check_prefix("states", &self.states, size)?;
        Ok(())
    }
}

fn shape_mismatch(field: &'static str, expected: &[usize], found: &[usize]) -> BufferError {
    BufferError::ShapeMismatch {
        field,
        expected: expected.to_vec(),
        found: found.to_vec(),
    }
}

fn check_prefix(field: &'static str, tree: &impl Tree, size: &[usize]) -> Result<(), BufferError> {
    let mut mismatch = None;
    tree.for_each_shape(&mut |shape| {
        if mismatch.is_none() && !shape.starts_with(size) {
            mismatch = Some(shape.to_vec());
        }
    });
    match mismatch {
        Some(found) => Err(shape_mismatch(field, size, &found)),
        None => Ok(()),
    }
}

/// Gathers every field with the same indices.
impl<O: Tree, A: Tree, S: Tree> Tree for RolloutBuffer<O, A, S> {
    fn for_each_shape(&self, f: &mut dyn FnMut(&[usize])) {
        self.observations.for_each_shape(f);
        self.actions.for_each_shape(f);
        f(self.rewards.shape());
        f(self.terminations.shape());
        f(self.truncations.shape());
        f(self.log_probs.shape());
        f(self.values.shape());
        f(self.returns.shape());
        f(self.advantages.shape());
        self.states.for_each_shape(f);
    }

    fn take(&self, indices: &Tensor<usize>) -> Result<Self, TensorError> {
        Ok(Self {
            observations: self.observations.take(indices)?,
            actions: self.actions.take(indices)?,
            rewards: self.rewards.take(indices)?,
            terminations: self.terminations.take(indices)?,
            truncations: self.truncations.take(indices)?,
            log_probs: self.log_probs.take(indices)?,
            values: self.values.take(indices)?,
            returns: self.returns.take(indices)?,
            advantages: self.advantages.take(indices)?,
            states: self.states.take(indices)?,
        })
    }
}

/// Collects the fields of a [`RolloutBuffer`].
///
/// `returns` and `advantages` are optional and default to NaN tensors shaped
/// like `values`.
#[derive(Debug)]
pub struct RolloutBufferBuilder<O, A, S = State> {
    observations: Option<O>,
    actions: Option<A>,
    rewards: Option<Tensor>,
    terminations: Option<Tensor<bool>>,
    truncations: Option<Tensor<bool>>,
    log_probs: Option<Tensor>,
    values: Option<Tensor>,
    returns: Option<Tensor>,
    advantages: Option<Tensor>,
    states: Option<S>,
}

impl<O, A, S> Default for RolloutBufferBuilder<O, A, S> {
    fn default() -> Self {
        Self {
            observations: None,
            actions: None,
            rewards: None,
            terminations: None,
            truncations: None,
            log_probs: None,
            values: None,
            returns: None,
            advantages: None,
            states: None,
        }
    }
}

impl<O: Tree, A: Tree, S: Tree> RolloutBufferBuilder<O, A, S> {
    #[must_use]
    pub fn observations(mut self, observations: O) -> Self {
        self.observations = Some(observations);
        self
    }

    #[must_use]
    pub fn actions(mut self, actions: A) -> Self {
        self.actions = Some(actions);
        self
    }

    #[must_use]
    pub fn rewards(mut self, rewards: impl Into<Tensor>) -> Self {
        self.rewards = Some(rewards.into());
        self
    }

    #[must_use]
    pub fn terminations(mut self, terminations: impl Into<Tensor<bool>>) -> Self {
        self.terminations = Some(terminations.into());
        self
    }

    #[must_use]
    pub fn truncations(mut self, truncations: impl Into<Tensor<bool>>) -> Self {
        self.truncations = Some(truncations.into());
        self
    }

    #[must_use]
    pub fn log_probs(mut self, log_probs: impl Into<Tensor>) -> Self {
        self.log_probs = Some(log_probs.into());
        self
    }

    #[must_use]
    pub fn values(mut self, values: impl Into<Tensor>) -> Self {
        self.values = Some(values.into());
        self
    }

    #[must_use]
    pub fn returns(mut self, returns: impl Into<Tensor>) -> Self {
        self.returns = Some(returns.into());
        self
    }

    #[must_use]
    pub fn advantages(mut self, advantages: impl Into<Tensor>) -> Self {
        self.advantages = Some(advantages.into());
        self
    }

    #[must_use]
    pub fn states(mut self, states: S) -> Self {
        self.states = Some(states);
        self
    }

    /// Validates shapes and assembles the buffer.
    pub fn build(self) -> Result<RolloutBuffer<O, A, S>, BufferError> {
        let values = self.values.ok_or(BufferError::MissingField("values"))?;
        let returns = self.returns.unwrap_or_else(|| values.nan_like());
        let advantages = self.advantages.unwrap_or_else(|| values.nan_like());
        let buffer = RolloutBuffer {
            observations: self
                .observations
                .ok_or(BufferError::MissingField("observations"))?,
            actions: self.actions.ok_or(BufferError::MissingField("actions"))?,
            rewards: self.rewards.ok_or(BufferError::MissingField("rewards"))?,
            terminations: self
                .terminations
                .ok_or(BufferError::MissingField("terminations"))?,
            truncations: self
                .truncations
                .ok_or(BufferError::MissingField("truncations"))?,
            log_probs: self.log_probs.ok_or(BufferError::MissingField("log_probs"))?,
            values,
            returns,
            advantages,
            states: self.states.ok_or(BufferError::MissingField("states"))?,
        };
        buffer.validate()?;
        Ok(buffer)
    }
}
