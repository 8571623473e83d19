use crate::{EnvError, Space};
use state::{State, Stateful};
use tensor::Key;

/// Auxiliary diagnostics returned alongside observations.
///
/// Wrappers pass it through untouched.
pub type Info = serde_json::Map<String, serde_json::Value>;

/// Output of [`EnvLike::reset`].
#[derive(Clone, Debug, PartialEq)]
pub struct Reset<O> {
    pub state: State,
    pub observation: O,
    pub info: Info,
}

/// Output of [`EnvLike::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct Step<O> {
    pub state: State,
    pub observation: O,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Info,
}

impl<O> Step<O> {
    /// Whether the episode ended for either reason.
    #[must_use]
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Capability set shared by terminal environments and wrappers.
///
/// Implementors hold no mutable fields: everything that changes between calls
/// lives in the [`State`] passed in and returned. The container handed to an
/// implementor holds at least the slots it reports through [`Stateful`].
///
/// `key` is optional everywhere. Without one an environment must behave
/// deterministically.
pub trait EnvLike: Stateful {
    type Action;
    type Observation;
    type ActionSpace: Space<Item = Self::Action>;
    type ObservationSpace: Space<Item = Self::Observation>;
    /// The innermost terminal environment of a wrapper stack.
    type Unwrapped: EnvLike;

    fn reset(&self, state: State, key: Option<Key>) -> Result<Reset<Self::Observation>, EnvError>;

    fn step(
        &self,
        state: State,
        action: Self::Action,
        key: Option<Key>,
    ) -> Result<Step<Self::Observation>, EnvError>;

    /// Text rendering of the current state, if the environment supports one.
    fn render(&self, state: &State) -> Result<Option<String>, EnvError> {
        let _ = state;
        Ok(None)
    }

    fn close(&self) -> Result<(), EnvError> {
        Ok(())
    }

    fn action_space(&self) -> Self::ActionSpace;

    fn observation_space(&self) -> Self::ObservationSpace;

    fn unwrapped(&self) -> &Self::Unwrapped;
}
