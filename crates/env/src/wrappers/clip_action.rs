use crate::{ActionTransform, BoxSpace, EnvError, EnvLike};
use state::{State, Stateful};
use tensor::{Key, Tensor};

/// Clamps tensor actions into the child's action box.
///
/// The wrapper itself accepts any action of the right shape.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipAction {
    bounds: BoxSpace,
}

impl ClipAction {
    #[must_use]
    pub fn new(bounds: BoxSpace) -> Self {
        Self { bounds }
    }

    /// Clips into `env`'s own action space.
    #[must_use]
    pub fn for_env<E: EnvLike<ActionSpace = BoxSpace>>(env: &E) -> Self {
        Self::new(env.action_space())
    }
}

impl Stateful for ClipAction {}

impl<E> ActionTransform<E> for ClipAction
where
    E: EnvLike<Action = Tensor, ActionSpace = BoxSpace>,
{
    type Action = Tensor;
    type Space = BoxSpace;

    fn action(
        &self,
        state: State,
        action: Tensor,
        _key: Option<Key>,
    ) -> Result<(State, Tensor), EnvError> {
        let clipped = self.bounds.clip(&action)?;
        Ok((state, clipped))
    }

    fn action_space(&self, env: &E) -> BoxSpace {
        BoxSpace::unbounded(env.action_space().shape().to_vec())
    }
}
