//! Generalized advantage estimation over a recorded trajectory.

use crate::{BufferError, RolloutBuffer};
use tensor::{try_scan, Tensor, TensorError, Tree};

impl<O, A, S> RolloutBuffer<O, A, S>
where
    O: Tree + Clone,
    A: Tree + Clone,
    S: Tree + Clone,
{
    /// Returns a copy of the buffer with `returns` and `advantages` filled in.
    ///
    /// `last_value` is the value estimate of the observation following the
    /// final recorded step and `done` says whether that observation starts a
    /// new episode. Both have the shape of one timestep (`*size[1..]`), so
    /// plain scalars for a single environment.
    ///
    /// Position `t` of the continuation mask is zero when step `t` ended its
    /// episode; at the final step it is also zero when `done` is set. The
    /// recurrence
    ///
    /// ```text
    /// delta[t]     = r[t] + gamma * v[t + 1] * mask[t] - v[t]
    /// advantage[t] = delta[t] + gamma * lambda * mask[t] * advantage[t + 1]
    /// ```
    ///
    /// is evaluated as one backward scan, and `returns = advantages + values`.
    pub fn compute_returns_and_advantages(
        &self,
        last_value: impl Into<Tensor>,
        done: impl Into<Tensor<bool>>,
        gae_lambda: f32,
        gamma: f32,
    ) -> Result<Self, BufferError> {
        let last_value = last_value.into();
        let done = done.into();
        let len = self.len();
        if len == 0 {
            return Err(BufferError::EmptyRollout);
        }
        let step_shape = self.values.row_shape();
        if last_value.shape() != step_shape {
            return Err(BufferError::ShapeMismatch {
                field: "last_value",
                expected: step_shape.to_vec(),
                found: last_value.shape().to_vec(),
            });
        }
        if done.shape() != step_shape {
            return Err(BufferError::ShapeMismatch {
                field: "done",
                expected: step_shape.to_vec(),
                found: done.shape().to_vec(),
            });
        }

        let ended = self.terminations.or(&self.truncations)?;
        let next_values =
            Tensor::concat0(&[&self.values.slice0(1..len)?, &last_value.expand0()])?;
        let final_mask = ended.row(len - 1)?.or(&done)?.not().to_f32();
        let next_non_terminal = Tensor::concat0(&[
            &ended.slice0(0..len - 1)?.not().to_f32(),
            &final_mask.expand0(),
        ])?;

        let deltas = self
            .rewards
            .add(&next_values.mul(&next_non_terminal)?.scale(gamma))?
            .sub(&self.values)?;

        let steps = deltas
            .flip0()?
            .rows()?
            .into_iter()
            .zip(next_non_terminal.flip0()?.rows()?);
        let (_, reversed) = try_scan(
            Tensor::zeros(step_shape.to_vec()),
            steps,
            |carry: Tensor, (delta, mask): (Tensor, Tensor)| {
                let advantage = delta.add(&mask.mul(&carry)?.scale(gamma * gae_lambda))?;
                Ok::<_, TensorError>((advantage.clone(), advantage))
            },
        )?;
        let advantages = Tensor::stack(&reversed)?.flip0()?;
        let returns = advantages.add(&self.values)?;

        tracing::debug!(
            steps = len,
            gamma,
            gae_lambda,
            mean_advantage = advantages.mean(),
            "computed returns and advantages"
        );

        Ok(Self {
            returns,
            advantages,
            ..self.clone()
        })
    }
}
