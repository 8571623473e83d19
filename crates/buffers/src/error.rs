use env::EnvError;
use state::StateError;
use tensor::TensorError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BufferError {
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Env(#[from] EnvError),
    #[error("field `{field}` has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        field: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("batch size {batch_size} does not evenly divide {len} samples")]
    BatchSize { len: usize, batch_size: usize },
    #[error("buffer of shape {shape:?} has no batch axis to select from")]
    Unbatched { shape: Vec<usize> },
    #[error("rollout has no timesteps")]
    EmptyRollout,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}
