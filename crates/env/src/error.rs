use state::StateError;
use tensor::TensorError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    #[error("state merge failed: {0}")]
    State(#[from] StateError),
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error("invalid action: {0}")]
    InvalidAction(String),
}
