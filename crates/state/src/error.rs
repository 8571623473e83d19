use tensor::TensorError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("state index {0} is not part of this container")]
    UnknownIndex(u64),
    #[error("state index {0} is lent to an outstanding substate")]
    Lent(u64),
    #[error("state index {0} is already lent; a slice cannot be extracted twice")]
    AlreadyLent(u64),
    #[error("state index {index} expects shape {expected:?}, found {found:?}")]
    ShapeMismatch {
        index: u64,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("container was not produced by `substate` and cannot be merged")]
    NotASubstate,
    #[error("substate does not match the slots lent under lease {lease}: {detail}")]
    StructureMismatch { lease: u64, detail: String },
    #[error("substate still has {0} slot(s) lent to a nested substate")]
    OutstandingLease(usize),
    #[error(transparent)]
    Tensor(#[from] TensorError),
}
