use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("shape {shape:?} does not hold {found} elements")]
    ElementCount { shape: Vec<usize>, found: usize },
    #[error("index {index} out of bounds for axis of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("operation needs at least one axis, found a scalar")]
    Scalar,
    #[error("cannot stack or concatenate an empty sequence")]
    Empty,
    #[error("invalid leaf: {0}")]
    InvalidLeaf(&'static str),
}
