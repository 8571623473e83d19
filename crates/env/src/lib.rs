#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! # Env
//!
//! The environment protocol: a capability set shared by concrete
//! environments and the wrappers stacked on top of them.
//!
//! Environments are immutable values. Their evolving data lives in a
//! [`state::State`] threaded through every `reset` and `step`, and randomness
//! arrives as an optional, single-use [`tensor::Key`].
//!
//! ## Key Components
//!
//! -   [`EnvLike`]: `reset`, `step`, `render`, `close`, the two spaces, and
//!     `unwrapped`.
//! -   [`wrapper`]: [`ObservationWrapper`], [`ActionWrapper`] and
//!     [`RewardWrapper`], each delegating to a child and applying one
//!     transform.
//! -   [`wrappers`]: ready-made transforms.
//! -   [`space`]: [`BoxSpace`] and [`Discrete`].
//! -   [`envs`]: the [`envs::RollingSphere`] reference environment.

pub mod env_like;
pub mod envs;
pub mod error;
pub mod space;
pub mod wrapper;
pub mod wrappers;

pub use env_like::{EnvLike, Info, Reset, Step};
pub use error::EnvError;
pub use space::{BoxSpace, Discrete, Space};
pub use wrapper::{
    ActionTransform, ActionWrapper, ObservationTransform, ObservationWrapper, RewardTransform,
    RewardWrapper,
};
