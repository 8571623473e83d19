#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! # Buffers
//!
//! On-policy trajectory storage and the training targets computed from it.
//!
//! A [`RolloutBuffer`] holds one trajectory as fixed-shape tensors plus
//! arbitrary [`tensor::Tree`] observations, actions and captured states. It
//! is an immutable value: computing targets or regrouping into minibatches
//! produces a new buffer.
//!
//! ## Key Components
//!
//! -   [`RolloutBuffer`] and its builder, with shape validation on
//!     construction.
//! -   `compute_returns_and_advantages`: generalized advantage estimation as
//!     a single backward scan.
//! -   `batches`: contiguous or shuffled regrouping of the leading axis,
//!     applied to every field at once.
//! -   [`collect()`]: fills a buffer by stepping an [`env::EnvLike`] with a
//!     [`Policy`].

pub mod batch;
pub mod collect;
pub mod error;
pub mod gae;
pub mod rollout;

pub use collect::{collect, Decision, Policy, Rollout};
pub use error::BufferError;
pub use rollout::{RolloutBuffer, RolloutBufferBuilder};
