#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! # Trellis
//!
//! Composable environment wrappers and on-policy rollout buffers, written as
//! pure functions over explicitly threaded state.
//!
//! ## Project Architecture
//!
//! -   **[`tensor`]:** fixed-shape arrays, leading-axis gathers, the `Tree`
//!     trait for structured values, `scan`, and the move-only splittable
//!     `Key`.
//! -   **[`state`]:** the `State` container. Modules own `StateIndex`
//!     markers; composed modules lend their children's slots out with
//!     `substate` and merge them back with `update`.
//! -   **[`env`]:** the `EnvLike` contract, observation/action/reward
//!     wrappers and ready-made transforms, plus the `RollingSphere`
//!     reference environment.
//! -   **[`buffers`]:** `RolloutBuffer`, generalized advantage estimation,
//!     minibatching and rollout collection.
//! -   **`trellis`:** this crate. Run configuration, a small linear policy,
//!     and the pipeline behind the `trellis` binary.

pub mod app;
pub mod config;
pub mod policy;

pub use buffers;
pub use env;
pub use state;
pub use tensor;
