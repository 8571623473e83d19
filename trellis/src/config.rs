//! Run configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional JSON file, then command-line flags.

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything one collection and training-target pass needs.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Steps to collect.
    pub steps: usize,
    /// Minibatch size; must divide `steps`.
    pub batch_size: usize,
    pub gamma: f32,
    pub gae_lambda: f32,
    /// Root seed. `None` runs without randomness.
    pub seed: Option<u64>,
    pub max_episode_steps: usize,
    pub reward_scale: f32,
    /// Half-width of the uniform start position.
    pub reset_noise: f32,
    /// Standard deviation of the Gaussian added to observations.
    pub observation_noise: f32,
    /// Standard deviation of the policy's exploration noise.
    pub action_std: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 256,
            batch_size: 64,
            gamma: 0.99,
            gae_lambda: 0.95,
            seed: Some(0),
            max_episode_steps: 200,
            reward_scale: 1.0,
            reset_noise: 0.05,
            observation_noise: 0.0,
            action_std: 0.5,
        }
    }
}

impl RunConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, or a parse error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Overrides fields with every flag given on the command line.
    pub fn apply(&mut self, args: &Args) {
        if let Some(steps) = args.steps {
            self.steps = steps;
        }
        if let Some(batch_size) = args.batch_size {
            self.batch_size = batch_size;
        }
        if let Some(gamma) = args.gamma {
            self.gamma = gamma;
        }
        if let Some(gae_lambda) = args.gae_lambda {
            self.gae_lambda = gae_lambda;
        }
        if let Some(seed) = args.seed {
            self.seed = Some(seed);
        }
        if args.no_seed {
            self.seed = None;
        }
        if let Some(max_episode_steps) = args.max_episode_steps {
            self.max_episode_steps = max_episode_steps;
        }
        if let Some(reward_scale) = args.reward_scale {
            self.reward_scale = reward_scale;
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps == 0 {
            return Err(ConfigError::Invalid("steps must be positive".into()));
        }
        if self.batch_size == 0 || self.steps % self.batch_size != 0 {
            return Err(ConfigError::Invalid(format!(
                "batch_size {} must evenly divide steps {}",
                self.batch_size, self.steps
            )));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::Invalid(format!(
                "gamma must lie in [0, 1], got {}",
                self.gamma
            )));
        }
        if !(0.0..=1.0).contains(&self.gae_lambda) {
            return Err(ConfigError::Invalid(format!(
                "gae_lambda must lie in [0, 1], got {}",
                self.gae_lambda
            )));
        }
        if self.max_episode_steps == 0 {
            return Err(ConfigError::Invalid(
                "max_episode_steps must be positive".into(),
            ));
        }
        for (name, value) in [
            ("reset_noise", self.reset_noise),
            ("observation_noise", self.observation_noise),
            ("action_std", self.action_std),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Command-line flags of the `trellis` binary.
#[derive(Debug, Default, Parser)]
#[command(
    name = "trellis",
    version,
    about = "Collects a rollout on the rolling-sphere task and computes its training targets"
)]
pub struct Args {
    /// JSON file with a `RunConfig`.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub steps: Option<usize>,
    #[arg(long)]
    pub batch_size: Option<usize>,
    #[arg(long)]
    pub gamma: Option<f32>,
    #[arg(long)]
    pub gae_lambda: Option<f32>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Run without any randomness.
    #[arg(long, conflicts_with = "seed")]
    pub no_seed: bool,
    #[arg(long)]
    pub max_episode_steps: Option<usize>,
    #[arg(long)]
    pub reward_scale: Option<f32>,
}

/// Resolves defaults, the config file and flags into a validated config.
///
/// # Errors
///
/// Fails when the file cannot be loaded or the merged config is invalid.
pub fn resolve(args: &Args) -> Result<RunConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    config.apply(args);
    config.validate()?;
    Ok(config)
}
