//! Configuration of [`Trainer`](super::Trainer).
use crate::{EpsilonSchedule, RangeNormalizer};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    /// The number of episodes to run.
    pub max_episodes: usize,

    /// The maximum number of environment steps (actions applied) per episode.
    pub max_steps: usize,

    /// Interval of saving model parameters in episodes. `0` disables saving.
    pub save_interval: usize,

    /// Where to save the model parameters.
    pub model_dir: String,

    /// Prefix of checkpoint file names.
    pub model_name: String,

    /// Exploration schedule.
    pub epsilon: EpsilonSchedule,

    /// Bounds of normalized observations.
    pub obs_range: RangeNormalizer,

    /// Weight of the latest episode reward in the running reward.
    pub running_reward_decay: f32,

    /// Running reward before the first episode.
    pub initial_running_reward: f32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 30000,
            max_steps: 80,
            save_interval: 500,
            model_dir: "rl_models".to_string(),
            model_name: "rl-model".to_string(),
            epsilon: EpsilonSchedule::default(),
            obs_range: RangeNormalizer::default(),
            running_reward_decay: 0.05,
            initial_running_reward: 10.0,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the step budget of an episode.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the interval of saving in episodes.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the directory where checkpoints are written.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = v.into();
        self
    }

    /// Sets the prefix of checkpoint file names.
    pub fn model_name(mut self, v: impl Into<String>) -> Self {
        self.model_name = v.into();
        self
    }

    /// Sets the exploration schedule.
    pub fn epsilon(mut self, v: EpsilonSchedule) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the bounds of normalized observations.
    pub fn obs_range(mut self, v: RangeNormalizer) -> Self {
        self.obs_range = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
