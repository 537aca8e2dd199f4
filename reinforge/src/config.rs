//! Configuration of a training or evaluation run.
use anyhow::Result;
use log::info;
use reinforge_candle_agent::{
    mlp::MlpConfig, opt::OptimizerConfig, reinforce::ReinforceConfig, Device,
};
use reinforge_core::TrainerConfig;
use reinforge_env::{ProcessEnvConfig, ScoreThresholdConfig};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Environment of a run.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EnvSection {
    /// Seeded synthetic environment.
    Synthetic(ScoreThresholdConfig),

    /// Environment served by a child process.
    Process(ProcessEnvConfig),
}

impl Default for EnvSection {
    fn default() -> Self {
        Self::Synthetic(ScoreThresholdConfig::default())
    }
}

/// Hyperparameters of the REINFORCE agent.
///
/// The input and output dimensions of the policy network are taken from the
/// environment when the agent is built.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AgentSection {
    /// Hidden layer sizes of the policy network.
    pub units: Vec<i64>,

    /// Dropout probability of the input layer.
    pub dropout: f32,

    /// `alpha` of the ELU activations.
    pub elu_alpha: f64,

    /// Per-sample normalization of hidden layers.
    pub layer_norm: bool,

    /// Optimizer.
    pub opt_config: OptimizerConfig,

    /// Discount factor of returns.
    pub discount_factor: f64,

    /// Device of the policy network.
    pub device: Option<Device>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            units: vec![1024, 256],
            dropout: 0.1,
            elu_alpha: 1.0,
            layer_norm: true,
            opt_config: OptimizerConfig::default(),
            discount_factor: 0.99,
            device: None,
        }
    }
}

/// Configuration of a run: environment, agent and trainer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Seed of the environment and of the action sampling of the agent.
    pub seed: i64,

    /// Environment.
    pub env: EnvSection,

    /// Agent.
    pub agent: AgentSection,

    /// Trainer.
    pub trainer: TrainerConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 543,
            env: EnvSection::default(),
            agent: AgentSection::default(),
            trainer: TrainerConfig::default(),
        }
    }
}

impl RunConfig {
    /// Configuration of the agent for an environment with `obs_dim` features and
    /// `n_actions` actions.
    pub fn agent_config(&self, obs_dim: usize, n_actions: usize) -> ReinforceConfig<MlpConfig> {
        let a = &self.agent;
        let mlp_config = MlpConfig::new(obs_dim as _, a.units.clone(), n_actions as _)
            .dropout(a.dropout)
            .elu_alpha(a.elu_alpha)
            .layer_norm(a.layer_norm);
        let config = ReinforceConfig::default()
            .policy_config(mlp_config)
            .opt_config(a.opt_config.clone())
            .discount_factor(a.discount_factor)
            .seed(self.seed as u64);
        match a.device {
            Some(device) => config.device(device),
            None => config,
        }
    }

    /// Constructs [`RunConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load run config from {:?}", path_);
        Ok(b)
    }

    /// Saves [`RunConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
