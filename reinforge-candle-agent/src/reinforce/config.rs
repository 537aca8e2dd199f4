//! Configuration of REINFORCE agent.
use super::PolicyModelConfig;
use crate::{opt::OptimizerConfig, util::OutDim, Device};
use anyhow::Result;
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Reinforce`](super::Reinforce) agent.
///
/// `P` is the configuration type of the policy network.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReinforceConfig<P>
where
    P: OutDim,
{
    /// Configuration of the policy network and its optimizer.
    pub model_config: PolicyModelConfig<P>,

    /// Discount factor of returns.
    #[serde(default = "default_discount_factor")]
    pub discount_factor: f64,

    /// Seed of the random number generator used for action selection.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Device of the policy network. Defaults to CPU.
    #[serde(default)]
    pub device: Option<Device>,

    /// If `true`, the agent starts in training mode.
    #[serde(default = "default_train")]
    pub train: bool,
}

fn default_discount_factor() -> f64 {
    0.99
}

fn default_seed() -> u64 {
    543
}

fn default_train() -> bool {
    true
}

impl<P> Default for ReinforceConfig<P>
where
    P: OutDim,
{
    fn default() -> Self {
        Self {
            model_config: PolicyModelConfig::default(),
            discount_factor: default_discount_factor(),
            seed: default_seed(),
            device: None,
            train: default_train(),
        }
    }
}

impl<P> ReinforceConfig<P>
where
    P: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the policy network.
    pub fn policy_config(mut self, v: P) -> Self {
        self.model_config = self.model_config.policy_config(v);
        self
    }

    /// Sets the number of actions.
    pub fn out_dim(mut self, v: i64) -> Self {
        self.model_config = self.model_config.out_dim(v);
        self
    }

    /// Sets the optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.model_config = self.model_config.opt_config(v);
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f64) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    /// Loads [`ReinforceConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of REINFORCE agent from {:?}", path_);
        Ok(b)
    }

    /// Saves [`ReinforceConfig`] to YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of REINFORCE agent into {:?}", path_);
        Ok(())
    }
}
