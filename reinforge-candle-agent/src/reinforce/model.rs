use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::OutDim,
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use log::info;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`PolicyModel`].
pub struct PolicyModelConfig<P>
where
    P: OutDim,
{
    pub(super) policy_config: Option<P>,
    pub(super) opt_config: OptimizerConfig,
}

impl<P> Default for PolicyModelConfig<P>
where
    P: OutDim,
{
    fn default() -> Self {
        Self {
            policy_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<P> PolicyModelConfig<P>
where
    P: DeserializeOwned + Serialize + OutDim,
{
    /// Sets configurations of the policy network.
    pub fn policy_config(mut self, v: P) -> Self {
        self.policy_config = Some(v);
        self
    }

    /// Sets output dimension of the model, i.e., the number of actions.
    pub fn out_dim(mut self, v: i64) -> Self {
        if let Some(policy_config) = &mut self.policy_config {
            policy_config.set_out_dim(v);
        }
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`PolicyModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PolicyModelConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Policy network owning its parameters and optimizer.
///
/// The network maps an observation to unnormalized action scores (logits).
pub struct PolicyModel<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim,
{
    device: Device,
    varmap: VarMap,

    // Dimension of the output vector (equal to the number of actions).
    out_dim: i64,

    policy: P,
    opt: Optimizer,
}

impl<P> PolicyModel<P>
where
    P: SubModel1<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Constructs [`PolicyModel`].
    pub fn build(config: PolicyModelConfig<P::Config>, device: Device) -> Result<Self> {
        let policy_config = config
            .policy_config
            .context("policy_config is not set.")?;
        let out_dim = policy_config.get_out_dim();
        let varmap = VarMap::new();
        let policy = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            P::build(vb, policy_config)?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            device,
            varmap,
            out_dim,
            policy,
            opt,
        })
    }

    /// Outputs the logits of actions given observation(s).
    pub fn forward_t(&self, obs: &P::Input, train: bool) -> Result<Tensor> {
        self.policy.forward_t(obs, train)
    }

    /// Number of actions.
    pub fn out_dim(&self) -> i64 {
        self.out_dim
    }

    /// Device on which the parameters live.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Computes gradients of `loss` and applies one optimizer step.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// Saves the parameters in safetensors format.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.varmap.save(&path)?;
        info!("Save policy model to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads parameters saved by [`PolicyModel::save`].
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.varmap.load(&path)?;
        info!("Load policy model from {:?}", path.as_ref());
        Ok(())
    }
}
