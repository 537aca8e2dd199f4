//! Optimizers.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Configuration of optimizer for training the policy network.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam optimizer.
    Adam {
        /// Learning rate.
        lr: f64,
    },

    /// AdamW optimizer.
    AdamW {
        /// Learning rate.
        lr: f64,
        #[serde(default = "default_beta1")]
        #[allow(missing_docs)]
        beta1: f64,
        #[serde(default = "default_beta2")]
        #[allow(missing_docs)]
        beta2: f64,
        #[serde(default = "default_eps")]
        #[allow(missing_docs)]
        eps: f64,
        #[serde(default = "default_weight_decay")]
        #[allow(missing_docs)]
        weight_decay: f64,
    },
}

fn default_beta1() -> f64 {
    ParamsAdamW::default().beta1
}

fn default_beta2() -> f64 {
    ParamsAdamW::default().beta2
}

fn default_eps() -> f64 {
    ParamsAdamW::default().eps
}

fn default_weight_decay() -> f64 {
    ParamsAdamW::default().weight_decay
}

impl OptimizerConfig {
    /// Constructs the optimizer over `vars`.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        match &self {
            OptimizerConfig::Adam { lr } => {
                let params = ParamsAdam {
                    lr: *lr,
                    ..ParamsAdam::default()
                };
                let opt = Adam::new(vars, params)?;
                Ok(Optimizer::Adam(opt))
            }
            OptimizerConfig::AdamW {
                lr,
                beta1,
                beta2,
                eps,
                weight_decay,
            } => {
                let params = ParamsAdamW {
                    lr: *lr,
                    beta1: *beta1,
                    beta2: *beta2,
                    eps: *eps,
                    weight_decay: *weight_decay,
                };
                let opt = AdamW::new(vars, params)?;
                Ok(Optimizer::AdamW(opt))
            }
        }
    }

    /// Returns the learning rate.
    pub fn get_learning_rate(&self) -> f64 {
        match self {
            Self::Adam { lr } => *lr,
            Self::AdamW { lr, .. } => *lr,
        }
    }

    /// Override learning rate.
    pub fn learning_rate(self, lr: f64) -> Self {
        match self {
            Self::Adam { lr: _ } => Self::Adam { lr },
            Self::AdamW {
                lr: _,
                beta1,
                beta2,
                eps,
                weight_decay,
            } => Self::AdamW {
                lr,
                beta1,
                beta2,
                eps,
                weight_decay,
            },
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 1e-2 }
    }
}

/// Optimizers.
///
/// This is a thin wrapper of [`candle_nn::Optimizer`] implementations.
pub enum Optimizer {
    /// Adam optimizer.
    Adam(Adam),

    /// AdamW optimizer.
    AdamW(AdamW),
}

impl Optimizer {
    /// Applies a backward step pass.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adam(opt) => Ok(opt.backward_step(loss)?),
            Self::AdamW(opt) => Ok(opt.backward_step(loss)?),
        }
    }
}
