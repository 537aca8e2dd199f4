use crate::util::OutDim;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub(super) in_dim: i64,
    pub(super) units: Vec<i64>,
    pub(super) out_dim: i64,

    /// Drop probability applied to the input features during training.
    #[serde(default = "default_dropout")]
    pub(super) dropout: f32,

    #[serde(default = "default_elu_alpha")]
    pub(super) elu_alpha: f64,

    /// If `true`, hidden activations are normalized per sample before ELU.
    #[serde(default = "default_layer_norm")]
    pub(super) layer_norm: bool,
}

fn default_dropout() -> f32 {
    0.1
}

fn default_elu_alpha() -> f64 {
    1.0
}

fn default_layer_norm() -> bool {
    true
}

impl MlpConfig {
    /// Creates configuration of MLP with default dropout, ELU and normalization settings.
    pub fn new(in_dim: i64, units: Vec<i64>, out_dim: i64) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            dropout: default_dropout(),
            elu_alpha: default_elu_alpha(),
            layer_norm: default_layer_norm(),
        }
    }

    /// Sets the dropout probability of the input layer.
    pub fn dropout(mut self, v: f32) -> Self {
        self.dropout = v;
        self
    }

    /// Sets `alpha` of ELU.
    pub fn elu_alpha(mut self, v: f64) -> Self {
        self.elu_alpha = v;
        self
    }

    /// Enables or disables normalization of hidden layers.
    pub fn layer_norm(mut self, v: bool) -> Self {
        self.layer_norm = v;
        self
    }

    /// Sets the input dimension.
    pub fn in_dim(mut self, v: i64) -> Self {
        self.in_dim = v;
        self
    }
}

impl OutDim for MlpConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, out_dim: i64) {
        self.out_dim = out_dim;
    }
}
