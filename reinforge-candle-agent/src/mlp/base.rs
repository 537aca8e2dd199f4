use super::MlpConfig;
use crate::model::SubModel1;
use anyhow::{ensure, Result};
use candle_core::{Device, Tensor, D};
use candle_nn::{init::Init, linear, Dropout, Linear, Module, ModuleT, VarBuilder};

/// Per-sample normalization over the feature dimension with learnable scale and shift.
///
/// Statistics are computed for each row, so a batch of one sample is fine.
struct FeatureNorm {
    weight: Tensor,
    bias: Tensor,
    eps: f64,
}

impl FeatureNorm {
    fn build(dim: usize, vb: VarBuilder) -> Result<Self> {
        let weight = vb.get_with_hints(dim, "weight", Init::Const(1.0))?;
        let bias = vb.get_with_hints(dim, "bias", Init::Const(0.0))?;
        Ok(Self {
            weight,
            bias,
            eps: 1e-5,
        })
    }

    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let mean = xs.mean_keepdim(D::Minus1)?;
        let centered = xs.broadcast_sub(&mean)?;
        let var = centered.sqr()?.mean_keepdim(D::Minus1)?;
        let xs = centered.broadcast_div(&var.affine(1.0, self.eps)?.sqrt()?)?;
        Ok(xs.broadcast_mul(&self.weight)?.broadcast_add(&self.bias)?)
    }
}

struct HiddenLayer {
    linear: Linear,
    norm: Option<FeatureNorm>,
}

/// ELU from primitive ops.
fn elu(xs: &Tensor, alpha: f64) -> Result<Tensor> {
    let negative = xs.minimum(0f64)?.exp()?.affine(alpha, -alpha)?;
    Ok((xs.relu()? + negative)?)
}

/// Multilayer perceptron with ELU activations.
///
/// Input features pass through dropout, then each hidden layer applies
/// `Linear -> FeatureNorm -> ELU`. The output layer returns raw logits.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    dropout: Dropout,
    hidden: Vec<HiddenLayer>,
    head: Linear,
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        ensure!(config.in_dim > 0, "in_dim of MLP must be positive");
        ensure!(config.out_dim > 0, "out_dim of MLP must be positive");
        ensure!(
            (0.0..1.0).contains(&config.dropout),
            "dropout probability must be in [0, 1), got {}",
            config.dropout
        );
        let device = vb.device().clone();
        let vb = vb.pp("mlp");

        let mut dims = vec![config.in_dim as usize];
        dims.extend(config.units.iter().map(|&u| u as usize));
        let mut hidden = Vec::with_capacity(config.units.len());
        for (i, w) in dims.windows(2).enumerate() {
            let linear = linear(w[0], w[1], vb.pp(format!("ln{}", i)))?;
            let norm = match config.layer_norm {
                true => Some(FeatureNorm::build(w[1], vb.pp(format!("norm{}", i)))?),
                false => None,
            };
            hidden.push(HiddenLayer { linear, norm });
        }
        let last = *dims.last().unwrap_or(&(config.in_dim as usize));
        let head = linear(last, config.out_dim as usize, vb.pp("head"))?;

        Ok(Self {
            dropout: Dropout::new(config.dropout),
            config,
            device,
            hidden,
            head,
        })
    }

    fn forward_t(&self, xs: &Self::Input, train: bool) -> Result<Self::Output> {
        let xs = xs.to_device(&self.device)?;
        let mut xs = self.dropout.forward_t(&xs, train)?;
        for layer in self.hidden.iter() {
            xs = layer.linear.forward(&xs)?;
            if let Some(norm) = &layer.norm {
                xs = norm.forward(&xs)?;
            }
            xs = elu(&xs, self.config.elu_alpha)?;
        }
        Ok(self.head.forward(&xs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    fn build(layer_norm: bool) -> Result<(VarMap, Mlp)> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let config = MlpConfig::new(6, vec![16, 8], 3).layer_norm(layer_norm);
        let mlp = Mlp::build(vb, config)?;
        Ok((varmap, mlp))
    }

    #[test]
    fn test_single_sample_forward() -> Result<()> {
        let (_varmap, mlp) = build(true)?;
        let xs = Tensor::from_slice(&[0.5f32, -0.5, 0.1, 0.2, 0.3, 0.0], (1, 6), &Device::Cpu)?;
        for train in [true, false] {
            let ys = mlp.forward_t(&xs, train)?;
            assert_eq!(ys.dims(), &[1, 3]);
            assert!(ys.flatten_all()?.to_vec1::<f32>()?.iter().all(|v| v.is_finite()));
        }
        Ok(())
    }

    #[test]
    fn test_eval_is_deterministic() -> Result<()> {
        let (_varmap, mlp) = build(true)?;
        let xs = Tensor::from_slice(&[0.5f32, -0.5, 0.1, 0.2, 0.3, 0.0], (1, 6), &Device::Cpu)?;
        let y1 = mlp.forward_t(&xs, false)?.flatten_all()?.to_vec1::<f32>()?;
        let y2 = mlp.forward_t(&xs, false)?.flatten_all()?.to_vec1::<f32>()?;
        assert_eq!(y1, y2);
        Ok(())
    }

    #[test]
    fn test_parameters() -> Result<()> {
        let (varmap, _) = build(true)?;
        // 3 linear layers with weight and bias, 2 norms with weight and bias
        assert_eq!(varmap.all_vars().len(), 10);
        let (varmap, _) = build(false)?;
        assert_eq!(varmap.all_vars().len(), 6);
        Ok(())
    }

    #[test]
    fn test_elu() -> Result<()> {
        let xs = Tensor::from_slice(&[-1.0f32, 0.0, 2.0], 3, &Device::Cpu)?;
        let ys = elu(&xs, 1.0)?.to_vec1::<f32>()?;
        assert!((ys[0] - ((-1.0f32).exp() - 1.0)).abs() < 1e-6);
        assert_eq!(ys[1], 0.0);
        assert_eq!(ys[2], 2.0);
        Ok(())
    }
}
