//! Utilities.
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use reinforge_core::Obs;

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> i64;

    /// Sets the output dimension.
    fn set_out_dim(&mut self, v: i64);
}

/// Converts an observation into a `[1, obs_dim]` tensor.
pub fn obs_to_tensor(obs: &Obs, device: &Device) -> Result<Tensor> {
    Ok(Tensor::from_slice(obs.as_slice(), (1, obs.len()), device)?)
}

/// Log-softmax over the last dimension.
///
/// The maximum is subtracted for stability and detached; the result does not
/// depend on the shift.
pub fn log_softmax(logits: &Tensor) -> Result<Tensor> {
    let max = logits.max_keepdim(D::Minus1)?.detach();
    let shifted = logits.broadcast_sub(&max)?;
    let log_sum_exp = shifted.exp()?.sum_keepdim(D::Minus1)?.log()?;
    Ok(shifted.broadcast_sub(&log_sum_exp)?)
}
