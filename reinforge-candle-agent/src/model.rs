//! Interface of neural networks used in RL agents.
use anyhow::Result;
use candle_nn::VarBuilder;

/// Neural network model not owing its [`VarMap`] internally.
///
/// [`VarMap`]: https://docs.rs/candle-nn/0.8.4/candle_nn/var_map/struct.VarMap.html
pub trait SubModel1 {
    /// Configuration from which [`SubModel1`] is constructed.
    type Config;

    /// Input of the [`SubModel1`].
    type Input;

    /// Output of the [`SubModel1`].
    type Output;

    /// Builds [`SubModel1`] with [`VarBuilder`] and [`SubModel1::Config`].
    ///
    /// [`VarBuilder`]: https://docs.rs/candle-nn/0.8.4/candle_nn/var_builder/type.VarBuilder.html
    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// A generalized forward function.
    ///
    /// `train` switches layers that behave differently during training, such as dropout.
    fn forward_t(&self, input: &Self::Input, train: bool) -> Result<Self::Output>;
}
