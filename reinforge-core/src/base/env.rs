//! Environment.
use super::{Act, ActionTable, Info, Obs, Step};
use anyhow::Result;

/// An environment exposing a fixed action vocabulary and a scoring signal.
///
/// Environments are stateful and are stepped one action at a time; the
/// observation after step `t` is the input of the policy at step `t + 1`.
/// Errors returned by [`Env::reset`] and [`Env::step`] are treated as faults
/// of the environment by the [`Trainer`](crate::Trainer): the episode is
/// dropped and training continues.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns the initial observation.
    fn reset(&mut self) -> Result<Obs>;

    /// Applies an action.
    fn step(&mut self, act: &Act) -> Result<Step<Self>>
    where
        Self: Sized;

    /// The action vocabulary.
    fn action_table(&self) -> &ActionTable;

    /// Cardinality of the action space.
    fn n_actions(&self) -> usize {
        self.action_table().len()
    }

    /// Length of observation vectors.
    fn obs_dim(&self) -> usize;
}
