//! Agent.
use super::{Act, Env, Obs, Policy};
use crate::{record::Record, Trajectory};
use anyhow::Result;
use std::path::Path;

/// Represents a trainable stochastic policy on an environment.
///
/// An agent selects actions with an exploration rule and keeps what it needs
/// for the gradient in a [`Trajectory`] owned by the running episode. After
/// the episode, [`Agent::opt_with_record`] turns the trajectory into one
/// parameter update.
pub trait Agent<E: Env>: Policy<E> {
    /// Differentiable log-probability of a sampled action, as kept by the backend.
    type LogProb;

    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Selects an action with exploration probability `epsilon`.
    ///
    /// Pushes exactly one log-probability slot to `trajectory`: `Some` when the
    /// action was sampled from the policy, `None` when it was drawn uniformly
    /// at random.
    fn select_action(
        &mut self,
        obs: &Obs,
        epsilon: f64,
        trajectory: &mut Trajectory<Self::LogProb>,
    ) -> Result<Act>;

    /// Performs an optimization step from a completed episode and returns
    /// some information. The trajectory is empty afterwards.
    fn opt_with_record(&mut self, trajectory: &mut Trajectory<Self::LogProb>) -> Result<Record>;

    /// Performs an optimization step from a completed episode.
    fn opt(&mut self, trajectory: &mut Trajectory<Self::LogProb>) -> Result<()> {
        self.opt_with_record(trajectory).map(|_| ())
    }

    /// Save the parameters of the agent to the given file.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given file.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
