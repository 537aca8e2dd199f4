//! Policy.
use super::{Act, Env, Obs};
use anyhow::Result;
use serde::de::DeserializeOwned;

/// A policy on an environment.
///
/// Policy is a mapping from an observation to an action, without any
/// bookkeeping for training.
pub trait Policy<E: Env> {
    /// Sample an action given an observation.
    fn sample(&mut self, obs: &Obs) -> Result<Act>;
}

/// A configurable object.
pub trait Configurable {
    /// Configuration.
    type Config: Clone + DeserializeOwned;

    /// Builds the object.
    fn build(config: Self::Config) -> Result<Self>
    where
        Self: Sized;
}
