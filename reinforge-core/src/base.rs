//! Core functionalities.
mod action_table;
mod agent;
mod env;
mod policy;
mod step;
pub use action_table::ActionTable;
pub use agent::Agent;
pub use env::Env;
pub use policy::{Configurable, Policy};
pub use step::{Info, Step};

/// Observation of an environment: a fixed-length feature vector.
///
/// The length is the feature dimensionality reported by [`Env::obs_dim`].
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Obs(pub Vec<f32>);

impl Obs {
    /// Returns the features as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Returns the number of features.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the observation has no features.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f32>> for Obs {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

impl From<Obs> for Vec<f32> {
    fn from(obs: Obs) -> Self {
        obs.0
    }
}

/// Action of an environment: an index into its [`ActionTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Act(pub usize);

impl Act {
    /// Returns the index of the action.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for Act {
    fn from(ix: usize) -> Self {
        Self(ix)
    }
}
