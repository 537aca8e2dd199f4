//! REINFORCE agent.
//!
//! The agent selects actions with an epsilon-gated categorical policy and is
//! updated once per episode with the return-weighted log-likelihood of the
//! actions it sampled.
mod base;
mod config;
pub mod explorer;
mod model;
pub use base::Reinforce;
pub use config::ReinforceConfig;
pub use model::{PolicyModel, PolicyModelConfig};
