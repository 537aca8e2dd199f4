//! Environments for reinforge.
//!
//! * [`ProcessEnv`] drives an environment living in another process through a
//!   line-delimited JSON protocol on the child's stdin and stdout.
//! * [`ScoreThresholdEnv`] is a seeded synthetic environment in which actions
//!   shift a feature vector and a fixed linear-sigmoid oracle scores it.
mod process;
mod synthetic;
pub use process::{ProcessEnv, ProcessEnvConfig, ProcessInfo};
pub use synthetic::{ScoreInfo, ScoreThresholdConfig, ScoreThresholdEnv};
