#![warn(missing_docs)]
//! Core of reinforge: a policy-gradient trainer that learns to pick sequences of
//! discrete transformation actions against an external scoring environment.
//!
//! This crate is backend-agnostic. It defines the environment contract ([`Env`]),
//! the trainable policy contract ([`Agent`]), the per-episode [`Trajectory`],
//! the pure numerical pieces ([`RangeNormalizer`], [`EpsilonSchedule`],
//! [`discounted_returns`], [`normalize_returns`]), the [`EpisodeRunner`] and the
//! [`Trainer`], which also takes care of periodic checkpoints. Trained policies
//! are scored with an [`Evaluator`](evaluator::Evaluator).
//!
//! Neural network policies live in backend crates such as `reinforge-candle-agent`.
pub mod error;
pub mod record;

mod base;
pub use base::{Act, ActionTable, Agent, Configurable, Env, Info, Obs, Policy, Step};

mod trajectory;
pub use trajectory::Trajectory;

mod obs_norm;
pub use obs_norm::RangeNormalizer;

mod epsilon;
pub use epsilon::EpsilonSchedule;

mod returns;
pub use returns::{discounted_returns, normalize_returns, RETURN_NORM_EPS};

mod runner;
pub use runner::{Episode, EpisodeRunner};

pub mod evaluator;

mod trainer;
pub use trainer::{checkpoint_path, TrainSummary, Trainer, TrainerConfig};
