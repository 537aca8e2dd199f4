//! Structured events emitted while training.
//!
//! The trainer does not format or print anything on its own beyond log lines.
//! Instead, it hands a [`Record`] to a [`Recorder`] once per episode and once per
//! checkpoint. Observability layers (Tensorboard, files, dashboards) implement
//! [`Recorder`] and decide how to present the values.
//!
//! ```rust
//! use reinforge_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("episode", 1.0);
//! record.insert("episode_reward", RecordValue::Scalar(-0.5));
//! record.insert("checkpoint", RecordValue::String("rl_models/rl-model-1.safetensors".into()));
//! assert_eq!(record.get_scalar("episode").unwrap(), 1.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
