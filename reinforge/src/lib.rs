//! Command line trainer of reinforge.
//!
//! Wires a [`RunConfig`](config::RunConfig), the logger, an environment, the
//! REINFORCE agent and a recorder into a [`Trainer`](reinforge_core::Trainer).
pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
