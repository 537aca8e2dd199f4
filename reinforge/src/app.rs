//! Training and evaluation runs.
use crate::config::{EnvSection, RunConfig};
use anyhow::Result;
use log::info;
use reinforge_candle_agent::{mlp::Mlp, reinforce::Reinforce};
use reinforge_core::{
    evaluator::{DefaultEvaluator, Evaluator},
    record::{NullRecorder, Recorder},
    Agent, Configurable, Env, EpisodeRunner, TrainSummary, Trainer,
};
use reinforge_env::{ProcessEnv, ScoreThresholdEnv};
use reinforge_tensorboard::TensorboardRecorder;
use std::path::Path;

/// File name of the run configuration written next to the checkpoints.
pub const RUN_CONFIG_FILE: &str = "run.yaml";

fn create_recorder(tensorboard: Option<&Path>) -> Box<dyn Recorder> {
    match tensorboard {
        Some(logdir) => {
            info!("Write tensorboard records to {:?}", logdir);
            Box::new(TensorboardRecorder::new(logdir))
        }
        None => Box::new(NullRecorder::new()),
    }
}

fn create_agent<E: Env>(config: &RunConfig, env: &E) -> Result<Reinforce<E, Mlp>> {
    Reinforce::build(config.agent_config(env.obs_dim(), env.n_actions()))
}

fn train_in<E: Env>(
    env_config: &E::Config,
    config: &RunConfig,
    recorder: &mut dyn Recorder,
) -> Result<TrainSummary> {
    let mut env = E::build(env_config, config.seed)?;
    let mut agent = create_agent(config, &env)?;
    let mut trainer = Trainer::build(config.trainer.clone());
    trainer.train(&mut env, &mut agent, recorder)
}

/// Trains an agent as configured and returns the summary of the run.
///
/// If checkpoints are enabled, the configuration is saved as
/// [`RUN_CONFIG_FILE`] in the model directory so that `eval` can rebuild the
/// same network.
pub fn train(config: &RunConfig, tensorboard: Option<&Path>) -> Result<TrainSummary> {
    if config.trainer.save_interval > 0 {
        let model_dir = Path::new(&config.trainer.model_dir);
        std::fs::create_dir_all(model_dir)?;
        config.save(model_dir.join(RUN_CONFIG_FILE))?;
    }

    let mut recorder = create_recorder(tensorboard);
    let summary = match &config.env {
        EnvSection::Synthetic(env_config) => {
            train_in::<ScoreThresholdEnv>(env_config, config, recorder.as_mut())?
        }
        EnvSection::Process(env_config) => {
            train_in::<ProcessEnv>(env_config, config, recorder.as_mut())?
        }
    };
    info!(
        "Finished {} episodes ({} aborted), running reward {:.4}",
        summary.episodes, summary.failed_episodes, summary.running_reward
    );
    Ok(summary)
}

fn eval_in<E: Env>(
    env_config: &E::Config,
    config: &RunConfig,
    model: &Path,
    n_episodes: usize,
) -> Result<f32> {
    let env = E::build(env_config, config.seed)?;
    let mut agent = create_agent(config, &env)?;
    agent.load_params(model)?;
    agent.eval();

    let runner = EpisodeRunner::new(config.trainer.max_steps, config.trainer.obs_range);
    let mut evaluator = DefaultEvaluator::from_env(env, n_episodes, runner)?;
    let record = evaluator.evaluate(&mut agent)?;
    Ok(record.get_scalar("eval_reward")?)
}

/// Runs `n_episodes` greedy episodes with the parameters in `model` and returns
/// the mean total reward.
pub fn eval(config: &RunConfig, model: &Path, n_episodes: usize) -> Result<f32> {
    info!("Evaluate {:?} for {} episodes", model, n_episodes);
    match &config.env {
        EnvSection::Synthetic(env_config) => {
            eval_in::<ScoreThresholdEnv>(env_config, config, model, n_episodes)
        }
        EnvSection::Process(env_config) => {
            eval_in::<ProcessEnv>(env_config, config, model, n_episodes)
        }
    }
}
