//! Train [`Agent`].
mod config;
use crate::{
    error::ReinforgeError,
    record::{Record, RecordValue, Recorder},
    Agent, Env, EpisodeRunner, EpsilonSchedule,
};
use anyhow::Result;
use chrono::{Local, NaiveDate};
pub use config::TrainerConfig;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// Path of the checkpoint written after `episode`:
/// `<model_dir>/<model_name>-<episode>-<YYYY-MM-DD>.safetensors`.
pub fn checkpoint_path(
    model_dir: impl AsRef<Path>,
    model_name: &str,
    episode: usize,
    date: NaiveDate,
) -> PathBuf {
    model_dir.as_ref().join(format!(
        "{}-{}-{}.safetensors",
        model_name,
        episode,
        date.format("%Y-%m-%d")
    ))
}

/// Outcome of [`Trainer::train`].
#[derive(Debug, Clone, Default)]
pub struct TrainSummary {
    /// Episodes run, including failed ones.
    pub episodes: usize,

    /// Episodes aborted by a fault of the environment.
    pub failed_episodes: usize,

    /// Checkpoints written, in order.
    pub checkpoints: Vec<PathBuf>,

    /// Checkpoints that could not be written.
    pub failed_checkpoints: usize,

    /// Running reward after the last successful episode.
    pub running_reward: f32,

    /// Total reward of the last successful episode.
    pub last_episode_reward: Option<f32>,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop.
///
/// # Training loop
///
/// For each episode `i` in `1..=max_episodes`:
///
/// 1. Compute the exploration probability `epsilon(i)` with [`EpsilonSchedule`].
/// 2. Run one episode with [`EpisodeRunner`], which resets the environment and
///    alternates [`Agent::select_action`] and [`Env::step`] until the environment
///    signals the end of the episode or `max_steps` steps were taken.
/// 3. Update the agent with the collected trajectory by
///    [`Agent::opt_with_record`] and write a [`Record`] of the episode to the
///    recorder.
/// 4. If `i % save_interval == 0`, save the agent's parameters to
///    [`checkpoint_path`].
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Idle
///     Idle --> Running: train()
///     Running --> Updated: episode collected
///     Running --> MaybeCheckpointed: environment fault
///     Updated --> MaybeCheckpointed
///     MaybeCheckpointed --> Running: i < max_episodes
///     MaybeCheckpointed --> Done: i == max_episodes
/// ```
///
/// # Errors
///
/// A fault of the environment ([`ReinforgeError::Environment`]) aborts only the
/// current episode: it is logged, counted in [`TrainSummary::failed_episodes`] and
/// training goes on. Failing to write a checkpoint is logged and counted as well.
/// Any other error stops training and is returned.
pub struct Trainer {
    /// Number of episodes.
    max_episodes: usize,

    /// Interval of saving the model in episodes.
    save_interval: usize,

    /// Where to save the trained model.
    model_dir: String,

    /// Prefix of checkpoint file names.
    model_name: String,

    /// Exploration schedule.
    epsilon: EpsilonSchedule,

    /// Collects episodes.
    runner: EpisodeRunner,

    running_reward_decay: f32,

    initial_running_reward: f32,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            max_episodes: config.max_episodes,
            save_interval: config.save_interval,
            model_dir: config.model_dir,
            model_name: config.model_name,
            epsilon: config.epsilon,
            runner: EpisodeRunner::new(config.max_steps, config.obs_range),
            running_reward_decay: config.running_reward_decay,
            initial_running_reward: config.initial_running_reward,
        }
    }

    fn is_checkpoint_episode(&self, episode: usize) -> bool {
        self.save_interval > 0 && episode % self.save_interval == 0
    }

    fn save_model<E, A>(
        &self,
        agent: &A,
        episode: usize,
        date: NaiveDate,
    ) -> Result<PathBuf, ReinforgeError>
    where
        E: Env,
        A: Agent<E>,
    {
        let path = checkpoint_path(&self.model_dir, &self.model_name, episode, date);
        let model_dir = Path::new(&self.model_dir);
        if !model_dir.exists() {
            std::fs::create_dir_all(model_dir).map_err(|e| ReinforgeError::Checkpoint {
                path: path.clone(),
                source: e.into(),
            })?;
            info!("Created model directory {:?}", model_dir);
        }
        agent
            .save_params(&path)
            .map_err(|source| ReinforgeError::Checkpoint {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Train the agent.
    pub fn train<E, A>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        recorder: &mut dyn Recorder,
    ) -> Result<TrainSummary>
    where
        E: Env,
        A: Agent<E>,
    {
        let mut summary = TrainSummary {
            running_reward: self.initial_running_reward,
            ..TrainSummary::default()
        };
        agent.train();
        info!(
            "Starts training for {} episodes of at most {} steps",
            self.max_episodes,
            self.runner.max_steps()
        );

        for episode in 1..=self.max_episodes {
            let epsilon = self.epsilon.epsilon(episode);
            summary.episodes = episode;

            match self.runner.run(env, agent, episode, epsilon) {
                Ok(mut ep) => {
                    let record_agent = agent
                        .opt_with_record(&mut ep.trajectory)
                        .map_err(ReinforgeError::Agent)?;
                    let decay = self.running_reward_decay;
                    summary.running_reward =
                        decay * ep.total_reward + (1.0 - decay) * summary.running_reward;
                    summary.last_episode_reward = Some(ep.total_reward);

                    let record = Record::from_slice(&[
                        ("episode", RecordValue::Scalar(episode as f32)),
                        ("epsilon", RecordValue::Scalar(epsilon as f32)),
                        ("episode_reward", RecordValue::Scalar(ep.total_reward)),
                        ("running_reward", RecordValue::Scalar(summary.running_reward)),
                        ("episode_steps", RecordValue::Scalar(ep.steps as f32)),
                    ])
                    .merge(record_agent);
                    recorder.write(record);
                    info!(
                        "Episode {}: reward {:.4}, running reward {:.4}, steps {}, epsilon {:.3}",
                        episode, ep.total_reward, summary.running_reward, ep.steps, epsilon
                    );
                }
                Err(e) if e.is_environment_fault() => {
                    summary.failed_episodes += 1;
                    warn!("Episode {} aborted: {:#}", episode, anyhow::Error::from(e));
                }
                Err(e) => return Err(e.into()),
            }

            if self.is_checkpoint_episode(episode) {
                let now = Local::now();
                match self.save_model::<E, A>(agent, episode, now.date_naive()) {
                    Ok(path) => {
                        info!("Saved the model in {:?}", &path);
                        recorder.write(Record::from_slice(&[
                            ("episode", RecordValue::Scalar(episode as f32)),
                            (
                                "checkpoint",
                                RecordValue::String(path.to_string_lossy().into_owned()),
                            ),
                            ("datetime", RecordValue::DateTime(now)),
                        ]));
                        summary.checkpoints.push(path);
                    }
                    Err(e) => {
                        summary.failed_checkpoints += 1;
                        error!("{:#}", anyhow::Error::from(e));
                    }
                }
            }
        }

        recorder.flush();
        info!(
            "Training done: {} episodes, {} aborted, {} checkpoints",
            summary.episodes,
            summary.failed_episodes,
            summary.checkpoints.len()
        );
        Ok(summary)
    }
}
