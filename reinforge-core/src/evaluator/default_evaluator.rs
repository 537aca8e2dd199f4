//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{record::Record, Env, EpisodeRunner, Policy};
use anyhow::{ensure, Result};
use log::info;

/// Runs a fixed number of episodes with [`Policy::sample`] and reports the
/// average total reward under the key `eval_reward`.
///
/// Observations are normalized like in training, and every episode is cut
/// after the step budget of the given [`EpisodeRunner`]. Errors of the
/// environment are returned as is.
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    runner: EpisodeRunner,
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<P: Policy<E>>(&mut self, policy: &mut P) -> Result<Record> {
        let mut r_total = 0f32;

        for episode in 1..=self.n_episodes {
            let obs = self.env.reset()?;
            let mut obs = self.runner.prepare_obs(&self.env, obs, episode)?;
            let mut r_episode = 0f32;

            for _ in 0..self.runner.max_steps() {
                let act = policy.sample(&obs)?;
                let step = self.env.step(&act)?;
                r_episode += step.reward;
                if step.is_done() {
                    break;
                }
                obs = self.runner.prepare_obs(&self.env, step.obs, episode)?;
            }
            info!("Evaluation episode {}: reward {:.4}", episode, r_episode);
            r_total += r_episode;
        }

        Ok(Record::from_scalar(
            "eval_reward",
            r_total / self.n_episodes as f32,
        ))
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a [`DefaultEvaluator`] with a new environment.
    pub fn new(
        config: &E::Config,
        seed: i64,
        n_episodes: usize,
        runner: EpisodeRunner,
    ) -> Result<Self> {
        Self::from_env(E::build(config, seed)?, n_episodes, runner)
    }

    /// Constructs a [`DefaultEvaluator`] running episodes in `env`.
    pub fn from_env(env: E, n_episodes: usize, runner: EpisodeRunner) -> Result<Self> {
        ensure!(n_episodes > 0, "the number of evaluation episodes must be positive");
        Ok(Self {
            n_episodes,
            runner,
            env,
        })
    }
}
