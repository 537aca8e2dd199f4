//! Collection of one episode.
use crate::{error::ReinforgeError, Agent, Env, Obs, RangeNormalizer, Trajectory};
use log::{debug, trace};

/// A completed episode.
#[derive(Debug)]
pub struct Episode<L> {
    /// Rewards and log-probabilities of the episode, aligned by step.
    pub trajectory: Trajectory<L>,

    /// Sum of rewards.
    pub total_reward: f32,

    /// Number of environment steps taken.
    pub steps: usize,

    /// `true` if the environment signaled the end of the episode,
    /// `false` if the step budget ran out first.
    pub is_done: bool,
}

/// Drives one rollout of an agent in an environment.
#[derive(Debug, Clone)]
pub struct EpisodeRunner {
    max_steps: usize,
    normalizer: RangeNormalizer,
}

impl EpisodeRunner {
    /// Constructs a runner taking at most `max_steps` environment steps per episode.
    pub fn new(max_steps: usize, normalizer: RangeNormalizer) -> Self {
        Self {
            max_steps,
            normalizer,
        }
    }

    /// Step budget of an episode.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub(crate) fn prepare_obs<E: Env>(
        &self,
        env: &E,
        obs: Obs,
        episode: usize,
    ) -> Result<Obs, ReinforgeError> {
        if obs.len() != env.obs_dim() {
            return Err(ReinforgeError::Environment {
                episode,
                source: anyhow::anyhow!(
                    "observation has {} features, expected {}",
                    obs.len(),
                    env.obs_dim()
                ),
            });
        }
        self.normalizer
            .normalize(&obs)
            .map_err(|e| ReinforgeError::Environment {
                episode,
                source: e.into(),
            })
    }

    /// Runs one episode with exploration probability `epsilon`.
    ///
    /// Resets the environment, then alternates action selection and environment
    /// steps until the environment signals the end of the episode or
    /// `max_steps` steps were taken. Any error of the environment aborts the
    /// episode and is returned as [`ReinforgeError::Environment`]; the partial
    /// trajectory is dropped.
    pub fn run<E, A>(
        &self,
        env: &mut E,
        agent: &mut A,
        episode: usize,
        epsilon: f64,
    ) -> Result<Episode<A::LogProb>, ReinforgeError>
    where
        E: Env,
        A: Agent<E>,
    {
        let mut trajectory = Trajectory::new();
        let mut total_reward = 0f32;
        let mut steps = 0;
        let mut is_done = false;

        let obs = env
            .reset()
            .map_err(|source| ReinforgeError::Environment { episode, source })?;
        let mut obs = self.prepare_obs(env, obs, episode)?;

        for t in 1..=self.max_steps {
            let act = agent
                .select_action(&obs, epsilon, &mut trajectory)
                .map_err(ReinforgeError::Agent)?;
            let step = env
                .step(&act)
                .map_err(|source| ReinforgeError::Environment { episode, source })?;

            trajectory.push_reward(step.reward);
            total_reward += step.reward;
            steps = t;
            debug!(
                "episode {}, step {}, action {}, reward {}",
                episode,
                t,
                env.action_table().name(&act).unwrap_or("?"),
                step.reward
            );

            if step.is_done() {
                is_done = true;
                break;
            }
            obs = self.prepare_obs(env, step.obs, episode)?;
        }
        trace!("episode {} over after {} steps", episode, steps);

        Ok(Episode {
            trajectory,
            total_reward,
            steps,
            is_done,
        })
    }
}
