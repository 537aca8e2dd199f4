//! Environment step.
use super::{Act, Env, Obs};
use std::fmt::{self, Debug};

/// Additional information returned by an environment at every step.
pub trait Info {}

impl Info for () {}

/// Outcome of one environment step: `(a_t, o_t+1, r_t)` with termination flags
/// and environment-defined information.
pub struct Step<E: Env> {
    /// Action.
    pub act: Act,

    /// Observation after the action was applied.
    pub obs: Obs,

    /// Reward.
    pub reward: f32,

    /// The episode reached a terminal state, e.g. the score crossed the threshold.
    pub is_terminated: bool,

    /// The episode was cut by the environment itself.
    pub is_truncated: bool,

    /// Information defined by the environment.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: Obs,
        act: Act,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
        info: E::Info,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

impl<E> Debug for Step<E>
where
    E: Env,
    E::Info: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("act", &self.act)
            .field("obs", &self.obs)
            .field("reward", &self.reward)
            .field("is_terminated", &self.is_terminated)
            .field("is_truncated", &self.is_truncated)
            .field("info", &self.info)
            .finish()
    }
}
