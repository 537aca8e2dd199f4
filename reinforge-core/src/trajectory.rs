//! Per-episode buffers of rewards and log-probabilities.

/// Transient buffers of one in-flight episode.
///
/// `rewards[t]` is the reward received after step `t`. `log_probs[t]` is the
/// log-probability of the action taken at step `t` when that action was sampled
/// from the policy, and `None` when it was an exploration action drawn uniformly
/// at random. Both sequences are indexed by step, so a return is always paired
/// with the log-probability of the action that produced it.
#[derive(Debug)]
pub struct Trajectory<L> {
    rewards: Vec<f32>,
    log_probs: Vec<Option<L>>,
}

impl<L> Default for Trajectory<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> Trajectory<L> {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self {
            rewards: Vec::new(),
            log_probs: Vec::new(),
        }
    }

    /// Records the log-probability slot of the action taken at the current step.
    pub fn push_log_prob(&mut self, log_prob: Option<L>) {
        self.log_probs.push(log_prob);
    }

    /// Records the reward received after the current step.
    pub fn push_reward(&mut self, reward: f32) {
        self.rewards.push(reward);
    }

    /// Rewards in time order.
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Log-probability slots in time order.
    pub fn log_probs(&self) -> &[Option<L>] {
        &self.log_probs
    }

    /// Number of completed steps.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Returns `true` if no step has been recorded.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty() && self.log_probs.is_empty()
    }

    /// Number of steps whose action was sampled from the policy.
    pub fn n_sampled(&self) -> usize {
        self.log_probs.iter().filter(|lp| lp.is_some()).count()
    }

    /// Sum of rewards.
    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }

    /// Returns `true` if every step has both a reward and a log-probability slot.
    pub fn is_aligned(&self) -> bool {
        self.rewards.len() == self.log_probs.len()
    }

    /// Empties both buffers.
    pub fn clear(&mut self) {
        self.rewards.clear();
        self.log_probs.clear();
    }
}
