//! Exploration probability as a function of the episode index.
use serde::{Deserialize, Serialize};

/// Linear decay of the exploration probability with a floor.
///
/// `epsilon(e) = max(eps_final, eps_start - e / decay_episodes)`. The value is
/// recomputed from the episode index and never stored, so it is monotonically
/// non-increasing and stays at `eps_final` once it gets there.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct EpsilonSchedule {
    /// Exploration probability at episode 0.
    pub eps_start: f64,

    /// Floor of the exploration probability.
    pub eps_final: f64,

    /// Decay horizon in episodes.
    pub decay_episodes: usize,
}

impl Default for EpsilonSchedule {
    fn default() -> Self {
        Self {
            eps_start: 1.0,
            eps_final: 0.4,
            decay_episodes: 1000,
        }
    }
}

impl EpsilonSchedule {
    /// Schedule that never explores at random.
    pub fn greedy() -> Self {
        Self {
            eps_start: 0.0,
            eps_final: 0.0,
            decay_episodes: 1,
        }
    }

    /// Sets the exploration probability at episode 0.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Sets the floor of the exploration probability.
    pub fn eps_final(mut self, v: f64) -> Self {
        self.eps_final = v;
        self
    }

    /// Sets the decay horizon in episodes.
    pub fn decay_episodes(mut self, v: usize) -> Self {
        self.decay_episodes = v;
        self
    }

    /// Exploration probability of the given episode.
    pub fn epsilon(&self, episode: usize) -> f64 {
        let decayed = if self.decay_episodes == 0 {
            self.eps_final
        } else {
            self.eps_start - episode as f64 / self.decay_episodes as f64
        };
        decayed.max(self.eps_final).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_schedule() {
        let s = EpsilonSchedule::default();
        assert_eq!(s.epsilon(0), 1.0);
        assert!((s.epsilon(100) - 0.9).abs() < 1e-12);
        assert_eq!(s.epsilon(1000), 0.4);
        for e in [600, 1000, 1001, 5000, 30000, usize::MAX / 2] {
            assert_eq!(s.epsilon(e), 0.4, "episode {}", e);
        }
    }

    #[test]
    fn test_monotonic_non_increasing() {
        let s = EpsilonSchedule::default();
        let mut prev = s.epsilon(0);
        for e in 1..=1000 {
            let eps = s.epsilon(e);
            assert!(eps <= prev, "epsilon increased at episode {}", e);
            prev = eps;
        }
    }

    #[test]
    fn test_greedy_and_zero_horizon() {
        assert_eq!(EpsilonSchedule::greedy().epsilon(0), 0.0);
        let s = EpsilonSchedule::default().decay_episodes(0);
        assert_eq!(s.epsilon(0), 0.4);
    }
}
