//! Exploration rule of the REINFORCE agent.
//!
//! With probability `epsilon` the action is drawn uniformly at random;
//! otherwise it is sampled from the categorical distribution of the policy.
use rand::{distributions::WeightedIndex, Rng};

/// Returns `true` if the next action should be an exploration action.
///
/// `epsilon == 0` never explores and `epsilon == 1` always does.
pub fn explores(epsilon: f64, rng: &mut impl Rng) -> bool {
    rng.gen::<f64>() < epsilon
}

/// Draws an action index uniformly from `0..n_actions`.
pub fn uniform(n_actions: usize, rng: &mut impl Rng) -> usize {
    rng.gen_range(0..n_actions)
}

/// Samples an index from the categorical distribution `probs`.
///
/// Returns `None` if `probs` is not a valid distribution (empty, all zero, or
/// containing negative or non-finite entries).
pub fn sample_categorical(probs: &[f32], rng: &mut impl Rng) -> Option<usize> {
    if probs.iter().any(|p| !p.is_finite()) {
        return None;
    }
    WeightedIndex::new(probs).ok().map(|dist| rng.sample(dist))
}
