//! Range normalization of observations.
use crate::{error::ReinforgeError, Obs};
use serde::{Deserialize, Serialize};

/// Linearly rescales a vector so that its own minimum and maximum map to
/// `min_val` and `max_val`.
///
/// With `obs_min` and `obs_max` the extrema of the input,
/// `a = (max_val - min_val) / (obs_max - obs_min)`, `b = max_val - a * obs_max`
/// and the output is `obs * a + b`. A constant vector has no range to rescale
/// and maps to the midpoint of the bounds, as does a range too small for `a`
/// to be finite.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct RangeNormalizer {
    /// Lower bound of the output.
    pub min_val: f32,

    /// Upper bound of the output.
    pub max_val: f32,
}

impl Default for RangeNormalizer {
    fn default() -> Self {
        Self {
            min_val: -0.5,
            max_val: 0.5,
        }
    }
}

impl RangeNormalizer {
    /// Constructs a normalizer, `min_val` must be strictly below `max_val`.
    pub fn new(min_val: f32, max_val: f32) -> Result<Self, ReinforgeError> {
        if !(min_val.is_finite() && max_val.is_finite() && min_val < max_val) {
            return Err(ReinforgeError::Config(format!(
                "invalid normalization range ({}, {})",
                min_val, max_val
            )));
        }
        Ok(Self { min_val, max_val })
    }

    /// Rescales a slice of features.
    pub fn normalize_slice(&self, xs: &[f32]) -> Result<Vec<f32>, ReinforgeError> {
        if let Some(i) = xs.iter().position(|x| !x.is_finite()) {
            return Err(ReinforgeError::Numerical(format!(
                "observation feature {} is not finite: {}",
                i, xs[i]
            )));
        }
        let (obs_min, obs_max) = xs
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });

        let mid = 0.5 * (self.min_val + self.max_val);
        if xs.is_empty() || obs_max == obs_min {
            return Ok(vec![mid; xs.len()]);
        }

        let a = (self.max_val - self.min_val) / (obs_max - obs_min);
        let b = self.max_val - a * obs_max;
        // A subnormal range overflows the scale.
        if !(a.is_finite() && b.is_finite()) {
            return Ok(vec![mid; xs.len()]);
        }
        Ok(xs
            .iter()
            .map(|&x| (x * a + b).clamp(self.min_val, self.max_val))
            .collect())
    }

    /// Rescales an observation.
    pub fn normalize(&self, obs: &Obs) -> Result<Obs, ReinforgeError> {
        self.normalize_slice(obs.as_slice()).map(Obs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn min_max(xs: &[f32]) -> (f32, f32) {
        xs.iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            })
    }

    #[test]
    fn test_extrema_map_to_bounds() {
        let norm = RangeNormalizer::default();
        for xs in [
            vec![0.0f32, 10.0, 5.0, 2.5],
            vec![-3.0, -1.0, -2.0],
            vec![1e6, 3.0, 42.0, 7e5],
            vec![0.25, 0.75],
        ] {
            let ys = norm.normalize_slice(&xs).unwrap();
            let (lo, hi) = min_max(&ys);
            assert!((lo + 0.5).abs() < 1e-5, "{:?} -> {:?}", xs, ys);
            assert!((hi - 0.5).abs() < 1e-5, "{:?} -> {:?}", xs, ys);
        }
    }

    #[test]
    fn test_tiny_range_hits_bounds() {
        let norm = RangeNormalizer::default();
        for xs in [vec![0.0f32, 1e-7], vec![3e-6, 2e-6, 2.5e-6]] {
            let ys = norm.normalize_slice(&xs).unwrap();
            let (lo, hi) = min_max(&ys);
            assert!((lo + 0.5).abs() < 1e-5, "{:?} -> {:?}", xs, ys);
            assert!((hi - 0.5).abs() < 1e-5, "{:?} -> {:?}", xs, ys);
        }
    }

    #[test]
    fn test_subnormal_range_is_finite() {
        let norm = RangeNormalizer::default();
        let ys = norm.normalize_slice(&[0.0, f32::from_bits(1)]).unwrap();
        assert!(ys.iter().all(|y| y.is_finite()), "{:?}", ys);
    }

    #[test]
    fn test_order_is_preserved() {
        let norm = RangeNormalizer::new(0.0, 1.0).unwrap();
        let ys = norm.normalize_slice(&[2.0, 4.0, 3.0]).unwrap();
        assert!((ys[0] - 0.0).abs() < 1e-6);
        assert!((ys[1] - 1.0).abs() < 1e-6);
        assert!((ys[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_constant_vector_maps_to_midpoint() {
        let norm = RangeNormalizer::new(-1.0, 3.0).unwrap();
        let ys = norm.normalize_slice(&[7.0; 5]).unwrap();
        assert!(ys.iter().all(|y| y.is_finite() && (*y - 1.0).abs() < 1e-6));
        assert!(norm.normalize_slice(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_finite() {
        let norm = RangeNormalizer::default();
        assert!(matches!(
            norm.normalize_slice(&[0.0, f32::NAN]),
            Err(ReinforgeError::Numerical(_))
        ));
        assert!(RangeNormalizer::new(1.0, 1.0).is_err());
    }
}
