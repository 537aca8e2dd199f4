//! Discounted returns and their normalization.

/// Added to the standard deviation before dividing in [`normalize_returns`].
pub const RETURN_NORM_EPS: f32 = f32::EPSILON;

/// Discounted returns `R_t = r_t + gamma * R_{t+1}` with `R_{T+1} = 0`, in time order.
pub fn discounted_returns(rewards: &[f32], gamma: f64) -> Vec<f32> {
    let mut returns = vec![0f32; rewards.len()];
    let mut acc = 0f64;
    for (t, r) in rewards.iter().enumerate().rev() {
        acc = *r as f64 + gamma * acc;
        returns[t] = acc as f32;
    }
    returns
}

/// Shifts and scales returns to zero mean and unit (sample) standard deviation.
///
/// `eps` is added to the standard deviation before dividing, so a constant
/// sequence maps to zeros instead of non-finite values. A single return has
/// no spread and also maps to zero.
pub fn normalize_returns(returns: &[f32], eps: f32) -> Vec<f32> {
    let n = returns.len();
    if n == 0 {
        return vec![];
    }
    let mean = returns.iter().map(|&r| r as f64).sum::<f64>() / n as f64;
    let std = if n > 1 {
        let var = returns
            .iter()
            .map(|&r| (r as f64 - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };
    let denom = std + eps as f64;
    returns
        .iter()
        .map(|&r| ((r as f64 - mean) / denom) as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(xs: &[f32], ys: &[f32]) {
        assert_eq!(xs.len(), ys.len());
        for (x, y) in xs.iter().zip(ys) {
            assert!((x - y).abs() < 1e-6, "{:?} != {:?}", xs, ys);
        }
    }

    #[test]
    fn test_discounted_returns() {
        assert_close(&discounted_returns(&[1.0, 1.0, 1.0], 1.0), &[3.0, 2.0, 1.0]);
        assert_close(&discounted_returns(&[1.0, 1.0, 1.0], 0.5), &[1.75, 1.5, 1.0]);
        assert_close(&discounted_returns(&[0.0, 0.0, 10.0], 0.9), &[8.1, 9.0, 10.0]);
        assert!(discounted_returns(&[], 0.99).is_empty());
    }

    #[test]
    fn test_normalized_moments() {
        for rs in [
            vec![3.0f32, 2.0, 1.0],
            vec![1.75, 1.5],
            vec![0.0, 0.0, 0.0, 100.0, -3.0, 7.5],
        ] {
            let ns = normalize_returns(&rs, RETURN_NORM_EPS);
            let n = ns.len() as f32;
            let mean = ns.iter().sum::<f32>() / n;
            let std = (ns.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / (n - 1.0)).sqrt();
            assert!(mean.abs() < 1e-5, "mean {} for {:?}", mean, rs);
            assert!((std - 1.0).abs() < 1e-4, "std {} for {:?}", std, rs);
        }
    }

    #[test]
    fn test_degenerate_inputs_stay_finite() {
        assert_eq!(normalize_returns(&[5.0, 5.0, 5.0], RETURN_NORM_EPS), vec![0.0; 3]);
        assert_eq!(normalize_returns(&[2.0], RETURN_NORM_EPS), vec![0.0]);
        assert!(normalize_returns(&[], RETURN_NORM_EPS).is_empty());
    }
}
