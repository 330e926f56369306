//! Group statistics and importance ratios shared by the engines.
//!
//! Group-relative advantage as shown in the GRPO walk-through:
//!
//!   A_i = (R_i - mean(R)) / std(R)
//!
//! with the population standard deviation and a fallback of `std = 1` when the
//! group has no spread.

use serde::Serialize;

/// Mean, spread and per-output advantages of one scored group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub mean: f64,
    /// Population variance (divides by N).
    pub variance: f64,
    /// `sqrt(variance)`, or `1.0` when that is exactly zero.
    pub std: f64,
    pub advantages: Vec<f64>,
}

/// Compute group-relative advantages for a group of scores.
///
/// # Edge cases
///
/// - Empty input yields `mean = 0`, `variance = 0`, `std = 1` and no
///   advantages.
/// - If all scores are identical the standard deviation falls back to `1.0`,
///   so every advantage is exactly `0.0`.
pub fn group_stats(scores: &[f64]) -> GroupStats {
    if scores.is_empty() {
        return GroupStats {
            mean: 0.0,
            variance: 0.0,
            std: 1.0,
            advantages: Vec::new(),
        };
    }

    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

    let mut std = variance.sqrt();
    if std == 0.0 {
        std = 1.0;
    }

    let advantages = scores.iter().map(|s| (s - mean) / std).collect();

    GroupStats {
        mean,
        variance,
        std,
        advantages,
    }
}

/// Importance sampling ratio between the current and behaviour policies,
/// computed in log-space:
///
///   rho = exp(log pi_theta - log pi_old)
pub fn importance_ratio(current_log_prob: f64, behavior_log_prob: f64) -> f64 {
    (current_log_prob - behavior_log_prob).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_basic() {
        // Mean = 0.5, std = 0.5.
        let stats = group_stats(&[0.0, 0.0, 1.0, 1.0]);
        assert!((stats.mean - 0.5).abs() < 1e-12);
        assert!((stats.std - 0.5).abs() < 1e-12);
        assert!((stats.advantages[0] + 1.0).abs() < 1e-12);
        assert!((stats.advantages[3] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_stats_worked_example() {
        let stats = group_stats(&[10.0, 2.0, 9.0, 1.0]);
        assert!((stats.mean - 5.5).abs() < 1e-12);
        assert!((stats.variance - 16.25).abs() < 1e-12);
        assert!((stats.std - 4.0311).abs() < 1e-4);

        let expected = [1.1163, -0.8682, 0.8682, -1.1163];
        for (a, e) in stats.advantages.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "expected {e}, got {a}");
        }
        let sum: f64 = stats.advantages.iter().sum();
        assert!(sum.abs() < 1e-9);
    }

    #[test]
    fn test_stats_identical_scores_fall_back_to_unit_std() {
        let stats = group_stats(&[7.0, 7.0, 7.0, 7.0]);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.std, 1.0);
        assert!(stats.advantages.iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_stats_single_score() {
        let stats = group_stats(&[4.0]);
        assert_eq!(stats.std, 1.0);
        assert_eq!(stats.advantages, vec![0.0]);
    }

    #[test]
    fn test_stats_empty() {
        let stats = group_stats(&[]);
        assert!(stats.advantages.is_empty());
        assert_eq!(stats.std, 1.0);
    }

    #[test]
    fn test_advantages_sum_to_zero() {
        let groups: [&[f64]; 4] = [
            &[0.1, 0.4, 0.7, 0.9, 1.0, 0.0, 0.3, 0.6],
            &[3.0, 8.0],
            &[-5.0, 12.5, 0.25],
            &[1.0, 1.0, 1.0, 9.0, 2.0],
        ];
        for scores in groups {
            let sum: f64 = group_stats(scores).advantages.iter().sum();
            assert!(sum.abs() < 1e-9, "sum for {scores:?} was {sum}");
        }
    }

    #[test]
    fn test_importance_ratio_same_policy() {
        assert_eq!(importance_ratio(-2.5, -2.5), 1.0);
    }

    #[test]
    fn test_importance_ratio_higher_prob() {
        let ratio = importance_ratio(-1.0, -2.0);
        assert!((ratio - 1.0_f64.exp()).abs() < 1e-9);
    }

    #[test]
    fn test_importance_ratio_lower_prob() {
        let ratio = importance_ratio(-3.0, -2.0);
        assert!((ratio - (-1.0_f64).exp()).abs() < 1e-9);
    }
}
