//! Clipped IS-weight Policy Optimization metrics.
//!
//! An offline sample carries its behaviour-policy log-prob. The importance
//! weight is the ratio of current to behaviour probability:
//!
//!   rho = exp(log pi_theta - log pi_old)
//!
//! Before the update stage the current policy is the behaviour policy, so
//! `rho = 1`. From the update stage the current log-prob is shifted by
//! [`POLICY_SHIFT`], giving `rho = e^0.2`.
//!
//! The `clip(rho, 1-eps, 1+eps)` bound is shown as text only; no epsilon is
//! applied to the ratio.

use serde::Serialize;

use crate::example::CispoExample;
use crate::stage::{CispoStage, Gate};

use super::advantage::importance_ratio;

/// Simulated log-prob gain of the current policy after the update.
pub const POLICY_SHIFT: f64 = 0.2;

/// Static bound text shown next to the ratio.
pub const CLIP_BOUNDS: &str = "clip(ρ, 1-ε, 1+ε)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CispoPanels {
    /// Behaviour log-prob is shown (from `Sampling`).
    pub show_sampling: bool,
    /// Current log-prob and importance ratio (from `IsCalc`).
    pub show_ratio: bool,
    /// Clip bounds on the ratio (from `Clipping`).
    pub show_clipping: bool,
    pub updated: bool,
}

impl CispoPanels {
    pub fn from_gate(gate: Gate<CispoStage>) -> Self {
        Self {
            show_sampling: gate.is_at_or_past(CispoStage::Sampling),
            show_ratio: gate.is_at_or_past(CispoStage::IsCalc),
            show_clipping: gate.is_at_or_past(CispoStage::Clipping),
            updated: gate.is_at_or_past(CispoStage::Update),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CispoMetrics {
    pub behavior_log_prob: f64,
    pub current_log_prob: f64,
    pub prob_ratio: f64,
    pub clip_bounds: &'static str,
    pub panels: CispoPanels,
}

pub fn compute(example: &CispoExample, gate: Gate<CispoStage>) -> CispoMetrics {
    let behavior_log_prob = example.behavior_log_prob;
    let current_log_prob = if gate.is_at_or_past(CispoStage::Update) {
        behavior_log_prob + POLICY_SHIFT
    } else {
        behavior_log_prob
    };

    CispoMetrics {
        behavior_log_prob,
        current_log_prob,
        prob_ratio: importance_ratio(current_log_prob, behavior_log_prob),
        clip_bounds: CLIP_BOUNDS,
        panels: CispoPanels::from_gate(gate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::fallback;
    use crate::stage::Stage;

    fn with_log_prob(behavior_log_prob: f64) -> CispoExample {
        CispoExample {
            behavior_log_prob,
            ..fallback::cispo()
        }
    }

    #[test]
    fn test_ratio_is_exactly_one_before_update() {
        for lp in [-0.5, -4.9, -0.1, -123.0] {
            for stage in &CispoStage::ORDER[..CispoStage::Update.index()] {
                let m = compute(&with_log_prob(lp), Gate::at(*stage));
                assert_eq!(m.prob_ratio, 1.0, "log-prob {lp} at {stage:?}");
                assert_eq!(m.current_log_prob, lp);
            }
        }
    }

    #[test]
    fn test_ratio_after_update() {
        let expected = 0.2_f64.exp();
        for lp in [-0.5, -4.9, -0.1] {
            let m = compute(&with_log_prob(lp), Gate::at(CispoStage::Update));
            assert!((m.prob_ratio - expected).abs() < 1e-4);
            assert!((m.prob_ratio - 1.22140).abs() < 1e-4);
            assert!((m.current_log_prob - (lp + 0.2)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_clip_bounds_are_static_text() {
        let a = compute(&with_log_prob(-0.5), Gate::at(CispoStage::Clipping));
        let b = compute(&with_log_prob(-3.0), Gate::at(CispoStage::Update));
        assert_eq!(a.clip_bounds, b.clip_bounds);
        assert!(a.panels.show_clipping && !a.panels.updated);
    }
}
