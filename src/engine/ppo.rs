//! Proximal Policy Optimization metrics.
//!
//! A one-step advantage, `A = R - V`: how much better the rollout scored than
//! the critic predicted.
//!
//! The clipping bar revealed at the clip-loss stage is an animation cue with
//! fixed widths ([`CLIP_BAR_CUE`]). It is not derived from any probability
//! ratio and must not be read as one.

use serde::Serialize;

use crate::example::PpoExample;
use crate::stage::{Gate, PpoStage};

/// Narrative attached to the sign of the advantage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    BetterThanExpected,
    WorseThanExpected,
}

impl Outlook {
    /// Strictly positive advantages are "better than expected".
    pub fn from_advantage(advantage: f64) -> Self {
        if advantage > 0.0 {
            Self::BetterThanExpected
        } else {
            Self::WorseThanExpected
        }
    }

    pub fn narrative(self) -> &'static str {
        match self {
            Self::BetterThanExpected => {
                "The response was better than expected! We should encourage this."
            }
            Self::WorseThanExpected => {
                "The response was worse than expected. We should discourage this."
            }
        }
    }
}

/// Start and end widths (fractions of the track) of the clip-bar animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipBarCue {
    pub from_width: f64,
    pub to_width: f64,
}

/// Static decoration, identical for every example.
pub const CLIP_BAR_CUE: ClipBarCue = ClipBarCue {
    from_width: 0.5,
    to_width: 0.8,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PpoPanels {
    /// Response has been generated (from `Rollout`).
    pub rollout: bool,
    /// Reward and value estimates are shown (from `Evaluation`).
    pub evaluation: bool,
    /// `A = R - V` and its outlook (from `Advantage`).
    pub advantage: bool,
    /// Clip range is shown (from `Clipping`).
    pub clipping: bool,
    /// Update nudge applied to reward and value.
    pub updated: bool,
}

impl PpoPanels {
    pub fn from_gate(gate: Gate<PpoStage>) -> Self {
        Self {
            rollout: gate.is_at_or_past(PpoStage::Rollout),
            evaluation: gate.is_at_or_past(PpoStage::Evaluation),
            advantage: gate.is_at_or_past(PpoStage::Advantage),
            clipping: gate.is_at_or_past(PpoStage::Clipping),
            updated: gate.is_at_or_past(PpoStage::Update),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PpoMetrics {
    pub reward: f64,
    pub value: f64,
    pub advantage: f64,
    pub outlook: Outlook,
    /// Present from the clip-loss stage on.
    pub clip_bar: Option<ClipBarCue>,
    pub panels: PpoPanels,
}

pub fn compute(example: &PpoExample, gate: Gate<PpoStage>) -> PpoMetrics {
    let advantage = example.initial_reward - example.initial_value;
    let panels = PpoPanels::from_gate(gate);

    PpoMetrics {
        reward: example.initial_reward,
        value: example.initial_value,
        advantage,
        outlook: Outlook::from_advantage(advantage),
        clip_bar: panels.clipping.then_some(CLIP_BAR_CUE),
        panels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::fallback;

    fn with_scores(reward: f64, value: f64) -> PpoExample {
        PpoExample {
            initial_reward: reward,
            initial_value: value,
            ..fallback::ppo()
        }
    }

    #[test]
    fn test_fallback_advantage() {
        let m = compute(&fallback::ppo(), Gate::at(PpoStage::Advantage));
        assert!((m.advantage - 1.7).abs() < 1e-9);
        assert_eq!(m.outlook, Outlook::BetterThanExpected);
        assert!(m.clip_bar.is_none());
    }

    #[test]
    fn test_negative_and_zero_advantage() {
        let m = compute(&with_scores(3.0, 7.5), Gate::at(PpoStage::Advantage));
        assert!((m.advantage + 4.5).abs() < 1e-12);
        assert_eq!(m.outlook, Outlook::WorseThanExpected);

        let m = compute(&with_scores(5.0, 5.0), Gate::at(PpoStage::Advantage));
        assert_eq!(m.outlook, Outlook::WorseThanExpected);
    }

    #[test]
    fn test_clip_bar_is_static() {
        let a = compute(&with_scores(9.0, 1.0), Gate::at(PpoStage::Clipping));
        let b = compute(&with_scores(1.0, 9.0), Gate::at(PpoStage::Update));
        assert_eq!(a.clip_bar, Some(CLIP_BAR_CUE));
        assert_eq!(a.clip_bar, b.clip_bar);
    }

    #[test]
    fn test_narratives() {
        assert!(Outlook::BetterThanExpected.narrative().contains("better"));
        assert!(Outlook::WorseThanExpected.narrative().contains("worse"));
    }
}
