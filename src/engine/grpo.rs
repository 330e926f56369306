//! Group Relative Policy Optimization metrics.
//!
//! Every output in the group is judged against its siblings: the advantage is
//! the score's z-score within the group (see [`group_stats`]). From the update
//! stage on, each output is labelled reinforce (advantage >= 0) or suppress.

use serde::Serialize;

use crate::example::GroupExample;
use crate::stage::{Gate, GrpoStage};

use super::advantage::{group_stats, GroupStats};

/// What the simulated update does to an output's probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateDirection {
    Reinforce,
    Suppress,
}

impl UpdateDirection {
    /// Zero advantage counts as reinforce.
    pub fn from_advantage(advantage: f64) -> Self {
        if advantage >= 0.0 {
            Self::Reinforce
        } else {
            Self::Suppress
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrpoRow {
    /// Output id, e.g. `gen-0`.
    pub id: String,
    pub text: String,
    /// Raw reward-model score.
    pub score: f64,
    /// `(score - mean) / std` over the group.
    pub advantage: f64,
    /// Only present once the update stage is reached.
    pub direction: Option<UpdateDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrpoPanels {
    /// Sampled outputs are listed (from `Sampling`).
    pub show_group: bool,
    /// Scores are shown next to each output (from `Scoring`).
    pub show_scores: bool,
    /// Group mean, variance and std (from `Stats`).
    pub show_stats: bool,
    /// Per-output advantages (from `Advantage`).
    pub show_advantage: bool,
    /// Reinforce or suppress each output (at `Update`).
    pub show_update: bool,
}

impl GrpoPanels {
    pub fn from_gate(gate: Gate<GrpoStage>) -> Self {
        Self {
            show_group: gate.is_at_or_past(GrpoStage::Sampling),
            show_scores: gate.is_at_or_past(GrpoStage::Scoring),
            show_stats: gate.is_at_or_past(GrpoStage::Stats),
            show_advantage: gate.is_at_or_past(GrpoStage::Advantage),
            show_update: gate.is_at_or_past(GrpoStage::Update),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrpoMetrics {
    pub mean: f64,
    pub variance: f64,
    pub std: f64,
    pub rows: Vec<GrpoRow>,
    pub panels: GrpoPanels,
}

pub fn compute(example: &GroupExample, gate: Gate<GrpoStage>) -> GrpoMetrics {
    let GroupStats {
        mean,
        variance,
        std,
        advantages,
    } = group_stats(&example.scores());
    let panels = GrpoPanels::from_gate(gate);

    let rows = example
        .outputs
        .iter()
        .zip(advantages)
        .map(|(output, advantage)| GrpoRow {
            id: output.id.clone(),
            text: output.text.clone(),
            score: output.score,
            advantage,
            direction: panels
                .show_update
                .then(|| UpdateDirection::from_advantage(advantage)),
        })
        .collect();

    GrpoMetrics {
        mean,
        variance,
        std,
        rows,
        panels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example::{fallback, ScoredOutput};

    fn group(scores: &[f64]) -> GroupExample {
        GroupExample {
            id: "test".into(),
            topic: "test".into(),
            prompt: "test".into(),
            outputs: scores
                .iter()
                .enumerate()
                .map(|(i, &score)| ScoredOutput {
                    id: format!("o{i}"),
                    text: format!("output {i}"),
                    score,
                })
                .collect(),
        }
    }

    #[test]
    fn test_fallback_group() {
        let m = compute(&fallback::grpo(), Gate::at(GrpoStage::Advantage));
        assert!((m.mean - 5.5).abs() < 1e-12);
        assert!((m.variance - 16.25).abs() < 1e-12);
        assert!((m.std - 4.0311).abs() < 1e-4);

        let advs: Vec<f64> = m.rows.iter().map(|r| r.advantage).collect();
        let expected = [1.1163, -0.8682, 0.8682, -1.1163];
        for (a, e) in advs.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3);
        }
        assert!(advs.iter().sum::<f64>().abs() < 1e-9);
    }

    #[test]
    fn test_direction_hidden_before_update() {
        let m = compute(&fallback::grpo(), Gate::at(GrpoStage::Advantage));
        assert!(m.rows.iter().all(|r| r.direction.is_none()));
        assert!(!m.panels.show_update);
    }

    #[test]
    fn test_direction_at_update() {
        let m = compute(&fallback::grpo(), Gate::at(GrpoStage::Update));
        let dirs: Vec<_> = m.rows.iter().map(|r| r.direction).collect();
        assert_eq!(
            dirs,
            vec![
                Some(UpdateDirection::Reinforce),
                Some(UpdateDirection::Suppress),
                Some(UpdateDirection::Reinforce),
                Some(UpdateDirection::Suppress),
            ]
        );
    }

    #[test]
    fn test_zero_advantage_reinforces() {
        assert_eq!(UpdateDirection::from_advantage(0.0), UpdateDirection::Reinforce);
        assert_eq!(UpdateDirection::from_advantage(-0.0), UpdateDirection::Reinforce);
        assert_eq!(UpdateDirection::from_advantage(-1e-12), UpdateDirection::Suppress);

        // The median output of an odd, symmetric group sits exactly on the mean.
        let m = compute(&group(&[1.0, 5.0, 9.0]), Gate::at(GrpoStage::Update));
        assert_eq!(m.rows[1].advantage, 0.0);
        assert_eq!(m.rows[1].direction, Some(UpdateDirection::Reinforce));
    }

    #[test]
    fn test_equal_scores_use_unit_std() {
        let m = compute(&group(&[6.0, 6.0, 6.0, 6.0]), Gate::at(GrpoStage::Update));
        assert_eq!(m.std, 1.0);
        assert!(m.rows.iter().all(|r| r.advantage == 0.0));
        assert!(m
            .rows
            .iter()
            .all(|r| r.direction == Some(UpdateDirection::Reinforce)));
    }

    #[test]
    fn test_panels_progress() {
        let p = GrpoPanels::from_gate(Gate::at(GrpoStage::Input));
        assert!(!p.show_group);
        let p = GrpoPanels::from_gate(Gate::at(GrpoStage::Stats));
        assert!(p.show_group && p.show_scores && p.show_stats);
        assert!(!p.show_advantage);
    }
}
