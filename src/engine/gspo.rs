//! Group Sequence Policy Optimization metrics.
//!
//! The walk-through labels this step "softmax weights", but the weights are a
//! plain linear normalisation of the scores, `w_i = s_i / sum(s)`, which keeps
//! the bars readable without huge exponents. A zero score sum is treated as 1.

use serde::Serialize;

use crate::example::GroupExample;
use crate::stage::{Gate, GspoStage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GspoRow {
    pub id: String,
    pub text: String,
    pub score: f64,
    /// `score / sum(scores)`, or `score / 1` when the scores sum to zero.
    pub weight: f64,
    /// `weight * 100`, unrounded. Rounded percentages need not sum to 100.
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GspoPanels {
    pub show_group: bool,
    pub show_scores: bool,
    /// Sequence weights and percentages (from `Weighting`).
    pub show_weighting: bool,
    pub show_update: bool,
}

impl GspoPanels {
    pub fn from_gate(gate: Gate<GspoStage>) -> Self {
        Self {
            show_group: gate.is_at_or_past(GspoStage::Sampling),
            show_scores: gate.is_at_or_past(GspoStage::Scoring),
            show_weighting: gate.is_at_or_past(GspoStage::Weighting),
            show_update: gate.is_at_or_past(GspoStage::Update),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GspoMetrics {
    /// The divisor actually used.
    pub normalizer: f64,
    pub rows: Vec<GspoRow>,
    pub panels: GspoPanels,
}

/// Linear weights `s_i / sum(s)`; a zero sum divides by 1 instead.
pub fn normalized_weights(scores: &[f64]) -> (f64, Vec<f64>) {
    let sum: f64 = scores.iter().sum();
    let normalizer = if sum == 0.0 { 1.0 } else { sum };
    let weights = scores.iter().map(|s| s / normalizer).collect();
    (normalizer, weights)
}

pub fn compute(example: &GroupExample, gate: Gate<GspoStage>) -> GspoMetrics {
    let (normalizer, weights) = normalized_weights(&example.scores());

    let rows = example
        .outputs
        .iter()
        .zip(weights)
        .map(|(output, weight)| GspoRow {
            id: output.id.clone(),
            text: output.text.clone(),
            score: output.score,
            weight,
            percent: weight * 100.0,
        })
        .collect();

    GspoMetrics {
        normalizer,
        rows,
        panels: GspoPanels::from_gate(gate),
    }
}
