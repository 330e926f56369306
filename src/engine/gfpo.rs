//! Group Filtered Policy Optimization metrics.
//!
//! GFPO keeps only correct responses and prefers the shortest of them. The
//! walk-through shows this as a display transform over the sampled group:
//!
//! - before ranking the group is shown in sampling order, with incorrect rows
//!   dimmed once filtering starts;
//! - from ranking on, a stable sort puts correct rows first (ascending
//!   length) and incorrect rows are hidden;
//! - from the update stage, the shortest correct row is the winner.
//!
//! The example itself is never reordered or trimmed.

use std::cmp::Ordering;

use serde::Serialize;

use crate::example::{GfpoExample, GfpoOutput};
use crate::stage::{Gate, GfpoStage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GfpoRow {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
    /// Token count.
    pub length: u32,
    /// Incorrect output greyed out while filtering.
    pub dimmed: bool,
    /// Shortest correct output, marked at the update stage.
    pub winner: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GfpoPanels {
    /// Sampled outputs are listed (from `Sampling`).
    pub show_group: bool,
    /// Incorrect outputs are dimmed (from `Filtering`).
    pub filtering: bool,
    /// Correct outputs are sorted by length and incorrect ones hidden
    /// (from `Ranking`).
    pub ranking: bool,
    pub updated: bool,
}

impl GfpoPanels {
    pub fn from_gate(gate: Gate<GfpoStage>) -> Self {
        Self {
            show_group: gate.is_at_or_past(GfpoStage::Sampling),
            filtering: gate.is_at_or_past(GfpoStage::Filtering),
            ranking: gate.is_at_or_past(GfpoStage::Ranking),
            updated: gate.is_at_or_past(GfpoStage::Update),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GfpoMetrics {
    /// Every output, in display order for the current stage.
    pub ordered: Vec<GfpoRow>,
    /// What the presentation layer lists: `ordered` minus incorrect rows from
    /// ranking on.
    pub visible: Vec<GfpoRow>,
    /// Id of the shortest correct output, once the update stage is reached.
    pub winner: Option<String>,
    pub panels: GfpoPanels,
}

/// Correct before incorrect; correct by ascending length; incorrect rows
/// compare equal so the stable sort keeps their sampling order.
fn rank(a: &GfpoOutput, b: &GfpoOutput) -> Ordering {
    match (a.is_correct, b.is_correct) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => a.length.cmp(&b.length),
        (false, false) => Ordering::Equal,
    }
}

/// The outputs in display order for `gate`.
pub fn display_order(outputs: &[GfpoOutput], gate: Gate<GfpoStage>) -> Vec<&GfpoOutput> {
    let mut ordered: Vec<&GfpoOutput> = outputs.iter().collect();
    if gate.is_at_or_past(GfpoStage::Ranking) {
        ordered.sort_by(|a, b| rank(a, b));
    }
    ordered
}

pub fn compute(example: &GfpoExample, gate: Gate<GfpoStage>) -> GfpoMetrics {
    let panels = GfpoPanels::from_gate(gate);
    let ordered = display_order(&example.outputs, gate);

    let winner = ordered
        .first()
        .filter(|top| panels.updated && top.is_correct)
        .map(|top| top.id.clone());

    let ordered: Vec<GfpoRow> = ordered
        .into_iter()
        .map(|output| GfpoRow {
            id: output.id.clone(),
            text: output.text.clone(),
            is_correct: output.is_correct,
            length: output.length,
            dimmed: panels.filtering && !output.is_correct,
            winner: winner.as_deref() == Some(output.id.as_str()),
        })
        .collect();

    let visible = ordered
        .iter()
        .filter(|row| !panels.ranking || row.is_correct)
        .cloned()
        .collect();

    GfpoMetrics {
        ordered,
        visible,
        winner,
        panels,
    }
}
