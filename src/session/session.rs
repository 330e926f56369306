//! One algorithm's example, auxiliary state and stage cursor.

use serde::Serialize;

use crate::algorithm::{Algorithm, AlgorithmKind, AnyMetrics, SimulationParameters};
use crate::example::ExampleRecord;
use crate::stage::{Gate, Sequencer, Stage};

/// Serializable read model of a session at its current stage.
///
/// The algorithm tag is carried by the flattened metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub stage_index: usize,
    pub stage: &'static str,
    pub stage_count: usize,
    pub terminal: bool,
    pub example_id: String,
    pub topic: String,
    pub prompt: String,
    pub params: SimulationParameters,
    #[serde(flatten)]
    pub metrics: AnyMetrics,
}

impl Snapshot {
    pub fn algorithm(&self) -> AlgorithmKind {
        self.metrics.kind()
    }
}

/// The state bundle of a single algorithm, written once for every variant.
#[derive(Debug)]
pub struct Session<A: Algorithm> {
    example: A::Example,
    aux: A::Aux,
    sequencer: Sequencer<A::Stage>,
}

impl<A: Algorithm> Session<A> {
    /// A session over the built-in scenario, at the first stage.
    pub fn new() -> Self {
        Self {
            example: A::fallback_example(),
            aux: A::initial_aux(),
            sequencer: Sequencer::new(),
        }
    }

    pub fn example(&self) -> &A::Example {
        &self.example
    }

    pub fn aux(&self) -> &A::Aux {
        &self.aux
    }

    pub fn stage(&self) -> A::Stage {
        self.sequencer.current()
    }

    pub fn gate(&self) -> Gate<A::Stage> {
        self.sequencer.gate()
    }

    /// Step forward. `false` when already terminal.
    pub fn advance(&mut self) -> bool {
        self.sequencer.advance()
    }

    pub fn reset(&mut self) {
        self.sequencer.reset();
    }

    /// Swap in a new example and rewind to the first stage.
    pub fn replace(&mut self, example: A::Example, aux: A::Aux) {
        self.example = example;
        self.aux = aux;
        self.sequencer.reset();
    }

    pub fn metrics(&self, params: &SimulationParameters) -> A::Metrics {
        A::derive(&self.example, &self.aux, params, self.gate())
    }

    pub fn snapshot(&self, params: &SimulationParameters) -> Snapshot {
        Snapshot {
            stage_index: self.sequencer.position(),
            stage: self.stage().label(),
            stage_count: self.sequencer.len(),
            terminal: self.sequencer.is_terminal(),
            example_id: self.example.id().to_string(),
            topic: self.example.topic().to_string(),
            prompt: self.example.prompt().to_string(),
            params: *params,
            metrics: A::wrap_metrics(self.metrics(params)),
        }
    }
}

impl<A: Algorithm> Default for Session<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{Cispo, Gfpo, Grpo};
    use crate::engine::UpdateDirection;
    use crate::example::fallback;
    use crate::stage::{GfpoStage, GrpoStage};

    #[test]
    fn test_starts_on_fallback_at_first_stage() {
        let s: Session<Grpo> = Session::new();
        assert_eq!(s.stage(), GrpoStage::Input);
        assert_eq!(s.example().id, "grpo-1");
    }

    #[test]
    fn test_metrics_follow_the_cursor() {
        let mut s: Session<Grpo> = Session::new();
        let params = SimulationParameters::default();
        assert!(s.metrics(&params).rows[0].direction.is_none());
        while s.advance() {}
        let m = s.metrics(&params);
        assert_eq!(m.rows[0].direction, Some(UpdateDirection::Reinforce));
        assert_eq!(m.rows[1].direction, Some(UpdateDirection::Suppress));
    }

    #[test]
    fn test_replace_rewinds() {
        let mut s: Session<Gfpo> = Session::new();
        s.advance();
        s.advance();
        assert_eq!(s.stage(), GfpoStage::Filtering);

        let mut next = fallback::gfpo();
        next.id = "other".into();
        s.replace(next, ());
        assert_eq!(s.stage(), GfpoStage::Input);
        assert_eq!(s.example().id, "other");
    }

    #[test]
    fn test_snapshot_reports_position() {
        let mut s: Session<Cispo> = Session::new();
        while s.advance() {}
        let snap = s.snapshot(&SimulationParameters::default());
        assert_eq!(snap.algorithm(), AlgorithmKind::Cispo);
        assert_eq!(snap.stage_index, 4);
        assert_eq!(snap.stage_count, 5);
        assert_eq!(snap.stage, "Policy Update");
        assert!(snap.terminal);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["algorithm"], "CISPO");
        assert!(json["metrics"]["prob_ratio"].as_f64().unwrap() > 1.2);
    }
}
