//! Marker types binding each algorithm to its stages, example and engine.

use rand::Rng;

use crate::engine::{self, SimulatedLogProbs};
use crate::example::{
    fallback, CispoExample, DpoExample, GfpoExample, GrpoExample, GspoExample, PpoExample,
};
use crate::stage::{CispoStage, DpoStage, Gate, GfpoStage, GrpoStage, GspoStage, PpoStage};

use super::traits::{Algorithm, SimulationParameters};
use super::{AlgorithmKind, AnyExample, AnyMetrics};

#[derive(Debug, Clone, Copy)]
pub struct Dpo;

#[derive(Debug, Clone, Copy)]
pub struct Grpo;

#[derive(Debug, Clone, Copy)]
pub struct Gspo;

#[derive(Debug, Clone, Copy)]
pub struct Gfpo;

#[derive(Debug, Clone, Copy)]
pub struct Ppo;

#[derive(Debug, Clone, Copy)]
pub struct Cispo;

impl Algorithm for Dpo {
    const KIND: AlgorithmKind = AlgorithmKind::Dpo;
    type Stage = DpoStage;
    type Example = DpoExample;
    type Aux = SimulatedLogProbs;
    type Metrics = engine::DpoMetrics;

    fn fallback_example() -> DpoExample {
        fallback::dpo()
    }

    fn initial_aux() -> SimulatedLogProbs {
        SimulatedLogProbs::INITIAL
    }

    fn fresh_aux<R: Rng + ?Sized>(rng: &mut R) -> SimulatedLogProbs {
        SimulatedLogProbs::sample(rng)
    }

    fn derive(
        _example: &DpoExample,
        aux: &SimulatedLogProbs,
        params: &SimulationParameters,
        gate: Gate<DpoStage>,
    ) -> engine::DpoMetrics {
        engine::dpo::compute(params.beta, *aux, gate)
    }

    fn from_any(example: AnyExample) -> Result<DpoExample, AnyExample> {
        match example {
            AnyExample::Dpo(e) => Ok(e),
            other => Err(other),
        }
    }

    fn wrap_metrics(metrics: engine::DpoMetrics) -> AnyMetrics {
        AnyMetrics::Dpo(metrics)
    }
}

/// Implements [`Algorithm`] for a variant with no auxiliary state whose engine
/// only needs the example and the gate.
macro_rules! stateless_algorithm {
    ($marker:ty, $kind:ident, $stage:ty, $example:ty, $metrics:ty, $fallback:path, $engine:path) => {
        impl Algorithm for $marker {
            const KIND: AlgorithmKind = AlgorithmKind::$kind;
            type Stage = $stage;
            type Example = $example;
            type Aux = ();
            type Metrics = $metrics;

            fn fallback_example() -> $example {
                $fallback()
            }

            fn initial_aux() {}

            fn fresh_aux<R: Rng + ?Sized>(_rng: &mut R) {}

            fn derive(
                example: &$example,
                _aux: &(),
                _params: &SimulationParameters,
                gate: Gate<$stage>,
            ) -> $metrics {
                $engine(example, gate)
            }

            fn from_any(example: AnyExample) -> Result<$example, AnyExample> {
                match example {
                    AnyExample::$kind(e) => Ok(e),
                    other => Err(other),
                }
            }

            fn wrap_metrics(metrics: $metrics) -> AnyMetrics {
                AnyMetrics::$kind(metrics)
            }
        }
    };
}

stateless_algorithm!(
    Grpo,
    Grpo,
    GrpoStage,
    GrpoExample,
    engine::GrpoMetrics,
    fallback::grpo,
    engine::grpo::compute
);
stateless_algorithm!(
    Gspo,
    Gspo,
    GspoStage,
    GspoExample,
    engine::GspoMetrics,
    fallback::gspo,
    engine::gspo::compute
);
stateless_algorithm!(
    Gfpo,
    Gfpo,
    GfpoStage,
    GfpoExample,
    engine::GfpoMetrics,
    fallback::gfpo,
    engine::gfpo::compute
);
stateless_algorithm!(
    Ppo,
    Ppo,
    PpoStage,
    PpoExample,
    engine::PpoMetrics,
    fallback::ppo,
    engine::ppo::compute
);
stateless_algorithm!(
    Cispo,
    Cispo,
    CispoStage,
    CispoExample,
    engine::CispoMetrics,
    fallback::cispo,
    engine::cispo::compute
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;

    #[test]
    fn test_from_any_routes_by_variant() {
        let any = AnyExample::Grpo(fallback::grpo());
        assert!(Gspo::from_any(any.clone()).is_err());
        assert_eq!(Grpo::from_any(any).unwrap(), fallback::grpo());
    }

    #[test]
    fn test_dpo_derive_uses_beta() {
        let params = SimulationParameters {
            beta: 1.0,
            ..Default::default()
        };
        let m = Dpo::derive(
            &Dpo::fallback_example(),
            &Dpo::initial_aux(),
            &params,
            Gate::at(DpoStage::first()),
        );
        assert!((m.margin - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_metrics_tags_kind() {
        let m = Ppo::derive(
            &Ppo::fallback_example(),
            &(),
            &SimulationParameters::default(),
            Gate::at(PpoStage::last()),
        );
        assert_eq!(Ppo::wrap_metrics(m).kind(), AlgorithmKind::Ppo);
    }
}
