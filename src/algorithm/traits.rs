//! The capability table each algorithm variant provides.

use rand::Rng;
use serde::Serialize;

use crate::example::ExampleRecord;
use crate::stage::{Gate, Stage};

use super::{AlgorithmKind, AnyExample, AnyMetrics};

/// Simulation parameters entered by the user. Only `beta` is adjustable; the
/// learning rate is a display constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationParameters {
    pub beta: f64,
    pub learning_rate: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            beta: 0.1,
            learning_rate: 1e-5,
        }
    }
}

/// One algorithm's stage list, example shape, auxiliary simulated state and
/// metric engine.
///
/// Implemented by zero-sized marker types in [`super::variants`]; the generic
/// [`crate::session::Session`] is written once against this trait.
pub trait Algorithm: 'static {
    const KIND: AlgorithmKind;

    type Stage: Stage;
    type Example: ExampleRecord + Clone + std::fmt::Debug;
    /// Simulated state that lives next to the example (DPO log-probs).
    type Aux: Clone + std::fmt::Debug;
    type Metrics: Clone + std::fmt::Debug + Serialize;

    /// The built-in scenario loaded at start-up.
    fn fallback_example() -> Self::Example;

    /// Auxiliary state paired with the fallback example.
    fn initial_aux() -> Self::Aux;

    /// Auxiliary state for a freshly fetched example.
    fn fresh_aux<R: Rng + ?Sized>(rng: &mut R) -> Self::Aux;

    /// Derive display metrics. Pure and total.
    fn derive(
        example: &Self::Example,
        aux: &Self::Aux,
        params: &SimulationParameters,
        gate: Gate<Self::Stage>,
    ) -> Self::Metrics;

    /// Take this variant's example out of an [`AnyExample`], handing it back
    /// unchanged when it belongs to another algorithm.
    fn from_any(example: AnyExample) -> Result<Self::Example, AnyExample>;

    fn wrap_metrics(metrics: Self::Metrics) -> AnyMetrics;
}
