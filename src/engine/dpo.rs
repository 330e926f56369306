//! Direct Preference Optimization metrics.
//!
//! Implicit rewards and the DPO loss for a single preference pair:
//!
//!   r(y)    = beta * (log pi_theta(y|x) - log pi_ref(y|x))
//!   margin  = r(y_w) - r(y_l)
//!   loss    = -ln sigmoid(margin)
//!
//! Once the walk-through reaches the weight-update stage the policy log-probs
//! are nudged (+0.5 chosen, -0.5 rejected) to show what training does.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::stage::{DpoStage, Gate};

/// Shift applied to the policy log-probs from [`DpoStage::Update`] onward.
pub const POLICY_DRIFT: f64 = 0.5;

/// Log-probabilities of the chosen and rejected responses under the frozen
/// reference model and the policy being trained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatedLogProbs {
    pub ref_chosen: f64,
    pub ref_rejected: f64,
    pub policy_chosen: f64,
    pub policy_rejected: f64,
}

impl SimulatedLogProbs {
    /// Values shown for the built-in scenario.
    pub const INITIAL: Self = Self {
        ref_chosen: -2.5,
        ref_rejected: -3.2,
        policy_chosen: -2.4,
        policy_rejected: -3.3,
    };

    /// Draw a fresh set for a new scenario:
    ///
    /// - chosen log-probs (reference and policy) from `-1.5 - U[0, 2)`
    /// - rejected log-probs (reference and policy) from `-2.5 - U[0, 3)`
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            ref_chosen: -1.5 - rng.gen_range(0.0..2.0),
            ref_rejected: -2.5 - rng.gen_range(0.0..3.0),
            policy_chosen: -1.5 - rng.gen_range(0.0..2.0),
            policy_rejected: -2.5 - rng.gen_range(0.0..3.0),
        }
    }

    /// The same log-probs after the simulated update.
    pub fn drifted(self) -> Self {
        Self {
            policy_chosen: self.policy_chosen + POLICY_DRIFT,
            policy_rejected: self.policy_rejected - POLICY_DRIFT,
            ..self
        }
    }
}

impl Default for SimulatedLogProbs {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Which DPO panels are revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DpoPanels {
    /// Reference model forward pass has run (from `ForwardRef`).
    pub reference_active: bool,
    /// Policy forward pass has run (from `ForwardPolicy`).
    pub policy_active: bool,
    /// Implicit rewards and margin are shown (from `RewardCalc`).
    pub show_rewards: bool,
    /// Sigmoid and loss are shown (from `LossCalc`).
    pub show_loss: bool,
    /// Gradient is flowing back (from `Backward`).
    pub backward: bool,
    /// Policy log-probs include the update nudge.
    pub updated: bool,
}

impl DpoPanels {
    pub fn from_gate(gate: Gate<DpoStage>) -> Self {
        Self {
            reference_active: gate.is_at_or_past(DpoStage::ForwardRef),
            policy_active: gate.is_at_or_past(DpoStage::ForwardPolicy),
            show_rewards: gate.is_at_or_past(DpoStage::RewardCalc),
            show_loss: gate.is_at_or_past(DpoStage::LossCalc),
            backward: gate.is_at_or_past(DpoStage::Backward),
            updated: gate.is_at_or_past(DpoStage::Update),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DpoMetrics {
    pub beta: f64,
    /// Log-probs actually used, i.e. after drift when updated.
    pub log_probs: SimulatedLogProbs,
    pub implicit_reward_chosen: f64,
    pub implicit_reward_rejected: f64,
    pub margin: f64,
    pub sigmoid: f64,
    pub loss: f64,
    pub panels: DpoPanels,
}

/// Derive the DPO display metrics at the gate's stage.
///
/// Never fails: extreme inputs propagate as extreme values (a hugely negative
/// margin gives `loss = +inf`).
pub fn compute(beta: f64, base: SimulatedLogProbs, gate: Gate<DpoStage>) -> DpoMetrics {
    let log_probs = if gate.is_at_or_past(DpoStage::Update) {
        base.drifted()
    } else {
        base
    };

    let implicit_reward_chosen = beta * (log_probs.policy_chosen - log_probs.ref_chosen);
    let implicit_reward_rejected = beta * (log_probs.policy_rejected - log_probs.ref_rejected);
    let margin = implicit_reward_chosen - implicit_reward_rejected;
    let sigmoid = 1.0 / (1.0 + (-margin).exp());
    let loss = -sigmoid.ln();

    DpoMetrics {
        beta,
        log_probs,
        implicit_reward_chosen,
        implicit_reward_rejected,
        margin,
        sigmoid,
        loss,
        panels: DpoPanels::from_gate(gate),
    }
}
