//! The closed set of algorithms and their type-erased wrappers.
//!
//! - [`traits::Algorithm`] -- the per-variant capability table (stages,
//!   example shape, auxiliary state, metric engine).
//! - [`variants`] -- the six marker types implementing it.
//! - [`AlgorithmKind`], [`AnyExample`], [`AnyMetrics`] -- runtime tags and
//!   enum wrappers for dispatching without `dyn`.

pub mod traits;
pub mod variants;

use serde::{Deserialize, Serialize};

use crate::engine::{CispoMetrics, DpoMetrics, GfpoMetrics, GrpoMetrics, GspoMetrics, PpoMetrics};
use crate::example::{
    CispoExample, DpoExample, ExampleRecord, GfpoExample, GrpoExample, GspoExample, PpoExample,
};
use crate::stage::{CispoStage, DpoStage, GfpoStage, GrpoStage, GspoStage, PpoStage, Stage};

pub use traits::{Algorithm, SimulationParameters};
pub use variants::{Cispo, Dpo, Gfpo, Grpo, Gspo, Ppo};

// ---------------------------------------------------------------------------
// AlgorithmKind
// ---------------------------------------------------------------------------

/// Runtime tag of an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlgorithmKind {
    Ppo,
    Dpo,
    Grpo,
    Gspo,
    Gfpo,
    Cispo,
}

impl AlgorithmKind {
    /// Every algorithm, in selector order.
    pub const ALL: [AlgorithmKind; 6] = [
        Self::Ppo,
        Self::Dpo,
        Self::Grpo,
        Self::Gspo,
        Self::Gfpo,
        Self::Cispo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ppo => "PPO",
            Self::Dpo => "DPO",
            Self::Grpo => "GRPO",
            Self::Gspo => "GSPO",
            Self::Gfpo => "GFPO",
            Self::Cispo => "CISPO",
        }
    }

    /// Parse from a string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ppo" => Some(Self::Ppo),
            "dpo" => Some(Self::Dpo),
            "grpo" => Some(Self::Grpo),
            "gspo" => Some(Self::Gspo),
            "gfpo" => Some(Self::Gfpo),
            "cispo" => Some(Self::Cispo),
            _ => None,
        }
    }

    /// Stage labels of this algorithm's walk-through.
    pub fn stage_labels(&self) -> Vec<&'static str> {
        match self {
            Self::Ppo => PpoStage::labels(),
            Self::Dpo => DpoStage::labels(),
            Self::Grpo => GrpoStage::labels(),
            Self::Gspo => GspoStage::labels(),
            Self::Gfpo => GfpoStage::labels(),
            Self::Cispo => CispoStage::labels(),
        }
    }

    /// Whether the beta control applies.
    pub fn uses_beta(&self) -> bool {
        matches!(self, Self::Dpo)
    }
}

impl std::fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AnyExample
// ---------------------------------------------------------------------------

/// An example of any algorithm, as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "algorithm", content = "example", rename_all = "UPPERCASE")]
pub enum AnyExample {
    Ppo(PpoExample),
    Dpo(DpoExample),
    Grpo(GrpoExample),
    Gspo(GspoExample),
    Gfpo(GfpoExample),
    Cispo(CispoExample),
}

impl AnyExample {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Self::Ppo(_) => AlgorithmKind::Ppo,
            Self::Dpo(_) => AlgorithmKind::Dpo,
            Self::Grpo(_) => AlgorithmKind::Grpo,
            Self::Gspo(_) => AlgorithmKind::Gspo,
            Self::Gfpo(_) => AlgorithmKind::Gfpo,
            Self::Cispo(_) => AlgorithmKind::Cispo,
        }
    }

    fn record(&self) -> &dyn ExampleRecord {
        match self {
            Self::Ppo(e) => e,
            Self::Dpo(e) => e,
            Self::Grpo(e) => e,
            Self::Gspo(e) => e,
            Self::Gfpo(e) => e,
            Self::Cispo(e) => e,
        }
    }

    pub fn id(&self) -> &str {
        self.record().id()
    }

    pub fn topic(&self) -> &str {
        self.record().topic()
    }

    pub fn prompt(&self) -> &str {
        self.record().prompt()
    }
}

// ---------------------------------------------------------------------------
// AnyMetrics
// ---------------------------------------------------------------------------

/// Derived metrics of any algorithm.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "algorithm", content = "metrics", rename_all = "UPPERCASE")]
pub enum AnyMetrics {
    Ppo(PpoMetrics),
    Dpo(DpoMetrics),
    Grpo(GrpoMetrics),
    Gspo(GspoMetrics),
    Gfpo(GfpoMetrics),
    Cispo(CispoMetrics),
}

impl AnyMetrics {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Self::Ppo(_) => AlgorithmKind::Ppo,
            Self::Dpo(_) => AlgorithmKind::Dpo,
            Self::Grpo(_) => AlgorithmKind::Grpo,
            Self::Gspo(_) => AlgorithmKind::Gspo,
            Self::Gfpo(_) => AlgorithmKind::Gfpo,
            Self::Cispo(_) => AlgorithmKind::Cispo,
        }
    }
}
