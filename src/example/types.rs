//! Scenario records, one shape per algorithm.
//!
//! Field names serialise in camelCase so records read the same as the JSON the
//! scenario provider produces.

use serde::{Deserialize, Serialize};

/// Accessors shared by every scenario record.
pub trait ExampleRecord {
    fn id(&self) -> &str;
    fn topic(&self) -> &str;
    fn prompt(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty),+) => {
        $(
            impl ExampleRecord for $ty {
                fn id(&self) -> &str {
                    &self.id
                }
                fn topic(&self) -> &str {
                    &self.topic
                }
                fn prompt(&self) -> &str {
                    &self.prompt
                }
            }
        )+
    };
}

// ---------------------------------------------------------------------------
// DPO
// ---------------------------------------------------------------------------

/// A preference pair. The texts are display-only; DPO metrics are driven by
/// the simulated log-probs, not by the text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DpoExample {
    pub id: String,
    pub topic: String,
    pub prompt: String,
    /// The preferred response (y_w).
    pub chosen: String,
    /// The dispreferred response (y_l).
    pub rejected: String,
}

// ---------------------------------------------------------------------------
// Scored groups (GRPO, GSPO)
// ---------------------------------------------------------------------------

/// One sampled output with a scalar reward-model score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredOutput {
    pub id: String,
    pub text: String,
    /// Typically an integer in 1..=10, but any real number is accepted.
    pub score: f64,
}

/// A prompt with a group of scored outputs sampled for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupExample {
    pub id: String,
    pub topic: String,
    pub prompt: String,
    pub outputs: Vec<ScoredOutput>,
}

impl GroupExample {
    pub fn scores(&self) -> Vec<f64> {
        self.outputs.iter().map(|o| o.score).collect()
    }
}

pub type GrpoExample = GroupExample;
pub type GspoExample = GroupExample;

// ---------------------------------------------------------------------------
// GFPO
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GfpoOutput {
    /// Positional id, `gfpo-<index>` for generated examples.
    pub id: String,
    pub text: String,
    /// Whether the answer is right; incorrect outputs are filtered out.
    pub is_correct: bool,
    /// Token count of the response.
    pub length: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GfpoExample {
    pub id: String,
    pub topic: String,
    pub prompt: String,
    pub outputs: Vec<GfpoOutput>,
}

// ---------------------------------------------------------------------------
// PPO
// ---------------------------------------------------------------------------

/// A single rollout with the reward model's score and the critic's estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpoExample {
    pub id: String,
    pub topic: String,
    pub prompt: String,
    pub response: String,
    /// Reward model score R.
    pub initial_reward: f64,
    /// Critic value estimate V(s) made before seeing the response.
    pub initial_value: f64,
}

// ---------------------------------------------------------------------------
// CISPO
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CispoExample {
    pub id: String,
    /// Short subject label, e.g. "General".
    pub topic: String,
    pub prompt: String,
    /// The sampled response the ratio is computed for.
    pub response: String,
    /// log pi_old(response | prompt); a log-probability, so never positive.
    pub behavior_log_prob: f64,
}

impl_record!(DpoExample, GroupExample, GfpoExample, PpoExample, CispoExample);
