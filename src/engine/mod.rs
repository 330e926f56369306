//! Metric engines, one per algorithm.
//!
//! Every engine is a pure function of (example, simulation parameters, gate).
//! Nothing here holds state; metrics are recomputed whenever an input changes.
//! Degenerate groups use fallback constants rather than failing, and extreme
//! log-probs propagate as infinities.

pub mod advantage;
pub mod cispo;
pub mod dpo;
pub mod gfpo;
pub mod grpo;
pub mod gspo;
pub mod ppo;

pub use advantage::{group_stats, importance_ratio, GroupStats};
pub use cispo::CispoMetrics;
pub use dpo::{DpoMetrics, SimulatedLogProbs};
pub use gfpo::GfpoMetrics;
pub use grpo::{GrpoMetrics, UpdateDirection};
pub use gspo::GspoMetrics;
pub use ppo::{Outlook, PpoMetrics};
