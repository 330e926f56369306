//! rlexplain: step-by-step walk-throughs of preference and policy-gradient
//! fine-tuning algorithms (DPO, GRPO, GSPO, GFPO, PPO, CISPO).
//!
//! Each algorithm is a fixed sequence of stages over one small scenario. A
//! pure metric engine derives the numbers shown at the current stage; the
//! simulated "policy improvement" is a nudge applied from the update stage.

pub mod algorithm;
pub mod config;
pub mod engine;
pub mod example;
pub mod provider;
pub mod session;
pub mod stage;
