//! Stage identities and the per-algorithm step-state machine.
//!
//! This module provides:
//! - [`kinds`] -- the six closed stage enumerations (one per algorithm) and
//!   their display labels, kept apart from stage identity.
//! - [`sequencer::Sequencer`] -- the cursor over an algorithm's ordered stage
//!   list, with saturating `advance` and `reset`.
//! - [`sequencer::Gate`] -- the single `is_at_or_past` primitive every reveal
//!   flag and every metric branch is derived from.

pub mod kinds;
pub mod sequencer;

pub use kinds::{CispoStage, DpoStage, GfpoStage, GrpoStage, GspoStage, PpoStage, Stage};
pub use sequencer::{Gate, Sequencer};
