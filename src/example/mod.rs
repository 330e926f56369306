//! Scenario records and the fallback dataset.
//!
//! - [`types`] -- the per-algorithm example shapes.
//! - [`fallback`] -- the built-in scenarios used at start-up and offline.

pub mod fallback;
pub mod types;

pub use types::{
    CispoExample, DpoExample, ExampleRecord, GfpoExample, GfpoOutput, GroupExample, GrpoExample,
    GspoExample, PpoExample, ScoredOutput,
};
