//! Session state and orchestration.
//!
//! - [`session::Session`] -- generic (example, auxiliary state, cursor)
//!   bundle for one algorithm.
//! - [`orchestrator::Orchestrator`] -- owns one session per algorithm and
//!   applies user actions to the active one.

#[allow(clippy::module_inception)]
pub mod session;
pub mod orchestrator;

pub use orchestrator::{BetaBounds, FetchOutcome, Orchestrator};
pub use session::{Session, Snapshot};
