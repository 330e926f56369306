//! Scenario providers.
//!
//! - [`gemini::GeminiProvider`] -- asks a generative model for a fresh
//!   scenario through a JSON response schema.
//! - [`offline::StaticProvider`] -- serves the built-in scenarios.
//! - [`records`] -- raw record parsing and validation shared by providers.
//! - [`prompt`] -- per-algorithm instructions and response schemas.

pub mod error;
pub mod gemini;
pub mod offline;
pub mod prompt;
pub mod records;

pub use error::{ProviderError, ProviderResult};
pub use gemini::GeminiProvider;
pub use offline::StaticProvider;

use crate::algorithm::{AlgorithmKind, AnyExample};

/// Source of new example scenarios.
///
/// On success the example has the shape of `kind` with every field
/// populated and validated. On failure nothing is returned.
#[allow(async_fn_in_trait)]
pub trait ExampleProvider: Send + Sync {
    async fn generate(&self, kind: AlgorithmKind) -> ProviderResult<AnyExample>;
}

// ---------------------------------------------------------------------------
// AnyProvider: enum dispatch over the concrete providers
// ---------------------------------------------------------------------------

/// Runtime provider selection without `dyn` (async trait methods are not
/// object safe).
#[derive(Debug, Clone)]
pub enum AnyProvider {
    Gemini(GeminiProvider),
    Static(StaticProvider),
}

impl ExampleProvider for AnyProvider {
    async fn generate(&self, kind: AlgorithmKind) -> ProviderResult<AnyExample> {
        match self {
            Self::Gemini(p) => p.generate(kind).await,
            Self::Static(p) => p.generate(kind).await,
        }
    }
}
