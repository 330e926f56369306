use tracing::debug;

use crate::algorithm::{AlgorithmKind, AnyExample};
use crate::example::{fallback, CispoExample, DpoExample, GfpoExample, GroupExample, PpoExample};

use super::error::ProviderResult;
use super::records::new_example_id;
use super::ExampleProvider;

/// Serves the built-in scenarios under fresh ids. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProvider;

impl StaticProvider {
    pub fn example(kind: AlgorithmKind) -> AnyExample {
        let id = new_example_id();
        match kind {
            AlgorithmKind::Dpo => AnyExample::Dpo(DpoExample {
                id,
                ..fallback::dpo()
            }),
            AlgorithmKind::Grpo => AnyExample::Grpo(GroupExample {
                id,
                ..fallback::grpo()
            }),
            AlgorithmKind::Gspo => AnyExample::Gspo(GroupExample {
                id,
                ..fallback::gspo()
            }),
            AlgorithmKind::Gfpo => AnyExample::Gfpo(GfpoExample {
                id,
                ..fallback::gfpo()
            }),
            AlgorithmKind::Ppo => AnyExample::Ppo(PpoExample {
                id,
                ..fallback::ppo()
            }),
            AlgorithmKind::Cispo => AnyExample::Cispo(CispoExample {
                id,
                ..fallback::cispo()
            }),
        }
    }
}

impl ExampleProvider for StaticProvider {
    async fn generate(&self, kind: AlgorithmKind) -> ProviderResult<AnyExample> {
        let example = Self::example(kind);
        debug!(algorithm = %kind, id = example.id(), "serving built-in scenario");
        Ok(example)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_every_kind_with_fresh_ids() {
        for kind in AlgorithmKind::ALL {
            let a = StaticProvider.generate(kind).await.unwrap();
            let b = StaticProvider.generate(kind).await.unwrap();
            assert_eq!(a.kind(), kind);
            assert_ne!(a.id(), b.id());
            assert_eq!(a.prompt(), b.prompt());
        }
    }
}
