//! The fixed stage lists of each walk-through.
//!
//! Stage identity is the enum variant; its position in [`Stage::ORDER`] is the
//! only thing gating logic ever compares. Human-readable labels come from a
//! separate lookup ([`Stage::label`]) and are never used for comparisons.

use serde::{Deserialize, Serialize};

/// Common interface of every per-algorithm stage enumeration.
pub trait Stage: Copy + Eq + std::fmt::Debug + 'static {
    /// Every stage in walk-through order. Never empty.
    const ORDER: &'static [Self];

    /// Zero-based position of this stage in [`Stage::ORDER`].
    fn index(self) -> usize;

    /// Display label shown by the presentation layer.
    fn label(self) -> &'static str;

    /// The stage every walk-through starts at.
    fn first() -> Self {
        Self::ORDER[0]
    }

    /// The terminal stage.
    fn last() -> Self {
        Self::ORDER[Self::ORDER.len() - 1]
    }

    /// Labels of the whole sequence, in order.
    fn labels() -> Vec<&'static str> {
        Self::ORDER.iter().map(|s| s.label()).collect()
    }
}

/// Declares a stage enum whose variant order is its walk-through order.
macro_rules! stage_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl Stage for $name {
            const ORDER: &'static [Self] = &[$(Self::$variant),+];

            fn index(self) -> usize {
                self as usize
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

stage_enum! {
    /// DPO: preference pair through reference and policy forward passes to
    /// the simulated weight update.
    DpoStage {
        Input => "Input",
        ForwardRef => "Forward (Ref)",
        ForwardPolicy => "Forward (Policy)",
        RewardCalc => "Reward & Margin",
        LossCalc => "Loss Calculation",
        Backward => "Backward Pass",
        /// Simulated log-prob drift is applied from here on.
        Update => "Weights Update",
    }
}

stage_enum! {
    /// GRPO: sample a group, score it, normalise within the group.
    GrpoStage {
        Input => "Input",
        Sampling => "Sample Group (G)",
        Scoring => "Reward Scoring",
        Stats => "Group Stats",
        Advantage => "Advantage Calc",
        Update => "Policy Update",
    }
}

stage_enum! {
    GspoStage {
        Input => "Input",
        Sampling => "Sample Group",
        Scoring => "Reward Scoring",
        Weighting => "Softmax Weights",
        Update => "Policy Update",
    }
}

stage_enum! {
    /// GFPO: filter by correctness, then rank survivors by length.
    GfpoStage {
        Input => "Input",
        Sampling => "Sample Group",
        Filtering => "Filter (Correctness)",
        Ranking => "Rank (Length)",
        Update => "Update Policy",
    }
}

stage_enum! {
    PpoStage {
        Input => "Input",
        Rollout => "Rollout (Actor)",
        Evaluation => "Eval (Critic/Reward)",
        Advantage => "Advantage (GAE)",
        Clipping => "Clip Loss",
        Update => "Update All",
    }
}

stage_enum! {
    /// CISPO: offline samples re-weighted by a clipped importance ratio.
    CispoStage {
        Input => "Input",
        Sampling => "Offline Sampling",
        IsCalc => "IS Weight (ρ)",
        Clipping => "Clip Objective",
        Update => "Policy Update",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_match_order<S: Stage>() {
        for (i, stage) in S::ORDER.iter().enumerate() {
            assert_eq!(stage.index(), i, "{stage:?} out of place");
        }
    }

    #[test]
    fn test_stage_counts() {
        assert_eq!(DpoStage::ORDER.len(), 7);
        assert_eq!(GrpoStage::ORDER.len(), 6);
        assert_eq!(PpoStage::ORDER.len(), 6);
        assert_eq!(GspoStage::ORDER.len(), 5);
        assert_eq!(GfpoStage::ORDER.len(), 5);
        assert_eq!(CispoStage::ORDER.len(), 5);
    }

    #[test]
    fn test_index_is_position_in_order() {
        assert_indices_match_order::<DpoStage>();
        assert_indices_match_order::<GrpoStage>();
        assert_indices_match_order::<GspoStage>();
        assert_indices_match_order::<GfpoStage>();
        assert_indices_match_order::<PpoStage>();
        assert_indices_match_order::<CispoStage>();
    }

    #[test]
    fn test_first_and_last() {
        assert_eq!(DpoStage::first(), DpoStage::Input);
        assert_eq!(DpoStage::last(), DpoStage::Update);
        assert_eq!(GfpoStage::last(), GfpoStage::Update);
        assert_eq!(CispoStage::first(), CispoStage::Input);
    }

    #[test]
    fn test_labels_are_separate_from_identity() {
        assert_eq!(DpoStage::Update.label(), "Weights Update");
        assert_eq!(CispoStage::IsCalc.to_string(), "IS Weight (ρ)");
        assert_eq!(
            GfpoStage::labels(),
            vec![
                "Input",
                "Sample Group",
                "Filter (Correctness)",
                "Rank (Length)",
                "Update Policy"
            ]
        );
    }

    #[test]
    fn test_serializes_as_snake_case() {
        let json = serde_json::to_string(&DpoStage::ForwardRef).unwrap();
        assert_eq!(json, "\"forward_ref\"");
        let back: CispoStage = serde_json::from_str("\"is_calc\"").unwrap();
        assert_eq!(back, CispoStage::IsCalc);
    }
}
