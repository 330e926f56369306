//! Raw scenario records as the model returns them, and their validation.
//!
//! A raw record carries no ids. [`parse_example`] deserializes the text for
//! the requested algorithm, checks every field, and assigns a fresh example
//! id plus positional output ids. Any missing field, empty string, empty
//! group or non-finite number rejects the whole record.

use serde::Deserialize;

use crate::algorithm::{AlgorithmKind, AnyExample};
use crate::example::{
    CispoExample, DpoExample, GfpoExample, GfpoOutput, GroupExample, PpoExample, ScoredOutput,
};

use super::error::{ProviderError, ProviderResult};

#[derive(Debug, Deserialize)]
struct RawDpo {
    topic: String,
    prompt: String,
    chosen: String,
    rejected: String,
}

#[derive(Debug, Deserialize)]
struct RawScored {
    text: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGfpoOutput {
    text: String,
    is_correct: bool,
    length: f64,
}

#[derive(Debug, Deserialize)]
struct RawGroup<T> {
    topic: String,
    prompt: String,
    outputs: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPpo {
    topic: String,
    prompt: String,
    response: String,
    initial_reward: f64,
    initial_value: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCispo {
    topic: String,
    prompt: String,
    response: String,
    behavior_log_prob: f64,
}

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

fn text(field: &str, value: String) -> ProviderResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::invalid(format!("`{field}` is empty")));
    }
    Ok(trimmed.to_string())
}

fn finite(field: &str, value: f64) -> ProviderResult<f64> {
    if !value.is_finite() {
        return Err(ProviderError::invalid(format!("`{field}` is not finite")));
    }
    Ok(value)
}

fn token_length(field: &str, value: f64) -> ProviderResult<u32> {
    let value = finite(field, value)?;
    if value < 0.0 || value > f64::from(u32::MAX) || value.fract() != 0.0 {
        return Err(ProviderError::invalid(format!(
            "`{field}` must be a non-negative whole token count, got {value}"
        )));
    }
    Ok(value as u32)
}

fn non_empty<T>(outputs: Vec<T>) -> ProviderResult<Vec<T>> {
    if outputs.is_empty() {
        return Err(ProviderError::invalid("`outputs` is empty"));
    }
    Ok(outputs)
}

/// A fresh identifier for a fetched example.
pub fn new_example_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn scored_group(raw: RawGroup<RawScored>, id_prefix: &str) -> ProviderResult<GroupExample> {
    let outputs = non_empty(raw.outputs)?
        .into_iter()
        .enumerate()
        .map(|(i, o)| {
            Ok(ScoredOutput {
                id: format!("{id_prefix}-{i}"),
                text: text("outputs.text", o.text)?,
                score: finite("outputs.score", o.score)?,
            })
        })
        .collect::<ProviderResult<Vec<_>>>()?;

    Ok(GroupExample {
        id: new_example_id(),
        topic: text("topic", raw.topic)?,
        prompt: text("prompt", raw.prompt)?,
        outputs,
    })
}

/// Parse and validate the model's JSON text as an example of `kind`.
pub fn parse_example(kind: AlgorithmKind, body: &str) -> ProviderResult<AnyExample> {
    let example = match kind {
        AlgorithmKind::Dpo => {
            let raw: RawDpo = serde_json::from_str(body)?;
            AnyExample::Dpo(DpoExample {
                id: new_example_id(),
                topic: text("topic", raw.topic)?,
                prompt: text("prompt", raw.prompt)?,
                chosen: text("chosen", raw.chosen)?,
                rejected: text("rejected", raw.rejected)?,
            })
        }
        AlgorithmKind::Grpo => AnyExample::Grpo(scored_group(serde_json::from_str(body)?, "gen")?),
        AlgorithmKind::Gspo => AnyExample::Gspo(scored_group(serde_json::from_str(body)?, "gspo")?),
        AlgorithmKind::Gfpo => {
            let raw: RawGroup<RawGfpoOutput> = serde_json::from_str(body)?;
            let outputs = non_empty(raw.outputs)?
                .into_iter()
                .enumerate()
                .map(|(i, o)| {
                    Ok(GfpoOutput {
                        id: format!("gfpo-{i}"),
                        text: text("outputs.text", o.text)?,
                        is_correct: o.is_correct,
                        length: token_length("outputs.length", o.length)?,
                    })
                })
                .collect::<ProviderResult<Vec<_>>>()?;
            AnyExample::Gfpo(GfpoExample {
                id: new_example_id(),
                topic: text("topic", raw.topic)?,
                prompt: text("prompt", raw.prompt)?,
                outputs,
            })
        }
        AlgorithmKind::Ppo => {
            let raw: RawPpo = serde_json::from_str(body)?;
            AnyExample::Ppo(PpoExample {
                id: new_example_id(),
                topic: text("topic", raw.topic)?,
                prompt: text("prompt", raw.prompt)?,
                response: text("response", raw.response)?,
                initial_reward: finite("initialReward", raw.initial_reward)?,
                initial_value: finite("initialValue", raw.initial_value)?,
            })
        }
        AlgorithmKind::Cispo => {
            let raw: RawCispo = serde_json::from_str(body)?;
            let behavior_log_prob = finite("behaviorLogProb", raw.behavior_log_prob)?;
            if behavior_log_prob > 0.0 {
                return Err(ProviderError::invalid(format!(
                    "`behaviorLogProb` must be a log-probability (<= 0), got {behavior_log_prob}"
                )));
            }
            AnyExample::Cispo(CispoExample {
                id: new_example_id(),
                topic: text("topic", raw.topic)?,
                prompt: text("prompt", raw.prompt)?,
                response: text("response", raw.response)?,
                behavior_log_prob,
            })
        }
    };
    Ok(example)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_grpo_with_positional_ids() {
        let body = r#"{
            "topic": "Math",
            "prompt": "What is 2+2?",
            "outputs": [
                {"text": "4", "score": 10},
                {"text": "5", "score": 2}
            ]
        }"#;
        let AnyExample::Grpo(e) = parse_example(AlgorithmKind::Grpo, body).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(e.outputs[0].id, "gen-0");
        assert_eq!(e.outputs[1].id, "gen-1");
        assert_eq!(e.scores(), vec![10.0, 2.0]);
        assert!(uuid::Uuid::parse_str(&e.id).is_ok());
    }

    #[test]
    fn test_gspo_and_gfpo_use_their_own_prefixes() {
        let gspo = r#"{"topic":"Poetry","prompt":"p","outputs":[{"text":"a","score":1}]}"#;
        let AnyExample::Gspo(e) = parse_example(AlgorithmKind::Gspo, gspo).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(e.outputs[0].id, "gspo-0");

        let gfpo = r#"{"topic":"Math","prompt":"p","outputs":[
            {"text":"a","isCorrect":true,"length":12},
            {"text":"b","isCorrect":false,"length":30}
        ]}"#;
        let AnyExample::Gfpo(e) = parse_example(AlgorithmKind::Gfpo, gfpo).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(e.outputs[1].id, "gfpo-1");
        assert_eq!(e.outputs[0].length, 12);
        assert!(!e.outputs[1].is_correct);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let body = r#"{"topic":"t","prompt":"p","response":"r","initialReward":1.0}"#;
        let err = parse_example(AlgorithmKind::Ppo, body).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedJson(_)));
    }

    #[test]
    fn test_empty_text_is_invalid() {
        let body = r#"{"topic":"t","prompt":"  ","chosen":"a","rejected":"b"}"#;
        let err = parse_example(AlgorithmKind::Dpo, body).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidExample(_)));
    }

    #[test]
    fn test_empty_group_is_invalid() {
        let body = r#"{"topic":"t","prompt":"p","outputs":[]}"#;
        let err = parse_example(AlgorithmKind::Grpo, body).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidExample(_)));
    }

    #[test]
    fn test_negative_length_is_invalid() {
        let body = r#"{"topic":"t","prompt":"p","outputs":[{"text":"a","isCorrect":true,"length":-3}]}"#;
        let err = parse_example(AlgorithmKind::Gfpo, body).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidExample(_)));
    }

    #[test]
    fn test_fractional_length_is_invalid() {
        let body = r#"{"topic":"t","prompt":"p","outputs":[{"text":"a","isCorrect":true,"length":12.4}]}"#;
        let err = parse_example(AlgorithmKind::Gfpo, body).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidExample(_)));

        let whole = r#"{"topic":"t","prompt":"p","outputs":[{"text":"a","isCorrect":true,"length":12.0}]}"#;
        let AnyExample::Gfpo(e) = parse_example(AlgorithmKind::Gfpo, whole).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(e.outputs[0].length, 12);
    }

    #[test]
    fn test_positive_behavior_log_prob_is_invalid() {
        let body = r#"{"topic":"t","prompt":"p","response":"r","behaviorLogProb":0.3}"#;
        let err = parse_example(AlgorithmKind::Cispo, body).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidExample(_)));

        let ok = r#"{"topic":"t","prompt":"p","response":"r","behaviorLogProb":-1.25}"#;
        let AnyExample::Cispo(e) = parse_example(AlgorithmKind::Cispo, ok).unwrap() else {
            panic!("wrong variant");
        };
        assert_eq!(e.behavior_log_prob, -1.25);
    }

    #[test]
    fn test_wrong_shape_for_kind_is_malformed() {
        let dpo = r#"{"topic":"t","prompt":"p","chosen":"a","rejected":"b"}"#;
        assert!(parse_example(AlgorithmKind::Grpo, dpo).is_err());
    }
}
