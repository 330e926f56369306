//! Generation prompts and response schemas for each algorithm.
//!
//! The instruction asks the model for one scenario; the schema pins the JSON
//! shape so the reply can be parsed into the raw records in
//! [`super::records`]. Ids are never requested from the model.

use serde_json::{json, Value};

use crate::algorithm::AlgorithmKind;

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// The user-turn instruction sent for `kind`.
pub fn instruction(kind: AlgorithmKind) -> &'static str {
    match kind {
        AlgorithmKind::Dpo => {
            "Generate a single training example for DPO (Direct Preference Optimization).
It should include a user prompt, a \"chosen\" (correct/better) response, and a \"rejected\" (incorrect/worse/hallucinated) response.
Keep the responses relatively short (under 50 words) so they fit a step-by-step display.
Topics can range from Coding, Science, History, or General Knowledge."
        }
        AlgorithmKind::Grpo => {
            "Generate a training scenario for GRPO (Group Relative Policy Optimization).
1. A user prompt (math, logic, or reasoning task).
2. A group of 4 distinct responses:
   - one perfect,
   - one good but slightly flawed,
   - one bad,
   - one completely irrelevant or wrong.
3. Assign an integer score (1-10) to each response based on quality.
Keep responses concise (under 40 words)."
        }
        AlgorithmKind::Gspo => {
            "Generate a training scenario for GSPO (Group Sequence Policy Optimization).
1. A user prompt (creative or open-ended).
2. A group of 4 responses of varying quality.
3. Assign a score (1-10) to each.
Keep responses concise."
        }
        AlgorithmKind::Gfpo => {
            "Generate a training scenario for GFPO (Group Filtered Policy Optimization) focusing on concise reasoning.
1. A user prompt (Math, Logic, or Common Sense).
2. Generate 5 responses:
   - 2 must be INCORRECT.
   - 3 must be CORRECT but vary in length (one very short, one medium, one very verbose).
3. Flag each as correct or incorrect.
4. Estimate the token length of each (integer)."
        }
        AlgorithmKind::Ppo => {
            "Generate a PPO (Proximal Policy Optimization) training scenario.
1. A user prompt (general knowledge or creative).
2. A single model response.
3. A reward score (float between 0-10) that a reward model would assign to this response.
4. An initial value estimate (float between 0-10) that the critic would predict for the prompt before seeing the answer.
Keep the response concise."
        }
        AlgorithmKind::Cispo => {
            "Generate a CISPO (Clipped IS-weight Policy Optimization) training scenario.
1. A prompt.
2. A response text.
3. A log probability (behaviorLogProb) for that response under an \"old\" policy, between -5.0 and -0.1."
        }
    }
}

// ---------------------------------------------------------------------------
// Response schemas
// ---------------------------------------------------------------------------

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

fn string(description: Option<&str>) -> Value {
    match description {
        Some(d) => json!({ "type": "STRING", "description": d }),
        None => json!({ "type": "STRING" }),
    }
}

fn number() -> Value {
    json!({ "type": "NUMBER" })
}

fn group_of(item: Value) -> Value {
    object(
        json!({
            "topic": string(None),
            "prompt": string(None),
            "outputs": { "type": "ARRAY", "items": item },
        }),
        &["topic", "prompt", "outputs"],
    )
}

/// The JSON response schema for `kind`, in the provider's schema dialect.
pub fn response_schema(kind: AlgorithmKind) -> Value {
    match kind {
        AlgorithmKind::Dpo => object(
            json!({
                "prompt": string(Some("The user query")),
                "chosen": string(Some("The high quality answer")),
                "rejected": string(Some("The lower quality or incorrect answer")),
                "topic": string(Some("Category of the example")),
            }),
            &["prompt", "chosen", "rejected", "topic"],
        ),
        AlgorithmKind::Grpo | AlgorithmKind::Gspo => group_of(object(
            json!({ "text": string(None), "score": number() }),
            &["text", "score"],
        )),
        AlgorithmKind::Gfpo => group_of(object(
            json!({
                "text": string(None),
                "isCorrect": { "type": "BOOLEAN" },
                "length": number(),
            }),
            &["text", "isCorrect", "length"],
        )),
        AlgorithmKind::Ppo => object(
            json!({
                "topic": string(None),
                "prompt": string(None),
                "response": string(None),
                "initialReward": number(),
                "initialValue": number(),
            }),
            &["topic", "prompt", "response", "initialReward", "initialValue"],
        ),
        AlgorithmKind::Cispo => object(
            json!({
                "topic": string(None),
                "prompt": string(None),
                "response": string(None),
                "behaviorLogProb": number(),
            }),
            &["topic", "prompt", "response", "behaviorLogProb"],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_schema_requires_topic_and_prompt() {
        for kind in AlgorithmKind::ALL {
            let schema = response_schema(kind);
            let required: Vec<&str> = schema["required"]
                .as_array()
                .unwrap()
                .iter()
                .filter_map(|v| v.as_str())
                .collect();
            assert!(required.contains(&"topic"), "{kind}");
            assert!(required.contains(&"prompt"), "{kind}");
        }
    }

    #[test]
    fn test_gfpo_items_carry_correctness_flag() {
        let schema = response_schema(AlgorithmKind::Gfpo);
        let item = &schema["properties"]["outputs"]["items"];
        assert_eq!(item["properties"]["isCorrect"]["type"], "BOOLEAN");
        assert_eq!(item["required"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_instructions_name_their_algorithm() {
        for kind in AlgorithmKind::ALL {
            assert!(instruction(kind).contains(kind.as_str()), "{kind}");
        }
    }
}
