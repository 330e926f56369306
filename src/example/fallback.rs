//! Hardcoded scenarios loaded at start-up and served by the offline provider.

use super::types::{
    CispoExample, DpoExample, GfpoExample, GfpoOutput, GroupExample, PpoExample, ScoredOutput,
};

fn scored(id: &str, text: &str, score: f64) -> ScoredOutput {
    ScoredOutput {
        id: id.into(),
        text: text.into(),
        score,
    }
}

fn gfpo_output(id: &str, text: &str, is_correct: bool, length: u32) -> GfpoOutput {
    GfpoOutput {
        id: id.into(),
        text: text.into(),
        is_correct,
        length,
    }
}

pub fn dpo() -> DpoExample {
    DpoExample {
        id: "init-1".into(),
        topic: "Coding".into(),
        prompt: "Write a Python function to reverse a string.".into(),
        chosen: "def reverse_string(s):\n    return s[::-1]".into(),
        rejected: "def reverse_string(s):\n    return s.reverse()".into(),
    }
}

pub fn grpo() -> GroupExample {
    GroupExample {
        id: "grpo-1".into(),
        topic: "Logic".into(),
        prompt: "If you have a 3 liter jug and a 5 liter jug, how do you measure exactly 4 liters?"
            .into(),
        outputs: vec![
            scored(
                "o1",
                "Fill the 5L, pour into 3L. 2L left in 5L. Empty 3L. Pour 2L into 3L. Fill 5L, pour 1L into 3L to full. 4L left in 5L.",
                10.0,
            ),
            scored(
                "o2",
                "Fill 5L jug completely. Pour out 1 liter roughly. You have 4 liters.",
                2.0,
            ),
            scored(
                "o3",
                "Fill the 3L jug. Pour it into the 5L jug. Fill the 3L jug again. Pour until 5L is full. 1L left in 3L. Empty 5L. Pour 1L into 5L. Fill 3L and add to 5L. Total 4L.",
                9.0,
            ),
            scored("o4", "Just guess until it looks like 4 liters.", 1.0),
        ],
    }
}

pub fn gspo() -> GroupExample {
    GroupExample {
        id: "gspo-1".into(),
        topic: "Creative Writing".into(),
        prompt: "Write a haiku about the stars.".into(),
        outputs: vec![
            scored(
                "s1",
                "Diamonds in the dark,\nWatching over sleeping world,\nNight's silent guardians.",
                9.0,
            ),
            scored(
                "s2",
                "Bright lights far away. They look very pretty now. Good night everyone.",
                3.0,
            ),
            scored(
                "s3",
                "Twinkle twinkle little star,\nHow I wonder what you are,\nUp above the world so high.",
                5.0,
            ),
            scored(
                "s4",
                "Cosmic dust burns bright,\nAncient light reaches my eyes,\nHistory in sky.",
                8.0,
            ),
        ],
    }
}

pub fn gfpo() -> GfpoExample {
    GfpoExample {
        id: "gfpo-1".into(),
        topic: "Math Reasoning".into(),
        prompt: "Solve for x: 2(x - 3) + 4 = 10".into(),
        outputs: vec![
            gfpo_output("g1", "2(x-3) = 6 → x-3 = 3 → x = 6", true, 12),
            gfpo_output(
                "g2",
                "Expand: 2x - 6 + 4 = 10. 2x - 2 = 10. 2x = 12. x = 6.",
                true,
                24,
            ),
            gfpo_output(
                "g3",
                "2x - 6 + 4 = 10. 2x - 2 = 10. 2x = 8. x = 4.",
                false,
                20,
            ),
            gfpo_output("g4", "The answer is 6.", true, 5),
            gfpo_output(
                "g5",
                "First distribute the 2 into the parenthesis to get 2x - 6. Then add 4 to get 2x - 2. Set equal to 10. Add 2 to both sides getting 2x = 12. Divide by 2 getting x = 6.",
                true,
                45,
            ),
        ],
    }
}

pub fn ppo() -> PpoExample {
    PpoExample {
        id: "ppo-1".into(),
        topic: "Creative Writing".into(),
        prompt: "Write a haiku about the ocean.".into(),
        response: "Blue waves crash quietly,\nSand warms my feet on the beach,\nPeace is in the salt."
            .into(),
        initial_reward: 8.2,
        initial_value: 6.5,
    }
}

pub fn cispo() -> CispoExample {
    CispoExample {
        id: "cispo-1".into(),
        topic: "General".into(),
        prompt: "What is the capital of France?".into(),
        response: "The capital of France is Paris.".into(),
        behavior_log_prob: -0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_groups_are_non_empty() {
        assert_eq!(grpo().outputs.len(), 4);
        assert_eq!(gspo().outputs.len(), 4);
        assert_eq!(gfpo().outputs.len(), 5);
    }

    #[test]
    fn test_fallback_ids_are_distinct() {
        let ids = [
            dpo().id,
            grpo().id,
            gspo().id,
            gfpo().id,
            ppo().id,
            cispo().id,
        ];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_gfpo_fallback_has_one_incorrect_output() {
        let incorrect: Vec<_> = gfpo()
            .outputs
            .into_iter()
            .filter(|o| !o.is_correct)
            .map(|o| o.id)
            .collect();
        assert_eq!(incorrect, vec!["g3".to_string()]);
    }
}
