//! Mood score resolution.
//!
//! Scores come from the mood state's explicit `score` field and from
//! nowhere else. Display order looks like a tempting proxy for intensity
//! ("first mood is best") and has caused exactly that regression in
//! similar systems — the analytics tests pin the distinction.

use std::collections::HashMap;

use thymos_core::MoodState;
use uuid::Uuid;

/// Lookup from mood-state id to its explicit numeric score.
#[derive(Debug, Clone, Default)]
pub struct ScoreIndex {
    scores: HashMap<Uuid, f64>,
}

impl ScoreIndex {
    pub fn new(states: &[MoodState]) -> Self {
        Self {
            scores: states.iter().map(|s| (s.id, s.score)).collect(),
        }
    }

    /// Resolved score for a state id. Unmapped ids resolve to `0.0`,
    /// which downstream trend analytics read as "scoreless".
    pub fn score_of(&self, id: Uuid) -> f64 {
        self.scores.get(&id).copied().unwrap_or(0.0)
    }

    /// Mean of `scores` rounded to one decimal place; `0.0` for the
    /// empty set, never NaN.
    pub fn average(scores: &[f64]) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }
        round1(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(name: &str, score: f64, position: u32) -> MoodState {
        MoodState {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            color: "#888888".to_string(),
            score,
            is_system: false,
            position,
        }
    }

    #[test]
    fn empty_average_is_zero_not_nan() {
        assert_eq!(ScoreIndex::average(&[]), 0.0);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        // Three days at 9 and two at 3: 33 / 5 = 6.6.
        assert_eq!(ScoreIndex::average(&[9.0, 9.0, 9.0, 3.0, 3.0]), 6.6);
        assert_eq!(ScoreIndex::average(&[1.0, 2.0]), 1.5);
        assert_eq!(ScoreIndex::average(&[10.0 / 3.0]), 3.3);
    }

    #[test]
    fn resolves_explicit_score_not_position() {
        // Positions deliberately inverted against scores.
        let great = state("Great", 9.0, 5);
        let terrible = state("Terrible", 1.0, 0);
        let index = ScoreIndex::new(&[great.clone(), terrible.clone()]);
        assert_eq!(index.score_of(great.id), 9.0);
        assert_eq!(index.score_of(terrible.id), 1.0);
    }

    #[test]
    fn unmapped_id_is_scoreless() {
        let index = ScoreIndex::new(&[]);
        assert_eq!(index.score_of(Uuid::new_v4()), 0.0);
    }
}
