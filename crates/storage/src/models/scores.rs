use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::numeric;

pub const TOTAL_TIME_KEY: &str = "total_time";
pub const PENALTY_TIME_KEY: &str = "penalty_time";
pub const PENALTY_SCORE_KEY: &str = "penalty_score";

/// Everything recorded for one player in one race.
///
/// Stored as a flat map keyed by event id, with the reserved keys
/// `total_time`, `penalty_time` and `penalty_score` alongside. Values that do
/// not parse as numbers read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct PlayerScores {
    pub event_scores: BTreeMap<String, Decimal>,
    /// Raw stopwatch value in milliseconds, `None` until a run is committed
    pub total_time_ms: Option<Decimal>,
    /// Signed milliseconds added to the raw time
    pub time_penalty_ms: Decimal,
    /// Signed points subtracted from the event total
    pub score_penalty: Decimal,
}

impl PlayerScores {
    pub fn event_score(&self, event_id: &str) -> Decimal {
        self.event_scores
            .get(event_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn event_total(&self) -> Decimal {
        self.event_scores
            .values()
            .fold(Decimal::ZERO, |total, score| total.saturating_add(*score))
    }
}

impl From<BTreeMap<String, Value>> for PlayerScores {
    fn from(mut raw: BTreeMap<String, Value>) -> Self {
        let total_time_ms = raw
            .remove(TOTAL_TIME_KEY)
            .filter(|value| !value.is_null())
            .map(|value| numeric::value_to_decimal(&value));
        let time_penalty_ms = raw
            .remove(PENALTY_TIME_KEY)
            .map(|value| numeric::value_to_decimal(&value))
            .unwrap_or(Decimal::ZERO);
        let score_penalty = raw
            .remove(PENALTY_SCORE_KEY)
            .map(|value| numeric::value_to_decimal(&value))
            .unwrap_or(Decimal::ZERO);

        let event_scores = raw
            .into_iter()
            .map(|(event_id, value)| (event_id, numeric::value_to_decimal(&value)))
            .collect();

        Self {
            event_scores,
            total_time_ms,
            time_penalty_ms,
            score_penalty,
        }
    }
}

impl From<PlayerScores> for BTreeMap<String, Value> {
    fn from(scores: PlayerScores) -> Self {
        let mut raw: BTreeMap<String, Value> = scores
            .event_scores
            .into_iter()
            .map(|(event_id, score)| (event_id, numeric::decimal_to_value(score)))
            .collect();

        if let Some(total_time) = scores.total_time_ms {
            raw.insert(TOTAL_TIME_KEY.to_string(), numeric::decimal_to_value(total_time));
        }
        if !scores.time_penalty_ms.is_zero() {
            raw.insert(
                PENALTY_TIME_KEY.to_string(),
                numeric::decimal_to_value(scores.time_penalty_ms),
            );
        }
        if !scores.score_penalty.is_zero() {
            raw.insert(
                PENALTY_SCORE_KEY.to_string(),
                numeric::decimal_to_value(scores.score_penalty),
            );
        }

        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reserved_keys_are_split_out() {
        let scores: PlayerScores = serde_json::from_value(json!({
            "def_0": 10,
            "def_1": "7,5",
            "total_time": 20000,
            "penalty_time": 5000,
            "penalty_score": -2
        }))
        .unwrap();

        assert_eq!(scores.total_time_ms, Some(Decimal::from(20000)));
        assert_eq!(scores.time_penalty_ms, Decimal::from(5000));
        assert_eq!(scores.score_penalty, Decimal::from(-2));
        assert_eq!(scores.event_scores.len(), 2);
        assert_eq!(scores.event_score("def_1"), Decimal::new(75, 1));
        assert_eq!(scores.event_total(), Decimal::new(175, 1));
    }

    #[test]
    fn test_garbage_values_read_as_zero() {
        let scores: PlayerScores = serde_json::from_value(json!({
            "def_0": "",
            "def_1": "abc",
            "def_2": null,
            "penalty_score": "n/a"
        }))
        .unwrap();

        assert_eq!(scores.event_total(), Decimal::ZERO);
        assert_eq!(scores.score_penalty, Decimal::ZERO);
        assert_eq!(scores.total_time_ms, None);
    }

    #[test]
    fn test_written_back_as_flat_map() {
        let mut scores = PlayerScores {
            total_time_ms: Some(Decimal::from(61_230)),
            score_penalty: Decimal::new(15, 1),
            ..Default::default()
        };
        scores
            .event_scores
            .insert("def_3".to_string(), Decimal::from(4));

        let value = serde_json::to_value(&scores).unwrap();
        assert_eq!(
            value,
            json!({"def_3": 4, "total_time": 61230, "penalty_score": 1.5})
        );

        let back: PlayerScores = serde_json::from_value(value).unwrap();
        assert_eq!(back, scores);
    }

    #[test]
    fn test_unknown_event_reads_zero() {
        assert_eq!(PlayerScores::default().event_score("def_9"), Decimal::ZERO);
    }
}
