//! Per-session training metrics.

use crate::hint::Hint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Frames that scored in each category. Each evaluated frame scores at most
/// once per category, so every counter stays within `frames`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accuracy {
    pub stance: u64,
    pub blocks: u64,
    pub combos: u64,
}

/// Accumulator for one training session.
///
/// Field names on the wire are part of the persisted log format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetrics {
    pub accuracy: Accuracy,
    pub reaction_ms: u64,
    pub punches: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub duration_ms: u64,
    /// Evaluated frames; the attempts every accuracy counter is scored against
    #[serde(default)]
    pub frames: u64,
}

impl SessionMetrics {
    /// Zeroed metrics for a session starting at `started`
    pub fn new(started: DateTime<Utc>) -> Self {
        Self {
            accuracy: Accuracy::default(),
            reaction_ms: 0,
            punches: 0,
            timestamp: started,
            duration_ms: 0,
            frames: 0,
        }
    }

    /// Fold one evaluation's hints into the tally.
    ///
    /// A frame with no hints counts toward stance accuracy; a frame with any
    /// block or punch hint counts one punch.
    pub fn fold_hints(&mut self, hints: &[Hint]) {
        self.frames += 1;
        if hints.is_empty() {
            self.accuracy.stance += 1;
        }
        if hints.iter().any(|h| h.code.is_strike()) {
            self.punches += 1;
        }
    }

    pub fn record_reaction(&mut self, elapsed_ms: u64) {
        self.reaction_ms = elapsed_ms;
    }

    /// Stamp the end of the session
    pub fn finish(mut self, ended: DateTime<Utc>) -> Self {
        self.duration_ms = (ended - self.timestamp).num_milliseconds().max(0) as u64;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hint::HintCode;
    use chrono::Duration;

    #[test]
    fn test_empty_hints_count_as_stance() {
        let mut m = SessionMetrics::new(Utc::now());
        m.fold_hints(&[]);
        m.fold_hints(&[]);
        assert_eq!(m.accuracy.stance, 2);
        assert_eq!(m.frames, 2);
        assert_eq!(m.punches, 0);
    }

    #[test]
    fn test_good_stance_hint_is_not_counted_as_stance() {
        // Only an empty list scores; GOOD_STANCE still makes the list non-empty
        let mut m = SessionMetrics::new(Utc::now());
        m.fold_hints(&[Hint::info(HintCode::GoodStance)]);
        assert_eq!(m.accuracy.stance, 0);
        assert_eq!(m.frames, 1);
    }

    #[test]
    fn test_strike_counts_once_per_frame() {
        let mut m = SessionMetrics::new(Utc::now());
        m.fold_hints(&[Hint::info(HintCode::BlockHigh), Hint::info(HintCode::BlockLow)]);
        m.fold_hints(&[Hint::warn(HintCode::RaiseGuard)]);
        assert_eq!(m.punches, 1);
    }

    #[test]
    fn test_finish_sets_duration() {
        let start = Utc::now();
        let m = SessionMetrics::new(start).finish(start + Duration::milliseconds(4_250));
        assert_eq!(m.duration_ms, 4_250);
    }

    #[test]
    fn test_wire_field_names() {
        let m = SessionMetrics::new(Utc::now());
        let value = serde_json::to_value(&m).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["accuracy", "reactionMs", "punches", "timestamp", "durationMs", "frames"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert!(value["accuracy"].get("combos").is_some());
    }

    #[test]
    fn test_records_without_frames_still_load() {
        let json = r#"{"accuracy":{"stance":3,"blocks":0,"combos":0},"reactionMs":0,"punches":1,"timestamp":"2026-03-01T08:00:00Z"}"#;
        let m: SessionMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(m.frames, 0);
        assert_eq!(m.duration_ms, 0);
    }
}
