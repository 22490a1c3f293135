//! Aggregate statistics over the progress log.
//!
//! Derived on read, never persisted.

use crate::metrics::SessionMetrics;
use serde::{Deserialize, Serialize};

/// Points one scoring frame adds to its category counter
pub const ACCURACY_WEIGHT: f64 = 1.0;

/// Accuracy percentage per category over every evaluated frame, in [0, 100]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyStats {
    pub stance: f64,
    pub blocks: f64,
    pub combos: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub sessions: usize,
    pub accuracy: AccuracyStats,
    pub total_punches: u64,
    pub avg_reaction_ms: f64,
    pub total_training_ms: u64,
}

impl ProgressStats {
    pub fn from_sessions(sessions: &[SessionMetrics]) -> Self {
        if sessions.is_empty() {
            return Self::default();
        }

        let count = sessions.len() as f64;
        let sum_of = |f: fn(&SessionMetrics) -> u64| sessions.iter().map(f).sum::<u64>();
        let attempts = sum_of(|s| s.frames) as f64;
        let percent = |score: u64| {
            if attempts == 0.0 {
                0.0
            } else {
                (score as f64 * 100.0 / (attempts * ACCURACY_WEIGHT)).min(100.0)
            }
        };

        Self {
            sessions: sessions.len(),
            accuracy: AccuracyStats {
                stance: percent(sum_of(|s| s.accuracy.stance)),
                blocks: percent(sum_of(|s| s.accuracy.blocks)),
                combos: percent(sum_of(|s| s.accuracy.combos)),
            },
            total_punches: sum_of(|s| s.punches),
            avg_reaction_ms: sum_of(|s| s.reaction_ms) as f64 / count,
            total_training_ms: sum_of(|s| s.duration_ms),
        }
    }

    /// Whole minutes trained, for display
    pub fn training_minutes(&self) -> u64 {
        self.total_training_ms / 60_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Accuracy;
    use chrono::Utc;

    fn sample() -> SessionMetrics {
        SessionMetrics {
            accuracy: Accuracy {
                stance: 80,
                blocks: 40,
                combos: 10,
            },
            reaction_ms: 1_500,
            punches: 12,
            timestamp: Utc::now(),
            duration_ms: 90_000,
            frames: 100,
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        let stats = ProgressStats::from_sessions(&[]);
        assert_eq!(stats, ProgressStats::default());
        assert_eq!(stats.accuracy.stance, 0.0);
        assert_eq!(stats.avg_reaction_ms, 0.0);
    }

    #[test]
    fn test_identical_sessions_keep_averages_and_scale_sums() {
        let one = ProgressStats::from_sessions(&[sample()]);
        let many = ProgressStats::from_sessions(&vec![sample(); 7]);

        assert_eq!(one.accuracy.stance, 80.0);
        assert_eq!(many.accuracy, one.accuracy);
        assert_eq!(many.avg_reaction_ms, 1_500.0);
        assert_eq!(many.total_punches, 12 * 7);
        assert_eq!(many.total_training_ms, 90_000 * 7);
        assert_eq!(many.sessions, 7);
    }

    #[test]
    fn test_mixed_sessions_average() {
        let mut a = sample();
        a.reaction_ms = 1_000;
        a.accuracy.stance = 50;
        let mut b = sample();
        b.reaction_ms = 2_000;
        b.accuracy.stance = 100;

        let stats = ProgressStats::from_sessions(&[a, b]);
        assert_eq!(stats.avg_reaction_ms, 1_500.0);
        assert_eq!(stats.accuracy.stance, 75.0);
        assert_eq!(stats.training_minutes(), 3);
    }

    #[test]
    fn test_pooled_over_frames() {
        let mut short = sample();
        short.frames = 10;
        short.accuracy.stance = 10;
        let mut long = sample();
        long.frames = 90;
        long.accuracy.stance = 0;

        let stats = ProgressStats::from_sessions(&[short, long]);
        assert_eq!(stats.accuracy.stance, 10.0);
    }

    #[test]
    fn test_folded_frames_stay_within_percent_range() {
        use crate::hint::{Hint, HintCode};

        let mut clean = SessionMetrics::new(Utc::now());
        for _ in 0..300 {
            clean.fold_hints(&[]);
        }
        let stats = ProgressStats::from_sessions(&[clean.clone()]);
        assert_eq!(stats.accuracy.stance, 100.0);

        let mut mixed = SessionMetrics::new(Utc::now());
        for i in 0..40 {
            if i % 4 == 0 {
                mixed.fold_hints(&[]);
            } else {
                mixed.fold_hints(&[Hint::warn(HintCode::RaiseGuard)]);
            }
        }
        let stats = ProgressStats::from_sessions(&[mixed]);
        assert_eq!(stats.accuracy.stance, 25.0);
        assert_eq!(stats.accuracy.blocks, 0.0);
    }

    #[test]
    fn test_no_frames_means_zero_accuracy() {
        let mut legacy = sample();
        legacy.frames = 0;
        let stats = ProgressStats::from_sessions(&[legacy]);
        assert_eq!(stats.accuracy.stance, 0.0);
        assert_eq!(stats.sessions, 1);
    }
}
