//! Stress events: random interruptions that simulate pressure.
//!
//! Synthesis is separate from scheduling so both the random source and the
//! clock can be supplied by the caller.

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Spoken-style commands
pub const COMMAND_PHRASES: &[&str] = &[
    "Block high!",
    "Duck low!",
    "Move left!",
    "Move right!",
    "Counter attack!",
    "Reset guard!",
    "Stay focused!",
];

/// Audio cue tags
pub const AUDIO_CUES: &[&str] = &["alert", "warning", "attention"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressKind {
    Audio,
    Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressEvent {
    pub kind: StressKind,
    pub payload: String,
    pub emitted_at: DateTime<Utc>,
}

impl StressEvent {
    /// Draw a kind uniformly, then a payload uniformly from that kind's set
    pub fn synthesize<R: Rng + ?Sized>(rng: &mut R, clock: &dyn Clock) -> Self {
        let (kind, choices) = if rng.gen_bool(0.5) {
            (StressKind::Audio, AUDIO_CUES)
        } else {
            (StressKind::Command, COMMAND_PHRASES)
        };
        let payload = choices.choose(rng).copied().unwrap_or_default();

        Self {
            kind,
            payload: payload.to_string(),
            emitted_at: clock.now(),
        }
    }

    pub fn is_command(&self) -> bool {
        self.kind == StressKind::Command
    }
}
