//! Shared types and logic for GuardAI components.
//!
//! Everything here is synchronous and free of runtime concerns: the pose
//! rules, the hint vocabulary, stress-event synthesis, session metrics and
//! the persisted progress history. The tokio runtime lives in `guardd`.

pub mod achievements;
pub mod clock;
pub mod config;
pub mod error;
pub mod hint;
pub mod keypoints;
pub mod metrics;
pub mod progress;
pub mod rules;
pub mod stats;
pub mod stress;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::GuardConfig;
pub use error::GuardError;
pub use hint::{Hint, HintCode, Severity};
pub use keypoints::{Keypoint, KeypointSet, Landmark};
pub use metrics::{Accuracy, SessionMetrics};
pub use progress::{FileStorage, LogStorage, MemoryStorage, ProgressStore};
pub use rules::{evaluate, RuleEvaluator};
pub use stats::ProgressStats;
pub use stress::{StressEvent, StressKind};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Key under which the session log is persisted
pub const STORE_KEY: &str = "guardai_progress";

/// Maximum number of sessions kept in the progress log
pub const MAX_SESSIONS: usize = 100;
