//! Camera-free demo session.
//!
//! Walks the trainee through a fixed list of drills, one every step, then
//! ends on its own. Nothing is evaluated and nothing is persisted.

use crate::collaborators::Presenter;
use guard_shared::Severity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{interval_at, Duration, Instant};
use tracing::info;

pub const DEMO_INSTRUCTIONS: &[&str] = &[
    "Raise your guard position",
    "Keep your chin down",
    "Move left, then right",
    "Practice blocking motions",
    "Throw quick jabs",
];

/// Spacing between drills
pub const DEMO_STEP: Duration = Duration::from_secs(3);

pub const DEMO_INTRO: &str = "Demo mode: Follow the on-screen instructions without camera.";

pub const DEMO_DONE: &str = "Demo completed! Start training with a camera to track progress.";

/// Drive the drill list until it runs out or `running` is cleared
pub(crate) async fn run<V: Presenter>(presenter: Arc<V>, running: Arc<AtomicBool>, step: Duration) {
    let mut ticker = interval_at(Instant::now() + step, step);

    for instruction in DEMO_INSTRUCTIONS {
        ticker.tick().await;
        if !running.load(Ordering::SeqCst) {
            return;
        }
        presenter.on_status(instruction, Severity::Info);
    }

    ticker.tick().await;
    if running.swap(false, Ordering::SeqCst) {
        info!("Demo session finished");
        presenter.on_status(DEMO_DONE, Severity::Info);
    }
}
