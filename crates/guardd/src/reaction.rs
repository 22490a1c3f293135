//! Reaction windows opened by command prompts.
//!
//! Each command event opens a window that closes after a fixed timeout and
//! records the elapsed time as the session's reaction time. Nothing watches
//! the pose for an actual response yet, so the recorded value is always the
//! timeout; the window is the hook a real detector would close early.
//! Windows still open when the session stops are cancelled and record
//! nothing.

use guard_shared::config::StressConfig;
use guard_shared::SessionMetrics;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

#[derive(Debug)]
pub struct ReactionTimer {
    timeout: Duration,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl ReactionTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &StressConfig) -> Self {
        Self::new(Duration::from_millis(config.reaction_timeout_ms))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Open a window that writes into `metrics` unless `running` has been
    /// cleared by the time it closes
    pub fn begin(&self, metrics: Arc<RwLock<SessionMetrics>>, running: Arc<AtomicBool>) {
        let timeout = self.timeout;
        let opened = Instant::now();

        let handle = tokio::spawn(async move {
            sleep(timeout).await;
            if !running.load(Ordering::SeqCst) {
                return;
            }
            let elapsed_ms = opened.elapsed().as_millis() as u64;
            metrics.write().await.record_reaction(elapsed_ms);
            debug!("Reaction window closed after {}ms", elapsed_ms);
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Abort every open window
    pub fn cancel_all(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let open = pending.iter().filter(|h| !h.is_finished()).count();
        for handle in pending.drain(..) {
            handle.abort();
        }
        if open > 0 {
            debug!("Cancelled {} open reaction window(s)", open);
        }
    }

    pub fn open_windows(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }
}
