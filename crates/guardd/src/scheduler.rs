//! Randomized stress-event scheduler.
//!
//! A self-perpetuating timer chain: wait a uniformly drawn delay, emit one
//! event, draw the next delay. It runs as its own tokio task and never
//! touches the frame loop.
//!
//! `stop` is final for the running chain: the active flag and the chain's
//! generation are checked under the same lock that guards the callback, so
//! once `stop` returns no further callback can begin, even if a delay had
//! already elapsed and the task was waiting to be polled.

use guard_shared::config::StressConfig;
use guard_shared::{Clock, StressEvent, SystemClock};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

type SharedRng = Arc<Mutex<Box<dyn RngCore + Send>>>;

#[derive(Debug, Default)]
struct Gate {
    active: bool,
    generation: u64,
}

pub struct StressScheduler {
    min_delay_ms: u64,
    max_delay_ms: u64,
    rng: SharedRng,
    clock: Arc<dyn Clock>,
    gate: Arc<Mutex<Gate>>,
    task: Option<JoinHandle<()>>,
}

impl StressScheduler {
    /// Entropy-seeded scheduler on the system clock
    pub fn from_config(config: &StressConfig) -> Self {
        Self::new(config, StdRng::from_entropy(), Arc::new(SystemClock))
    }

    pub fn new(config: &StressConfig, rng: impl RngCore + Send + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            min_delay_ms: config.min_delay_ms,
            max_delay_ms: config.max_delay_ms.max(config.min_delay_ms + 1),
            rng: Arc::new(Mutex::new(Box::new(rng))),
            clock,
            gate: Arc::new(Mutex::new(Gate::default())),
            task: None,
        }
    }

    /// Begin the chain; `on_event` runs on the scheduler task.
    ///
    /// Must be called inside a tokio runtime. Starting an active scheduler
    /// restarts the chain. The callback must not stop the scheduler itself.
    pub fn start<F>(&mut self, on_event: F)
    where
        F: Fn(StressEvent) + Send + Sync + 'static,
    {
        self.stop();

        let generation = {
            let mut gate = lock(&self.gate);
            gate.active = true;
            gate.generation += 1;
            gate.generation
        };

        let chain = Chain {
            generation,
            min_delay_ms: self.min_delay_ms,
            max_delay_ms: self.max_delay_ms,
            rng: Arc::clone(&self.rng),
            clock: Arc::clone(&self.clock),
            gate: Arc::clone(&self.gate),
        };
        self.task = Some(tokio::spawn(chain.run(on_event)));
        info!("Stress scheduler started");
    }

    /// Cancel the pending delay. Idempotent; safe before `start`.
    pub fn stop(&mut self) {
        let was_active = {
            let mut gate = lock(&self.gate);
            std::mem::replace(&mut gate.active, false)
        };
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if was_active {
            info!("Stress scheduler stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        lock(&self.gate).active
    }
}

impl Drop for StressScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Chain {
    generation: u64,
    min_delay_ms: u64,
    max_delay_ms: u64,
    rng: SharedRng,
    clock: Arc<dyn Clock>,
    gate: Arc<Mutex<Gate>>,
}

impl Chain {
    async fn run<F>(self, on_event: F)
    where
        F: Fn(StressEvent) + Send + Sync + 'static,
    {
        loop {
            let delay_ms = lock(&self.rng).gen_range(self.min_delay_ms..self.max_delay_ms);
            sleep(Duration::from_millis(delay_ms)).await;

            // Held through the callback so a concurrent stop waits for it
            let gate = lock(&self.gate);
            if !gate.active || gate.generation != self.generation {
                return;
            }
            let event = StressEvent::synthesize(&mut *lock(&self.rng), self.clock.as_ref());
            debug!(kind = ?event.kind, payload = %event.payload, "Stress event after {}ms", delay_ms);
            on_event(event);
        }
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
