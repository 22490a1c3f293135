//! Training session state machine.
//!
//! `idle -> running -> idle`. While running, two independent chains share
//! the session's metrics: the frame loop (pose -> rules -> presenter, gated
//! to the current fps) and the stress scheduler (random prompts, each
//! command opening a reaction window). Stopping ends both, waits for the
//! frame loop to hand the pose source back and flushes the finished session
//! to the progress store.
//!
//! A demo session is the camera-free variant: a scripted drill list on a
//! timer, no evaluation, no stress prompts and nothing persisted. It ends by
//! itself after the last drill or on `stop`.
//!
//! The frame loop checks the running flag at the top of each tick, so at
//! most one tick already in progress completes after `stop` clears it.
//! `stop` awaits that tick before returning.

use crate::collaborators::{PoseSource, Presenter};
use crate::demo;
use crate::error::SessionError;
use crate::frame_gate::FrameGate;
use crate::reaction::ReactionTimer;
use crate::scheduler::StressScheduler;
use anyhow::Context;
use guard_shared::achievements::newly_unlocked;
use guard_shared::config::FeedbackConfig;
use guard_shared::{
    Clock, FileStorage, GuardConfig, LogStorage, ProgressStore, RuleEvaluator, SessionMetrics,
    Severity, SystemClock,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
}

pub struct FeedbackLoop<P: PoseSource, V: Presenter, S: LogStorage> {
    config: GuardConfig,
    evaluator: Arc<RuleEvaluator>,
    presenter: Arc<V>,
    pose: Option<P>,
    store: ProgressStore<S>,
    scheduler: StressScheduler,
    clock: Arc<dyn Clock>,
    reactions: Arc<ReactionTimer>,
    running: Arc<AtomicBool>,
    metrics: Arc<RwLock<SessionMetrics>>,
    frame_task: Option<JoinHandle<P>>,
    demo_task: Option<JoinHandle<()>>,
    session_id: Option<Uuid>,
}

impl<P: PoseSource, V: Presenter> FeedbackLoop<P, V, FileStorage> {
    /// Loop over a file-backed store at the configured data directory
    pub fn from_config(config: GuardConfig, pose: P, presenter: Arc<V>) -> anyhow::Result<Self> {
        config.validate().context("invalid GuardAI configuration")?;

        let storage = &config.storage;
        std::fs::create_dir_all(&storage.data_dir).with_context(|| {
            format!("failed to create data dir {}", storage.data_dir.display())
        })?;
        let store = ProgressStore::open(&storage.data_dir)
            .with_key(storage.store_key.clone())
            .with_capacity(storage.max_sessions);

        Ok(Self::new(config, pose, presenter, store))
    }
}

impl<P: PoseSource, V: Presenter, S: LogStorage> FeedbackLoop<P, V, S> {
    pub fn new(config: GuardConfig, pose: P, presenter: Arc<V>, store: ProgressStore<S>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            evaluator: Arc::new(RuleEvaluator::from_config(&config.rules)),
            scheduler: StressScheduler::from_config(&config.stress),
            reactions: Arc::new(ReactionTimer::from_config(&config.stress)),
            metrics: Arc::new(RwLock::new(SessionMetrics::new(clock.now()))),
            running: Arc::new(AtomicBool::new(false)),
            config,
            presenter,
            pose: Some(pose),
            store,
            clock,
            frame_task: None,
            demo_task: None,
            session_id: None,
        }
    }

    /// Replace the stress scheduler, e.g. with a seeded one
    pub fn with_scheduler(mut self, scheduler: StressScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Clock used for session timestamps, durations and stress events.
    ///
    /// Rebuilds the stress scheduler on the new clock, so a custom scheduler
    /// must be supplied after this.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.scheduler =
            StressScheduler::new(&self.config.stress, StdRng::from_entropy(), Arc::clone(&clock));
        self.clock = clock;
        self
    }

    pub fn state(&self) -> SessionState {
        if self.running.load(Ordering::SeqCst) {
            SessionState::Running
        } else {
            SessionState::Idle
        }
    }

    pub fn store(&self) -> &ProgressStore<S> {
        &self.store
    }

    pub fn presenter(&self) -> &Arc<V> {
        &self.presenter
    }

    /// Copy of the running session's counters
    pub async fn metrics_snapshot(&self) -> SessionMetrics {
        self.metrics.read().await.clone()
    }

    /// Open the pose source and begin a session.
    ///
    /// A collaborator failure is reported once through the presenter and
    /// leaves the loop idle.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if self.state() == SessionState::Running {
            return Err(SessionError::AlreadyRunning);
        }
        self.demo_task.take();
        let mut pose = self.pose.take().ok_or(SessionError::PoseSourceLost)?;

        if let Err(e) = pose.open() {
            error!("Failed to start training: {}", e);
            self.presenter.on_status(e.user_message(), Severity::Warn);
            self.pose = Some(pose);
            return Err(e.into());
        }

        *self.metrics.write().await = SessionMetrics::new(self.clock.now());
        self.running.store(true, Ordering::SeqCst);
        let session_id = Uuid::new_v4();
        self.session_id = Some(session_id);

        if self.config.stress.enabled {
            let presenter = Arc::clone(&self.presenter);
            let reactions = Arc::clone(&self.reactions);
            let metrics = Arc::clone(&self.metrics);
            let running = Arc::clone(&self.running);
            self.scheduler.start(move |event| {
                presenter.on_stress_event(&event);
                if event.is_command() {
                    reactions.begin(Arc::clone(&metrics), Arc::clone(&running));
                }
            });
        }

        let frames = FrameLoop {
            feedback: self.config.feedback.clone(),
            evaluator: Arc::clone(&self.evaluator),
            presenter: Arc::clone(&self.presenter),
            running: Arc::clone(&self.running),
            metrics: Arc::clone(&self.metrics),
        };
        self.frame_task = Some(tokio::spawn(frames.run(pose)));

        self.presenter
            .on_status("Training started! Follow the instructions.", Severity::Info);
        info!(%session_id, "Training session started");
        Ok(())
    }

    /// Run the scripted drills without a camera.
    ///
    /// Works whether or not the pose source can open, which makes it the
    /// fallback after a collaborator failure.
    pub fn start_demo(&mut self) -> Result<(), SessionError> {
        if self.state() == SessionState::Running {
            return Err(SessionError::AlreadyRunning);
        }

        self.running.store(true, Ordering::SeqCst);
        self.presenter.on_status(demo::DEMO_INTRO, Severity::Info);
        self.demo_task = Some(tokio::spawn(demo::run(
            Arc::clone(&self.presenter),
            Arc::clone(&self.running),
            demo::DEMO_STEP,
        )));
        info!("Demo session started");
        Ok(())
    }

    /// End the session and persist it.
    ///
    /// Returns the finished metrics, or `None` when no session was running.
    /// Demo sessions are never persisted and also return `None`.
    pub async fn stop(&mut self) -> Result<Option<SessionMetrics>, SessionError> {
        if let Some(task) = self.demo_task.take() {
            let was_running = self.running.swap(false, Ordering::SeqCst);
            task.abort();
            let _ = task.await;
            if was_running {
                info!("Demo session stopped");
                self.presenter.on_status("Demo stopped.", Severity::Info);
            }
            return Ok(None);
        }

        if !self.running.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }

        self.scheduler.stop();
        self.reactions.cancel_all();

        if let Some(task) = self.frame_task.take() {
            match task.await {
                Ok(mut pose) => {
                    pose.close();
                    self.pose = Some(pose);
                }
                Err(e) => error!("Frame loop ended abnormally, pose source lost: {}", e),
            }
        }

        let finished = self.metrics.read().await.clone().finish(self.clock.now());
        let session_id = self.session_id.take();
        info!(
            session_id = ?session_id,
            duration_ms = finished.duration_ms,
            punches = finished.punches,
            "Training session stopped"
        );

        let before = self.store.get_stats();
        if let Err(e) = self.store.log(&finished) {
            error!("Failed to save session: {}", e);
            self.presenter
                .on_status("Training stopped, but progress could not be saved.", Severity::Warn);
            return Err(e.into());
        }
        let after = self.store.get_stats();
        for achievement in newly_unlocked(&before, &after) {
            info!("Achievement unlocked: {}", achievement.name);
            self.presenter.on_achievement(&achievement);
        }

        self.presenter.on_status(
            &format!("Training completed! Duration: {}s", finished.duration_ms / 1_000),
            Severity::Info,
        );
        Ok(Some(finished))
    }
}

impl<P: PoseSource, V: Presenter, S: LogStorage> Drop for FeedbackLoop<P, V, S> {
    fn drop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            warn!("Feedback loop dropped while running; session discarded");
        }
        self.reactions.cancel_all();
        if let Some(task) = self.frame_task.take() {
            task.abort();
        }
        if let Some(task) = self.demo_task.take() {
            task.abort();
        }
    }
}

/// State the frame task owns for the length of one session
struct FrameLoop<V: Presenter> {
    feedback: FeedbackConfig,
    evaluator: Arc<RuleEvaluator>,
    presenter: Arc<V>,
    running: Arc<AtomicBool>,
    metrics: Arc<RwLock<SessionMetrics>>,
}

impl<V: Presenter> FrameLoop<V> {
    async fn run<P: PoseSource>(self, mut pose: P) -> P {
        let mut gate = FrameGate::from_config(&self.feedback);
        let mut ticker = interval(Duration::from_millis(self.feedback.frame_tick_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let started = Instant::now();
        let mut frames = 0u64;

        loop {
            ticker.tick().await;
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            let now = Instant::now();
            if !gate.admit(now) {
                continue;
            }

            if let Some(keypoints) = pose.latest_keypoints(now - started) {
                self.presenter.draw_pose(&keypoints);
                let hints = self.evaluator.evaluate(&keypoints);
                self.presenter.on_hints(&hints);
                self.metrics.write().await.fold_hints(&hints);
                frames += 1;
            }
            gate.record_iteration(Instant::now(), now.elapsed());
        }

        debug!("Frame loop exited after {} evaluated frames at {} fps", frames, gate.current_fps());
        pose
    }
}
