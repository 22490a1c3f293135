//! Frame admission for the feedback loop.
//!
//! The loop ticks faster than it evaluates. The gate admits a tick only when
//! a full frame interval has passed since the last admitted one, so the
//! evaluation rate never exceeds the current fps. With `adaptive` on, an
//! iteration slower than its interval drops the rate one step (never below
//! `min_fps`) and every quiet perf window wins a step back (never above
//! `target_fps`).

use guard_shared::config::FeedbackConfig;
use tokio::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FrameGate {
    target_fps: u32,
    min_fps: u32,
    fps: u32,
    adaptive: bool,
    step: u32,
    perf_window: Duration,
    last_admitted: Option<Instant>,
    window_start: Option<Instant>,
    slow_in_window: bool,
}

impl FrameGate {
    pub fn from_config(config: &FeedbackConfig) -> Self {
        let target_fps = config.target_fps.max(1);
        Self {
            target_fps,
            min_fps: config.min_fps.clamp(1, target_fps),
            fps: target_fps,
            adaptive: config.adaptive,
            step: config.fps_step.max(1),
            perf_window: Duration::from_millis(config.perf_window_ms.max(1)),
            last_admitted: None,
            window_start: None,
            slow_in_window: false,
        }
    }

    /// Minimum spacing between admitted frames at the current rate
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }

    pub fn current_fps(&self) -> u32 {
        self.fps
    }

    /// Whether the tick at `now` should be evaluated
    pub fn admit(&mut self, now: Instant) -> bool {
        let due = match self.last_admitted {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval(),
        };
        if due {
            self.last_admitted = Some(now);
            self.window_start.get_or_insert(now);
        }
        due
    }

    /// Feed back how long an admitted iteration took
    pub fn record_iteration(&mut self, now: Instant, took: Duration) {
        if !self.adaptive {
            return;
        }

        if took > self.interval() {
            self.slow_in_window = true;
            let lowered = self.fps.saturating_sub(self.step).max(self.min_fps);
            if lowered != self.fps {
                debug!("Frame took {:?}, lowering rate {} -> {} fps", took, self.fps, lowered);
                self.fps = lowered;
            }
        }

        let window_start = *self.window_start.get_or_insert(now);
        if now.saturating_duration_since(window_start) < self.perf_window {
            return;
        }

        if !self.slow_in_window && self.fps < self.target_fps {
            let raised = (self.fps + self.step).min(self.target_fps);
            debug!("Frames keeping up, raising rate {} -> {} fps", self.fps, raised);
            self.fps = raised;
        }
        self.window_start = Some(now);
        self.slow_in_window = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> FrameGate {
        FrameGate::from_config(&FeedbackConfig::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_tick_admitted() {
        let mut g = gate();
        assert!(g.admit(Instant::now()));
    }

    #[test]
    fn test_admission_never_exceeds_rate() {
        let mut g = gate();
        let start = Instant::now();
        let admitted = (0..=62u64)
            .filter(|i| g.admit(start + ms(i * 16)))
            .count();
        // One second of 16ms ticks at 30 fps
        assert!(admitted <= 31, "admitted {}", admitted);
        assert!(admitted >= 15, "admitted {}", admitted);
    }

    #[test]
    fn test_slow_iterations_lower_rate_to_floor() {
        let mut g = gate();
        let start = Instant::now();
        for i in 0..10u64 {
            g.record_iteration(start + ms(i * 100), ms(200));
        }
        assert_eq!(g.current_fps(), 15);
        assert_eq!(g.interval(), Duration::from_secs(1) / 15);
    }

    #[test]
    fn test_quiet_windows_recover_to_target() {
        let mut g = gate();
        let start = Instant::now();
        g.record_iteration(start, ms(200));
        assert_eq!(g.current_fps(), 25);

        // First window still saw the slow frame
        g.record_iteration(start + ms(1_000), ms(1));
        assert_eq!(g.current_fps(), 25);

        g.record_iteration(start + ms(2_000), ms(1));
        assert_eq!(g.current_fps(), 30);

        g.record_iteration(start + ms(3_000), ms(1));
        assert_eq!(g.current_fps(), 30);
    }

    #[test]
    fn test_fixed_rate_when_not_adaptive() {
        let mut g = FrameGate::from_config(&FeedbackConfig {
            adaptive: false,
            ..FeedbackConfig::default()
        });
        g.record_iteration(Instant::now(), ms(500));
        assert_eq!(g.current_fps(), 30);
    }
}
