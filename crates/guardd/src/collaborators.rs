//! Interfaces to the parts of the system outside the core: the pose
//! estimator on one side and whatever renders feedback on the other.

use crate::error::CollaboratorError;
use guard_shared::achievements::Achievement;
use guard_shared::{Hint, KeypointSet, Severity, StressEvent};
use std::time::Duration;

/// Supplies one keypoint set per frame
pub trait PoseSource: Send + 'static {
    /// Acquire the camera and load the model
    fn open(&mut self) -> Result<(), CollaboratorError> {
        Ok(())
    }

    /// Latest detection for the frame at `frame_ts` since session start.
    /// `None` when nobody was detected; that is not an error.
    fn latest_keypoints(&mut self, frame_ts: Duration) -> Option<KeypointSet>;

    /// Release the camera
    fn close(&mut self) {}
}

/// Presentation boundary; also the draw capability for the skeleton overlay
pub trait Presenter: Send + Sync + 'static {
    fn on_hints(&self, hints: &[Hint]);

    fn on_stress_event(&self, event: &StressEvent);

    fn on_status(&self, _message: &str, _severity: Severity) {}

    fn draw_pose(&self, _keypoints: &KeypointSet) {}

    fn on_achievement(&self, _achievement: &Achievement) {}
}
