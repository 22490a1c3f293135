//! Error types for the GuardAI runtime.

use guard_shared::GuardError;
use thiserror::Error;

/// Failures reported by the pose collaborator while opening
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("pose model failed to load: {0}")]
    ModelLoad(String),
}

impl CollaboratorError {
    /// Status line shown to the trainee
    pub fn user_message(&self) -> &'static str {
        match self {
            CollaboratorError::PermissionDenied => "Camera access denied. Try demo mode instead.",
            CollaboratorError::CameraUnavailable(_) => "No camera available.",
            CollaboratorError::ModelLoad(_) => "Failed to load AI model. Try demo mode.",
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("a training session is already running")]
    AlreadyRunning,

    #[error("collaborator failed: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("pose source lost after an aborted frame loop")]
    PoseSourceLost,

    #[error("failed to persist session: {0}")]
    Persist(#[from] GuardError),
}
