//! GuardAI runtime: drives pose rules once per admitted frame, injects
//! randomized stress prompts and hands finished sessions to the progress log.
//!
//! All timers run on tokio. Hosts are expected to drive a session from a
//! current-thread runtime, which matches the cooperative model the loop is
//! written for; the shared state is still guarded so a multi-thread runtime
//! stays sound.

pub mod collaborators;
pub mod demo;
pub mod error;
pub mod feedback;
pub mod frame_gate;
pub mod logging;
pub mod reaction;
pub mod scheduler;

pub use collaborators::{PoseSource, Presenter};
pub use error::{CollaboratorError, SessionError};
pub use feedback::{FeedbackLoop, SessionState};
pub use frame_gate::FrameGate;
pub use reaction::ReactionTimer;
pub use scheduler::StressScheduler;
