//! Single-slot lifecycle of one outbound wave.

pub mod lifecycle;
pub mod transitions;
pub mod types;

pub use lifecycle::{SubmissionLifecycle, SubmissionSettings, SubmitRejected, ABANDONED_REASON};
pub use transitions::{SubmissionTransition, TransitionError};
pub use types::{SubmissionPhase, SubmissionState};
