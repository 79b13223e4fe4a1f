pub mod aggregator;
pub mod augment;
mod controller;
mod state;

pub use aggregator::{aggregate, error_marker, PartialReply};
pub use augment::{FeatureAugmenter, GuidanceRule};
pub use controller::{SessionConfig, SessionController, TurnOutcome};
pub use state::{Lifecycle, Session, TurnStatus};

/// Notifications for the display layer, sent on an unbounded channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Context, lifecycle or transcript changed; re-read the session.
    StateChanged,
    /// A turn began; the display should block re-submission.
    TurnStarted { input: String },
    /// The reply so far during a streaming turn. Each value extends the last.
    PartialReply { text: String },
    /// The completion service failed; the marker is already in the reply.
    UpstreamFailure { cause: String },
    TurnFinished,
}
