use crate::constants::prompts::ERROR_MARKER_PREFIX;
use crate::error::{Result, SupportError};
use crate::llm::StreamEvent;
use futures::{Stream, StreamExt};
use tracing::trace;

/// The working value of a streamed reply.
///
/// Text only ever grows until the reply is finalized; after that it is frozen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialReply {
    accumulated_text: String,
    finalized: bool,
    error: Option<String>,
}

impl PartialReply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.accumulated_text
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Upstream failure that ended the stream, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn push(&mut self, fragment: &str) -> Result<()> {
        if self.finalized {
            return Err(SupportError::invariant("fragment pushed after finalization"));
        }
        self.accumulated_text.push_str(fragment);
        Ok(())
    }

    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    /// Stop aggregation on an upstream failure, recording a visible marker.
    pub fn fail(&mut self, cause: impl Into<String>) {
        if self.finalized {
            return;
        }
        let cause = cause.into();
        if !self.accumulated_text.is_empty() {
            self.accumulated_text.push_str("\n\n");
        }
        self.accumulated_text.push_str(&error_marker(&cause));
        self.error = Some(cause);
        self.finalized = true;
    }

    pub fn into_text(self) -> String {
        self.accumulated_text
    }
}

/// Render the transcript marker for a failed completion.
pub fn error_marker(cause: &str) -> String {
    format!("{ERROR_MARKER_PREFIX}{cause}]")
}

/// Drain `fragments` into a [`PartialReply`].
///
/// `on_partial` sees the reply after every fragment and once more if the
/// stream fails, so a display can render progressively. A stream that closes
/// without `Done` or `Error` counts as a failure.
pub async fn aggregate<S, F>(mut fragments: S, mut on_partial: F) -> PartialReply
where
    S: Stream<Item = StreamEvent> + Unpin,
    F: FnMut(&PartialReply),
{
    let mut reply = PartialReply::new();

    loop {
        match fragments.next().await {
            Some(StreamEvent::TextDelta(delta)) => {
                if delta.is_empty() {
                    continue;
                }
                // Cannot fail: the reply is only finalized when the loop exits.
                let _ = reply.push(&delta);
                trace!(len = reply.text().len(), "fragment aggregated");
                on_partial(&reply);
            }
            Some(StreamEvent::Done) => {
                reply.finalize();
                break;
            }
            Some(StreamEvent::Error(cause)) => {
                reply.fail(cause);
                on_partial(&reply);
                break;
            }
            None => {
                reply.fail("stream closed before completion");
                on_partial(&reply);
                break;
            }
        }
    }

    reply
}
