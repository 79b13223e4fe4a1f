use super::aggregator::{aggregate, error_marker};
use super::augment::FeatureAugmenter;
use super::state::{Lifecycle, Session, TurnGuard};
use super::SessionEvent;
use crate::context::{ContextTag, MessageStore, SystemPromptBuilder};
use crate::error::{Result, SupportError};
use crate::llm::{Completion, CompletionMode, LlmClient, Message};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// How a [`SessionController`] runs its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: CompletionMode,
    /// Start in `AwaitingContext` and return there on reset.
    pub require_context: bool,
    /// Canned assistant message placed after the System message.
    pub greeting: Option<String>,
    /// Send the greeting upstream as part of the transcript.
    pub greeting_in_context: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: CompletionMode::Stream,
            require_context: true,
            greeting: None,
            greeting_in_context: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank or whitespace-only input was rejected. Nothing was stored, no
    /// event was sent and no request was made.
    Rejected,
    Completed { reply: String },
    /// The completion service failed. `reply` carries the error marker and
    /// was committed like any other reply.
    Failed { reply: String, cause: String },
}

impl TurnOutcome {
    pub fn reply(&self) -> Option<&str> {
        match self {
            Self::Rejected => None,
            Self::Completed { reply } | Self::Failed { reply, .. } => Some(reply),
        }
    }
}

/// Owns one [`Session`] and runs its turns.
///
/// Every entry point takes `&mut self`, so turns never overlap.
pub struct SessionController {
    llm: Box<dyn LlmClient>,
    prompts: SystemPromptBuilder,
    augmenter: FeatureAugmenter,
    config: SessionConfig,
    session: Session,
    events: Option<UnboundedSender<SessionEvent>>,
}

impl SessionController {
    pub fn new(llm: Box<dyn LlmClient>, config: SessionConfig) -> Result<Self> {
        Self::with_parts(
            llm,
            SystemPromptBuilder::new(),
            FeatureAugmenter::with_defaults(),
            config,
        )
    }

    pub fn with_parts(
        llm: Box<dyn LlmClient>,
        prompts: SystemPromptBuilder,
        augmenter: FeatureAugmenter,
        config: SessionConfig,
    ) -> Result<Self> {
        let (store, lifecycle) = initial_store(&prompts, &config)?;
        let session = Session::new(store, lifecycle);
        info!(session_id = %session.id(), %lifecycle, "session created");
        Ok(Self {
            llm,
            prompts,
            augmenter,
            config,
            session,
            events: None,
        })
    }

    /// Send [`SessionEvent`]s to `tx` from now on.
    pub fn with_events(mut self, tx: UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Non-system messages in transcript order.
    pub fn transcript(&self) -> std::slice::Iter<'_, Message> {
        self.session.store.all_except_system()
    }

    /// Pick a context and start a fresh transcript for it.
    pub fn select_context(&mut self, tag: &str) -> Result<()> {
        let tag = ContextTag::new(tag)?;
        let store = fresh_store(&self.prompts, self.config.greeting.as_deref(), Some(&tag))?;

        self.session.store = store;
        self.session.lifecycle = Lifecycle::Active;
        info!(session_id = %self.session.id(), context = %tag, "context selected");
        self.session.context = Some(tag);

        self.emit(SessionEvent::StateChanged);
        Ok(())
    }

    /// Run one chat turn.
    ///
    /// Upstream failures do not surface as errors: they end up as a marker in
    /// the committed reply and as [`TurnOutcome::Failed`]. If the returned
    /// future is dropped before completion, the store is left as it was.
    pub async fn submit_turn(&mut self, input: &str) -> Result<TurnOutcome> {
        if input.trim().is_empty() {
            debug!(session_id = %self.session.id(), "blank input ignored");
            return Ok(TurnOutcome::Rejected);
        }
        if self.session.lifecycle == Lifecycle::AwaitingContext {
            return Err(SupportError::ContextRequired);
        }

        let user = Message::user(input)?;
        let mut request = self
            .session
            .store
            .request_messages(self.config.greeting_in_context);
        request.push(user.clone());

        let session_id = self.session.id();
        let mode = self.config.mode;
        let guard = TurnGuard::start(&mut self.session, input, self.events.as_ref());
        debug!(%session_id, messages = request.len(), %mode, "dispatching turn");

        let (reply, failure) =
            run_completion(self.llm.as_ref(), mode, &request, self.events.as_ref()).await;
        let reply = self.augmenter.augment(input, &reply);

        let assistant = Message::assistant(reply.clone())?;
        guard.session.store.append_all([user, assistant])?;
        let len = guard.session.store.len();
        drop(guard);

        info!(%session_id, messages = len, failed = failure.is_some(), "turn committed");
        self.emit(SessionEvent::StateChanged);

        Ok(match failure {
            Some(cause) => TurnOutcome::Failed { reply, cause },
            None => TurnOutcome::Completed { reply },
        })
    }

    /// Drop the transcript and start over.
    pub fn reset_session(&mut self) -> Result<()> {
        let (store, lifecycle) = initial_store(&self.prompts, &self.config)?;

        self.session.store = store;
        self.session.context = None;
        self.session.lifecycle = lifecycle;
        info!(session_id = %self.session.id(), %lifecycle, "session reset");

        self.emit(SessionEvent::StateChanged);
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        emit(self.events.as_ref(), event);
    }
}

fn emit(events: Option<&UnboundedSender<SessionEvent>>, event: SessionEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

/// Store and lifecycle for a session with no context selected yet.
fn initial_store(
    prompts: &SystemPromptBuilder,
    config: &SessionConfig,
) -> Result<(MessageStore, Lifecycle)> {
    if config.require_context {
        Ok((fresh_store(prompts, None, None)?, Lifecycle::AwaitingContext))
    } else {
        Ok((
            fresh_store(prompts, config.greeting.as_deref(), None)?,
            Lifecycle::Active,
        ))
    }
}

fn fresh_store(
    prompts: &SystemPromptBuilder,
    greeting: Option<&str>,
    context: Option<&ContextTag>,
) -> Result<MessageStore> {
    let system = Message::system(prompts.build(context))?;
    let greeting = greeting
        .filter(|g| !g.trim().is_empty())
        .map(Message::assistant)
        .transpose()?;
    MessageStore::with_greeting(system, greeting)
}

/// Ask the completion service for a reply. Always yields non-empty text; the
/// second value is the failure cause when the service did not deliver.
async fn run_completion(
    llm: &dyn LlmClient,
    mode: CompletionMode,
    request: &[Message],
    events: Option<&UnboundedSender<SessionEvent>>,
) -> (String, Option<String>) {
    let (text, mut failure) = match llm.complete(request, mode).await {
        Ok(Completion::Text(text)) => (text, None),
        Ok(Completion::Fragments(fragments)) => {
            let reply = aggregate(fragments, |partial| {
                emit(
                    events,
                    SessionEvent::PartialReply {
                        text: partial.text().to_string(),
                    },
                )
            })
            .await;
            let failure = reply.error().map(str::to_string);
            (reply.into_text(), failure)
        }
        Err(SupportError::Upstream { cause }) => (error_marker(&cause), Some(cause)),
        Err(other) => {
            let cause = other.to_string();
            (error_marker(&cause), Some(cause))
        }
    };

    let text = if failure.is_none() && text.trim().is_empty() {
        let cause = "empty reply from completion service".to_string();
        let marker = error_marker(&cause);
        failure = Some(cause);
        marker
    } else {
        text
    };

    if let Some(ref cause) = failure {
        warn!(%cause, "completion failed");
        emit(
            events,
            SessionEvent::UpstreamFailure {
                cause: cause.clone(),
            },
        );
    }

    (text, failure)
}
