use crate::error::{Result, SupportError};
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role-tagged entry of a conversation transcript.
///
/// Content is validated at construction: a message never carries blank text.
/// Fields are private so a constructed message cannot be emptied afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(SupportError::invariant(format!(
                "{role} message content must not be empty"
            )));
        }
        Ok(Self { role, content })
    }

    pub fn system(content: impl Into<String>) -> Result<Self> {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Result<Self> {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Result<Self> {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub finish_reason: Option<String>,
}

/// Events emitted during streaming LLM responses.
///
/// A well-formed stream is zero or more `TextDelta`s followed by exactly one
/// terminal event (`Done` or `Error`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    TextDelta(String),
    Done,
    Error(String),
}

/// The lazy fragment sequence handed out by a streaming completion.
pub type FragmentStream = mpsc::UnboundedReceiver<StreamEvent>;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompletionMode {
    Batch,
    #[default]
    Stream,
}

impl fmt::Display for CompletionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batch => f.write_str("batch"),
            Self::Stream => f.write_str("stream"),
        }
    }
}

/// Result of [`LlmClient::complete`]: either the whole reply or its fragments.
pub enum Completion {
    Text(String),
    Fragments(FragmentStream),
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Fragments(_) => f.write_str("Fragments(..)"),
        }
    }
}

/// The completion client trait. Implementations provide both blocking and
/// streaming chat; neither retries on failure.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the transcript and wait for the full reply.
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse>;

    /// Send the transcript and get a stream of events.
    async fn chat_stream(&self, messages: &[Message]) -> Result<FragmentStream>;

    /// Dispatch on `mode`. Every failure surfaces as [`SupportError::Upstream`].
    async fn complete(&self, messages: &[Message], mode: CompletionMode) -> Result<Completion> {
        let completion = match mode {
            CompletionMode::Batch => self.chat(messages).await.map(|r| {
                tracing::debug!(finish_reason = ?r.finish_reason, "batch completion received");
                Completion::Text(r.content)
            }),
            CompletionMode::Stream => self.chat_stream(messages).await.map(Completion::Fragments),
        };
        completion.map_err(|e| match e {
            SupportError::Upstream { .. } => e,
            other => SupportError::upstream(other.to_string()),
        })
    }

    /// Human-readable model identifier, for status output.
    fn model(&self) -> &str {
        "unknown"
    }
}
