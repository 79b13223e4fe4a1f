pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod llm;
pub mod session;

// Re-export key types
pub use config::Settings;
pub use context::{ContextTag, MessageStore, SystemPromptBuilder};
pub use error::{Result, SupportError};
pub use llm::{
    Completion, CompletionMode, FragmentStream, LlmClient, LlmResponse, Message, OpenAIClient,
    ProviderId, Role, StreamEvent,
};
pub use session::{
    FeatureAugmenter, Lifecycle, PartialReply, Session, SessionConfig, SessionController,
    SessionEvent, TurnOutcome, TurnStatus,
};
