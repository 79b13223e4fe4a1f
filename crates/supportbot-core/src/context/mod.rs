mod store;
pub mod system_prompt;

pub use store::MessageStore;
pub use system_prompt::{ContextTag, SystemPromptBuilder};
