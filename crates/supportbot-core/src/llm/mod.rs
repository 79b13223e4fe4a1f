mod traits;
mod openai;
pub mod provider;

pub use traits::*;
pub use openai::OpenAIClient;
pub use provider::ProviderId;
