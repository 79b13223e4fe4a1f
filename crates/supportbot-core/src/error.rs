use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupportError {
    /// Internal state was about to break a store or lifecycle invariant.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Any failure talking to the completion service.
    #[error("Upstream error: {cause}")]
    Upstream { cause: String },

    #[error("A context must be selected before chatting")]
    ContextRequired,

    #[error("Invalid context tag: {0:?}")]
    InvalidContext(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SupportError {
    pub fn upstream(cause: impl Into<String>) -> Self {
        Self::Upstream {
            cause: cause.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}

// Transport failures collapse into the single upstream kind.
impl From<reqwest::Error> for SupportError {
    fn from(err: reqwest::Error) -> Self {
        Self::upstream(error_chain(&err))
    }
}

/// Render an error with all of its sources, outermost first, joined by `: `.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // Some wrappers repeat their source in their own message.
        if !out.ends_with(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

pub type Result<T> = std::result::Result<T, SupportError>;
