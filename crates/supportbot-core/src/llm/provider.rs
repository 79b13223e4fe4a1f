use crate::constants::{defaults, endpoints, models};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifies an OpenAI-compatible completion backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAI,
    Groq,
    Together,
    OpenRouter,
    Ollama,
    LmStudio,
    Custom(String),
}

impl ProviderId {
    pub fn name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Groq => "Groq",
            Self::Together => "Together.ai",
            Self::OpenRouter => "OpenRouter",
            Self::Ollama => "Ollama (Local)",
            Self::LmStudio => "LM Studio (Local)",
            Self::Custom(name) => name,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Ollama | Self::LmStudio)
    }

    pub fn needs_api_key(&self) -> bool {
        !self.is_local() && !matches!(self, Self::Custom(_))
    }

    pub fn default_base_url(&self) -> &str {
        match self {
            Self::OpenAI => endpoints::OPENAI_BASE_URL,
            Self::Groq => endpoints::GROQ_BASE_URL,
            Self::Together => endpoints::TOGETHER_BASE_URL,
            Self::OpenRouter => endpoints::OPENROUTER_BASE_URL,
            Self::Ollama => endpoints::OLLAMA_BASE_URL,
            Self::LmStudio => endpoints::LMSTUDIO_BASE_URL,
            Self::Custom(_) => "",
        }
    }

    pub fn default_api_key_env(&self) -> &str {
        match self {
            Self::OpenAI => defaults::API_KEY_ENV,
            Self::Groq => "GROQ_API_KEY",
            Self::Together => "TOGETHER_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Ollama | Self::LmStudio | Self::Custom(_) => "",
        }
    }

    pub fn default_model(&self) -> &str {
        match self {
            Self::OpenAI | Self::Custom(_) => models::DEFAULT_OPENAI_MODEL,
            Self::Groq => models::DEFAULT_GROQ_MODEL,
            Self::Together => models::DEFAULT_TOGETHER_MODEL,
            Self::OpenRouter => models::DEFAULT_OPENROUTER_MODEL,
            Self::Ollama => models::DEFAULT_OLLAMA_MODEL,
            Self::LmStudio => models::DEFAULT_LMSTUDIO_MODEL,
        }
    }

    pub fn all_builtin() -> Vec<ProviderId> {
        vec![
            Self::OpenAI,
            Self::Groq,
            Self::Together,
            Self::OpenRouter,
            Self::Ollama,
            Self::LmStudio,
        ]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ProviderId {
    type Err = std::convert::Infallible;

    /// Unknown names become [`ProviderId::Custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "openai" => Self::OpenAI,
            "groq" => Self::Groq,
            "together" => Self::Together,
            "openrouter" => Self::OpenRouter,
            "ollama" => Self::Ollama,
            "lmstudio" | "lm_studio" | "lm-studio" => Self::LmStudio,
            other => Self::Custom(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_providers_need_no_key() {
        assert!(!ProviderId::Ollama.needs_api_key());
        assert!(!ProviderId::LmStudio.needs_api_key());
        assert!(ProviderId::OpenAI.needs_api_key());
        assert_eq!(ProviderId::Ollama.default_api_key_env(), "");
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("OpenAI".parse::<ProviderId>().unwrap(), ProviderId::OpenAI);
        assert_eq!("lm-studio".parse::<ProviderId>().unwrap(), ProviderId::LmStudio);
        assert_eq!(
            "my-gateway".parse::<ProviderId>().unwrap(),
            ProviderId::Custom("my-gateway".into())
        );
    }

    #[test]
    fn builtin_providers_have_endpoints() {
        for id in ProviderId::all_builtin() {
            assert!(id.default_base_url().starts_with("http"), "{id}");
            assert!(!id.default_model().is_empty());
        }
    }
}
