use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{defaults, guidance, prompts};
use crate::context::SystemPromptBuilder;
use crate::error::{Result, SupportError};
use crate::llm::{CompletionMode, LlmClient, OpenAIClient, ProviderId};
use crate::session::{FeatureAugmenter, GuidanceRule, SessionConfig, SessionController};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub session: SessionSettings,
    /// Keyword guidance, applied in this order.
    pub guidance: Vec<GuidanceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: String,
    /// Falls back to the provider's default model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Falls back to the provider's usual variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub mode: CompletionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    pub require_context: bool,
    pub contexts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greeting: Option<String>,
    pub greeting_in_context: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuidanceEntry {
    pub keyword: String,
    pub block: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            session: SessionSettings::default(),
            guidance: guidance::DEFAULT_RULES
                .iter()
                .map(|(keyword, block)| GuidanceEntry {
                    keyword: keyword.to_string(),
                    block: block.to_string(),
                })
                .collect(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            api_key_env: None,
            base_url: None,
            mode: CompletionMode::Stream,
            temperature: None,
            timeout_secs: defaults::TIMEOUT_SECS,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            require_context: true,
            contexts: defaults::CONTEXTS.iter().map(|c| c.to_string()).collect(),
            greeting: None,
            greeting_in_context: false,
            base_prompt: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("supportbot")
            .join("config.toml")
    }

    /// Load from the default location. Problems fall back to defaults.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Load from `path`. A missing file yields defaults; a malformed one is an
    /// error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| SupportError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SupportError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn provider(&self) -> ProviderId {
        match ProviderId::from_str(&self.llm.provider) {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }

    pub fn model(&self) -> String {
        match self.llm.model {
            Some(ref model) => model.clone(),
            None => self.provider().default_model().to_string(),
        }
    }

    /// Name of the environment variable holding the API key. Empty when the
    /// provider takes no key.
    pub fn api_key_env(&self) -> String {
        match self.llm.api_key_env {
            Some(ref name) => name.clone(),
            None => self.provider().default_api_key_env().to_string(),
        }
    }

    /// Get the API key from the environment variable specified in settings.
    pub fn api_key(&self) -> Option<String> {
        let name = self.api_key_env();
        if name.is_empty() {
            return None;
        }
        std::env::var(&name).ok().filter(|key| !key.trim().is_empty())
    }

    /// Build an LLM client from the current settings.
    pub fn build_llm_client(&self) -> Result<Box<dyn LlmClient>> {
        let provider = self.provider();
        let api_key = self.api_key();
        if provider.needs_api_key() && api_key.is_none() {
            return Err(SupportError::Config(format!(
                "{} requires an API key; set {}",
                provider.name(),
                self.api_key_env()
            )));
        }

        let base_url = match self.llm.base_url {
            Some(ref url) => url.clone(),
            None if provider.default_base_url().is_empty() => {
                return Err(SupportError::Config(format!(
                    "provider {:?} has no default endpoint; set llm.base_url",
                    self.llm.provider
                )));
            }
            None => provider.default_base_url().to_string(),
        };

        if self.llm.timeout_secs == 0 {
            return Err(SupportError::Config("llm.timeout_secs must be > 0".into()));
        }

        debug!(provider = %provider, model = %self.model(), %base_url, "building LLM client");
        let client = OpenAIClient::new(api_key)
            .with_model(self.model())
            .with_base_url(base_url)
            .with_temperature(self.llm.temperature)
            .with_timeout(Duration::from_secs(self.llm.timeout_secs))?;
        Ok(Box::new(client))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            mode: self.llm.mode,
            require_context: self.session.require_context,
            greeting: self.session.greeting.clone(),
            greeting_in_context: self.session.greeting_in_context,
        }
    }

    pub fn prompt_builder(&self) -> SystemPromptBuilder {
        SystemPromptBuilder::new().with_base_persona(
            self.session
                .base_prompt
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(prompts::BASE_PERSONA),
        )
    }

    pub fn augmenter(&self) -> FeatureAugmenter {
        FeatureAugmenter::new(
            self.guidance
                .iter()
                .map(|entry| GuidanceRule::new(&entry.keyword, entry.block.clone())),
        )
    }

    /// Wire a controller from these settings around `llm`.
    pub fn build_session_controller(&self, llm: Box<dyn LlmClient>) -> Result<SessionController> {
        SessionController::with_parts(
            llm,
            self.prompt_builder(),
            self.augmenter(),
            self.session_config(),
        )
    }
}
