use crate::constants::prompts;
use crate::error::{Result, SupportError};
use std::fmt;

/// A selected conversation context, e.g. an industry label.
///
/// Always non-blank. Surrounding whitespace is trimmed; everything else is
/// kept verbatim so the tag can be quoted back in the system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextTag(String);

impl ContextTag {
    pub fn new(tag: impl AsRef<str>) -> Result<Self> {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SupportError::InvalidContext(tag.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the system prompt for a support session.
///
/// `build` is a pure function of the builder's configuration and the selected
/// context, so rebuilding after a context change always yields the same text.
#[derive(Debug, Clone)]
pub struct SystemPromptBuilder {
    base_persona: String,
    custom_instructions: Option<String>,
}

impl SystemPromptBuilder {
    pub fn new() -> Self {
        Self {
            base_persona: prompts::BASE_PERSONA.to_string(),
            custom_instructions: None,
        }
    }

    pub fn with_base_persona(mut self, persona: impl Into<String>) -> Self {
        self.base_persona = persona.into();
        self
    }

    pub fn with_custom_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.custom_instructions = Some(instructions.into());
        self
    }

    pub fn build(&self, context: Option<&ContextTag>) -> String {
        let mut prompt = String::with_capacity(1024);
        prompt.push_str(self.base_persona.trim());

        match context {
            Some(tag) => {
                prompt.push_str("\n\n## Client Context\n");
                prompt.push_str(&format!(
                    "The user works in the {tag} industry. Tailor terminology, examples and \
                     recommended configurations to {tag} businesses, and keep the tone suited \
                     to {tag} professionals.\n"
                ));
            }
            None => prompt.push_str(GENERAL_CONTEXT),
        }

        prompt.push_str(RESPONSE_GUIDELINES);

        if let Some(ref instructions) = self.custom_instructions {
            prompt.push_str("\n\n## Additional Instructions\n");
            prompt.push_str(instructions);
        }

        prompt
    }
}

impl Default for SystemPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

const GENERAL_CONTEXT: &str = "\n\n## Client Context
No industry has been selected. Give answers that apply to any business, \
and ask a clarifying question when the right answer depends on the industry.\n";

const RESPONSE_GUIDELINES: &str = "\n## Response Guidelines
- Start with the direct answer, then the steps.
- Name menus and settings exactly as they appear in Odoo.
- Keep answers short unless the user asks for detail.";
