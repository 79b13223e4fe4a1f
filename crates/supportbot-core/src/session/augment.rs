use crate::constants::guidance::DEFAULT_RULES;
use tracing::debug;

/// One keyword trigger and the block it appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidanceRule {
    keyword: String,
    block: String,
}

impl GuidanceRule {
    /// The keyword is stored lowercased; matching is case-insensitive.
    pub fn new(keyword: impl AsRef<str>, block: impl Into<String>) -> Self {
        Self {
            keyword: keyword.as_ref().trim().to_lowercase(),
            block: block.into(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn block(&self) -> &str {
        &self.block
    }
}

/// Appends canned guidance to a reply based on keywords in the user's input.
///
/// Rules apply in declaration order and each one contributes at most once,
/// whatever the reply says.
#[derive(Debug, Clone, Default)]
pub struct FeatureAugmenter {
    rules: Vec<GuidanceRule>,
}

impl FeatureAugmenter {
    pub fn new(rules: impl IntoIterator<Item = GuidanceRule>) -> Self {
        let rules = rules
            .into_iter()
            // An empty keyword would match every input.
            .filter(|r| !r.keyword.is_empty())
            .collect();
        Self { rules }
    }

    /// Augmenter built from the stock ERP guidance blocks.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RULES.iter().map(|(k, b)| GuidanceRule::new(k, *b)))
    }

    pub fn rules(&self) -> &[GuidanceRule] {
        &self.rules
    }

    /// Rules whose keyword occurs in `user_text`, in declaration order.
    pub fn matching<'a>(&'a self, user_text: &str) -> impl Iterator<Item = &'a GuidanceRule> + 'a {
        let lowered = user_text.to_lowercase();
        self.rules
            .iter()
            .filter(move |rule| lowered.contains(&rule.keyword))
    }

    pub fn augment(&self, user_text: &str, reply_text: &str) -> String {
        let mut out = reply_text.to_string();
        let mut appended = 0usize;
        for rule in self.matching(user_text) {
            out.push_str("\n\n");
            out.push_str(&rule.block);
            appended += 1;
        }
        if appended > 0 {
            debug!(blocks = appended, "guidance appended to reply");
        }
        out
    }
}
