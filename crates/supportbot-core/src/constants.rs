//! Centralized constants for supportbot.
//! Model names, endpoints, prompt text and canned guidance live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
    pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
    pub const DEFAULT_TOGETHER_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo";
    pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o";
    pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
    pub const DEFAULT_LMSTUDIO_MODEL: &str = "local-model";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com";
    pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai";
    pub const TOGETHER_BASE_URL: &str = "https://api.together.xyz";
    pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";
    pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
    pub const LMSTUDIO_BASE_URL: &str = "http://localhost:1234";

    /// Path appended to every base URL.
    pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const TIMEOUT_SECS: u64 = 60;
    pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

    /// Industries offered for context selection.
    pub const CONTEXTS: &[&str] = &[
        "Finance",
        "Retail",
        "Manufacturing",
        "Healthcare",
        "Hospitality",
        "Logistics",
    ];
}

// ─── Prompts ──────────────────────────────────────────────────────────────────

pub mod prompts {
    pub const BASE_PERSONA: &str = "\
You are an expert assistant for Odoo post-implementation support. \
You have access to the full Odoo documentation and can help users with issues, \
configurations, best practices, and troubleshooting. \
Provide clear, step-by-step solutions based on the official documentation. \
If unsure, politely suggest checking with Odoo support or official forums.";

    /// Prefix of the visible marker written into the transcript when the
    /// completion service fails.
    pub const ERROR_MARKER_PREFIX: &str = "[Error: ";
}

// ─── Guidance Blocks ──────────────────────────────────────────────────────────

pub mod guidance {
    /// Default keyword → guidance mapping, in declaration order.
    pub const DEFAULT_RULES: &[(&str, &str)] = &[
        (
            "inventory",
            "**Inventory tip:** Check Inventory > Configuration > Settings to confirm \
             that multi-step routes and storage locations are enabled before adjusting \
             stock. Use Inventory > Operations > Physical Inventory for counts.",
        ),
        (
            "sales",
            "**Sales tip:** Quotation templates, pricelists and invoicing policy live under \
             Sales > Configuration > Settings. Confirm the invoicing policy (ordered vs. \
             delivered quantities) matches your process.",
        ),
        (
            "accounting",
            "**Accounting tip:** Reconcile bank statements from the Accounting dashboard \
             and lock past periods under Accounting > Configuration > Settings > Fiscal \
             Periods once they are closed.",
        ),
        (
            "purchase",
            "**Purchase tip:** Enable purchase agreements and 3-way matching under \
             Purchase > Configuration > Settings to control vendor bills against receipts.",
        ),
        (
            "manufacturing",
            "**Manufacturing tip:** Verify bills of materials and work center capacity \
             under Manufacturing > Products before scheduling manufacturing orders.",
        ),
    ];
}
