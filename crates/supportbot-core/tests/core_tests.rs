use supportbot_core::config::{GuidanceEntry, Settings};
use supportbot_core::*;
use tempfile::TempDir;

// ========================================================================
// Settings Tests (config/mod.rs)
// ========================================================================

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();

    assert_eq!(settings.llm.provider, "openai");
    assert_eq!(settings.llm.mode, CompletionMode::Stream);
    assert_eq!(settings.llm.timeout_secs, 60);
    assert!(settings.llm.base_url.is_none());
    assert_eq!(settings.model(), "gpt-4o");

    assert!(settings.session.require_context);
    assert!(!settings.session.greeting_in_context);
    assert!(settings.session.contexts.iter().any(|c| c == "Finance"));

    let keywords: Vec<&str> = settings.guidance.iter().map(|g| g.keyword.as_str()).collect();
    assert_eq!(
        keywords,
        vec!["inventory", "sales", "accounting", "purchase", "manufacturing"]
    );
}

#[test]
fn test_settings_load_from_missing_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings::load_from(&temp_dir.path().join("nope.toml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_settings_save_and_reload_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.toml");

    let mut settings = Settings::default();
    settings.llm.provider = "groq".into();
    settings.llm.model = Some("llama-3.1-8b-instant".into());
    settings.llm.mode = CompletionMode::Batch;
    settings.llm.temperature = Some(0.25);
    settings.session.require_context = false;
    settings.session.greeting = Some("Hi! Ask me about Odoo.".into());
    settings.guidance = vec![GuidanceEntry {
        keyword: "payroll".into(),
        block: "**Payroll tip:** check salary structures.".into(),
    }];

    settings.save_to(&path).unwrap();
    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.provider(), ProviderId::Groq);
    assert_eq!(loaded.api_key_env(), "GROQ_API_KEY");
}

#[test]
fn test_settings_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[llm]
provider = "ollama"
mode = "batch"

[session]
greeting = "Welcome!"
"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.provider(), ProviderId::Ollama);
    assert_eq!(settings.model(), "llama3.2");
    assert_eq!(settings.llm.mode, CompletionMode::Batch);
    assert_eq!(settings.llm.timeout_secs, 60);
    assert!(settings.session.require_context);
    assert_eq!(settings.session.greeting.as_deref(), Some("Welcome!"));
    assert_eq!(settings.guidance.len(), 5);
}

#[test]
fn test_settings_malformed_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[llm\nprovider = ").unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(matches!(err, SupportError::Config(_)));
}

#[test]
fn test_guidance_order_comes_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[[guidance]]
keyword = "Purchase"
block = "P"

[[guidance]]
keyword = "inventory"
block = "I"
"#,
    )
    .unwrap();

    let augmenter = Settings::load_from(&path).unwrap().augmenter();
    assert_eq!(
        augmenter.augment("inventory and purchase", "reply"),
        "reply\n\nP\n\nI"
    );
}

#[test]
fn test_session_config_mirrors_settings() {
    let mut settings = Settings::default();
    settings.llm.mode = CompletionMode::Batch;
    settings.session.greeting_in_context = true;

    let config = settings.session_config();
    assert_eq!(config.mode, CompletionMode::Batch);
    assert!(config.require_context);
    assert!(config.greeting_in_context);
}

// ========================================================================
// Prompt Builder Tests (context/system_prompt.rs)
// ========================================================================

#[test]
fn test_prompt_builder_is_idempotent() {
    let builder = Settings::default().prompt_builder();
    let tag = ContextTag::new("Manufacturing").unwrap();
    assert_eq!(builder.build(Some(&tag)), builder.build(Some(&tag)));
    assert_eq!(builder.build(None), builder.build(None));
}

#[test]
fn test_base_prompt_override() {
    let mut settings = Settings::default();
    settings.session.base_prompt = Some("You are a warehouse expert.".into());
    let prompt = settings.prompt_builder().build(None);
    assert!(prompt.starts_with("You are a warehouse expert."));
    assert!(!prompt.contains("Odoo post-implementation"));
}

// ========================================================================
// Message Store Tests (context/store.rs)
// ========================================================================

#[test]
fn test_store_reset_lengths() {
    let mut store = MessageStore::new(Message::system("a").unwrap()).unwrap();
    store.append(Message::user("q").unwrap()).unwrap();
    store.append(Message::assistant("r").unwrap()).unwrap();
    assert_eq!(store.len(), 3);

    store.reset(Message::system("b").unwrap()).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.system_message().content(), "b");

    store
        .reset_with_greeting(
            Message::system("c").unwrap(),
            Some(Message::assistant("hello").unwrap()),
        )
        .unwrap();
    assert_eq!(store.len(), 2);
    assert!(store.has_greeting());
}

#[test]
fn test_store_rejects_user_greeting() {
    let mut store = MessageStore::new(Message::system("a").unwrap()).unwrap();
    let err = store
        .reset_with_greeting(
            Message::system("b").unwrap(),
            Some(Message::user("not a greeting").unwrap()),
        )
        .unwrap_err();
    assert!(matches!(err, SupportError::InvariantViolation(_)));
    assert_eq!(store.system_message().content(), "a");
}

#[test]
fn test_blank_message_rejected() {
    assert!(Message::user("").is_err());
    assert!(Message::assistant(" \n ").is_err());
}

// ========================================================================
// Provider Tests (llm/provider.rs)
// ========================================================================

#[test]
fn test_provider_parsing_and_keys() {
    assert_eq!("OpenRouter".parse::<ProviderId>().unwrap(), ProviderId::OpenRouter);
    assert_eq!(
        "my-proxy".parse::<ProviderId>().unwrap(),
        ProviderId::Custom("my-proxy".into())
    );
    assert!(ProviderId::OpenAI.needs_api_key());
    assert!(!ProviderId::Ollama.needs_api_key());
}
