use supportbot_cli::commands::{handle_command, resolve_context_choice, CommandResult};
use supportbot_cli::Theme;

// ========================================================================
// Command Parsing Tests (commands.rs)
// ========================================================================

#[test]
fn test_help_command() {
    let result = handle_command("/help");
    match result {
        CommandResult::Message(msg) => {
            assert!(msg.contains("supportbot commands"));
            assert!(msg.contains("/industry"));
            assert!(msg.contains("/reset"));
        }
        other => panic!("expected help text, got {other:?}"),
    }
}

#[test]
fn test_help_command_short_alias() {
    assert!(matches!(handle_command("/h"), CommandResult::Message(_)));
}

#[test]
fn test_quit_aliases() {
    for cmd in ["/quit", "/exit", "/q"] {
        assert_eq!(handle_command(cmd), CommandResult::Quit, "{cmd}");
    }
}

#[test]
fn test_industry_command_keeps_full_argument() {
    assert_eq!(
        handle_command("/industry  Food & Beverage "),
        CommandResult::SelectContext("Food & Beverage".into())
    );
}

#[test]
fn test_industry_command_without_argument_shows_usage() {
    match handle_command("/industry") {
        CommandResult::Message(msg) => assert!(msg.contains("Usage")),
        other => panic!("expected usage, got {other:?}"),
    }
}

#[test]
fn test_session_commands() {
    assert_eq!(handle_command("/industries"), CommandResult::ListContexts);
    assert_eq!(handle_command("/reset"), CommandResult::Reset);
    assert_eq!(handle_command("/new"), CommandResult::Reset);
    assert_eq!(handle_command("/history"), CommandResult::ShowHistory);
    assert_eq!(handle_command("/status"), CommandResult::ShowStatus);
}

#[test]
fn test_version_command() {
    match handle_command("/version") {
        CommandResult::Message(msg) => assert!(msg.starts_with("supportbot v")),
        other => panic!("expected version, got {other:?}"),
    }
}

#[test]
fn test_unknown_command() {
    match handle_command("/frobnicate") {
        CommandResult::Message(msg) => assert!(msg.contains("Unknown command: /frobnicate")),
        other => panic!("expected error message, got {other:?}"),
    }
}

#[test]
fn test_plain_text_is_not_a_command() {
    assert_eq!(
        handle_command("How do I configure inventory routes?"),
        CommandResult::NotACommand
    );
    assert_eq!(handle_command(""), CommandResult::NotACommand);
}

// ========================================================================
// Context Choice Tests (commands.rs)
// ========================================================================

fn offered() -> Vec<String> {
    vec!["Finance".into(), "Retail".into(), "Healthcare".into()]
}

#[test]
fn test_choice_by_number() {
    assert_eq!(resolve_context_choice("2", &offered()), Some("Retail".into()));
    assert_eq!(resolve_context_choice(" 1 ", &offered()), Some("Finance".into()));
}

#[test]
fn test_choice_number_out_of_range() {
    assert_eq!(resolve_context_choice("0", &offered()), None);
    assert_eq!(resolve_context_choice("4", &offered()), None);
}

#[test]
fn test_choice_by_name_is_case_insensitive() {
    assert_eq!(
        resolve_context_choice("healthcare", &offered()),
        Some("Healthcare".into())
    );
}

#[test]
fn test_free_text_is_not_an_industry() {
    // A question typed before picking must not become the industry.
    assert_eq!(
        resolve_context_choice("How do I export invoices?", &offered()),
        None
    );
    assert_eq!(resolve_context_choice("Agriculture", &offered()), None);
    assert_eq!(resolve_context_choice("   ", &offered()), None);
}

#[test]
fn test_custom_industry_goes_through_command() {
    assert_eq!(
        handle_command("/industry Agriculture"),
        CommandResult::SelectContext("Agriculture".into())
    );
}

// ========================================================================
// Theme Tests (theme.rs)
// ========================================================================

#[test]
fn test_theme_by_name_falls_back_to_dark() {
    assert_eq!(Theme::by_name("light").name, "light");
    assert_eq!(Theme::by_name("plain").name, "plain");
    assert_eq!(Theme::by_name("nonexistent").name, "dark");
    for name in Theme::all_names() {
        assert_eq!(Theme::by_name(name).name, *name);
    }
}
