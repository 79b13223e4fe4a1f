/// Result of processing a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Quit the application.
    Quit,
    /// Pick an industry and start a fresh conversation.
    SelectContext(String),
    /// List the industries on offer.
    ListContexts,
    /// Start over.
    Reset,
    /// Print the transcript.
    ShowHistory,
    /// Show context, lifecycle, mode and model.
    ShowStatus,
    /// Not a command - treat as regular input.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,

        "/industry" | "/context" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /industry <name>\nSee /industries for suggestions.".into())
            } else {
                CommandResult::SelectContext(arg.to_string())
            }
        }
        "/industries" | "/contexts" => CommandResult::ListContexts,
        "/reset" | "/new" => CommandResult::Reset,
        "/history" => CommandResult::ShowHistory,
        "/status" => CommandResult::ShowStatus,
        "/version" => CommandResult::Message(format!("supportbot v{}", env!("CARGO_PKG_VERSION"))),

        _ => {
            if input.starts_with('/') {
                CommandResult::Message(format!("Unknown command: {cmd}. Type /help for commands."))
            } else {
                CommandResult::NotACommand
            }
        }
    }
}

/// Interpret a line typed while no industry is selected.
///
/// A number picks from `offered` (1-based) and a name matches
/// case-insensitively. Other text resolves to `None`; custom industries go
/// through `/industry <name>`.
pub fn resolve_context_choice(input: &str, offered: &[String]) -> Option<String> {
    let choice = input.trim();
    if choice.is_empty() {
        return None;
    }
    if let Ok(n) = choice.parse::<usize>() {
        return (1..=offered.len())
            .contains(&n)
            .then(|| offered[n - 1].clone());
    }
    offered.iter().find(|c| c.eq_ignore_ascii_case(choice)).cloned()
}

fn show_help() -> CommandResult {
    let help_text = "\
╭─ supportbot commands ──────────────────────────────────────────╮

  CONVERSATION
    /industry <name>          Pick an industry (starts a fresh chat)
    /industries               List suggested industries
    /reset, /new              Clear the conversation and start over
    /history                  Print the conversation so far

  INFO
    /status                   Show industry, state, mode and model
    /version                  Show version information

  OTHER
    /help, /h                 Show this help message
    /exit, /quit, /q          Quit

  Anything else is sent to the assistant. Ctrl-C cancels a reply.

╰────────────────────────────────────────────────────────────────╯";

    CommandResult::Message(help_text.into())
}
