// Library interface for supportbot-cli
// This allows integration tests to access internal modules

// commands.rs and theme.rs are also declared in main.rs, so point at the same
// source files instead of loading them twice.

#[path = "commands.rs"]
pub mod commands;

#[path = "theme.rs"]
pub mod theme;

pub use commands::{handle_command, resolve_context_choice, CommandResult};
pub use theme::Theme;
