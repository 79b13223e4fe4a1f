use anyhow::{Context, Result};
use std::io::{self, Write};
use supportbot_core::{
    Lifecycle, Role, SessionController, SessionEvent, Settings, SupportError, TurnOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::commands::{self, CommandResult};
use crate::theme::Theme;

/// Prints a reply as it streams in.
///
/// Partial replies only ever grow, so each one is printed as the suffix not
/// yet shown.
struct Renderer {
    theme: Theme,
    shown: String,
}

impl Renderer {
    fn new(theme: Theme) -> Self {
        Self {
            theme,
            shown: String::new(),
        }
    }

    fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::TurnStarted { .. } => {
                self.shown.clear();
                print!("{} ", self.theme.role_prefix(Role::Assistant));
            }
            SessionEvent::PartialReply { text } => self.show(&text),
            SessionEvent::UpstreamFailure { cause } => {
                tracing::debug!(%cause, "reply carries an error marker");
            }
            SessionEvent::TurnFinished | SessionEvent::StateChanged => {}
        }
        let _ = io::stdout().flush();
    }

    fn show(&mut self, text: &str) {
        match text.strip_prefix(self.shown.as_str()) {
            Some(suffix) => print!("{suffix}"),
            // Not an extension of what is on screen; start a new line.
            None => print!("\n{text}"),
        }
        self.shown = text.to_string();
    }

    /// Print whatever part of the committed reply has not been shown, such as
    /// appended guidance or the whole reply in batch mode.
    fn finish(&mut self, reply: &str) {
        self.show(reply);
        println!();
        self.shown.clear();
    }

    fn drain(&mut self, rx: &mut UnboundedReceiver<SessionEvent>) {
        while let Ok(event) = rx.try_recv() {
            self.handle(event);
        }
    }
}

/// Run one turn while rendering its events. `None` means the user cancelled.
async fn drive_turn(
    controller: &mut SessionController,
    rx: &mut UnboundedReceiver<SessionEvent>,
    renderer: &mut Renderer,
    input: &str,
) -> Option<supportbot_core::Result<TurnOutcome>> {
    let outcome = {
        let turn = controller.submit_turn(input);
        tokio::pin!(turn);
        loop {
            tokio::select! {
                outcome = &mut turn => break Some(outcome),
                Some(event) = rx.recv() => renderer.handle(event),
                _ = tokio::signal::ctrl_c() => break None,
            }
        }
    };
    renderer.drain(rx);
    outcome
}

fn build_controller(
    settings: &Settings,
) -> Result<(SessionController, UnboundedReceiver<SessionEvent>)> {
    let llm = settings
        .build_llm_client()
        .context("Failed to set up the completion client")?;
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let controller = settings
        .build_session_controller(llm)
        .context("Failed to start a session")?
        .with_events(event_tx);
    Ok((controller, event_rx))
}

// ── Single-prompt mode ──────────────────────────────────────────────────

pub async fn run_single_prompt(
    settings: &Settings,
    prompt: &str,
    industry: Option<&str>,
    theme: Theme,
) -> Result<()> {
    let mut settings = settings.clone();
    if industry.is_none() {
        // Nobody is around to pick an industry; answer in general terms.
        settings.session.require_context = false;
    }

    let (mut controller, mut event_rx) = build_controller(&settings)?;
    if let Some(industry) = industry {
        controller.select_context(industry)?;
    }

    let mut renderer = Renderer::new(theme);
    renderer.drain(&mut event_rx);

    match drive_turn(&mut controller, &mut event_rx, &mut renderer, prompt).await {
        None => anyhow::bail!("cancelled"),
        Some(Ok(TurnOutcome::Rejected)) => anyhow::bail!("prompt is empty"),
        Some(Ok(TurnOutcome::Completed { reply })) => {
            renderer.finish(&reply);
            Ok(())
        }
        Some(Ok(TurnOutcome::Failed { reply, cause })) => {
            renderer.finish(&reply);
            anyhow::bail!("completion failed: {cause}")
        }
        Some(Err(e)) => Err(e.into()),
    }
}

// ── Interactive REPL ────────────────────────────────────────────────────

pub async fn run_repl(settings: Settings, industry: Option<&str>, theme: Theme) -> Result<()> {
    let (mut controller, mut event_rx) = build_controller(&settings)?;
    if let Some(industry) = industry {
        controller.select_context(industry)?;
    }
    let mut renderer = Renderer::new(theme.clone());

    println!(
        "{}",
        theme.paint(
            &format!(
                "supportbot · {} · {} mode · /help for commands",
                controller.model(),
                controller.config().mode
            ),
            theme.muted,
        )
    );
    print_transcript(&controller, &theme);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        renderer.drain(&mut event_rx);
        if controller.session().lifecycle() == Lifecycle::AwaitingContext {
            print_context_menu(&settings.session.contexts, &theme);
        }
        print!("{} ", theme.role_prefix(Role::User));
        io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        match commands::handle_command(&line) {
            CommandResult::Quit => break,
            CommandResult::Message(msg) => println!("{msg}"),
            CommandResult::SelectContext(tag) => select_context(&mut controller, &tag, &theme),
            CommandResult::ListContexts => print_context_menu(&settings.session.contexts, &theme),
            CommandResult::Reset => {
                controller.reset_session()?;
                println!("{}", theme.paint("Conversation reset.", theme.muted));
                print_transcript(&controller, &theme);
            }
            CommandResult::ShowHistory => print_transcript(&controller, &theme),
            CommandResult::ShowStatus => println!("{}", format_status(&controller)),
            CommandResult::NotACommand => {
                if controller.session().lifecycle() == Lifecycle::AwaitingContext {
                    match commands::resolve_context_choice(&line, &settings.session.contexts) {
                        Some(tag) => select_context(&mut controller, &tag, &theme),
                        None if !line.trim().is_empty() => println!(
                            "{}",
                            theme.paint(
                                "Pick a number from the list, or use /industry <name> for another industry.",
                                theme.muted
                            )
                        ),
                        None => {}
                    }
                    continue;
                }

                match drive_turn(&mut controller, &mut event_rx, &mut renderer, &line).await {
                    None => println!("\n{}", theme.paint("(reply cancelled)", theme.muted)),
                    Some(Ok(TurnOutcome::Rejected)) => {}
                    Some(Ok(outcome)) => {
                        if let Some(reply) = outcome.reply() {
                            renderer.finish(reply);
                        }
                    }
                    Some(Err(e)) => print_error(&e, &theme),
                }
            }
        }
    }

    Ok(())
}

fn select_context(controller: &mut SessionController, tag: &str, theme: &Theme) {
    match controller.select_context(tag) {
        Ok(()) => {
            let tag = controller
                .session()
                .context()
                .map(|c| c.to_string())
                .unwrap_or_default();
            println!(
                "{}",
                theme.paint(&format!("Industry set to {tag}. Ask away!"), theme.muted)
            );
            print_transcript(controller, theme);
        }
        Err(e) => print_error(&e, theme),
    }
}

fn print_context_menu(contexts: &[String], theme: &Theme) {
    println!(
        "{}",
        theme.paint(
            "Which industry are you in? Pick a number or type its name:",
            theme.system_color
        )
    );
    for (i, context) in contexts.iter().enumerate() {
        println!("  {}. {context}", i + 1);
    }
}

fn print_transcript(controller: &SessionController, theme: &Theme) {
    for message in controller.transcript() {
        println!("{} {}", theme.role_prefix(message.role()), message.content());
    }
}

fn print_error(err: &SupportError, theme: &Theme) {
    println!("{}", theme.paint(&format!("Error: {err}"), theme.error));
}

fn format_status(controller: &SessionController) -> String {
    let session = controller.session();
    let context = session
        .context()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "(none)".to_string());
    format!(
        "Session:  {}\nIndustry: {}\nState:    {}\nMode:     {}\nModel:    {}\nMessages: {}",
        session.id(),
        context,
        session.lifecycle(),
        controller.config().mode,
        controller.model(),
        controller.transcript().len(),
    )
}
