use crate::error::{Result, SupportError};
use crate::llm::{Message, Role};

/// Ordered, append-only transcript for one session.
///
/// Index 0 always holds the single System message. The only way to shrink the
/// store is [`MessageStore::reset`], which replaces everything at once.
#[derive(Debug, Clone)]
pub struct MessageStore {
    messages: Vec<Message>,
    // Whether index 1 holds the canned greeting rather than a real reply.
    has_greeting: bool,
}

impl MessageStore {
    pub fn new(system: Message) -> Result<Self> {
        Self::with_greeting(system, None)
    }

    /// A store holding the System message followed by an optional greeting
    /// from the assistant.
    pub fn with_greeting(system: Message, greeting: Option<Message>) -> Result<Self> {
        ensure_system(&system)?;
        if let Some(ref g) = greeting {
            if g.role() != Role::Assistant {
                return Err(SupportError::invariant(format!(
                    "greeting must be an assistant message, got {}",
                    g.role()
                )));
            }
        }

        let mut messages = Vec::with_capacity(2);
        messages.push(system);
        let has_greeting = greeting.is_some();
        messages.extend(greeting);
        Ok(Self {
            messages,
            has_greeting,
        })
    }

    /// Replace the whole transcript with a fresh System message.
    pub fn reset(&mut self, system: Message) -> Result<()> {
        self.reset_with_greeting(system, None)
    }

    /// Replace the whole transcript with a fresh System message followed by an
    /// optional greeting. On error the store is left untouched.
    pub fn reset_with_greeting(&mut self, system: Message, greeting: Option<Message>) -> Result<()> {
        *self = Self::with_greeting(system, greeting)?;
        Ok(())
    }

    pub fn append(&mut self, message: Message) -> Result<()> {
        if message.is_system() {
            return Err(SupportError::invariant(
                "a System message already exists at position 0",
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Append several messages, all or nothing.
    pub fn append_all(&mut self, messages: impl IntoIterator<Item = Message>) -> Result<()> {
        let messages: Vec<Message> = messages.into_iter().collect();
        if messages.iter().any(Message::is_system) {
            return Err(SupportError::invariant(
                "a System message already exists at position 0",
            ));
        }
        self.messages.extend(messages);
        Ok(())
    }

    /// Non-system messages in order, for display. The iterator is `Clone`, so
    /// it can be restarted without touching the store.
    pub fn all_except_system(&self) -> std::slice::Iter<'_, Message> {
        self.messages[1..].iter()
    }

    /// Full transcript including the System message.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The transcript to send upstream. The greeting is left out unless
    /// `include_greeting` is set.
    pub fn request_messages(&self, include_greeting: bool) -> Vec<Message> {
        self.messages
            .iter()
            .enumerate()
            .filter(|(i, _)| include_greeting || !(self.has_greeting && *i == 1))
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn system_message(&self) -> &Message {
        &self.messages[0]
    }

    pub fn has_greeting(&self) -> bool {
        self.has_greeting
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.all_except_system().last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false: the System message is never removed.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn ensure_system(message: &Message) -> Result<()> {
    if message.is_system() {
        Ok(())
    } else {
        Err(SupportError::invariant(format!(
            "store must start with a System message, got {}",
            message.role()
        )))
    }
}
