use super::SessionEvent;
use crate::context::{ContextTag, MessageStore};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Waiting for the user to pick a context before any chat.
    AwaitingContext,
    Active,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingContext => write!(f, "awaiting context"),
            Self::Active => write!(f, "active"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Idle,
    InProgress,
}

/// State of one conversation. Mutated only through the session controller.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    pub(crate) context: Option<ContextTag>,
    pub(crate) store: MessageStore,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) turn_status: TurnStatus,
    pub(crate) pending_input: Option<String>,
}

impl Session {
    pub(crate) fn new(store: MessageStore, lifecycle: Lifecycle) -> Self {
        Self {
            id: Uuid::new_v4(),
            context: None,
            store,
            lifecycle,
            turn_status: TurnStatus::Idle,
            pending_input: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> Option<&ContextTag> {
        self.context.as_ref()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn turn_status(&self) -> TurnStatus {
        self.turn_status
    }

    /// Input of the turn currently in flight.
    pub fn pending_input(&self) -> Option<&str> {
        self.pending_input.as_deref()
    }
}

/// Marks a turn in progress and restores `Idle` when dropped, including when
/// the turn's future is cancelled.
pub(crate) struct TurnGuard<'a> {
    pub(crate) session: &'a mut Session,
    events: Option<&'a UnboundedSender<SessionEvent>>,
}

impl<'a> TurnGuard<'a> {
    pub(crate) fn start(
        session: &'a mut Session,
        input: &str,
        events: Option<&'a UnboundedSender<SessionEvent>>,
    ) -> Self {
        session.turn_status = TurnStatus::InProgress;
        session.pending_input = Some(input.to_string());
        if let Some(tx) = events {
            let _ = tx.send(SessionEvent::TurnStarted {
                input: input.to_string(),
            });
        }
        Self { session, events }
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.session.turn_status = TurnStatus::Idle;
        self.session.pending_input = None;
        if let Some(tx) = self.events {
            let _ = tx.send(SessionEvent::TurnFinished);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    fn session() -> Session {
        let store = MessageStore::new(Message::system("sys").unwrap()).unwrap();
        Session::new(store, Lifecycle::Active)
    }

    #[test]
    fn guard_restores_idle_on_drop() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut s = session();
        {
            let guard = TurnGuard::start(&mut s, "question", Some(&tx));
            assert_eq!(guard.session.turn_status(), TurnStatus::InProgress);
            assert_eq!(guard.session.pending_input(), Some("question"));
        }
        assert_eq!(s.turn_status(), TurnStatus::Idle);
        assert!(s.pending_input().is_none());

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::TurnStarted {
                input: "question".into()
            }
        );
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::TurnFinished);
    }

    #[test]
    fn sessions_get_distinct_ids() {
        assert_ne!(session().id(), session().id());
    }
}
