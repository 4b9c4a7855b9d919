use tracing::debug;

use super::{EditContext, ListContinuation, TypingSession};
use crate::annotation::AnnotationKind;
use crate::editor::buffer::EditDelta;

/// A live controller subscribed to user edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Typing(TypingSession),
    Continuation(ListContinuation),
}

impl Session {
    /// The annotation kind this session creates.
    pub const fn kind(&self) -> AnnotationKind {
        match self {
            Self::Typing(session) => session.style().kind(),
            Self::Continuation(list) => list.style().kind(),
        }
    }

    fn observe(&mut self, ctx: &mut EditContext<'_>, delta: EditDelta) {
        match self {
            Self::Typing(session) => {
                session.observe(ctx.store, delta);
            }
            Self::Continuation(list) => {
                list.observe(ctx, delta);
            }
        }
    }
}

/// Every armed session, notified in the order they were armed.
///
/// Several sessions may be armed at once, including two of the same kind.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, session: Session) {
        debug!(kind = %session.kind(), armed = self.sessions.len() + 1, "session armed");
        self.sessions.push(session);
    }

    /// Disarm every session regardless of kind. Returns how many were cleared.
    pub fn clear_all(&mut self) -> usize {
        let cleared = self.sessions.len();
        self.sessions.clear();
        debug!(cleared, "all sessions cleared");
        cleared
    }

    pub fn is_armed(&self, kind: AnnotationKind) -> bool {
        self.sessions.iter().any(|s| s.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    /// Let every armed session react to a user edit already applied to the store.
    pub fn notify(&mut self, ctx: &mut EditContext<'_>, delta: EditDelta) {
        for session in &mut self.sessions {
            session.observe(ctx, delta);
        }
    }
}
