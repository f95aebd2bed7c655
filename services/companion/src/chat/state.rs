//! services/companion/src/chat/state.rs
//!
//! Defines the turn state machine and the state shared between a
//! conversation and the tasks running its turns.

use chrono::Utc;
use dish_companion_core::{ChatMessage, MessageDraft, MessageId, MessageSink, Sender};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

//=========================================================================================
// Turn State Machine
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Planning,
    /// Working on the step with this index.
    Emitting(usize),
    Completed,
    /// A newer turn started, or the conversation was left.
    Superseded,
}

impl TurnState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Completed | TurnState::Superseded)
    }
}

/// Moves a turn to `next` unless it already reached a terminal state.
/// Returns whether the transition happened.
pub(crate) fn advance(state: &watch::Sender<TurnState>, next: TurnState) -> bool {
    state.send_if_modified(|current| {
        if current.is_terminal() {
            false
        } else {
            *current = next;
            true
        }
    })
}

//=========================================================================================
// Shared Conversation State
//=========================================================================================

/// The turn currently allowed to write to the message sink.
pub(crate) struct ActiveTurn {
    pub id: TurnId,
    pub token: CancellationToken,
    pub state: Arc<watch::Sender<TurnState>>,
}

impl ActiveTurn {
    pub fn supersede(self) {
        self.token.cancel();
        advance(&self.state, TurnState::Superseded);
    }
}

#[derive(Default)]
pub(crate) struct Ledger {
    pub active: Option<ActiveTurn>,
    pub closed: bool,
    next_turn: u64,
    next_message: u64,
}

impl Ledger {
    pub fn next_turn_id(&mut self) -> TurnId {
        self.next_turn += 1;
        TurnId(self.next_turn)
    }

    /// Ids are handed out under the ledger lock, in append order.
    pub fn stamp(&mut self, draft: MessageDraft, sender: Sender) -> ChatMessage {
        self.next_message += 1;
        draft.into_message(MessageId(self.next_message), sender, Utc::now())
    }

    pub fn is_active(&self, turn: TurnId) -> bool {
        !self.closed && self.active.as_ref().is_some_and(|active| active.id == turn)
    }
}

/// The message sink and the ledger guarding who may write to it.
pub(crate) struct Shared {
    pub sink: Arc<dyn MessageSink>,
    pub ledger: Mutex<Ledger>,
}

impl Shared {
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self {
            sink,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Runs `action` only while `turn` is still the active one. The check and
    /// the action happen under one lock, so a newer turn cannot slip in
    /// between them.
    pub async fn if_active<F, R>(&self, turn: TurnId, action: F) -> Option<R>
    where
        F: FnOnce(&mut Ledger, &dyn MessageSink) -> R,
    {
        let mut ledger = self.ledger.lock().await;
        if !ledger.is_active(turn) {
            return None;
        }
        Some(action(&mut ledger, self.sink.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_absorb_transitions() {
        let (state, _rx) = watch::channel(TurnState::Idle);
        assert!(advance(&state, TurnState::Planning));
        assert!(advance(&state, TurnState::Emitting(0)));
        assert!(advance(&state, TurnState::Superseded));
        assert!(!advance(&state, TurnState::Completed));
        assert!(!advance(&state, TurnState::Emitting(1)));
        assert_eq!(*state.borrow(), TurnState::Superseded);
    }

    #[test]
    fn message_ids_increase() {
        let mut ledger = Ledger::default();
        let first = ledger.stamp(MessageDraft::text("a"), Sender::User);
        let second = ledger.stamp(MessageDraft::text("b"), Sender::Agent);
        assert!(second.id > first.id);
        assert_ne!(ledger.next_turn_id(), ledger.next_turn_id());
    }
}
