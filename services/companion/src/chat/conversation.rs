//! services/companion/src/chat/conversation.rs
//!
//! The entry point for user input. A conversation owns the message sink
//! writer rights: the user's own messages are appended here, agent messages
//! only by the one turn task that is currently active.

use crate::chat::{
    state::{ActiveTurn, Shared, TurnId, TurnState},
    turn_task::{turn_process, Responder, TurnContext},
};
use crate::error::ClientError;
use dish_companion_core::{DishDescription, MessageDraft, MessageSink, Sender, TurnTiming};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

/// A handle on one started turn.
pub struct TurnHandle {
    id: TurnId,
    state: watch::Receiver<TurnState>,
    task: JoinHandle<TurnState>,
}

impl TurnHandle {
    pub fn id(&self) -> TurnId {
        self.id
    }

    pub fn state(&self) -> TurnState {
        *self.state.borrow()
    }

    /// Waits for the turn to reach a terminal state.
    pub async fn finished(self) -> TurnState {
        match self.task.await {
            Ok(state) => state,
            Err(e) => {
                error!("{} task failed: {}", self.id, e);
                let last = *self.state.borrow();
                if last.is_terminal() {
                    last
                } else {
                    TurnState::Superseded
                }
            }
        }
    }
}

pub struct Conversation {
    id: Uuid,
    shared: Arc<Shared>,
    responder: Responder,
    timing: TurnTiming,
    location: Option<String>,
}

impl Conversation {
    pub fn new(sink: Arc<dyn MessageSink>, responder: Responder) -> Self {
        Self {
            id: Uuid::new_v4(),
            shared: Arc::new(Shared::new(sink)),
            responder,
            timing: TurnTiming::default(),
            location: None,
        }
    }

    pub fn with_timing(mut self, timing: TurnTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Sent along with every recognition request.
    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Starts a new turn for `input`.
    ///
    /// Blank input is rejected before anything is appended. Otherwise any
    /// unfinished turn is superseded, the user's message is appended, the
    /// typing indicator is shown and the reply is produced in the background.
    pub async fn submit(&self, input: &str) -> Result<TurnHandle, ClientError> {
        let description = DishDescription::parse(input)?;

        let (id, token, state_tx, state_rx) = {
            let mut ledger = self.shared.ledger.lock().await;
            if ledger.closed {
                return Err(ClientError::ConversationClosed);
            }
            if let Some(previous) = ledger.active.take() {
                info!("Conversation {}: {} superseded.", self.id, previous.id);
                previous.supersede();
            }

            let id = ledger.next_turn_id();
            let token = CancellationToken::new();
            let (state_tx, state_rx) = watch::channel(TurnState::Idle);
            let state_tx = Arc::new(state_tx);
            ledger.active = Some(ActiveTurn {
                id,
                token: token.clone(),
                state: state_tx.clone(),
            });

            let message = ledger.stamp(MessageDraft::text(input), Sender::User);
            self.shared.sink.append_message(message);
            self.shared.sink.set_typing_indicator(true);
            (id, token, state_tx, state_rx)
        };
        info!("Conversation {}: {} started.", self.id, id);

        let context = TurnContext {
            id,
            input: description,
            shared: self.shared.clone(),
            token,
            state: state_tx,
            responder: self.responder.clone(),
            timing: self.timing,
            location: self.location.clone(),
        };
        let task = tokio::spawn(turn_process(context));

        Ok(TurnHandle {
            id,
            state: state_rx,
            task,
        })
    }

    /// The turn currently allowed to append, if any.
    pub async fn active_turn(&self) -> Option<TurnId> {
        self.shared.ledger.lock().await.active.as_ref().map(|turn| turn.id)
    }

    /// Leaves the conversation: the active turn stops at its next step
    /// boundary and further input is refused.
    pub async fn close(&self) {
        let mut ledger = self.shared.ledger.lock().await;
        if ledger.closed {
            return;
        }
        ledger.closed = true;
        if let Some(active) = ledger.active.take() {
            info!("Conversation {}: {} cancelled on close.", self.id, active.id);
            active.supersede();
            self.shared.sink.set_typing_indicator(false);
        }
        info!("Conversation {} closed.", self.id);
    }

    pub async fn is_closed(&self) -> bool {
        self.shared.ledger.lock().await.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MessageLog;
    use dish_companion_core::FixedPicker;

    fn offline(log: &Arc<MessageLog>) -> Conversation {
        Conversation::new(log.clone(), Responder::Offline(Arc::new(FixedPicker(0))))
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_appends_nothing() {
        let log = Arc::new(MessageLog::new());
        let conversation = offline(&log);

        for input in ["", "   ", "\n\t"] {
            let result = conversation.submit(input).await;
            assert!(matches!(result, Err(ClientError::Validation(_))));
        }
        assert!(log.events().is_empty());
        assert_eq!(conversation.active_turn().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_conversations_refuse_input_and_stop_the_active_turn() {
        let log = Arc::new(MessageLog::new());
        let conversation = offline(&log);

        let turn = conversation.submit("something tasty").await.unwrap();
        conversation.close().await;
        assert!(conversation.is_closed().await);

        assert_eq!(turn.finished().await, TurnState::Superseded);
        assert_eq!(log.messages().len(), 1);
        assert!(!log.is_typing());
        assert!(matches!(
            conversation.submit("again").await,
            Err(ClientError::ConversationClosed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn offline_turns_reply_from_the_table() {
        let log = Arc::new(MessageLog::new());
        let conversation = offline(&log);

        let turn = conversation.submit("Anything vegan?").await.unwrap();
        assert_eq!(turn.finished().await, TurnState::Completed);

        let messages = log.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, Sender::Agent);
        assert!(messages[1].text.as_deref().unwrap().contains("vegan options"));
        assert!(!log.is_typing());
        assert_eq!(conversation.active_turn().await, None);
    }
}
