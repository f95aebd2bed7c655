//! services/companion/src/adapters/memory.rs
//!
//! An in-memory message store: the append-only log plus the typing flag.
//! Useful to embed the conversation in another front end and in tests.

use dish_companion_core::{ChatMessage, MessageSink};
use std::sync::{Mutex, MutexGuard};

/// Every call made on the sink, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Appended(ChatMessage),
    Typing(bool),
}

#[derive(Debug, Default)]
pub struct MessageLog {
    events: Mutex<Vec<SinkEvent>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Appended(message) => Some(message.clone()),
                SinkEvent::Typing(_) => None,
            })
            .collect()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().clone()
    }

    /// The indicator as last set; hidden if it was never touched.
    pub fn is_typing(&self) -> bool {
        self.lock()
            .iter()
            .rev()
            .find_map(|event| match event {
                SinkEvent::Typing(visible) => Some(*visible),
                SinkEvent::Appended(_) => None,
            })
            .unwrap_or(false)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SinkEvent>> {
        // Appending cannot leave the log half-written, so a poisoned lock is still usable.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MessageSink for MessageLog {
    fn append_message(&self, message: ChatMessage) {
        self.lock().push(SinkEvent::Appended(message));
    }

    fn set_typing_indicator(&self, visible: bool) {
        self.lock().push(SinkEvent::Typing(visible));
    }
}
