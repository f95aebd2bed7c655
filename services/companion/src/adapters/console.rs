//! services/companion/src/adapters/console.rs
//!
//! A message sink that renders the conversation on standard output.

use dish_companion_core::{CardData, ChatMessage, MessageKind, MessageSink, Sender};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct ConsoleSink {
    typing: AtomicBool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageSink for ConsoleSink {
    fn append_message(&self, message: ChatMessage) {
        let rendered = render(&message);
        let mut stdout = std::io::stdout().lock();
        // A closed stdout only means nobody is watching anymore.
        let _ = writeln!(stdout, "{}", rendered);
        let _ = stdout.flush();
    }

    fn set_typing_indicator(&self, visible: bool) {
        let was_visible = self.typing.swap(visible, Ordering::SeqCst);
        if visible && !was_visible {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "Juho is typing...");
            let _ = stdout.flush();
        }
    }
}

/// Formats one message as console lines.
pub fn render(message: &ChatMessage) -> String {
    let speaker = match message.sender {
        Sender::User => "You",
        Sender::Agent => "Juho",
    };
    let mut lines = vec![format!(
        "[{}] {}: {}",
        message.created_at.format("%H:%M:%S"),
        speaker,
        message.text.as_deref().unwrap_or_default()
    )];

    if message.kind != MessageKind::Text {
        if let Some(image_ref) = &message.image_ref {
            lines.push(format!("    (image: {})", image_ref));
        }
    }
    if let Some(CardData::NearbyRestaurants(places)) = &message.card {
        for place in places {
            lines.push(format!(
                "    * {} {}",
                place.name,
                place.distance.as_deref().unwrap_or_default()
            ));
        }
    }
    lines.join("\n")
}
