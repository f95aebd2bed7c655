//! crates/dish_companion_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any HTTP client or serialization format;
//! the service crate maps its wire records onto them.

use chrono::{DateTime, Utc};
use std::fmt;

//=========================================================================================
// Backend Results
//=========================================================================================

/// A restaurant suggested by the backend. Compared structurally for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestaurantRef {
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub distance: Option<String>,
}

/// The outcome of identifying a dish from a free-text description.
#[derive(Debug, Clone, PartialEq)]
pub struct DishRecognitionResult {
    pub dish_name: String,
    pub dish_description: Option<String>,
    /// Possibly empty.
    pub restaurants: Vec<RestaurantRef>,
    /// Expected to lie in `[0, 1]` when present.
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarDish {
    pub dish_name: String,
    pub similarity_score: f64,
    pub similarity_reason: String,
}

/// The richer analysis payload returned by the dish analysis endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DishAnalysis {
    pub dish_name: String,
    pub dish_description: String,
    pub taste_profile: String,
    pub ingredients: Vec<String>,
    pub allergens: Vec<String>,
    pub dietary_tags: Vec<String>,
    pub similar_dishes: Vec<SimilarDish>,
    pub historical_background: Option<String>,
    pub fun_facts: Vec<String>,
    pub ingredient_origins: Option<String>,
    pub warnings: Vec<String>,
    pub processing_time_seconds: Option<f64>,
}

/// Liveness information reported by the backend root endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub message: String,
    pub status: String,
}

//=========================================================================================
// Chat Messages
//=========================================================================================

/// Identifier of a chat message, strictly increasing within one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Image,
    RichCard,
}

/// Structured payload attached to image-bearing or card messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardData {
    Restaurant(RestaurantRef),
    NearbyRestaurants(Vec<RestaurantRef>),
}

/// A message without identity yet. The conversation turns drafts into
/// `ChatMessage`s at the moment they are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub kind: MessageKind,
    pub text: Option<String>,
    pub image_ref: Option<String>,
    pub card: Option<CardData>,
}

impl MessageDraft {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            text: Some(text.into()),
            image_ref: None,
            card: None,
        }
    }

    pub fn image(text: impl Into<String>, image_ref: impl Into<String>, card: Option<CardData>) -> Self {
        Self {
            kind: MessageKind::Image,
            text: Some(text.into()),
            image_ref: Some(image_ref.into()),
            card,
        }
    }

    /// Stamps the draft with its identity. Messages are immutable afterwards.
    pub fn into_message(self, id: MessageId, sender: Sender, created_at: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id,
            sender,
            kind: self.kind,
            text: self.text,
            image_ref: self.image_ref,
            card: self.card,
            created_at,
        }
    }
}

/// Represents a single entry of the append-only conversation log.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: Sender,
    pub kind: MessageKind,
    pub text: Option<String>,
    pub image_ref: Option<String>,
    pub card: Option<CardData>,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Validated Input
//=========================================================================================

/// Raised when a caller hands over input that must never reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Description is required")]
    EmptyDescription,
}

/// A dish description that is guaranteed to be non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DishDescription(String);

impl DishDescription {
    /// Accepts any text that is non-empty after trimming. The original text is
    /// kept verbatim.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DishDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
