//! services/companion/src/error.rs
//!
//! Defines the primary error type for the companion client.

use crate::config::ConfigError;
use dish_companion_core::ValidationError;

/// The primary error type for the `companion` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input rejected before any network activity.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Input arrived after the conversation was left.
    #[error("The conversation has been closed")]
    ConversationClosed,

    /// Represents a standard Input/Output error (e.g., reading the console).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
