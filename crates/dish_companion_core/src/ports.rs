//! crates/dish_companion_core/src/ports.rs
//!
//! Defines the service contracts (traits) at the edges of the companion core.
//! The HTTP exchange, the dish backend and the UI-owned message store are all
//! reached through these traits so the conversation logic can be driven by
//! in-memory fakes.

use crate::domain::{ChatMessage, DishDescription, DishRecognitionResult};
use async_trait::async_trait;
use std::time::Duration;

//=========================================================================================
// Typed API Failure and Result Types
//=========================================================================================

/// Status code used when no HTTP response was obtained at all.
pub const NO_RESPONSE_STATUS: u16 = 0;

/// Status code used when a successful response carried an unreadable body.
pub const BAD_PAYLOAD_STATUS: u16 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request did not complete within its timeout.
    Timeout,
    /// DNS, connection, TLS or any other failure before a response arrived.
    Transport,
    /// The server answered with a non-success status.
    Protocol,
    /// The server answered with success but the body could not be parsed.
    Decode,
}

/// The error half of every API call. Exactly one of `Ok`/`Err` is populated
/// by construction of `ApiResponse`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (status {status_code})")]
pub struct ApiFailure {
    pub kind: FailureKind,
    pub status_code: u16,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiFailure {
    pub fn timeout() -> Self {
        Self {
            kind: FailureKind::Timeout,
            status_code: NO_RESPONSE_STATUS,
            message: "Request timeout".to_string(),
            detail: Some("The request took too long to complete".to_string()),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            status_code: NO_RESPONSE_STATUS,
            message: message.into(),
            detail: None,
        }
    }

    pub fn protocol(status_code: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Protocol,
            status_code,
            message: format!("HTTP {}", status_code),
            detail: Some(detail.into()),
        }
    }

    pub fn bad_payload() -> Self {
        Self {
            kind: FailureKind::Decode,
            status_code: BAD_PAYLOAD_STATUS,
            message: "Failed to parse response".to_string(),
            detail: Some("Invalid response body".to_string()),
        }
    }

    /// True for a local timeout as well as a server-reported 408.
    pub fn is_timeout(&self) -> bool {
        self.kind == FailureKind::Timeout || self.status_code == 408
    }
}

/// The outcome of one backend operation.
pub type ApiResponse<T> = Result<T, ApiFailure>;

//=========================================================================================
// HTTP Exchange Port
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An outbound request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Already-serialized JSON body.
    pub body: Option<String>,
    pub timeout: Duration,
}

/// A completed HTTP exchange, before any interpretation of the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// The reason phrase of the status line, e.g. "Not Found". May be empty.
    pub status_text: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpExchange: Send + Sync {
    /// Performs a single network exchange. Implementations map every
    /// transport-level problem to an `ApiFailure` with `NO_RESPONSE_STATUS`.
    /// Timeouts are enforced by the caller.
    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, ApiFailure>;
}

//=========================================================================================
// Backend and Message Store Ports
//=========================================================================================

#[async_trait]
pub trait DishRecognitionService: Send + Sync {
    /// Identifies a dish from a description and suggests restaurants.
    async fn recognize_dish(
        &self,
        description: &DishDescription,
        location: Option<&str>,
    ) -> ApiResponse<DishRecognitionResult>;
}

/// The UI-owned, append-only message log plus its typing indicator.
/// Both calls are fire-and-forget.
pub trait MessageSink: Send + Sync {
    fn append_message(&self, message: ChatMessage);
    fn set_typing_indicator(&self, visible: bool);
}
