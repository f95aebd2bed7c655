//! services/companion/src/api/transport.rs
//!
//! Performs one HTTP exchange under a hard timeout.

use dish_companion_core::ports::{ApiFailure, HttpExchange, HttpRequest, RawResponse};
use std::sync::Arc;
use tracing::warn;

/// Races every exchange against its request's timeout. When the timer wins,
/// the exchange future is dropped, which aborts the in-flight call; the
/// timer itself lives inside the race and is released on both paths.
#[derive(Clone)]
pub struct Transport {
    exchange: Arc<dyn HttpExchange>,
}

impl Transport {
    pub fn new(exchange: Arc<dyn HttpExchange>) -> Self {
        Self { exchange }
    }

    pub async fn send(&self, request: &HttpRequest) -> Result<RawResponse, ApiFailure> {
        match tokio::time::timeout(request.timeout, self.exchange.execute(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(failure)) => {
                warn!("Request to {} failed: {}", request.url, failure);
                Err(failure)
            }
            Err(_) => {
                warn!(
                    "Request to {} timed out after {:?}",
                    request.url, request.timeout
                );
                Err(ApiFailure::timeout())
            }
        }
    }
}
