//! services/companion/src/adapters/http.rs
//!
//! This module contains the adapter that performs real HTTP exchanges with
//! `reqwest`. It implements the `HttpExchange` port from the `core` crate.

use async_trait::async_trait;
use dish_companion_core::ports::{ApiFailure, HttpExchange, HttpMethod, HttpRequest, RawResponse};
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::debug;

use crate::error::ClientError;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `HttpExchange` port on top of `reqwest`.
#[derive(Clone)]
pub struct ReqwestExchange {
    client: Client,
}

impl ReqwestExchange {
    /// Creates a new `ReqwestExchange` with a default client.
    pub fn new() -> Result<Self, ClientError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ClientError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Reuses an existing client (and its connection pool).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

//=========================================================================================
// `HttpExchange` Trait Implementation
//=========================================================================================

#[async_trait]
impl HttpExchange for ReqwestExchange {
    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse, ApiFailure> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        }
        .header(CONTENT_TYPE, "application/json");

        let builder = match &request.body {
            Some(body) => builder.body(body.clone()),
            None => builder,
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        debug!("{} {} -> {}", method_name(request.method), request.url, status);

        // reqwest does not expose the reason phrase sent on the wire, so the
        // canonical phrase for the status stands in for the status line text.
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text,
            body: body.to_vec(),
        })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> ApiFailure {
    if error.is_timeout() {
        ApiFailure::timeout()
    } else {
        ApiFailure::transport(error.to_string())
    }
}

fn method_name(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Get => "GET",
        HttpMethod::Post => "POST",
    }
}
