//! services/companion/src/api/client.rs
//!
//! The single point of contact for the dish backend. Each method maps to one
//! backend operation and performs exactly one network call; retries are left
//! to the caller.

use crate::api::{
    decoder::decode,
    transport::Transport,
    wire::{DishAnalysisRecord, DishRecognitionRecord, HealthRecord, RecognizeDishBody},
};
use crate::config::{parse_base_url, Config, ConfigError, DEFAULT_RECOGNIZE_PATH, DEFAULT_TIMEOUT};
use async_trait::async_trait;
use dish_companion_core::ports::{ApiFailure, HttpExchange, HttpMethod, HttpRequest};
use dish_companion_core::{
    ApiResponse, DishAnalysis, DishDescription, DishRecognitionResult, DishRecognitionService,
    HealthStatus,
};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const ROOT_PATH: &str = "/";
pub const ANALYZE_DISH_PATH: &str = "/api/analyze-dish";

const MIN_TIMEOUT: Duration = Duration::from_millis(1);

pub struct ApiClient {
    transport: Transport,
    base_url: RwLock<Url>,
    recognize_path: String,
    timeout: Duration,
    user_id: Option<String>,
}

impl ApiClient {
    pub fn new(exchange: Arc<dyn HttpExchange>, base_url: Url) -> Self {
        Self {
            transport: Transport::new(exchange),
            base_url: RwLock::new(base_url),
            recognize_path: DEFAULT_RECOGNIZE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_id: None,
        }
    }

    pub fn from_config(exchange: Arc<dyn HttpExchange>, config: &Config) -> Self {
        Self::new(exchange, config.api_base_url.clone())
            .with_recognize_path(config.recognize_path.clone())
            .with_timeout(config.request_timeout)
            .with_user_id(config.user_id.clone())
    }

    /// Zero is not a usable bound and is raised to one millisecond.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            warn!("A zero request timeout was given; using {:?} instead.", MIN_TIMEOUT);
        }
        self.timeout = timeout.max(MIN_TIMEOUT);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn with_recognize_path(mut self, path: impl Into<String>) -> Self {
        self.recognize_path = path.into();
        self
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn base_url(&self) -> Url {
        self.base_url
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Swaps the backend address. Calls already in flight keep the address
    /// they started with.
    pub fn set_base_url(&self, raw: &str) -> Result<(), ConfigError> {
        let url = parse_base_url(raw)
            .map_err(|e| ConfigError::InvalidValue("API_BASE_URL".to_string(), e))?;
        info!("Switching API base URL to {}", url);
        *self
            .base_url
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = url;
        Ok(())
    }

    /// Liveness probe: `GET /`.
    pub async fn health_check(&self) -> ApiResponse<HealthStatus> {
        let request = self.request(HttpMethod::Get, ROOT_PATH, None);
        let raw = self.transport.send(&request).await?;
        decode::<HealthRecord>(raw).map(HealthRecord::to_domain)
    }

    /// Identifies a dish from a description and lists restaurants serving it.
    pub async fn recognize_dish(
        &self,
        description: &DishDescription,
        location: Option<&str>,
    ) -> ApiResponse<DishRecognitionResult> {
        let body = RecognizeDishBody {
            description: description.as_str(),
            location,
            user_id: self.user_id.as_deref(),
        };
        let body = serde_json::to_string(&body)
            .map_err(|e| ApiFailure::transport(format!("Failed to serialize request body: {}", e)))?;

        let request = self.request(HttpMethod::Post, &self.recognize_path, Some(body));
        let raw = self.transport.send(&request).await?;
        let result = decode::<DishRecognitionRecord>(raw).map(DishRecognitionRecord::to_domain)?;
        debug!(
            "Recognized '{}' with {} restaurant(s)",
            result.dish_name,
            result.restaurants.len()
        );
        Ok(result)
    }

    /// Detailed analysis of the demo dish: `GET /api/analyze-dish`.
    pub async fn analyze_dish(&self) -> ApiResponse<DishAnalysis> {
        let request = self.request(HttpMethod::Get, ANALYZE_DISH_PATH, None);
        let raw = self.transport.send(&request).await?;
        decode::<DishAnalysisRecord>(raw).map(DishAnalysisRecord::to_domain)
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let base = self.base_url();
        HttpRequest {
            method,
            url: format!("{}{}", base.as_str().trim_end_matches('/'), path),
            body,
            timeout: self.timeout,
        }
    }
}

#[async_trait]
impl DishRecognitionService for ApiClient {
    async fn recognize_dish(
        &self,
        description: &DishDescription,
        location: Option<&str>,
    ) -> ApiResponse<DishRecognitionResult> {
        ApiClient::recognize_dish(self, description, location).await
    }
}
