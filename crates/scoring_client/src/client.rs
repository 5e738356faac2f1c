//! Scoring service client
//!
//! Typed wrapper over the inference API. Endpoints:
//!
//! - `GET  /health` - service liveness and loaded models
//! - `GET  /models/status` - license and per-model availability
//! - `POST /predict/fraud` - fraud risk score for a payment transaction
//! - `POST /predict/pricing` - room pricing recommendation

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use core_kernel::{
    AdapterHealth, CircuitBreakerConfig, DomainPort, HealthCheckResult, HealthCheckable,
    PortError,
};

use crate::config::ScoringConfig;

/// License key header expected by the inference service
const LICENSE_HEADER: &str = "X-License-Key";

/// Circuit breaker state for fault tolerance
#[derive(Debug)]
struct CircuitBreaker {
    config: CircuitBreakerConfig,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    is_open: AtomicBool,
    last_failure_time: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            is_open: AtomicBool::new(false),
            last_failure_time: RwLock::new(None),
        }
    }

    async fn is_available(&self) -> bool {
        if !self.is_open.load(Ordering::Relaxed) {
            return true;
        }

        // Check if timeout has elapsed
        let last_failure = self.last_failure_time.read().await;
        if let Some(time) = *last_failure {
            if time.elapsed() > Duration::from_secs(self.config.reset_timeout_secs) {
                // Half-open state: allow one request through
                return true;
            }
        }

        false
    }

    fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        let success = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
        if success >= self.config.success_threshold as u64 {
            self.is_open.store(false, Ordering::Relaxed);
            self.success_count.store(0, Ordering::Relaxed);
        }
    }

    async fn record_failure(&self) {
        self.success_count.store(0, Ordering::Relaxed);
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.config.failure_threshold as u64 {
            self.is_open.store(true, Ordering::Relaxed);
            *self.last_failure_time.write().await = Some(Instant::now());
        }
    }
}

/// Client for the external AI scoring service
///
/// Cheap to clone; the underlying reqwest client pools connections.
///
/// # Example
///
/// ```rust,ignore
/// use scoring_client::{ScoringClient, ScoringConfig, FraudScoreRequest};
///
/// let client = ScoringClient::new(ScoringConfig::new(
///     "http://127.0.0.1:8000",
///     std::env::var("SCORING_LICENSE_KEY")?,
/// ));
///
/// let score = client.predict_fraud(&request).await?;
/// if score.fraud_flag {
///     // hold the payment for review
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScoringClient {
    config: ScoringConfig,
    client: Client,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
}

impl ScoringClient {
    /// Creates a new scoring client with the given configuration
    pub fn new(config: ScoringConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("reqwest client construction cannot fail with static options");

        let circuit_breaker = config
            .circuit_breaker
            .clone()
            .map(|cb| Arc::new(CircuitBreaker::new(cb)));

        Self {
            config,
            client,
            circuit_breaker,
        }
    }

    /// Returns the base URL of the scoring service
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Checks if the circuit breaker is open (blocking requests)
    pub async fn is_circuit_open(&self) -> bool {
        if let Some(ref cb) = self.circuit_breaker {
            !cb.is_available().await
        } else {
            false
        }
    }

    /// Service liveness and loaded model names
    pub async fn health(&self) -> Result<ServiceHealth, PortError> {
        self.get_json("health").await
    }

    /// License validity and per-model availability
    pub async fn model_status(&self) -> Result<ModelStatusResponse, PortError> {
        self.get_json("models/status").await
    }

    /// Scores a payment transaction for fraud risk
    pub async fn predict_fraud(
        &self,
        request: &FraudScoreRequest,
    ) -> Result<FraudScoreResponse, PortError> {
        let response: FraudScoreResponse = self.post_json("predict/fraud", request).await?;
        debug!(
            transaction_id = %request.transaction_id,
            fraud_probability = response.fraud_probability,
            action = ?response.recommended_action,
            "fraud score received"
        );
        Ok(response)
    }

    /// Requests a room pricing recommendation
    pub async fn predict_pricing(
        &self,
        request: &PricingRequest,
    ) -> Result<PricingResponse, PortError> {
        self.post_json("predict/pricing", request).await
    }

    async fn check_circuit(&self) -> Result<(), PortError> {
        if let Some(ref cb) = self.circuit_breaker {
            if !cb.is_available().await {
                return Err(PortError::ServiceUnavailable {
                    service: "scoring service circuit breaker is open".to_string(),
                });
            }
        }
        Ok(())
    }

    async fn record_outcome(&self, ok: bool) {
        if let Some(ref cb) = self.circuit_breaker {
            if ok {
                cb.record_success();
            } else {
                cb.record_failure().await;
            }
        }
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, PortError> {
        self.check_circuit().await?;

        let url = format!("{}/{}", self.config.base_url, path);
        let result = self
            .client
            .get(&url)
            .header(LICENSE_HEADER, &self.config.license_key)
            .send()
            .await;

        self.handle_response(path, result).await
    }

    async fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R, PortError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.check_circuit().await?;

        let url = format!("{}/{}", self.config.base_url, path);
        let result = self
            .client
            .post(&url)
            .header(LICENSE_HEADER, &self.config.license_key)
            .json(body)
            .send()
            .await;

        self.handle_response(path, result).await
    }

    async fn handle_response<R: DeserializeOwned>(
        &self,
        path: &str,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<R, PortError> {
        let response = match result {
            Ok(response) => response,
            Err(error) => {
                self.record_outcome(false).await;
                return Err(map_transport_error(path, error, self.config.timeout_secs));
            }
        };

        let status = response.status();
        if status.is_success() {
            let parsed = response.json::<R>().await.map_err(|e| {
                PortError::internal(format!("malformed scoring response for {}: {}", path, e))
            });
            self.record_outcome(parsed.is_ok()).await;
            return parsed;
        }

        // Surface the FastAPI error detail when present
        let detail = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.detail)
            .unwrap_or_else(|_| status.to_string());
        warn!(path, %status, detail, "scoring service returned an error");

        let transient = status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS;
        self.record_outcome(!transient).await;

        Err(map_status(status, path, detail))
    }
}

impl DomainPort for ScoringClient {}

#[async_trait]
impl HealthCheckable for ScoringClient {
    /// Performs a health check against the scoring service
    ///
    /// Calls the /health endpoint to verify connectivity and responsiveness.
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();

        if self.is_circuit_open().await {
            return HealthCheckResult {
                adapter_id: "scoring-client".to_string(),
                status: AdapterHealth::Degraded,
                latency_ms: 0,
                message: Some("Circuit breaker is open".to_string()),
                checked_at: Utc::now(),
            };
        }

        let result = self.health().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(health) => HealthCheckResult {
                adapter_id: "scoring-client".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: Some(format!("{} models loaded", health.models_loaded.len())),
                checked_at: Utc::now(),
            },
            Err(error) => HealthCheckResult {
                adapter_id: "scoring-client".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(error.to_string()),
                checked_at: Utc::now(),
            },
        }
    }
}

fn map_transport_error(path: &str, error: reqwest::Error, timeout_secs: u64) -> PortError {
    if error.is_timeout() {
        PortError::Timeout {
            operation: path.to_string(),
            duration_ms: timeout_secs * 1000,
        }
    } else if error.is_connect() {
        PortError::Connection {
            message: format!("scoring service unreachable: {}", error),
            source: Some(Box::new(error)),
        }
    } else {
        PortError::Internal {
            message: format!("scoring request failed: {}", error),
            source: Some(Box::new(error)),
        }
    }
}

fn map_status(status: StatusCode, path: &str, detail: String) -> PortError {
    match status {
        StatusCode::NOT_FOUND => PortError::not_found("scoring endpoint", path),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PortError::Unauthorized { message: detail }
        }
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited {
            retry_after_secs: 60,
        },
        status if status.is_server_error() => PortError::ServiceUnavailable {
            service: format!("scoring service: {}", detail),
        },
        _ => PortError::internal(format!("scoring service {}: {}", status, detail)),
    }
}

/// FastAPI error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

// =============================================================================
// Request / response payloads
// =============================================================================

/// Response from GET /health
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub models_loaded: Vec<String>,
}

/// Response from GET /models/status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatusResponse {
    pub license_valid: bool,
    pub license_expires: Option<String>,
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    pub timestamp: Option<String>,
}

/// Per-model entry in the model status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: Option<String>,
    pub training_date: Option<String>,
    pub available: bool,
    pub metrics: Option<serde_json::Value>,
}

/// Request body for POST /predict/fraud
#[derive(Debug, Clone, Serialize)]
pub struct FraudScoreRequest {
    /// Gateway transaction id being scored
    pub transaction_id: String,
    /// Payment amount in the folio currency
    pub amount: Decimal,
    /// Guest the payment belongs to
    pub guest_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_ip_country: Option<String>,
    /// Additional model features forwarded verbatim
    #[serde(flatten)]
    pub features: HashMap<String, serde_json::Value>,
}

/// Action recommended by the fraud model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Accept,
    Review,
    Block,
}

/// Response from POST /predict/fraud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudScoreResponse {
    pub transaction_id: Option<String>,
    /// Fraud probability in percent (0-100)
    pub fraud_probability: f64,
    pub anomaly_score: f64,
    pub fraud_flag: bool,
    pub recommended_action: RecommendedAction,
    #[serde(default)]
    pub reasons: Vec<String>,
    pub model_version: Option<String>,
    pub timestamp: Option<String>,
}

/// Request body for POST /predict/pricing
#[derive(Debug, Clone, Serialize)]
pub struct PricingRequest {
    pub property_id: String,
    pub room_type: String,
    pub current_price: Decimal,
    pub occupancy_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_prices_avg: Option<Decimal>,
    /// Additional model features forwarded verbatim
    #[serde(flatten)]
    pub features: HashMap<String, serde_json::Value>,
}

/// Response from POST /predict/pricing
///
/// The recommendation is bounded by the service to 80-130% of the current
/// price; prices here are model outputs, not ledger amounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingResponse {
    pub property_id: Option<String>,
    pub room_type: Option<String>,
    pub current_price: f64,
    pub recommended_price: f64,
    pub price_change_percent: f64,
    pub confidence: f64,
    pub reasoning: Option<String>,
    pub model_version: Option<String>,
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_circuit_breaker_initially_closed() {
        let client = ScoringClient::new(ScoringConfig::default());
        assert!(!client.is_circuit_open().await);
    }

    #[tokio::test]
    async fn test_circuit_opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 3,
            reset_timeout_secs: 60,
            success_threshold: 1,
        });

        for _ in 0..3 {
            breaker.record_failure().await;
        }
        assert!(!breaker.is_available().await);
    }

    #[tokio::test]
    async fn test_circuit_closes_after_successes() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            reset_timeout_secs: 0,
            success_threshold: 2,
        });

        breaker.record_failure().await;
        // reset_timeout of zero lets the half-open probe through immediately
        assert!(breaker.is_available().await);

        breaker.record_success();
        breaker.record_success();
        assert!(breaker.is_available().await);
        assert!(!breaker.is_open.load(Ordering::Relaxed));
    }

    #[test]
    fn test_fraud_request_serializes_with_flattened_features() {
        let mut features = HashMap::new();
        features.insert("card_attempts_24h".to_string(), serde_json::json!(4));

        let request = FraudScoreRequest {
            transaction_id: "txn_123".to_string(),
            amount: dec!(250.00),
            guest_id: "GST-42".to_string(),
            ip_country: Some("US".to_string()),
            booking_ip_country: None,
            features,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["transaction_id"], "txn_123");
        assert_eq!(value["card_attempts_24h"], 4);
        assert!(value.get("booking_ip_country").is_none());
    }

    #[test]
    fn test_fraud_response_deserializes_service_payload() {
        let json = r#"{
            "transaction_id": "txn_123",
            "fraud_probability": 82.15,
            "anomaly_score": 0.731,
            "fraud_flag": true,
            "recommended_action": "block",
            "reasons": ["high_amount", "geo_mismatch"],
            "model_version": "2024.05.1",
            "timestamp": "2024-06-10T12:00:00"
        }"#;

        let response: FraudScoreResponse = serde_json::from_str(json).unwrap();
        assert!(response.fraud_flag);
        assert_eq!(response.recommended_action, RecommendedAction::Block);
        assert_eq!(response.reasons.len(), 2);
    }

    #[test]
    fn test_model_status_deserializes_without_models() {
        let json = r#"{"license_valid": false, "license_expires": null, "timestamp": null}"#;
        let status: ModelStatusResponse = serde_json::from_str(json).unwrap();
        assert!(!status.license_valid);
        assert!(status.models.is_empty());
    }

    #[test]
    fn test_status_mapping() {
        let err = map_status(StatusCode::FORBIDDEN, "predict/fraud", "no license".into());
        assert!(matches!(err, PortError::Unauthorized { .. }));

        let err = map_status(StatusCode::BAD_GATEWAY, "predict/fraud", "down".into());
        assert!(err.is_transient());

        let err = map_status(StatusCode::NOT_FOUND, "predict/fraud", "missing".into());
        assert!(err.is_not_found());
    }
}
