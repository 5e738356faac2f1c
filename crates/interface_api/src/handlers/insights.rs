//! Insights handlers
//!
//! Forwarders to the external AI scoring service. The dashboards call these
//! instead of the inference API directly so auth, audit logging, and error
//! mapping stay uniform.

use axum::{extract::State, Json};
use validator::Validate;

use core_kernel::HealthCheckable;
use scoring_client::{FraudScoreResponse, ModelStatusResponse, PricingResponse};

use crate::dto::insights::*;
use crate::{error::ApiError, AppState};

/// Scores a payment transaction for fraud risk
pub async fn fraud_check(
    State(state): State<AppState>,
    Json(request): Json<FraudCheckRequest>,
) -> Result<Json<FraudScoreResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let response = state.scoring.predict_fraud(&request.into()).await?;
    Ok(Json(response))
}

/// Requests a room pricing recommendation
pub async fn pricing_advice(
    State(state): State<AppState>,
    Json(request): Json<PricingAdviceRequest>,
) -> Result<Json<PricingResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let response = state.scoring.predict_pricing(&request.into()).await?;
    Ok(Json(response))
}

/// License validity and per-model availability
pub async fn model_status(
    State(state): State<AppState>,
) -> Result<Json<ModelStatusResponse>, ApiError> {
    let response = state.scoring.model_status().await?;
    Ok(Json(response))
}

/// Health of the scoring adapter, including circuit breaker state
pub async fn scoring_health(
    State(state): State<AppState>,
) -> Json<ScoringHealthResponse> {
    let result = state.scoring.health_check().await;
    Json(ScoringHealthResponse {
        status: format!("{:?}", result.status).to_lowercase(),
        latency_ms: result.latency_ms,
        message: result.message,
    })
}
