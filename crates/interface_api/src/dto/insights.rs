//! Insights DTOs
//!
//! These requests are forwarded to the external scoring service; the
//! responses come back verbatim from the models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationError};

use scoring_client::{FraudScoreRequest, PricingRequest};

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(ValidationError::new("non_positive_amount"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct FraudCheckRequest {
    #[validate(length(min = 1, max = 128))]
    pub transaction_id: String,
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 128))]
    pub guest_id: String,
    pub ip_country: Option<String>,
    pub booking_ip_country: Option<String>,
    /// Additional model features forwarded verbatim
    #[serde(flatten)]
    pub features: HashMap<String, serde_json::Value>,
}

impl From<FraudCheckRequest> for FraudScoreRequest {
    fn from(request: FraudCheckRequest) -> Self {
        Self {
            transaction_id: request.transaction_id,
            amount: request.amount,
            guest_id: request.guest_id,
            ip_country: request.ip_country,
            booking_ip_country: request.booking_ip_country,
            features: request.features,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PricingAdviceRequest {
    #[validate(length(min = 1, max = 128))]
    pub property_id: String,
    #[validate(length(min = 1, max = 128))]
    pub room_type: String,
    #[validate(custom(function = "positive"))]
    pub current_price: Decimal,
    #[validate(range(min = 0.0, max = 1.0))]
    pub occupancy_rate: f64,
    pub competitor_prices_avg: Option<Decimal>,
    #[serde(flatten)]
    pub features: HashMap<String, serde_json::Value>,
}

impl From<PricingAdviceRequest> for PricingRequest {
    fn from(request: PricingAdviceRequest) -> Self {
        Self {
            property_id: request.property_id,
            room_type: request.room_type,
            current_price: request.current_price,
            occupancy_rate: request.occupancy_rate,
            competitor_prices_avg: request.competitor_prices_avg,
            features: request.features,
        }
    }
}

/// Health summary of the scoring adapter, surfaced on the ops dashboard
#[derive(Debug, Serialize)]
pub struct ScoringHealthResponse {
    pub status: String,
    pub latency_ms: u64,
    pub message: Option<String>,
}
