//! Scoring Client - adapter for the external AI scoring service
//!
//! The hospitality suite ships with a locally hosted inference service that
//! scores payment fraud risk and recommends room pricing. This crate is the
//! typed client for that service; the billing core only consumes the
//! request/response contract and never reimplements the models.
//!
//! # Architecture
//!
//! The adapter communicates over REST via reqwest, translating between the
//! inference API's payloads and typed DTOs. It includes:
//!
//! - Connection pooling via reqwest
//! - Circuit breaker pattern for fault tolerance
//! - Request/response logging and tracing
//!
//! # Error Handling
//!
//! External API errors are mapped to `PortError` variants:
//! - 404 -> `PortError::NotFound`
//! - 401/403 -> `PortError::Unauthorized`
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Other -> `PortError::Internal`

pub mod config;
pub mod client;

pub use config::ScoringConfig;
pub use client::{
    FraudScoreRequest, FraudScoreResponse, ModelInfo, ModelStatusResponse,
    PricingRequest, PricingResponse, RecommendedAction, ScoringClient, ServiceHealth,
};
