//! HTTP API Layer
//!
//! This crate provides the REST API for the hospitality billing core using
//! Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for billing and insights
//! - **Middleware**: Authentication, authorization, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects with boundary validation
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config)?;
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use core_kernel::{Currency, Timezone};
use infra_db::BillingRepository;
use scoring_client::{ScoringClient, ScoringConfig};

use crate::config::{ApiConfig, ConfigError};
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{billing, health, insights};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub billing: BillingRepository,
    pub scoring: ScoringClient,
    pub currency: Currency,
    pub timezone: Timezone,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
///
/// # Errors
///
/// Returns an error when the configured property currency or timezone
/// cannot be parsed.
pub fn create_router(pool: PgPool, config: ApiConfig) -> Result<Router, ConfigError> {
    let currency = config.currency()?;
    let timezone = config.timezone()?;

    let scoring = ScoringClient::new(
        ScoringConfig::new(&config.scoring_base_url, &config.scoring_license_key),
    );

    let state = AppState {
        billing: BillingRepository::new(pool.clone()),
        scoring,
        currency,
        timezone,
        pool,
        config,
    };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Billing routes
    let billing_routes = Router::new()
        .route("/", post(billing::create_billing))
        .route("/", get(billing::list_billings))
        .route("/totals", get(billing::get_totals))
        .route("/sweep", post(billing::sweep_overdue))
        .route("/:id", get(billing::get_billing))
        .route("/:id/payments", post(billing::apply_payment))
        .route("/:id/payments", get(billing::list_payments))
        .route("/:id/overdue", post(billing::mark_overdue));

    // Insights routes (forwarded to the scoring service)
    let insights_routes = Router::new()
        .route("/fraud", post(insights::fraud_check))
        .route("/pricing", post(insights::pricing_advice))
        .route("/models", get(insights::model_status))
        .route("/health", get(insights::scoring_health));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/billing", billing_routes)
        .nest("/insights", insights_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Ok(Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state))
}
