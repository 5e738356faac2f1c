//! Billing handlers
//!
//! The thin HTTP layer over the billing repository. Validation happens
//! here at the boundary; the ledger rules themselves live in the domain.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{BillingId, Currency, Money, ReservationId};
use domain_billing::{BillingRecord, BillingStatus, ChargeBreakdown, PaymentMethod};

use crate::dto::billing::*;
use crate::{error::ApiError, AppState};

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 500;

/// Creates a billing record for a reservation
pub async fn create_billing(
    State(state): State<AppState>,
    Json(request): Json<CreateBillingRequest>,
) -> Result<Json<BillingResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let currency = match &request.currency {
        Some(code) => code
            .parse::<Currency>()
            .map_err(|e| ApiError::Validation(e.to_string()))?,
        None => state.currency,
    };

    let charges = ChargeBreakdown::new(
        Money::new(request.subtotal, currency),
        Money::new(request.tax, currency),
        Money::new(request.service_fee, currency),
    )?;

    let record = BillingRecord::new(
        ReservationId::from_uuid(request.reservation_id),
        charges,
        request.due_date,
    );
    state.billing.insert(&record).await?;

    Ok(Json(record.into()))
}

/// Lists billing records, optionally filtered by status
pub async fn list_billings(
    State(state): State<AppState>,
    Query(query): Query<ListBillingQuery>,
) -> Result<Json<Vec<BillingResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<BillingStatus>)
        .transpose()?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let records = state.billing.list(status, limit).await?;
    Ok(Json(records.into_iter().map(BillingResponse::from).collect()))
}

/// Gets a billing record by ID
pub async fn get_billing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BillingResponse>, ApiError> {
    let record = state.billing.fetch(BillingId::from_uuid(id)).await?;
    Ok(Json(record.into()))
}

/// Applies a payment to a billing record
///
/// Returns 409 when a concurrent payment won the race; the caller retries
/// the same amount under its idempotency key.
pub async fn apply_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApplyPaymentRequest>,
) -> Result<Json<BillingResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let method: PaymentMethod = request.method.parse()?;
    let amount = Money::new(request.amount, state.currency);

    let record = state
        .billing
        .apply_payment(
            BillingId::from_uuid(id),
            amount,
            method,
            request.external_reference,
        )
        .await?;

    Ok(Json(record.into()))
}

/// Lists the payments applied to a billing record
pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let billing_id = BillingId::from_uuid(id);

    // Surface 404 for an unknown record rather than an empty list
    state.billing.fetch(billing_id).await?;

    let payments = state.billing.payments_for(billing_id).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Transitions a single past-due record to overdue
pub async fn mark_overdue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<OverdueRequest>,
) -> Result<Json<BillingResponse>, ApiError> {
    let as_of = request.as_of.unwrap_or_else(Utc::now);
    let record = state
        .billing
        .mark_overdue(BillingId::from_uuid(id), as_of, state.timezone)
        .await?;

    Ok(Json(record.into()))
}

/// Runs the overdue sweep across all unpaid records
pub async fn sweep_overdue(
    State(state): State<AppState>,
    Json(request): Json<OverdueRequest>,
) -> Result<Json<SweepResponse>, ApiError> {
    let as_of = request.as_of.unwrap_or_else(Utc::now);
    let swept = state.billing.sweep_overdue(as_of, state.timezone).await?;

    Ok(Json(SweepResponse { swept, as_of }))
}

/// Aggregate totals (collected, outstanding) across the property's records
pub async fn get_totals(
    State(state): State<AppState>,
) -> Result<Json<TotalsResponse>, ApiError> {
    let totals = state.billing.aggregate_totals(state.currency).await?;
    Ok(Json(TotalsResponse::from_totals(totals)))
}
