//! Billing DTOs
//!
//! Request payloads are validated at this boundary before anything reaches
//! the ledger engine: unknown fields are rejected by serde, monetary
//! components are checked for sign, and status/method strings must parse to
//! known variants.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use domain_billing::{BillingRecord, BillingTotals, Payment};

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() || value.is_zero() {
        return Err(ValidationError::new("non_positive_amount"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateBillingRequest {
    pub reservation_id: Uuid,
    /// ISO 4217 code; defaults to the property currency when omitted
    pub currency: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub subtotal: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub tax: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub service_fee: Decimal,
    pub due_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ApplyPaymentRequest {
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    /// One of: credit_card, debit_card, cash, bank_transfer, digital_wallet, voucher
    pub method: String,
    /// Gateway transaction reference, used for idempotent conflict retries
    #[validate(length(max = 128))]
    pub external_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListBillingQuery {
    /// Optional status filter: pending, partial, paid, overdue
    pub status: Option<String>,
    /// Page size, defaults to 100
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OverdueRequest {
    /// Evaluation instant; defaults to now
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BillingResponse {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub currency: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub service_fee: Decimal,
    pub total_due: Decimal,
    pub amount_paid: Decimal,
    pub outstanding_balance: Decimal,
    /// Refund due to the guest when payments exceeded the total
    pub credit_balance: Decimal,
    pub status: String,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BillingRecord> for BillingResponse {
    fn from(record: BillingRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            reservation_id: *record.reservation_id.as_uuid(),
            currency: record.currency.code().to_string(),
            subtotal: record.charges.subtotal().amount(),
            tax: record.charges.tax().amount(),
            service_fee: record.charges.service_fee().amount(),
            total_due: record.total_due.amount(),
            amount_paid: record.amount_paid.amount(),
            outstanding_balance: record.outstanding_balance().amount(),
            credit_balance: record.credit_balance().amount(),
            status: record.status.to_string(),
            due_date: record.due_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub billing_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub method: String,
    pub external_reference: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            billing_id: *payment.billing_id.as_uuid(),
            amount: payment.amount.amount(),
            currency: payment.amount.currency().code().to_string(),
            method: payment.method.to_string(),
            external_reference: payment.external_reference,
            received_at: payment.received_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub currency: String,
    pub total_collected: Decimal,
    pub total_outstanding: Decimal,
}

impl TotalsResponse {
    pub fn from_totals(totals: BillingTotals) -> Self {
        Self {
            currency: totals.total_collected.currency().code().to_string(),
            total_collected: totals.total_collected.amount(),
            total_outstanding: totals.total_outstanding.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    /// Number of records transitioned to overdue
    pub swept: u64,
    pub as_of: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_subtotal_fails_validation() {
        let request = CreateBillingRequest {
            reservation_id: Uuid::new_v4(),
            currency: None,
            subtotal: dec!(-1),
            tax: dec!(0),
            service_fee: dec!(0),
            due_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_zero_payment_fails_validation() {
        let request = ApplyPaymentRequest {
            amount: dec!(0),
            method: "cash".to_string(),
            external_reference: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let json = r#"{"amount": "10", "method": "cash", "tip": "5"}"#;
        let result: Result<ApplyPaymentRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
