//! Billing repository implementation
//!
//! This module provides database access for the billing ledger engine. It is
//! the persistent counterpart of the in-memory `BillingLedger`: the same
//! domain rules run against rows loaded inside a transaction, so
//! `total_due`, `amount_paid`, and `status` are always written back together.
//!
//! # Concurrency
//!
//! `apply_payment` serializes concurrent calls against the same billing id
//! with a row-level lock (`SELECT ... FOR UPDATE`) and an `updated_at`
//! compare-and-swap on the write-back. A lost race surfaces as
//! `DatabaseError::ConcurrentUpdate`, which callers retry with the same
//! payment amount under their idempotency key.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{BillingId, Currency, Money, PaymentId, ReservationId, Timezone};
use domain_billing::{
    BillingRecord, BillingStatus, BillingTotals, ChargeBreakdown, Payment, PaymentMethod,
};

use crate::error::DatabaseError;

const SELECT_BILLING: &str = r#"
    SELECT billing_id, reservation_id, currency,
           subtotal, tax, service_fee, total_due, amount_paid,
           status, due_date, created_at, updated_at
    FROM billing_records
"#;

/// Repository for the persistent billing ledger
///
/// All mutating operations run inside a single database transaction; read
/// operations work over a consistent snapshot and are safe for concurrent
/// use.
#[derive(Debug, Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    /// Creates a new BillingRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a freshly created billing record
    ///
    /// The record comes out of the domain constructor already validated;
    /// the database check constraints are a second line of defense.
    pub async fn insert(&self, record: &BillingRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO billing_records (
                billing_id, reservation_id, currency,
                subtotal, tax, service_fee, total_due, amount_paid,
                status, due_date, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.reservation_id.as_uuid())
        .bind(record.currency.code())
        .bind(record.charges.subtotal().amount())
        .bind(record.charges.tax().amount())
        .bind(record.charges.service_fee().amount())
        .bind(record.total_due.amount())
        .bind(record.amount_paid.amount())
        .bind(BillingStatusDb::from(record.status))
        .bind(record.due_date)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(billing_id = %record.id, "billing record persisted");
        Ok(())
    }

    /// Fetches a billing record by id
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown billing id
    pub async fn fetch(&self, billing_id: BillingId) -> Result<BillingRecord, DatabaseError> {
        let row: Option<BillingRow> =
            sqlx::query_as(&format!("{} WHERE billing_id = $1", SELECT_BILLING))
                .bind(billing_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or_else(|| DatabaseError::not_found("BillingRecord", billing_id))?
            .into_domain()
    }

    /// Lists billing records, optionally filtered by status, newest first
    pub async fn list(
        &self,
        status: Option<BillingStatus>,
        limit: i64,
    ) -> Result<Vec<BillingRecord>, DatabaseError> {
        let rows: Vec<BillingRow> = match status {
            Some(status) => {
                sqlx::query_as(&format!(
                    "{} WHERE status = $1 ORDER BY created_at DESC LIMIT $2",
                    SELECT_BILLING
                ))
                .bind(BillingStatusDb::from(status))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "{} ORDER BY created_at DESC LIMIT $1",
                    SELECT_BILLING
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(BillingRow::into_domain).collect()
    }

    /// Applies a payment to a billing record atomically
    ///
    /// The row is locked for the duration of the transaction, the domain
    /// rules recompute `amount_paid` and `status`, a payment audit row is
    /// appended, and the record is written back in one commit.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NotFound` for an unknown billing id
    /// - `DatabaseError::Domain(BillingError::Validation)` for a bad amount
    /// - `DatabaseError::ConcurrentUpdate` when a concurrent writer won;
    ///   the caller retries with the same amount
    pub async fn apply_payment(
        &self,
        billing_id: BillingId,
        amount: Money,
        method: PaymentMethod,
        external_reference: Option<String>,
    ) -> Result<BillingRecord, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<BillingRow> = sqlx::query_as(&format!(
            "{} WHERE billing_id = $1 FOR UPDATE",
            SELECT_BILLING
        ))
        .bind(billing_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or_else(|| DatabaseError::not_found("BillingRecord", billing_id))?;
        let loaded_updated_at = row.updated_at;

        let mut record = row.into_domain()?;
        record.apply_payment(amount)?;

        let mut payment = Payment::new(billing_id, amount, method);
        if let Some(reference) = external_reference {
            payment = payment.with_reference(reference);
        }

        sqlx::query(
            r#"
            INSERT INTO billing_payments (
                payment_id, billing_id, amount, method,
                external_reference, received_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.billing_id.as_uuid())
        .bind(payment.amount.amount())
        .bind(payment.method.as_str())
        .bind(&payment.external_reference)
        .bind(payment.received_at)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query(
            r#"
            UPDATE billing_records
            SET amount_paid = $1, status = $2, updated_at = $3
            WHERE billing_id = $4 AND updated_at = $5
            "#,
        )
        .bind(record.amount_paid.amount())
        .bind(BillingStatusDb::from(record.status))
        .bind(record.updated_at)
        .bind(billing_id.as_uuid())
        .bind(loaded_updated_at)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DatabaseError::ConcurrentUpdate(format!(
                "billing record {} changed during payment application",
                billing_id
            )));
        }

        tx.commit().await?;

        debug!(billing_id = %billing_id, amount = %amount, status = %record.status,
               "payment applied");
        Ok(record)
    }

    /// Transitions a single unpaid, past-due record to overdue
    ///
    /// No-op when the record is already paid or not yet due.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown billing id
    pub async fn mark_overdue(
        &self,
        billing_id: BillingId,
        as_of: DateTime<Utc>,
        timezone: Timezone,
    ) -> Result<BillingRecord, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<BillingRow> = sqlx::query_as(&format!(
            "{} WHERE billing_id = $1 FOR UPDATE",
            SELECT_BILLING
        ))
        .bind(billing_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or_else(|| DatabaseError::not_found("BillingRecord", billing_id))?;
        let mut record = row.into_domain()?;

        if record.mark_overdue(as_of, timezone) {
            sqlx::query(
                r#"
                UPDATE billing_records
                SET status = $1, updated_at = $2
                WHERE billing_id = $3
                "#,
            )
            .bind(BillingStatusDb::from(record.status))
            .bind(record.updated_at)
            .bind(billing_id.as_uuid())
            .execute(&mut *tx)
            .await?;

            debug!(billing_id = %billing_id, "billing record marked overdue");
        }

        tx.commit().await?;
        Ok(record)
    }

    /// Runs the overdue sweep across every unpaid record
    ///
    /// Idempotent batch operation; paid records are never touched, so
    /// running it concurrently with `apply_payment` cannot regress a paid
    /// record. Returns the number of records transitioned.
    pub async fn sweep_overdue(
        &self,
        as_of: DateTime<Utc>,
        timezone: Timezone,
    ) -> Result<u64, DatabaseError> {
        // A record is past due once the property-local day of its due date
        // has ended, i.e. its due_date is before the property-local date of
        // the sweep instant.
        let local_cutoff: NaiveDate = as_of.with_timezone(&timezone.0).date_naive();

        let result = sqlx::query(
            r#"
            UPDATE billing_records
            SET status = 'overdue', updated_at = $1
            WHERE status IN ('pending', 'partial') AND due_date < $2
            "#,
        )
        .bind(as_of)
        .bind(local_cutoff)
        .execute(&self.pool)
        .await?;

        let swept = result.rows_affected();
        if swept > 0 {
            debug!(count = swept, "overdue sweep transitioned records");
        }
        Ok(swept)
    }

    /// Aggregate totals across every record in the given currency
    ///
    /// total_collected sums `amount_paid` over all records;
    /// total_outstanding sums the clamped balance of records that are not
    /// fully paid.
    pub async fn aggregate_totals(
        &self,
        currency: Currency,
    ) -> Result<BillingTotals, DatabaseError> {
        let (collected, outstanding): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(amount_paid), 0) AS total_collected,
                COALESCE(
                    SUM(GREATEST(total_due - amount_paid, 0))
                        FILTER (WHERE status <> 'paid'),
                    0
                ) AS total_outstanding
            FROM billing_records
            WHERE currency = $1
            "#,
        )
        .bind(currency.code())
        .fetch_one(&self.pool)
        .await?;

        Ok(BillingTotals {
            total_collected: Money::new(collected, currency),
            total_outstanding: Money::new(outstanding, currency),
        })
    }

    /// Payments applied to one billing record, oldest first
    pub async fn payments_for(
        &self,
        billing_id: BillingId,
    ) -> Result<Vec<Payment>, DatabaseError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            r#"
            SELECT p.payment_id, p.billing_id, p.amount, p.method,
                   p.external_reference, p.received_at, p.created_at,
                   b.currency
            FROM billing_payments p
            JOIN billing_records b ON b.billing_id = p.billing_id
            WHERE p.billing_id = $1
            ORDER BY p.created_at
            "#,
        )
        .bind(billing_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PaymentRow::into_domain).collect()
    }
}

/// Billing status as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "billing_status", rename_all = "snake_case")]
enum BillingStatusDb {
    Pending,
    Partial,
    Paid,
    Overdue,
}

impl From<BillingStatus> for BillingStatusDb {
    fn from(status: BillingStatus) -> Self {
        match status {
            BillingStatus::Pending => BillingStatusDb::Pending,
            BillingStatus::Partial => BillingStatusDb::Partial,
            BillingStatus::Paid => BillingStatusDb::Paid,
            BillingStatus::Overdue => BillingStatusDb::Overdue,
        }
    }
}

impl From<BillingStatusDb> for BillingStatus {
    fn from(status: BillingStatusDb) -> Self {
        match status {
            BillingStatusDb::Pending => BillingStatus::Pending,
            BillingStatusDb::Partial => BillingStatus::Partial,
            BillingStatusDb::Paid => BillingStatus::Paid,
            BillingStatusDb::Overdue => BillingStatus::Overdue,
        }
    }
}

/// Database row for a billing record
#[derive(Debug, Clone, sqlx::FromRow)]
struct BillingRow {
    billing_id: Uuid,
    reservation_id: Uuid,
    currency: String,
    subtotal: Decimal,
    tax: Decimal,
    service_fee: Decimal,
    total_due: Decimal,
    amount_paid: Decimal,
    status: BillingStatusDb,
    due_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BillingRow {
    fn into_domain(self) -> Result<BillingRecord, DatabaseError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e| DatabaseError::SerializationError(format!("{}", e)))?;

        let charges = ChargeBreakdown::new(
            Money::new(self.subtotal, currency),
            Money::new(self.tax, currency),
            Money::new(self.service_fee, currency),
        )?;

        Ok(BillingRecord {
            id: BillingId::from_uuid(self.billing_id),
            reservation_id: ReservationId::from_uuid(self.reservation_id),
            currency,
            charges,
            total_due: Money::new(self.total_due, currency),
            amount_paid: Money::new(self.amount_paid, currency),
            status: self.status.into(),
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for a payment, joined with the record's currency
#[derive(Debug, Clone, sqlx::FromRow)]
struct PaymentRow {
    payment_id: Uuid,
    billing_id: Uuid,
    amount: Decimal,
    method: String,
    external_reference: Option<String>,
    received_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    currency: String,
}

impl PaymentRow {
    fn into_domain(self) -> Result<Payment, DatabaseError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e| DatabaseError::SerializationError(format!("{}", e)))?;
        let method: PaymentMethod = self.method.parse()?;

        Ok(Payment {
            id: PaymentId::from_uuid(self.payment_id),
            billing_id: BillingId::from_uuid(self.billing_id),
            amount: Money::new(self.amount, currency),
            method,
            external_reference: self.external_reference,
            received_at: self.received_at,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_row() -> BillingRow {
        let now = Utc::now();
        BillingRow {
            billing_id: Uuid::new_v4(),
            reservation_id: Uuid::new_v4(),
            currency: "USD".to_string(),
            subtotal: dec!(100),
            tax: dec!(10),
            service_fee: dec!(5),
            total_due: dec!(115),
            amount_paid: dec!(50),
            status: BillingStatusDb::Partial,
            due_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_into_domain() {
        let row = sample_row();
        let record = row.into_domain().unwrap();

        assert_eq!(record.currency, Currency::USD);
        assert_eq!(record.total_due, Money::new(dec!(115), Currency::USD));
        assert_eq!(record.status, BillingStatus::Partial);
        assert_eq!(record.outstanding_balance(), Money::new(dec!(65), Currency::USD));
    }

    #[test]
    fn test_row_with_unknown_currency_fails() {
        let mut row = sample_row();
        row.currency = "XTS".to_string();

        assert!(matches!(
            row.into_domain(),
            Err(DatabaseError::SerializationError(_))
        ));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            BillingStatus::Pending,
            BillingStatus::Partial,
            BillingStatus::Paid,
            BillingStatus::Overdue,
        ] {
            let db: BillingStatusDb = status.into();
            let back: BillingStatus = db.into();
            assert_eq!(back, status);
        }
    }
}
