//! The in-memory billing ledger engine
//!
//! `BillingLedger` holds the billing records for one property and applies
//! the engine operations over them: folio creation, payment application,
//! the overdue sweep, and aggregate reporting. The persistent engine in the
//! infrastructure layer provides the same operations over PostgreSQL; this
//! one backs unit tests and single-process deployments.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tracing::debug;

use core_kernel::{BillingId, Currency, Money, ReservationId, Timezone};

use crate::charges::ChargeBreakdown;
use crate::error::BillingError;
use crate::payment::{Payment, PaymentMethod};
use crate::record::{BillingRecord, BillingStatus};

/// Aggregate totals across a set of billing records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingTotals {
    /// Sum of `amount_paid` over every record
    pub total_collected: Money,
    /// Sum of outstanding balances over records that are not fully paid
    pub total_outstanding: Money,
}

/// Computes aggregate totals over a snapshot of billing records
///
/// Pure and side-effect-free; safe for unsynchronized concurrent use over
/// an immutable snapshot.
///
/// # Errors
///
/// Returns `BillingError::Money` if the records do not share the given
/// currency.
pub fn aggregate<'a, I>(records: I, currency: Currency) -> Result<BillingTotals, BillingError>
where
    I: IntoIterator<Item = &'a BillingRecord>,
{
    let mut total_collected = Money::zero(currency);
    let mut total_outstanding = Money::zero(currency);

    for record in records {
        total_collected = total_collected.checked_add(&record.amount_paid)?;
        if record.status != BillingStatus::Paid {
            total_outstanding = total_outstanding.checked_add(&record.outstanding_balance())?;
        }
    }

    Ok(BillingTotals {
        total_collected,
        total_outstanding,
    })
}

/// The billing ledger engine for one property
///
/// # Invariants
///
/// - Every record shares the ledger's currency
/// - `total_due`, `amount_paid`, and `status` are only ever changed
///   together, through the engine operations
/// - Records are never physically deleted
#[derive(Debug)]
pub struct BillingLedger {
    records: HashMap<BillingId, BillingRecord>,
    payments: Vec<Payment>,
    currency: Currency,
    timezone: Timezone,
}

impl BillingLedger {
    /// Creates an empty ledger for the given currency and property timezone
    pub fn new(currency: Currency, timezone: Timezone) -> Self {
        Self {
            records: HashMap::new(),
            payments: Vec::new(),
            currency,
            timezone,
        }
    }

    /// The ledger's currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Creates a billing record for a reservation
    ///
    /// Validates that all three charge components are non-negative amounts
    /// in the ledger currency; the new record starts `Pending` with nothing
    /// paid.
    pub fn create_billing(
        &mut self,
        reservation_id: ReservationId,
        subtotal: Money,
        tax: Money,
        service_fee: Money,
        due_date: NaiveDate,
    ) -> Result<BillingRecord, BillingError> {
        let charges = ChargeBreakdown::new(subtotal, tax, service_fee)?;
        if charges.currency() != self.currency {
            return Err(BillingError::validation(format!(
                "charges are in {}, ledger is {}",
                charges.currency(),
                self.currency
            )));
        }

        let record = BillingRecord::new(reservation_id, charges, due_date);
        debug!(billing_id = %record.id, reservation_id = %reservation_id,
               total_due = %record.total_due, "billing record created");

        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    /// Gets a record by id
    pub fn get(&self, id: &BillingId) -> Option<&BillingRecord> {
        self.records.get(id)
    }

    /// Applies a payment to a billing record
    ///
    /// Increments `amount_paid`, recomputes the status, and appends an
    /// audit payment row, all in one step.
    ///
    /// # Errors
    ///
    /// - `BillingError::NotFound` for an unknown billing id
    /// - `BillingError::Validation` for a non-positive or mismatched amount
    pub fn apply_payment(
        &mut self,
        billing_id: BillingId,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<BillingRecord, BillingError> {
        let record = self
            .records
            .get_mut(&billing_id)
            .ok_or_else(|| BillingError::not_found(billing_id.to_string()))?;

        record.apply_payment(amount)?;
        debug!(billing_id = %billing_id, amount = %amount, status = %record.status,
               "payment applied");

        let updated = record.clone();
        self.payments
            .push(Payment::new(billing_id, amount, method));

        Ok(updated)
    }

    /// Payments applied to one billing record, oldest first
    pub fn payments_for(&self, billing_id: &BillingId) -> Vec<&Payment> {
        self.payments
            .iter()
            .filter(|p| &p.billing_id == billing_id)
            .collect()
    }

    /// Transitions a single unpaid, past-due record to `Overdue`
    ///
    /// No-op when the record is already paid or not yet due.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NotFound` for an unknown billing id.
    pub fn mark_overdue(
        &mut self,
        billing_id: BillingId,
        as_of: DateTime<Utc>,
    ) -> Result<BillingRecord, BillingError> {
        let timezone = self.timezone;
        let record = self
            .records
            .get_mut(&billing_id)
            .ok_or_else(|| BillingError::not_found(billing_id.to_string()))?;

        if record.mark_overdue(as_of, timezone) {
            debug!(billing_id = %billing_id, "billing record marked overdue");
        }

        Ok(record.clone())
    }

    /// Runs the overdue sweep over every record
    ///
    /// Idempotent batch form of `mark_overdue`; re-running with the same
    /// `as_of` changes nothing, and paid records are never touched. Returns
    /// the number of records transitioned.
    pub fn sweep_overdue(&mut self, as_of: DateTime<Utc>) -> usize {
        let timezone = self.timezone;
        let swept = self
            .records
            .values_mut()
            .map(|record| record.mark_overdue(as_of, timezone))
            .filter(|changed| *changed)
            .count();

        if swept > 0 {
            debug!(count = swept, "overdue sweep transitioned records");
        }
        swept
    }

    /// Records filtered by status
    pub fn list_by_status(&self, status: BillingStatus) -> Vec<&BillingRecord> {
        self.records
            .values()
            .filter(|r| r.status == status)
            .collect()
    }

    /// Iterates over every record in the ledger
    pub fn records(&self) -> impl Iterator<Item = &BillingRecord> {
        self.records.values()
    }

    /// Aggregate totals over the whole ledger
    pub fn aggregate(&self) -> Result<BillingTotals, BillingError> {
        aggregate(self.records.values(), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn future_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
    }

    fn setup_ledger() -> BillingLedger {
        BillingLedger::new(Currency::USD, Timezone::default())
    }

    #[test]
    fn test_create_and_get() {
        let mut ledger = setup_ledger();
        let record = ledger
            .create_billing(
                ReservationId::new_v7(),
                usd(dec!(100)),
                usd(dec!(10)),
                usd(dec!(5)),
                future_date(),
            )
            .unwrap();

        let fetched = ledger.get(&record.id).unwrap();
        assert_eq!(fetched.total_due, usd(dec!(115)));
        assert_eq!(fetched.status, BillingStatus::Pending);
    }

    #[test]
    fn test_create_rejects_foreign_currency() {
        let mut ledger = setup_ledger();
        let result = ledger.create_billing(
            ReservationId::new_v7(),
            Money::new(dec!(100), Currency::EUR),
            Money::zero(Currency::EUR),
            Money::zero(Currency::EUR),
            future_date(),
        );

        assert!(matches!(result, Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_apply_payment_unknown_id() {
        let mut ledger = setup_ledger();
        let result =
            ledger.apply_payment(BillingId::new(), usd(dec!(50)), PaymentMethod::Cash);
        assert!(matches!(result, Err(BillingError::NotFound(_))));
    }

    #[test]
    fn test_apply_payment_appends_audit_row() {
        let mut ledger = setup_ledger();
        let record = ledger
            .create_billing(
                ReservationId::new_v7(),
                usd(dec!(100)),
                usd(dec!(10)),
                usd(dec!(5)),
                future_date(),
            )
            .unwrap();

        ledger
            .apply_payment(record.id, usd(dec!(50)), PaymentMethod::CreditCard)
            .unwrap();
        ledger
            .apply_payment(record.id, usd(dec!(65)), PaymentMethod::Cash)
            .unwrap();

        let payments = ledger.payments_for(&record.id);
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].amount, usd(dec!(50)));
        assert_eq!(ledger.get(&record.id).unwrap().status, BillingStatus::Paid);
    }

    #[test]
    fn test_mark_overdue_unknown_id() {
        let mut ledger = setup_ledger();
        let result = ledger.mark_overdue(BillingId::new(), Utc::now());
        assert!(matches!(result, Err(BillingError::NotFound(_))));
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let mut ledger = setup_ledger();
        let past = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        for _ in 0..3 {
            ledger
                .create_billing(
                    ReservationId::new_v7(),
                    usd(dec!(200)),
                    usd(dec!(0)),
                    usd(dec!(0)),
                    past,
                )
                .unwrap();
        }

        let now = Utc::now();
        assert_eq!(ledger.sweep_overdue(now), 3);
        assert_eq!(ledger.sweep_overdue(now), 0);
        assert_eq!(ledger.list_by_status(BillingStatus::Overdue).len(), 3);
    }

    #[test]
    fn test_aggregate_over_mixed_statuses() {
        let mut ledger = setup_ledger();
        let past = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let paid = ledger
            .create_billing(
                ReservationId::new_v7(),
                usd(dec!(100)),
                usd(dec!(10)),
                usd(dec!(5)),
                future_date(),
            )
            .unwrap();
        ledger
            .apply_payment(paid.id, usd(dec!(115)), PaymentMethod::CreditCard)
            .unwrap();

        ledger
            .create_billing(
                ReservationId::new_v7(),
                usd(dec!(200)),
                usd(dec!(0)),
                usd(dec!(0)),
                past,
            )
            .unwrap();
        ledger.sweep_overdue(Utc::now());

        let totals = ledger.aggregate().unwrap();
        assert_eq!(totals.total_collected, usd(dec!(115)));
        assert_eq!(totals.total_outstanding, usd(dec!(200)));
    }

    #[test]
    fn test_aggregate_excludes_paid_overpayment_from_outstanding() {
        let mut ledger = setup_ledger();
        let record = ledger
            .create_billing(
                ReservationId::new_v7(),
                usd(dec!(100)),
                usd(dec!(0)),
                usd(dec!(0)),
                future_date(),
            )
            .unwrap();
        ledger
            .apply_payment(record.id, usd(dec!(120)), PaymentMethod::Voucher)
            .unwrap();

        let totals = ledger.aggregate().unwrap();
        assert_eq!(totals.total_collected, usd(dec!(120)));
        assert!(totals.total_outstanding.is_zero());
    }
}
