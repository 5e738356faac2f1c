//! Billing record lifecycle and status reconciliation
//!
//! The billing record is the authoritative ledger entry for one
//! reservation's charges and payments. Status is derived from the ratio of
//! `amount_paid` to `total_due` plus the time-based overdue rule; callers
//! never set it directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BillingId, Currency, Money, ReservationId, Timezone};

use crate::charges::ChargeBreakdown;
use crate::error::BillingError;

/// Billing status
///
/// Transitions: `Pending -> Partial -> Paid`, `Pending -> Paid`,
/// `Pending|Partial -> Overdue`, `Overdue -> Paid`. `Paid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    /// No payment applied yet
    Pending,
    /// Partial payment received
    Partial,
    /// Fully paid; terminal
    Paid,
    /// Unpaid past the due date
    Overdue,
}

impl BillingStatus {
    /// Returns true for states the overdue sweep may transition
    pub fn is_sweepable(&self) -> bool {
        matches!(self, BillingStatus::Pending | BillingStatus::Partial)
    }

    /// Returns true for the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, BillingStatus::Paid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::Pending => "pending",
            BillingStatus::Partial => "partial",
            BillingStatus::Paid => "paid",
            BillingStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillingStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BillingStatus::Pending),
            "partial" => Ok(BillingStatus::Partial),
            "paid" => Ok(BillingStatus::Paid),
            "overdue" => Ok(BillingStatus::Overdue),
            other => Err(BillingError::validation(format!(
                "unknown billing status: {}",
                other
            ))),
        }
    }
}

/// The authoritative ledger entry for one reservation's charges and payments
///
/// # Invariants
///
/// - `total_due == charges.total()` at all times
/// - `status == Paid` iff `amount_paid >= total_due`
/// - `amount_paid` never decreases
/// - all monetary fields share `currency`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingRecord {
    /// Unique identifier, assigned at creation
    pub id: BillingId,
    /// The reservation this folio belongs to; immutable
    pub reservation_id: ReservationId,
    /// Currency of every monetary field
    pub currency: Currency,
    /// Charge components (room subtotal, tax, service fee)
    pub charges: ChargeBreakdown,
    /// Derived total: subtotal + tax + service fee
    pub total_due: Money,
    /// Sum of applied payments; monotonically non-decreasing
    pub amount_paid: Money,
    /// Derived status; see `BillingStatus`
    pub status: BillingStatus,
    /// Payment deadline, evaluated against the property's end of day
    pub due_date: NaiveDate,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutating operation
    pub updated_at: DateTime<Utc>,
}

impl BillingRecord {
    /// Creates a new billing record in `Pending` status
    pub fn new(
        reservation_id: ReservationId,
        charges: ChargeBreakdown,
        due_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        let currency = charges.currency();

        Self {
            id: BillingId::new_v7(),
            reservation_id,
            currency,
            charges,
            total_due: charges.total(),
            amount_paid: Money::zero(currency),
            status: BillingStatus::Pending,
            due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a payment and recomputes the status
    ///
    /// An overpayment is allowed: the record becomes `Paid`, the outstanding
    /// balance clamps at zero, and `credit_balance` carries the refund-due
    /// amount. A partial payment on an `Overdue` record accumulates but does
    /// not clear the overdue flag.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` if the amount is not strictly
    /// positive or is in a different currency.
    pub fn apply_payment(&mut self, amount: Money) -> Result<(), BillingError> {
        if amount.currency() != self.currency {
            return Err(BillingError::validation(format!(
                "payment currency {} does not match billing currency {}",
                amount.currency(),
                self.currency
            )));
        }
        if !amount.is_positive() {
            return Err(BillingError::validation(format!(
                "payment amount must be positive, got {}",
                amount
            )));
        }

        self.amount_paid = self.amount_paid.checked_add(&amount)?;
        self.recompute_status();
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Replaces the charge components and recomputes the total
    ///
    /// Only permitted while no payment has been applied; later corrections
    /// are compensating adjustments handled outside this engine.
    pub fn update_charges(&mut self, charges: ChargeBreakdown) -> Result<(), BillingError> {
        if !self.amount_paid.is_zero() {
            return Err(BillingError::validation(
                "charges are immutable once payments have been applied",
            ));
        }
        if charges.currency() != self.currency {
            return Err(BillingError::validation(format!(
                "charge currency {} does not match billing currency {}",
                charges.currency(),
                self.currency
            )));
        }

        self.charges = charges;
        self.total_due = charges.total();
        self.updated_at = Utc::now();

        Ok(())
    }

    /// Returns true when the due date has passed as of the given instant
    ///
    /// The threshold is the end of the due date in the property's timezone.
    pub fn is_past_due(&self, as_of: DateTime<Utc>, timezone: Timezone) -> bool {
        timezone.end_of_day(self.due_date) < as_of
    }

    /// Transitions an unpaid, past-due record to `Overdue`
    ///
    /// Idempotent: already-overdue records are untouched, and `Paid` records
    /// are never regressed. Returns true when the status changed.
    pub fn mark_overdue(&mut self, as_of: DateTime<Utc>, timezone: Timezone) -> bool {
        if !self.status.is_sweepable() {
            return false;
        }
        if !self.is_past_due(as_of, timezone) {
            return false;
        }

        self.status = BillingStatus::Overdue;
        self.updated_at = Utc::now();
        true
    }

    /// Amount still owed; never negative
    pub fn outstanding_balance(&self) -> Money {
        self.total_due
            .saturating_sub(&self.amount_paid)
            .expect("billing amounts share one currency")
    }

    /// Refund-due signal when payments exceed the total; zero otherwise
    pub fn credit_balance(&self) -> Money {
        self.amount_paid
            .saturating_sub(&self.total_due)
            .expect("billing amounts share one currency")
    }

    fn recompute_status(&mut self) {
        if self.amount_paid >= self.total_due {
            self.status = BillingStatus::Paid;
        } else if self.status == BillingStatus::Overdue {
            // An overdue folio stays overdue until fully settled
        } else if self.amount_paid.is_positive() {
            self.status = BillingStatus::Partial;
        } else {
            self.status = BillingStatus::Pending;
        }
    }
}
