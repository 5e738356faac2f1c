//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_billing::{BillingRecord, BillingStatus};
use rust_decimal::Decimal;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than
/// the tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a billing record satisfies every ledger invariant
///
/// - total_due equals the sum of the charge components
/// - status is Paid exactly when amount_paid covers total_due
/// - the outstanding balance is never negative
pub fn assert_billing_consistent(record: &BillingRecord) {
    assert_eq!(
        record.total_due,
        record.charges.total(),
        "total_due diverged from charge components for {}",
        record.id
    );

    assert_eq!(
        record.status == BillingStatus::Paid,
        record.amount_paid >= record.total_due,
        "status {} inconsistent with amount_paid {} / total_due {} for {}",
        record.status,
        record.amount_paid,
        record.total_due,
        record.id
    );

    assert!(
        !record.outstanding_balance().is_negative(),
        "negative outstanding balance for {}",
        record.id
    );
}

/// Asserts that a billing record has the expected status
pub fn assert_billing_status(record: &BillingRecord, expected: BillingStatus) {
    assert_eq!(
        record.status, expected,
        "Expected billing record {} to be {}, got {}",
        record.id, expected, record.status
    );
}
