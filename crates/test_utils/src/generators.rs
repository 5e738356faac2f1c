//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::NaiveDate;
use core_kernel::{Currency, Money, ReservationId};
use domain_billing::{BillingRecord, ChargeBreakdown, PaymentMethod};
use proptest::prelude::*;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::JPY),
        Just(Currency::INR),
        Just(Currency::AUD),
        Just(Currency::CAD),
        Just(Currency::SGD),
        Just(Currency::THB),
        Just(Currency::AED),
    ]
}

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating non-negative amounts in minor units
pub fn non_negative_amount_minor_strategy() -> impl Strategy<Value = i64> {
    0i64..1_000_000_000i64
}

/// Strategy for generating valid USD Money values
pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::USD))
}

/// Strategy for generating a valid USD charge breakdown with a non-zero total
pub fn charge_breakdown_strategy() -> impl Strategy<Value = ChargeBreakdown> {
    (
        positive_amount_minor_strategy(),
        0i64..100_000_000i64,
        0i64..10_000_000i64,
    )
        .prop_map(|(subtotal, tax, fee)| {
            ChargeBreakdown::new(
                Money::from_minor(subtotal, Currency::USD),
                Money::from_minor(tax, Currency::USD),
                Money::from_minor(fee, Currency::USD),
            )
            .expect("non-negative USD components are always valid")
        })
}

/// Strategy for generating a freshly created USD billing record
pub fn pending_billing_record_strategy() -> impl Strategy<Value = BillingRecord> {
    charge_breakdown_strategy().prop_map(|charges| {
        BillingRecord::new(
            ReservationId::new_v7(),
            charges,
            NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
        )
    })
}

/// Strategy for generating a sequence of positive USD payment amounts
pub fn payment_sequence_strategy() -> impl Strategy<Value = Vec<Money>> {
    proptest::collection::vec(
        positive_amount_minor_strategy()
            .prop_map(|amount| Money::from_minor(amount, Currency::USD)),
        0..10,
    )
}

/// Strategy for generating payment methods
pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::CreditCard),
        Just(PaymentMethod::DebitCard),
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::BankTransfer),
        Just(PaymentMethod::DigitalWallet),
        Just(PaymentMethod::Voucher),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_records_satisfy_invariants(record in pending_billing_record_strategy()) {
            crate::assertions::assert_billing_consistent(&record);
        }

        #[test]
        fn generated_payment_sequences_keep_records_consistent(
            mut record in pending_billing_record_strategy(),
            payments in payment_sequence_strategy()
        ) {
            for amount in payments {
                record.apply_payment(amount).unwrap();
            }
            crate::assertions::assert_billing_consistent(&record);
        }
    }
}
