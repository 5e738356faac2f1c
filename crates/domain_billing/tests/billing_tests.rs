//! Comprehensive tests for domain_billing

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{BillingId, Currency, Money, Rate, ReservationId, Timezone};

use domain_billing::charges::ChargeBreakdown;
use domain_billing::ledger::{aggregate, BillingLedger};
use domain_billing::payment::{Payment, PaymentMethod};
use domain_billing::record::{BillingRecord, BillingStatus};

fn usd(amount: Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

fn future_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
}

fn past_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

// ============================================================================
// Charge Tests
// ============================================================================

mod charge_tests {
    use super::*;

    #[test]
    fn test_total_due_equals_component_sum_after_creation() {
        // Scenario A: subtotal=100, tax=10, serviceFee=5 -> totalDue=115, pending
        let charges =
            ChargeBreakdown::new(usd(dec!(100)), usd(dec!(10)), usd(dec!(5))).unwrap();
        let record = BillingRecord::new(ReservationId::new_v7(), charges, future_date());

        assert_eq!(record.total_due, usd(dec!(115)));
        assert_eq!(record.status, BillingStatus::Pending);
        assert_eq!(
            record.total_due,
            record.charges.subtotal() + record.charges.tax() + record.charges.service_fee()
        );
    }

    #[test]
    fn test_zero_components_are_valid() {
        let charges = ChargeBreakdown::new(
            usd(dec!(0)),
            usd(dec!(0)),
            usd(dec!(0)),
        )
        .unwrap();
        assert!(charges.total().is_zero());
    }

    #[test]
    fn test_each_negative_component_rejected() {
        let good = usd(dec!(10));
        let bad = usd(dec!(-1));

        assert!(ChargeBreakdown::new(bad, good, good).is_err());
        assert!(ChargeBreakdown::new(good, bad, good).is_err());
        assert!(ChargeBreakdown::new(good, good, bad).is_err());
    }

    #[test]
    fn test_stay_derivation_component_sum_is_exact() {
        let charges = ChargeBreakdown::from_stay(
            usd(dec!(199.99)),
            4,
            Rate::from_percentage(dec!(8.875)),
            Rate::from_percentage(dec!(3.5)),
        )
        .unwrap();

        assert_eq!(
            charges.total(),
            charges.subtotal() + charges.tax() + charges.service_fee()
        );
        assert_eq!(charges.subtotal().amount(), dec!(799.96));
    }

    #[test]
    fn test_serde_round_trip() {
        let charges =
            ChargeBreakdown::new(usd(dec!(100)), usd(dec!(10)), usd(dec!(5))).unwrap();
        let json = serde_json::to_string(&charges).unwrap();
        let back: ChargeBreakdown = serde_json::from_str(&json).unwrap();
        assert_eq!(back, charges);
    }
}

// ============================================================================
// Record Tests
// ============================================================================

mod record_tests {
    use super::*;

    fn record_115() -> BillingRecord {
        let charges =
            ChargeBreakdown::new(usd(dec!(100)), usd(dec!(10)), usd(dec!(5))).unwrap();
        BillingRecord::new(ReservationId::new_v7(), charges, future_date())
    }

    #[test]
    fn test_partial_then_full_payment_scenario() {
        // Scenario B: pay 50 -> amountPaid=50, partial, outstanding=65
        let mut record = record_115();
        record.apply_payment(usd(dec!(50))).unwrap();

        assert_eq!(record.amount_paid, usd(dec!(50)));
        assert_eq!(record.status, BillingStatus::Partial);
        assert_eq!(record.outstanding_balance(), usd(dec!(65)));

        // Scenario C: pay 65 more -> amountPaid=115, paid, outstanding=0
        record.apply_payment(usd(dec!(65))).unwrap();

        assert_eq!(record.amount_paid, usd(dec!(115)));
        assert_eq!(record.status, BillingStatus::Paid);
        assert!(record.outstanding_balance().is_zero());
    }

    #[test]
    fn test_amount_paid_equals_sum_of_applied_payments() {
        let mut record = record_115();
        let amounts = [dec!(10), dec!(20.50), dec!(0.01), dec!(30)];

        let mut expected = Money::zero(Currency::USD);
        for amount in amounts {
            record.apply_payment(usd(amount)).unwrap();
            expected = expected + usd(amount);
            assert_eq!(record.amount_paid, expected);
        }
    }

    #[test]
    fn test_amount_paid_is_monotonic() {
        let mut record = record_115();
        let mut previous = record.amount_paid;

        for amount in [dec!(5), dec!(40), dec!(100)] {
            record.apply_payment(usd(amount)).unwrap();
            assert!(record.amount_paid >= previous);
            previous = record.amount_paid;
        }
    }

    #[test]
    fn test_rejected_payment_leaves_record_untouched() {
        let mut record = record_115();
        record.apply_payment(usd(dec!(50))).unwrap();
        let before = record.clone();

        assert!(record.apply_payment(usd(dec!(-5))).is_err());
        assert!(record
            .apply_payment(Money::new(dec!(5), Currency::EUR))
            .is_err());

        assert_eq!(record.amount_paid, before.amount_paid);
        assert_eq!(record.status, before.status);
        assert_eq!(record.total_due, before.total_due);
    }

    #[test]
    fn test_paid_is_terminal_for_every_operation() {
        let mut record = record_115();
        record.apply_payment(usd(dec!(115))).unwrap();
        assert_eq!(record.status, BillingStatus::Paid);

        // Further payments keep it paid
        record.apply_payment(usd(dec!(1))).unwrap();
        assert_eq!(record.status, BillingStatus::Paid);

        // The overdue sweep never regresses it
        assert!(!record.mark_overdue(Utc::now(), Timezone::default()));
        assert_eq!(record.status, BillingStatus::Paid);
    }

    #[test]
    fn test_overdue_scenario() {
        // Scenario D: totalDue=200, nothing paid, past due date -> overdue
        let charges =
            ChargeBreakdown::new(usd(dec!(200)), usd(dec!(0)), usd(dec!(0))).unwrap();
        let mut record = BillingRecord::new(ReservationId::new_v7(), charges, past_date());

        assert!(record.mark_overdue(Utc::now(), Timezone::default()));
        assert_eq!(record.status, BillingStatus::Overdue);
        assert_eq!(record.outstanding_balance(), usd(dec!(200)));
    }

    #[test]
    fn test_late_full_payment_clears_overdue() {
        let charges =
            ChargeBreakdown::new(usd(dec!(200)), usd(dec!(0)), usd(dec!(0))).unwrap();
        let mut record = BillingRecord::new(ReservationId::new_v7(), charges, past_date());
        record.mark_overdue(Utc::now(), Timezone::default());

        record.apply_payment(usd(dec!(200))).unwrap();
        assert_eq!(record.status, BillingStatus::Paid);
    }

    #[test]
    fn test_outstanding_balance_never_negative() {
        let mut record = record_115();
        record.apply_payment(usd(dec!(500))).unwrap();

        assert!(!record.outstanding_balance().is_negative());
        assert!(record.outstanding_balance().is_zero());
        assert_eq!(record.credit_balance(), usd(dec!(385)));
    }

    #[test]
    fn test_due_date_threshold_is_property_local() {
        // Due "today" in a UTC+7 property: overdue once Bangkok's day ends,
        // even though the same instant is still within the UTC day.
        let bangkok = Timezone::new(chrono_tz::Asia::Bangkok);
        let due = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let charges =
            ChargeBreakdown::new(usd(dec!(100)), usd(dec!(0)), usd(dec!(0))).unwrap();
        let record = BillingRecord::new(ReservationId::new_v7(), charges, due);

        let just_after_bangkok_midnight = bangkok
            .end_of_day(due)
            .checked_add_signed(chrono::Duration::seconds(1))
            .unwrap();

        assert!(record.is_past_due(just_after_bangkok_midnight, bangkok));
        assert!(!record.is_past_due(just_after_bangkok_midnight, Timezone::default()));
    }
}

// ============================================================================
// Payment Tests
// ============================================================================

mod payment_tests {
    use super::*;

    #[test]
    fn test_payment_serde_round_trip() {
        let payment = Payment::new(
            BillingId::new_v7(),
            usd(dec!(65)),
            PaymentMethod::BankTransfer,
        )
        .with_reference("wire-20240610-0042");

        let json = serde_json::to_string(&payment).unwrap();
        let back: Payment = serde_json::from_str(&json).unwrap();

        assert_eq!(back.amount, payment.amount);
        assert_eq!(back.method, payment.method);
        assert_eq!(back.external_reference, payment.external_reference);
    }

    #[test]
    fn test_method_serializes_snake_case() {
        let json = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(json, "\"credit_card\"");
    }
}

// ============================================================================
// Ledger Tests
// ============================================================================

mod ledger_tests {
    use super::*;

    fn setup_ledger() -> BillingLedger {
        BillingLedger::new(Currency::USD, Timezone::default())
    }

    #[test]
    fn test_aggregate_scenario() {
        // Scenario E: [paid(amountPaid=115), overdue(totalDue=200, paid=0)]
        // -> totalCollected=115, totalOutstanding=200
        let mut ledger = setup_ledger();

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
                past_date(),
            )
            .unwrap();
        ledger.sweep_overdue(Utc::now());

        let totals = ledger.aggregate().unwrap();
        assert_eq!(totals.total_collected, usd(dec!(115)));
        assert_eq!(totals.total_outstanding, usd(dec!(200)));
    }

    #[test]
    fn test_aggregate_counts_partial_records_in_both_totals() {
        let mut ledger = setup_ledger();
        let record = ledger
            .create_billing(
                ReservationId::new_v7(),
                usd(dec!(300)),
                usd(dec!(0)),
                usd(dec!(0)),
                future_date(),
            )
            .unwrap();
        ledger
            .apply_payment(record.id, usd(dec!(100)), PaymentMethod::Cash)
            .unwrap();

        let totals = ledger.aggregate().unwrap();
        assert_eq!(totals.total_collected, usd(dec!(100)));
        assert_eq!(totals.total_outstanding, usd(dec!(200)));
    }

    #[test]
    fn test_aggregate_free_function_over_snapshot() {
        let charges =
            ChargeBreakdown::new(usd(dec!(100)), usd(dec!(0)), usd(dec!(0))).unwrap();
        let records = vec![
            BillingRecord::new(ReservationId::new_v7(), charges, future_date()),
            BillingRecord::new(ReservationId::new_v7(), charges, future_date()),
        ];

        let totals = aggregate(records.iter(), Currency::USD).unwrap();
        assert!(totals.total_collected.is_zero());
        assert_eq!(totals.total_outstanding, usd(dec!(200)));
    }

    #[test]
    fn test_aggregate_empty_ledger_is_zero() {
        let ledger = setup_ledger();
        let totals = ledger.aggregate().unwrap();
        assert!(totals.total_collected.is_zero());
        assert!(totals.total_outstanding.is_zero());
    }

    #[test]
    fn test_mark_overdue_is_noop_when_paid() {
        let mut ledger = setup_ledger();
        let record = ledger
            .create_billing(
                ReservationId::new_v7(),
                usd(dec!(100)),
                usd(dec!(0)),
                usd(dec!(0)),
                past_date(),
            )
            .unwrap();
        ledger
            .apply_payment(record.id, usd(dec!(100)), PaymentMethod::Cash)
            .unwrap();

        let after = ledger.mark_overdue(record.id, Utc::now()).unwrap();
        assert_eq!(after.status, BillingStatus::Paid);
    }

    #[test]
    fn test_sweep_then_pay_then_sweep_again() {
        // A record settled between two sweep runs must stay paid.
        let mut ledger = setup_ledger();
        let record = ledger
            .create_billing(
                ReservationId::new_v7(),
                usd(dec!(150)),
                usd(dec!(0)),
                usd(dec!(0)),
                past_date(),
            )
            .unwrap();

        let now = Utc::now();
        assert_eq!(ledger.sweep_overdue(now), 1);

        ledger
            .apply_payment(record.id, usd(dec!(150)), PaymentMethod::BankTransfer)
            .unwrap();

        assert_eq!(ledger.sweep_overdue(now), 0);
        assert_eq!(ledger.get(&record.id).unwrap().status, BillingStatus::Paid);
    }

    #[test]
    fn test_list_by_status() {
        let mut ledger = setup_ledger();
        for _ in 0..2 {
            ledger
                .create_billing(
                    ReservationId::new_v7(),
                    usd(dec!(100)),
                    usd(dec!(0)),
                    usd(dec!(0)),
                    future_date(),
                )
                .unwrap();
        }
        let paid = ledger
            .create_billing(
                ReservationId::new_v7(),
                usd(dec!(100)),
                usd(dec!(0)),
                usd(dec!(0)),
                future_date(),
            )
            .unwrap();
        ledger
            .apply_payment(paid.id, usd(dec!(100)), PaymentMethod::Voucher)
            .unwrap();

        assert_eq!(ledger.list_by_status(BillingStatus::Pending).len(), 2);
        assert_eq!(ledger.list_by_status(BillingStatus::Paid).len(), 1);
        assert!(ledger.list_by_status(BillingStatus::Overdue).is_empty());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn outstanding_balance_never_negative_for_any_payment_sequence(
            total_minor in 0i64..100_000_000i64,
            payments in proptest::collection::vec(1i64..10_000_000i64, 0..12)
        ) {
            let charges = ChargeBreakdown::new(
                Money::from_minor(total_minor, Currency::USD),
                Money::zero(Currency::USD),
                Money::zero(Currency::USD),
            ).unwrap();
            let mut record = BillingRecord::new(
                ReservationId::new_v7(), charges, future_date(),
            );

            for minor in payments {
                record.apply_payment(Money::from_minor(minor, Currency::USD)).unwrap();
                prop_assert!(!record.outstanding_balance().is_negative());
                prop_assert_eq!(
                    record.status == BillingStatus::Paid,
                    record.amount_paid >= record.total_due
                );
            }
        }

        #[test]
        fn amount_paid_equals_payment_sum(
            payments in proptest::collection::vec(1i64..10_000_000i64, 1..12)
        ) {
            let charges = ChargeBreakdown::new(
                Money::from_minor(50_000_000, Currency::USD),
                Money::zero(Currency::USD),
                Money::zero(Currency::USD),
            ).unwrap();
            let mut record = BillingRecord::new(
                ReservationId::new_v7(), charges, future_date(),
            );

            let sum: i64 = payments.iter().sum();
            for minor in payments {
                record.apply_payment(Money::from_minor(minor, Currency::USD)).unwrap();
            }

            prop_assert_eq!(record.amount_paid, Money::from_minor(sum, Currency::USD));
        }
    }
}
