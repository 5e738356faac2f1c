//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the
//! hospitality system. These fixtures are designed to be consistent and
//! predictable for unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{
    BillingId, Currency, GuestId, Money, PaymentId, Rate, ReservationId, StayPeriod,
};
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Creates a standard USD amount for testing
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }

    /// A typical nightly room rate
    pub fn usd_nightly_rate() -> Money {
        Money::new(dec!(149.50), Currency::USD)
    }

    /// The canonical folio total used across billing scenarios
    pub fn usd_folio_total() -> Money {
        Money::new(dec!(115.00), Currency::USD)
    }

    /// Creates a zero amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// Creates a EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }

    /// Creates a JPY amount (zero decimal places)
    pub fn jpy_12000() -> Money {
        Money::new(dec!(12000), Currency::JPY)
    }

    /// A standard occupancy tax rate
    pub fn tax_rate() -> Rate {
        Rate::from_percentage(dec!(8.5))
    }

    /// A standard service-fee rate
    pub fn service_fee_rate() -> Rate {
        Rate::from_percentage(dec!(2.0))
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard check-in date (June 10, 2024)
    pub fn check_in() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    /// Standard check-out date (June 13, 2024): a three-night stay
    pub fn check_out() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 13).unwrap()
    }

    /// Standard stay period
    pub fn stay() -> StayPeriod {
        StayPeriod::new(Self::check_in(), Self::check_out()).unwrap()
    }

    /// Payment due date one week after check-out
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
    }

    /// A due date long past, for overdue scenarios
    pub fn past_due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    /// A due date far in the future, for never-overdue scenarios
    pub fn far_future_due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
    }

    /// A fixed instant after the standard due date has passed
    pub fn after_due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    pub fn reservation_id() -> ReservationId {
        ReservationId::new_v7()
    }

    pub fn guest_id() -> GuestId {
        GuestId::new_v7()
    }

    pub fn billing_id() -> BillingId {
        BillingId::new_v7()
    }

    pub fn payment_id() -> PaymentId {
        PaymentId::new_v7()
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// A realistic guest display name
    pub fn guest_name() -> String {
        Name().fake()
    }

    /// A gateway transaction reference
    pub fn gateway_reference() -> &'static str {
        "ch_3NxGz2EbAq7WvX1q"
    }

    /// A room type label
    pub fn room_type() -> &'static str {
        "Deluxe King"
    }
}
