//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant fields
//! while using defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{BillingId, Currency, Money, ReservationId};
use domain_billing::{BillingRecord, ChargeBreakdown, Payment, PaymentMethod};
use rust_decimal_macros::dec;

use crate::fixtures::{IdFixtures, TemporalFixtures};

/// Builder for constructing test billing records
///
/// Defaults to the canonical scenario folio: subtotal 100, tax 10,
/// service fee 5 (total due 115) in USD, due far in the future.
pub struct BillingRecordBuilder {
    reservation_id: ReservationId,
    subtotal: Money,
    tax: Money,
    service_fee: Money,
    due_date: NaiveDate,
    payments: Vec<Money>,
}

impl Default for BillingRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BillingRecordBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            reservation_id: IdFixtures::reservation_id(),
            subtotal: Money::new(dec!(100), Currency::USD),
            tax: Money::new(dec!(10), Currency::USD),
            service_fee: Money::new(dec!(5), Currency::USD),
            due_date: TemporalFixtures::far_future_due_date(),
            payments: Vec::new(),
        }
    }

    /// Sets the reservation ID
    pub fn with_reservation_id(mut self, id: ReservationId) -> Self {
        self.reservation_id = id;
        self
    }

    /// Sets the room subtotal
    pub fn with_subtotal(mut self, subtotal: Money) -> Self {
        self.subtotal = subtotal;
        self
    }

    /// Sets the tax component
    pub fn with_tax(mut self, tax: Money) -> Self {
        self.tax = tax;
        self
    }

    /// Sets the service-fee component
    pub fn with_service_fee(mut self, service_fee: Money) -> Self {
        self.service_fee = service_fee;
        self
    }

    /// Sets all three charge components to the given amounts
    pub fn with_charges(mut self, subtotal: Money, tax: Money, service_fee: Money) -> Self {
        self.subtotal = subtotal;
        self.tax = tax;
        self.service_fee = service_fee;
        self
    }

    /// Sets the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    /// Queues a payment to apply after construction
    pub fn with_payment(mut self, amount: Money) -> Self {
        self.payments.push(amount);
        self
    }

    /// Builds the billing record, applying any queued payments
    ///
    /// # Panics
    ///
    /// Panics if the configured charges or payments are invalid; builders
    /// are for tests, where that is a test bug.
    pub fn build(self) -> BillingRecord {
        let charges = ChargeBreakdown::new(self.subtotal, self.tax, self.service_fee)
            .expect("builder charges must be valid");
        let mut record = BillingRecord::new(self.reservation_id, charges, self.due_date);

        for amount in self.payments {
            record
                .apply_payment(amount)
                .expect("builder payments must be valid");
        }

        record
    }
}

/// Builder for constructing test payments
pub struct PaymentBuilder {
    billing_id: BillingId,
    amount: Money,
    method: PaymentMethod,
    external_reference: Option<String>,
}

impl Default for PaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            billing_id: IdFixtures::billing_id(),
            amount: Money::new(dec!(50), Currency::USD),
            method: PaymentMethod::CreditCard,
            external_reference: None,
        }
    }

    /// Sets the billing record the payment applies to
    pub fn with_billing_id(mut self, id: BillingId) -> Self {
        self.billing_id = id;
        self
    }

    /// Sets the payment amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the payment method
    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the gateway reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.external_reference = Some(reference.into());
        self
    }

    /// Builds the payment
    pub fn build(self) -> Payment {
        let mut payment = Payment::new(self.billing_id, self.amount, self.method);
        if let Some(reference) = self.external_reference {
            payment = payment.with_reference(reference);
        }
        payment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_billing::BillingStatus;

    #[test]
    fn test_default_builder_matches_scenario_folio() {
        let record = BillingRecordBuilder::new().build();
        assert_eq!(record.total_due, Money::new(dec!(115), Currency::USD));
        assert_eq!(record.status, BillingStatus::Pending);
    }

    #[test]
    fn test_builder_with_payment_produces_partial_record() {
        let record = BillingRecordBuilder::new()
            .with_payment(Money::new(dec!(50), Currency::USD))
            .build();

        assert_eq!(record.status, BillingStatus::Partial);
        assert_eq!(
            record.outstanding_balance(),
            Money::new(dec!(65), Currency::USD)
        );
    }
}
