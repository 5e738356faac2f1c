//! Charge breakdown for a reservation folio
//!
//! A billing record carries three charge components: the room subtotal,
//! occupancy tax, and service fees. The total due is always derived from the
//! components, never stored independently of them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, Rate};

use crate::error::BillingError;

/// The validated charge components of a billing record
///
/// All three components share one currency and are non-negative. The
/// breakdown is immutable once constructed; corrections produce a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    subtotal: Money,
    tax: Money,
    service_fee: Money,
}

impl ChargeBreakdown {
    /// Creates a charge breakdown from explicit components
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Validation` if any component is negative or
    /// the components do not share a single currency.
    pub fn new(subtotal: Money, tax: Money, service_fee: Money) -> Result<Self, BillingError> {
        let currency = subtotal.currency();
        if tax.currency() != currency || service_fee.currency() != currency {
            return Err(BillingError::validation(format!(
                "charge components must share one currency, got {}, {}, {}",
                subtotal.currency(),
                tax.currency(),
                service_fee.currency()
            )));
        }

        for (name, component) in [
            ("subtotal", &subtotal),
            ("tax", &tax),
            ("service_fee", &service_fee),
        ] {
            if component.is_negative() {
                return Err(BillingError::validation(format!(
                    "{} must be non-negative, got {}",
                    name, component
                )));
            }
        }

        Ok(Self {
            subtotal,
            tax,
            service_fee,
        })
    }

    /// Derives the breakdown from stay parameters
    ///
    /// The room subtotal is nightly rate times nights; tax and service fee
    /// are computed from their rates with banker's rounding at the
    /// currency's precision. This is the rate breakdown the reservation
    /// service supplies when a folio is opened.
    pub fn from_stay(
        nightly_rate: Money,
        nights: u32,
        tax_rate: Rate,
        service_fee_rate: Rate,
    ) -> Result<Self, BillingError> {
        if nightly_rate.is_negative() {
            return Err(BillingError::validation(format!(
                "nightly rate must be non-negative, got {}",
                nightly_rate
            )));
        }
        if nights == 0 {
            return Err(BillingError::validation("stay must have at least one night"));
        }

        let dp = nightly_rate.currency().decimal_places();
        let subtotal = nightly_rate
            .multiply(Decimal::from(nights))
            .round_to_currency();
        let tax = tax_rate.apply(&subtotal).round_bankers(dp);
        let service_fee = service_fee_rate.apply(&subtotal).round_bankers(dp);

        Self::new(subtotal, tax, service_fee)
    }

    /// Room subtotal component
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Tax component
    pub fn tax(&self) -> Money {
        self.tax
    }

    /// Service fee component
    pub fn service_fee(&self) -> Money {
        self.service_fee
    }

    /// The shared currency of all components
    pub fn currency(&self) -> Currency {
        self.subtotal.currency()
    }

    /// Total due: subtotal + tax + service fee
    pub fn total(&self) -> Money {
        self.subtotal + self.tax + self.service_fee
    }
}
