//! Payment audit records
//!
//! Every applied payment is appended to the ledger as an immutable audit
//! record. The payment gateway is trusted to deliver validated, settled
//! amounts; failed or reversed gateway attempts never reach this engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{BillingId, Money, PaymentId};

use crate::error::BillingError;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card
    CreditCard,
    /// Debit card
    DebitCard,
    /// Cash at the front desk
    Cash,
    /// Bank transfer
    BankTransfer,
    /// Digital wallet
    DigitalWallet,
    /// Prepaid voucher or gift card
    Voucher,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::DigitalWallet => "digital_wallet",
            PaymentMethod::Voucher => "voucher",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "cash" => Ok(PaymentMethod::Cash),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "digital_wallet" => Ok(PaymentMethod::DigitalWallet),
            "voucher" => Ok(PaymentMethod::Voucher),
            other => Err(BillingError::validation(format!(
                "unknown payment method: {}",
                other
            ))),
        }
    }
}

/// A payment applied to a billing record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Billing record the payment was applied to
    pub billing_id: BillingId,
    /// Payment amount; always positive
    pub amount: Money,
    /// Payment method
    pub method: PaymentMethod,
    /// Gateway reference (transaction id); used by the caller's
    /// idempotency-key dedupe on conflict retries
    pub external_reference: Option<String>,
    /// When the gateway settled the payment
    pub received_at: DateTime<Utc>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment record
    pub fn new(billing_id: BillingId, amount: Money, method: PaymentMethod) -> Self {
        let now = Utc::now();

        Self {
            id: PaymentId::new_v7(),
            billing_id,
            amount,
            method,
            external_reference: None,
            received_at: now,
            created_at: now,
        }
    }

    /// Sets the gateway reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.external_reference = Some(reference.into());
        self
    }

    /// Sets the settlement timestamp reported by the gateway
    pub fn received_at(mut self, at: DateTime<Utc>) -> Self {
        self.received_at = at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn test_payment() -> Payment {
        Payment::new(
            BillingId::new_v7(),
            Money::new(dec!(50), Currency::USD),
            PaymentMethod::CreditCard,
        )
    }

    #[test]
    fn test_payment_new() {
        let payment = test_payment();
        assert_eq!(payment.amount.amount(), dec!(50));
        assert_eq!(payment.method, PaymentMethod::CreditCard);
        assert!(payment.external_reference.is_none());
    }

    #[test]
    fn test_payment_with_reference() {
        let payment = test_payment().with_reference("ch_3NxyzAbc");
        assert_eq!(payment.external_reference, Some("ch_3NxyzAbc".to_string()));
    }

    #[test]
    fn test_method_string_round_trip() {
        for method in [
            PaymentMethod::CreditCard,
            PaymentMethod::DebitCard,
            PaymentMethod::Cash,
            PaymentMethod::BankTransfer,
            PaymentMethod::DigitalWallet,
            PaymentMethod::Voucher,
        ] {
            let parsed: PaymentMethod = method.as_str().parse().unwrap();
            assert_eq!(parsed, method);
        }
        assert!("crypto".parse::<PaymentMethod>().is_err());
    }
}
