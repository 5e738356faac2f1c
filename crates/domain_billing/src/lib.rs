//! Billing Domain - Reservation Billing Ledger Engine
//!
//! This crate implements the billing-state reconciliation logic for the
//! hospitality core: given a reservation's charges (room subtotal, occupancy
//! tax, service fees) and a sequence of payments, it produces a definitive
//! billing status and outstanding balance, and keeps them consistent as
//! payments arrive.
//!
//! # Status lifecycle
//!
//! ```text
//! Pending ──payment──▶ Partial ──payment──▶ Paid (terminal)
//!    │                    │                   ▲
//!    │                    └───past due────┐   │
//!    ├────full payment────────────────────┼───┘
//!    └────past due───▶ Overdue ───full payment
//! ```
//!
//! No transition leaves `Paid`. The overdue transition is time-based and
//! driven by the periodic sweep; everything else is derived from the ratio
//! of `amount_paid` to `total_due`.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{BillingLedger, PaymentMethod};
//!
//! let mut ledger = BillingLedger::new(Currency::USD, Timezone::default());
//!
//! let record = ledger.create_billing(reservation_id, subtotal, tax, fee, due_date)?;
//! ledger.apply_payment(record.id, deposit, PaymentMethod::CreditCard)?;
//! ```

pub mod charges;
pub mod record;
pub mod payment;
pub mod ledger;
pub mod error;

pub use charges::ChargeBreakdown;
pub use record::{BillingRecord, BillingStatus};
pub use payment::{Payment, PaymentMethod};
pub use ledger::{aggregate, BillingLedger, BillingTotals};
pub use error::BillingError;
