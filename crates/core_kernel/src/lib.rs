//! Core Kernel - Foundational types and utilities for the hospitality system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Temporal types for stay periods and property-local time handling
//! - Common identifiers and value objects
//! - Ports infrastructure for external service adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{StayPeriod, Timezone, TemporalError};
pub use identifiers::{
    ReservationId, GuestId, RoomId, PropertyId,
    BillingId, PaymentId,
};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, CircuitBreakerConfig, ExternalAuthConfig,
    AdapterHealth, HealthCheckResult, HealthCheckable,
};
