//! Infrastructure Database Layer
//!
//! This crate provides the database infrastructure for the hospitality core,
//! implementing the persistent billing ledger on PostgreSQL using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern, providing data access
//! abstractions that hide the database implementation details from the
//! domain layer. The billing repository supplies the transactional boundary
//! the ledger engine requires: `apply_payment` serializes concurrent calls
//! against the same billing record so `total_due`, `amount_paid`, and
//! `status` are always recomputed together.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, BillingRepository, DatabaseConfig};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/hospitality")).await?;
//! let repo = BillingRepository::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::billing::BillingRepository;
