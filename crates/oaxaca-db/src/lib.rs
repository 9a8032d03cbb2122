//! # oaxaca-db: Storage and Table Engine
//!
//! SQLite storage for the restaurant floor, plus the components that keep
//! table occupancy consistent under concurrent requests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Oaxaca Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (POST /table/assign)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    oaxaca-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ Table engine  │    │ Repositories │  │   │
//! │  │   │   (pool.rs)   │    │               │    │              │  │   │
//! │  │   │               │    │ TableAllocator│    │ TableRepo    │  │   │
//! │  │   │ SqlitePool    │◄───│ TableLifecycle│    │ CustomerRepo │  │   │
//! │  │   │ Migrations    │    │ ReportRepo    │    │ Staff/Order/ │  │   │
//! │  │   │               │    │               │    │ PaymentRepo  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   tables · customer · staff · orders · payments                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and component handles
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`allocator`] - Race-free table and waiter assignment
//! - [`lifecycle`] - Atomic table clearing, derived state
//! - [`reporting`] - Floor status board
//! - [`repository`] - Collaborator repositories (customers, staff, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oaxaca_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./oaxaca.db")).await?;
//! db.tables().provision(12).await?;
//!
//! let customer = db.customers().register("Ana", Some("peanuts")).await?;
//! let table = db.allocator().assign_customer_to_table(customer.customer_id).await?;
//! db.allocator().assign_waiter_to_tables().await?;
//!
//! let report = db.lifecycle().clear_table(table).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocator;
pub mod error;
pub mod lifecycle;
pub mod migrations;
pub mod pool;
pub mod reporting;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use allocator::{TableAllocator, DEFAULT_MAX_CLAIM_ATTEMPTS};
pub use lifecycle::TableLifecycle;
pub use reporting::ReportRepository;

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::order::OrderRepository;
pub use repository::payment::PaymentRepository;
pub use repository::staff::StaffRepository;
pub use repository::table::TableRepository;
