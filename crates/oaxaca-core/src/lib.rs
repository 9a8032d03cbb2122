//! # oaxaca-core: Pure Domain Logic for the Oaxaca Floor
//!
//! This crate holds the rules of the seating service as pure functions and
//! plain data types. Nothing in here touches a database or a socket.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Oaxaca Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web client (React)                           │   │
//! │  │    Register ──► Floor view ──► Orders ──► Pay ──► Clear table   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ oaxaca-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ TableState │  │  errors   │  │ validation│  │   │
//! │  │   │  Table    │  │  derive()  │  │ CoreError │  │   rules   │  │   │
//! │  │   │  Order    │  │            │  │           │  │           │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    oaxaca-db (Database Layer)                   │   │
//! │  │      SQLite, allocator, lifecycle manager, reporting queries    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Table, Customer, StaffMember, Order, Payment)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use oaxaca_core::TableState;
//!
//! assert_eq!(TableState::derive(1, None, None).unwrap(), TableState::Free);
//! assert_eq!(
//!     TableState::derive(1, Some(7), Some(3)).unwrap(),
//!     TableState::OccupiedStaffed
//! );
//! // A waiter at an empty table can never be produced by the engine.
//! assert!(TableState::derive(1, None, Some(3)).is_err());
//! ```

pub mod error;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of tables provisioned when no floor size is configured.
pub const DEFAULT_TABLE_COUNT: u32 = 12;

/// Upper bound on the floor size accepted by configuration and seeding.
pub const MAX_TABLE_COUNT: u32 = 500;

/// Maximum number of distinct lines on a single order.
pub const MAX_ORDER_LINES: usize = 50;

/// Maximum quantity of one dish on a single order line.
pub const MAX_LINE_QUANTITY: i64 = 99;
