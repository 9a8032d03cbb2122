//! # Repository Module
//!
//! Data-access wrappers around the five relations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.orders().mark_delivered(order_id)                          │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── place(&self, customer_id, items, total)                           │
//! │  ├── get(&self, id)                                                    │
//! │  └── mark_delivered / cancel                                           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TableRepository`](table::TableRepository) - Provisioning, table listings
//! - [`CustomerRepository`](customer::CustomerRepository) - Registration
//! - [`StaffRepository`](staff::StaffRepository) - Roster, available waiters
//! - [`OrderRepository`](order::OrderRepository) - Orders and status changes
//! - [`PaymentRepository`](payment::PaymentRepository) - Payments per table
//!
//! The table engine itself (allocation, clearing) lives in
//! [`crate::allocator`] and [`crate::lifecycle`].

pub mod customer;
pub mod order;
pub mod payment;
pub mod staff;
pub mod table;
