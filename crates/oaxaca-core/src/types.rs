//! # Domain Types
//!
//! Core domain types used throughout the Oaxaca seating service.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Table       │   │    Customer     │   │  StaffMember    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  table_number   │──►│  customer_id    │   │  staff_id       │       │
//! │  │  customer_id?   │   │  name           │   │  staff_type     │       │
//! │  │  staff_id?   ───┼───┼─────────────────┼──►│                 │       │
//! │  └─────────────────┘   └───────┬─────────┘   └─────────────────┘       │
//! │          │                     │ 0..N                                   │
//! │          │ 0..N                ▼                                        │
//! │  ┌───────▼─────────┐   ┌─────────────────┐                             │
//! │  │    Payment      │   │     Order       │                             │
//! │  │  table_number   │   │  customer_id    │                             │
//! │  │  amount_cents   │   │  status         │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived Occupancy
//! A table has no stored status column. Its [`TableState`] is computed from
//! the two nullable foreign keys by [`TableState::derive`], and nowhere else.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};

// =============================================================================
// Table State
// =============================================================================

/// Occupancy of a physical table.
///
/// ## State Machine
/// ```text
///            assign customer            assign waiter
///   FREE ─────────────────► OCCUPIED_UNSTAFFED ─────────────► OCCUPIED_STAFFED
///    ▲                             │                                 │
///    └──────── clear ──────────────┴──────────────── clear ──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableState {
    /// No customer, no waiter.
    Free,
    /// Customer seated, waiting for a waiter.
    OccupiedUnstaffed,
    /// Customer seated and served by a waiter.
    OccupiedStaffed,
}

impl TableState {
    /// Derives the state from the table's two nullable fields.
    ///
    /// `(None, Some(_))` is unreachable through the allocator and lifecycle
    /// manager, so observing it is reported as an integrity violation.
    pub fn derive(
        table_number: i64,
        customer_id: Option<i64>,
        staff_id: Option<i64>,
    ) -> CoreResult<Self> {
        match (customer_id, staff_id) {
            (None, None) => Ok(TableState::Free),
            (Some(_), None) => Ok(TableState::OccupiedUnstaffed),
            (Some(_), Some(_)) => Ok(TableState::OccupiedStaffed),
            (None, Some(staff_id)) => Err(CoreError::IntegrityViolation {
                table_number,
                detail: format!("staff {} assigned to a table with no customer", staff_id),
            }),
        }
    }

    /// True when a customer is seated.
    #[inline]
    pub const fn is_occupied(&self) -> bool {
        !matches!(self, TableState::Free)
    }
}

impl fmt::Display for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TableState::Free => "FREE",
            TableState::OccupiedUnstaffed => "OCCUPIED_UNSTAFFED",
            TableState::OccupiedStaffed => "OCCUPIED_STAFFED",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Table
// =============================================================================

/// A physical table row. Tables are provisioned once and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub table_number: i64,
    pub customer_id: Option<i64>,
    pub staff_id: Option<i64>,
}

impl Table {
    /// Returns the derived occupancy state.
    pub fn state(&self) -> CoreResult<TableState> {
        TableState::derive(self.table_number, self.customer_id, self.staff_id)
    }
}

/// A table row together with its derived state, as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub table_number: i64,
    pub customer_id: Option<i64>,
    pub staff_id: Option<i64>,
    pub state: TableState,
}

impl TryFrom<Table> for TableView {
    type Error = CoreError;

    fn try_from(table: Table) -> CoreResult<Self> {
        let state = table.state()?;
        Ok(TableView {
            table_number: table.table_number,
            customer_id: table.customer_id,
            staff_id: table.staff_id,
            state,
        })
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer. Immutable after registration.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: i64,
    pub customer_name: String,
    /// Free-text allergy notes passed to the kitchen.
    pub customer_allergies: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Staff
// =============================================================================

/// Role of a staff member. Only waiters are assigned to tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StaffType {
    Waiter,
    Kitchen,
    Manager,
}

impl StaffType {
    pub const ALL: [StaffType; 3] = [StaffType::Waiter, StaffType::Kitchen, StaffType::Manager];

    pub const fn as_str(&self) -> &'static str {
        match self {
            StaffType::Waiter => "waiter",
            StaffType::Kitchen => "kitchen",
            StaffType::Manager => "manager",
        }
    }
}

impl fmt::Display for StaffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "waiter" => Ok(StaffType::Waiter),
            "kitchen" => Ok(StaffType::Kitchen),
            "manager" => Ok(StaffType::Manager),
            _ => Err(ValidationError::NotAllowed {
                field: "staff_type".to_string(),
                allowed: StaffType::ALL.iter().map(|t| t.to_string()).collect(),
            }),
        }
    }
}

/// A member of the staff roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub staff_id: i64,
    pub staff_name: String,
    pub staff_type: StaffType,
}

// =============================================================================
// Order Status
// =============================================================================

/// Status of an order.
///
/// ```text
///   pending ──► delivered
///      │
///      └──────► cancelled
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Single source of truth for order status changes.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Delivered)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: vec!["pending".into(), "delivered".into(), "cancelled".into()],
            }),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub dish_name: String,
    pub quantity: i64,
}

/// An order placed by a seated customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    /// Total in cents, as computed by the order collaborator.
    pub total_price_cents: i64,
    #[ts(as = "String")]
    pub order_time: DateTime<Utc>,
}

// =============================================================================
// Payment
// =============================================================================

/// A recorded card payment for a table.
///
/// Only the last four digits of the card are kept.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// UUID v4.
    pub payment_id: String,
    pub table_number: i64,
    pub amount_cents: i64,
    pub card_holder: String,
    pub card_last4: String,
    pub card_expiry: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Payment details as submitted by the payment collaborator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    pub table_number: i64,
    pub amount_cents: i64,
    pub card_number: String,
    pub card_holder: String,
    pub card_expiry: String,
}

impl NewPayment {
    /// Last four digits of the card number, ignoring spaces and dashes.
    pub fn card_last4(&self) -> String {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

// =============================================================================
// Allocation Outcomes
// =============================================================================

/// How many unstaffed tables one waiter-assignment pass may serve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum WaiterAssignmentMode {
    /// Assign at most one table per call.
    #[default]
    Single,
    /// Assign every unstaffed occupied table while waiters remain.
    Batch,
}

impl FromStr for WaiterAssignmentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(WaiterAssignmentMode::Single),
            "batch" => Ok(WaiterAssignmentMode::Batch),
            _ => Err(ValidationError::NotAllowed {
                field: "waiter_mode".to_string(),
                allowed: vec!["single".into(), "batch".into()],
            }),
        }
    }
}

/// A waiter placed at a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TableAssignment {
    pub table_number: i64,
    pub staff_id: i64,
}

/// Result of one waiter-assignment pass.
///
/// Only `Assigned` means rows were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WaiterAssignment {
    Assigned { assignments: Vec<TableAssignment> },
    NoAvailableWaiters,
    NoUnstaffedTables,
}

impl WaiterAssignment {
    pub fn assignments(&self) -> &[TableAssignment] {
        match self {
            WaiterAssignment::Assigned { assignments } => assignments,
            _ => &[],
        }
    }
}

/// What a successful clear removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub table_number: i64,
    pub previous_state: TableState,
    pub orders_removed: u64,
    pub payments_removed: u64,
}

// =============================================================================
// Reporting
// =============================================================================

/// One line of the floor status board.
///
/// A table with several orders appears once per order; a table with none
/// appears once with empty order columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TableStatusRow {
    pub table_number: i64,
    pub customer_name: Option<String>,
    pub order_id: Option<i64>,
    pub order_status: Option<OrderStatus>,
    pub paid: bool,
}
