//! # Order Repository
//!
//! Orders placed by seated customers, and the status tracker that moves them
//! through their lifecycle.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. PLACE                                                              │
//! │     └── place() → Order { status: Pending }                            │
//! │                                                                         │
//! │  2. SERVE (one of)                                                     │
//! │     └── mark_delivered() → Order { status: Delivered }                 │
//! │     └── cancel()         → Order { status: Cancelled }                 │
//! │                                                                         │
//! │  3. TABLE CLEARED                                                      │
//! │     └── TableLifecycle::clear_table() deletes every order of the       │
//! │         table's customer, whatever its status                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use oaxaca_core::validation::{validate_id, validate_order_items};
use oaxaca_core::{CoreError, Order, OrderItem, OrderStatus, ValidationError};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Raw `orders` row; `items` is the stored JSON array.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: i64,
    customer_id: i64,
    status: OrderStatus,
    items: String,
    total_price_cents: i64,
    order_time: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        let items: Vec<OrderItem> = serde_json::from_str(&row.items)?;
        Ok(Order {
            order_id: row.order_id,
            customer_id: row.customer_id,
            status: row.status,
            items,
            total_price_cents: row.total_price_cents,
            order_time: row.order_time,
        })
    }
}

const ORDER_COLUMNS: &str = "order_id, customer_id, status, items, total_price_cents, order_time";

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places a new pending order for a customer.
    pub async fn place(
        &self,
        customer_id: i64,
        items: &[OrderItem],
        total_price_cents: i64,
    ) -> DbResult<Order> {
        validate_id("customer_id", customer_id)?;
        validate_order_items(items)?;
        if total_price_cents < 0 {
            return Err(ValidationError::MustBePositive {
                field: "total_price_cents".to_string(),
            }
            .into());
        }

        let items_json = serde_json::to_string(items)?;
        let sql = format!(
            "INSERT INTO orders (customer_id, status, items, total_price_cents, order_time) \
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {ORDER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(customer_id)
            .bind(OrderStatus::Pending)
            .bind(items_json)
            .bind(total_price_cents)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::not_found("Customer", customer_id),
                other => other,
            })?;

        debug!(order_id = row.order_id, customer_id, "Order placed");
        row.try_into()
    }

    /// Gets an order by id.
    pub async fn get(&self, order_id: i64) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = ?1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    /// Orders of one customer, oldest first.
    pub async fn list_for_customer(&self, customer_id: i64) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = ?1 ORDER BY order_id"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Every order on the floor, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY order_id");
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Marks a pending order as delivered.
    pub async fn mark_delivered(&self, order_id: i64) -> DbResult<Order> {
        self.transition(order_id, OrderStatus::Delivered).await
    }

    /// Cancels a pending order.
    pub async fn cancel(&self, order_id: i64) -> DbResult<Order> {
        self.transition(order_id, OrderStatus::Cancelled).await
    }

    /// Moves an order to `next` if [`OrderStatus::can_transition_to`] allows it.
    ///
    /// The update is guarded by the status that was read, so two concurrent
    /// changes cannot both succeed.
    async fn transition(&self, order_id: i64, next: OrderStatus) -> DbResult<Order> {
        let current = self
            .get(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        if !current.status.can_transition_to(next) {
            return Err(CoreError::InvalidOrderTransition {
                order_id,
                from: current.status,
                to: next,
            }
            .into());
        }

        let updated = sqlx::query("UPDATE orders SET status = ?1 WHERE order_id = ?2 AND status = ?3")
            .bind(next)
            .bind(order_id)
            .bind(current.status)
            .execute(&self.pool)
            .await?
            .rows_affected();

        match self.get(order_id).await? {
            Some(order) if updated == 1 => {
                info!(order_id, from = %current.status, to = %next, "Order status changed");
                Ok(order)
            }
            // Changed or removed by someone else between read and write.
            Some(order) => Err(CoreError::InvalidOrderTransition {
                order_id,
                from: order.status,
                to: next,
            }
            .into()),
            None => Err(DbError::not_found("Order", order_id)),
        }
    }
}
