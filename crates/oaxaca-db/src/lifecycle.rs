//! # Table Lifecycle Manager
//!
//! Owns the occupancy state machine of each table and the atomic clear.
//!
//! Occupancy is never stored. It is derived from `customer_id` and
//! `staff_id` by [`TableState::derive`], and this module is the only writer
//! that nulls those fields out.
//!
//! ## Clear Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      clear_table(n)                                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   1. DELETE orders of the table's current customer                     │
//! │      (first statement is a write: SQLite takes the write lock here,    │
//! │       so the customer read in the subquery cannot change under us)     │
//! │   2. SELECT the table row            → missing: NotFound, ROLLBACK     │
//! │   3. DELETE payments of table n                                        │
//! │   4. UPDATE tables SET customer_id = NULL, staff_id = NULL             │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any `?` between BEGIN and COMMIT drops the transaction, which rolls   │
//! │  it back and returns the connection to the pool.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use oaxaca_core::validation::validate_id;
use oaxaca_core::{ClearReport, CoreError, Table, TableState};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

use crate::error::{DbError, DbResult};

/// Clears tables and reports their derived state.
#[derive(Debug, Clone)]
pub struct TableLifecycle {
    pool: SqlitePool,
}

impl TableLifecycle {
    /// Creates a new TableLifecycle.
    pub fn new(pool: SqlitePool) -> Self {
        TableLifecycle { pool }
    }

    /// Releases a table: resets customer and waiter, deletes the customer's
    /// orders (whatever their status) and the table's payments.
    ///
    /// All of it commits together or not at all. Clearing a free table
    /// succeeds and removes nothing, so the call is idempotent.
    ///
    /// ## Errors
    /// - `NotFound` if the table number was never provisioned
    /// - storage errors, after the transaction has been rolled back
    pub async fn clear_table(&self, table_number: i64) -> DbResult<ClearReport> {
        validate_id("table_number", table_number)?;

        let mut tx = self.pool.begin().await?;

        let orders_removed = sqlx::query(
            r#"
            DELETE FROM orders
            WHERE customer_id = (SELECT customer_id FROM tables WHERE table_number = ?1)
            "#,
        )
        .bind(table_number)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let table = sqlx::query_as::<_, Table>(
            "SELECT table_number, customer_id, staff_id FROM tables WHERE table_number = ?1",
        )
        .bind(table_number)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Table", table_number))?;

        let previous_state = match table.state() {
            Ok(state) => state,
            Err(violation) => {
                // Clearing repairs the row, so the clear still goes ahead.
                error!(table_number, error = %violation, "Table integrity violation");
                TableState::Free
            }
        };

        let payments_removed = sqlx::query("DELETE FROM payments WHERE table_number = ?1")
            .bind(table_number)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query(
            r#"
            UPDATE tables
            SET customer_id = NULL, staff_id = NULL
            WHERE table_number = ?1
            "#,
        )
        .bind(table_number)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        if previous_state == TableState::Free && orders_removed == 0 && payments_removed == 0 {
            debug!(table_number, "Cleared an already free table");
        } else {
            info!(
                table_number,
                %previous_state,
                orders_removed,
                payments_removed,
                "Table cleared"
            );
        }

        Ok(ClearReport {
            table_number,
            previous_state,
            orders_removed,
            payments_removed,
        })
    }

    /// Derived occupancy of one table.
    pub async fn state_of(&self, table_number: i64) -> DbResult<TableState> {
        let table = sqlx::query_as::<_, Table>(
            "SELECT table_number, customer_id, staff_id FROM tables WHERE table_number = ?1",
        )
        .bind(table_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Table", table_number))?;

        table.state().map_err(|violation| {
            if let CoreError::IntegrityViolation { detail, .. } = &violation {
                error!(table_number, %detail, "Table integrity violation");
            }
            violation.into()
        })
    }
}
