//! Read-only floor reports.

use oaxaca_core::TableStatusRow;
use sqlx::SqlitePool;

use crate::error::DbResult;

/// Joined views over tables, customers, orders and payments.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// One row per (table, order), ordered by table then order.
    ///
    /// Tables without orders appear once with empty order columns. `paid`
    /// is true when any payment was recorded for the table.
    pub async fn status_board(&self) -> DbResult<Vec<TableStatusRow>> {
        let rows = sqlx::query_as::<_, TableStatusRow>(
            r#"
            SELECT
                t.table_number,
                c.customer_name,
                o.order_id,
                o.status AS order_status,
                EXISTS (
                    SELECT 1 FROM payments p WHERE p.table_number = t.table_number
                ) AS paid
            FROM tables t
            LEFT JOIN customer c ON c.customer_id = t.customer_id
            LEFT JOIN orders o ON o.customer_id = t.customer_id
            ORDER BY t.table_number, o.order_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
