//! # Table Repository
//!
//! Provisioning and read-only projections over the `tables` relation.
//!
//! Writes to `customer_id` / `staff_id` live elsewhere on purpose:
//! [`TableAllocator`](crate::allocator::TableAllocator) sets them and
//! [`TableLifecycle`](crate::lifecycle::TableLifecycle) clears them. This
//! repository never touches either column.

use oaxaca_core::validation::validate_table_count;
use oaxaca_core::Table;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// Repository for table rows.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Ensures tables `1..=count` exist. Existing rows keep their state.
    ///
    /// ## Returns
    /// Number of tables newly created.
    pub async fn provision(&self, count: u32) -> DbResult<u64> {
        validate_table_count(count)?;

        let mut tx = self.pool.begin().await?;
        let mut created = 0;
        for table_number in 1..=i64::from(count) {
            created += sqlx::query("INSERT OR IGNORE INTO tables (table_number) VALUES (?1)")
                .bind(table_number)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;

        info!(count, created, "Floor provisioned");
        Ok(created)
    }

    /// All tables, ordered by table number (showTables).
    pub async fn list(&self) -> DbResult<Vec<Table>> {
        let tables = sqlx::query_as::<_, Table>(
            r#"
            SELECT table_number, customer_id, staff_id
            FROM tables
            ORDER BY table_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Gets one table by number.
    pub async fn get(&self, table_number: i64) -> DbResult<Option<Table>> {
        let table = sqlx::query_as::<_, Table>(
            "SELECT table_number, customer_id, staff_id FROM tables WHERE table_number = ?1",
        )
        .bind(table_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Tables served by one staff member (showAssigned).
    ///
    /// Unknown staff ids yield an empty list.
    pub async fn assigned_to(&self, staff_id: i64) -> DbResult<Vec<Table>> {
        debug!(staff_id, "Listing assigned tables");

        let tables = sqlx::query_as::<_, Table>(
            r#"
            SELECT table_number, customer_id, staff_id
            FROM tables
            WHERE staff_id = ?1
            ORDER BY table_number
            "#,
        )
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Occupied tables still waiting for a waiter, in scan order.
    pub async fn unstaffed_occupied(&self) -> DbResult<Vec<Table>> {
        let tables = sqlx::query_as::<_, Table>(
            r#"
            SELECT table_number, customer_id, staff_id
            FROM tables
            WHERE customer_id IS NOT NULL AND staff_id IS NULL
            ORDER BY table_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Total number of provisioned tables.
    pub async fn count(&self) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tables")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_provision_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = db.tables();

        assert_eq!(tables.provision(3).await.unwrap(), 3);
        assert_eq!(tables.provision(3).await.unwrap(), 0);
        assert_eq!(tables.provision(5).await.unwrap(), 2);
        assert_eq!(tables.count().await.unwrap(), 5);

        let numbers: Vec<i64> = tables
            .list()
            .await
            .unwrap()
            .iter()
            .map(|t| t.table_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_provision_rejects_empty_floor() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.tables().provision(0).await.is_err());
    }

    #[tokio::test]
    async fn test_assigned_to_unknown_staff_is_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.tables().provision(2).await.unwrap();

        assert!(db.tables().assigned_to(99).await.unwrap().is_empty());
        assert!(db.tables().get(7).await.unwrap().is_none());
    }
}
