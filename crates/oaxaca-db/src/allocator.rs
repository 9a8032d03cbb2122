//! # Table Pool Allocator
//!
//! Reserves free tables for arriving customers and available waiters for
//! occupied tables. This is the only writer that *sets* `tables.customer_id`
//! and `tables.staff_id`.
//!
//! ## Claim Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Customer Claim (per attempt)                         │
//! │                                                                         │
//! │  1. SELECT lowest table_number WHERE customer_id IS NULL               │
//! │     └── none → NoCapacity (nothing written)                            │
//! │                                                                         │
//! │  2. UPDATE tables SET customer_id = ?                                  │
//! │       WHERE table_number = ? AND customer_id IS NULL                   │
//! │     ├── 1 row  → claimed, return table_number                          │
//! │     └── 0 rows → another request won the table, go to 1               │
//! │                                                                         │
//! │  After max_claim_attempts lost races → Conflict                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `WHERE ... IS NULL` guard turns the naive read-then-write into a
//! compare-and-set, so two concurrent registrations can never receive the
//! same table. Waiter assignment uses the same shape, with an extra
//! `NOT EXISTS` guard (and a UNIQUE index) keeping one waiter on one table.
//!
//! ## Selection Policy
//! Tables are picked deterministically (first free by number). Waiters are
//! picked uniformly at random among the eligible ones to spread the load.

use oaxaca_core::validation::validate_id;
use oaxaca_core::{CoreError, TableAssignment, WaiterAssignment, WaiterAssignmentMode};
use rand::seq::SliceRandom;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::staff::StaffRepository;
use crate::repository::table::TableRepository;

/// Lost races tolerated per call before giving up with `Conflict`.
pub const DEFAULT_MAX_CLAIM_ATTEMPTS: u32 = 8;

/// Assigns customers and waiters to tables.
#[derive(Debug, Clone)]
pub struct TableAllocator {
    pool: SqlitePool,
    mode: WaiterAssignmentMode,
    max_claim_attempts: u32,
}

impl TableAllocator {
    /// Creates an allocator in [`WaiterAssignmentMode::Single`] mode.
    pub fn new(pool: SqlitePool) -> Self {
        TableAllocator {
            pool,
            mode: WaiterAssignmentMode::default(),
            max_claim_attempts: DEFAULT_MAX_CLAIM_ATTEMPTS,
        }
    }

    /// Sets how many tables one waiter-assignment pass may serve.
    pub fn with_mode(mut self, mode: WaiterAssignmentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the lost-race budget. Values below 1 are treated as 1.
    pub fn with_max_claim_attempts(mut self, attempts: u32) -> Self {
        self.max_claim_attempts = attempts.max(1);
        self
    }

    pub fn mode(&self) -> WaiterAssignmentMode {
        self.mode
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Seats a registered customer at the lowest-numbered free table.
    ///
    /// ## Errors
    /// - `NotFound` if the customer does not exist
    /// - `Conflict` if the customer is already seated, or every attempt lost
    ///   its race to a concurrent claim
    /// - `NoCapacity` if no table is free; nothing is written
    pub async fn assign_customer_to_table(&self, customer_id: i64) -> DbResult<i64> {
        validate_id("customer_id", customer_id)?;

        let known: Option<i64> =
            sqlx::query_scalar("SELECT customer_id FROM customer WHERE customer_id = ?1")
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await?;
        if known.is_none() {
            return Err(DbError::not_found("Customer", customer_id));
        }

        let seated: Option<i64> =
            sqlx::query_scalar("SELECT table_number FROM tables WHERE customer_id = ?1")
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await?;
        if let Some(table_number) = seated {
            return Err(already_seated(table_number));
        }

        let mut last_candidate = 0;
        for attempt in 1..=self.max_claim_attempts {
            let candidate: Option<i64> = sqlx::query_scalar(
                r#"
                SELECT table_number
                FROM tables
                WHERE customer_id IS NULL
                ORDER BY table_number
                LIMIT 1
                "#,
            )
            .fetch_optional(&self.pool)
            .await?;

            let Some(table_number) = candidate else {
                let total = TableRepository::new(self.pool.clone()).count().await?;
                warn!(customer_id, total, "No free table");
                return Err(CoreError::NoCapacity { total }.into());
            };
            last_candidate = table_number;

            let claimed = sqlx::query(
                r#"
                UPDATE tables
                SET customer_id = ?1
                WHERE table_number = ?2 AND customer_id IS NULL
                "#,
            )
            .bind(customer_id)
            .bind(table_number)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                // Same customer seated by a concurrent request.
                DbError::UniqueViolation { .. } => already_seated(table_number),
                other => other,
            })?
            .rows_affected();

            if claimed == 1 {
                info!(customer_id, table_number, attempt, "Customer seated");
                return Ok(table_number);
            }

            debug!(customer_id, table_number, attempt, "Table claimed concurrently, retrying");
        }

        warn!(
            customer_id,
            attempts = self.max_claim_attempts,
            "Gave up claiming a table"
        );
        Err(CoreError::Conflict {
            table_number: last_candidate,
            reason: format!(
                "lost {} consecutive races for a free table",
                self.max_claim_attempts
            ),
        }
        .into())
    }

    // =========================================================================
    // Waiters
    // =========================================================================

    /// Places available waiters at occupied tables that have none.
    ///
    /// Tables are served in ascending order; each gets a waiter chosen at
    /// random among those not serving any table. In `Single` mode the pass
    /// stops after the first assignment, in `Batch` mode it continues while
    /// both unstaffed tables and free waiters remain.
    ///
    /// `NoAvailableWaiters` and `NoUnstaffedTables` are ordinary outcomes
    /// and leave every row unchanged.
    pub async fn assign_waiter_to_tables(&self) -> DbResult<WaiterAssignment> {
        let tables = TableRepository::new(self.pool.clone());
        let staff = StaffRepository::new(self.pool.clone());

        let mut assignments: Vec<TableAssignment> = Vec::new();
        let mut lost_races = 0;

        loop {
            let unstaffed = tables.unstaffed_occupied().await?;
            let Some(table) = unstaffed.first() else {
                break;
            };
            let table_number = table.table_number;

            let waiters = staff.available_waiters().await?;
            let staff_id = waiters.choose(&mut rand::thread_rng()).copied();
            let Some(staff_id) = staff_id else {
                if assignments.is_empty() {
                    info!(unstaffed = unstaffed.len(), "No available waiters");
                    return Ok(WaiterAssignment::NoAvailableWaiters);
                }
                break;
            };

            if self.try_assign_waiter(table_number, staff_id).await? {
                info!(table_number, staff_id, "Waiter assigned");
                assignments.push(TableAssignment {
                    table_number,
                    staff_id,
                });
                if self.mode == WaiterAssignmentMode::Single {
                    break;
                }
                continue;
            }

            lost_races += 1;
            debug!(table_number, staff_id, lost_races, "Waiter assignment raced, retrying");
            if lost_races >= self.max_claim_attempts {
                if assignments.is_empty() {
                    return Err(CoreError::Conflict {
                        table_number,
                        reason: "waiter assignment kept losing to concurrent passes".to_string(),
                    }
                    .into());
                }
                break;
            }
        }

        if assignments.is_empty() {
            debug!("No unstaffed tables");
            Ok(WaiterAssignment::NoUnstaffedTables)
        } else {
            Ok(WaiterAssignment::Assigned { assignments })
        }
    }

    /// Guarded write of one waiter assignment. `false` means the table or
    /// the waiter was taken in the meantime.
    async fn try_assign_waiter(&self, table_number: i64, staff_id: i64) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tables
            SET staff_id = ?1
            WHERE table_number = ?2
              AND customer_id IS NOT NULL
              AND staff_id IS NULL
              AND NOT EXISTS (SELECT 1 FROM tables WHERE staff_id = ?1)
            "#,
        )
        .bind(staff_id)
        .bind(table_number)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { .. } => Ok(false),
                other => Err(other),
            },
        }
    }
}

fn already_seated(table_number: i64) -> DbError {
    CoreError::Conflict {
        table_number,
        reason: "customer is already seated".to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use oaxaca_core::{CoreError, StaffType, TableState, WaiterAssignment, WaiterAssignmentMode};

    use crate::{Database, DbConfig, DbError};

    async fn floor(tables: u32) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.tables().provision(tables).await.unwrap();
        db
    }

    async fn seat(db: &Database, name: &str) -> i64 {
        let customer = db.customers().register(name, None).await.unwrap();
        db.allocator()
            .assign_customer_to_table(customer.customer_id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_free_table_is_chosen() {
        let db = floor(3).await;

        assert_eq!(seat(&db, "Ana").await, 1);
        assert_eq!(seat(&db, "Ben").await, 2);

        let table = db.tables().get(2).await.unwrap().unwrap();
        assert_eq!(table.state().unwrap(), TableState::OccupiedUnstaffed);
    }

    #[tokio::test]
    async fn test_no_capacity_writes_nothing() {
        let db = floor(1).await;
        seat(&db, "Ana").await;
        let before = db.tables().list().await.unwrap();

        let late = db.customers().register("Ben", None).await.unwrap();
        let err = db
            .allocator()
            .assign_customer_to_table(late.customer_id)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::NoCapacity { total: 1 })
        ));
        assert!(err.is_retryable());
        assert_eq!(db.tables().list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_losing_every_claim_is_a_conflict() {
        let db = floor(2).await;
        let ana = db.customers().register("Ana", None).await.unwrap();

        // Every claim matches zero rows, as if another request won each race.
        sqlx::query(
            r#"
            CREATE TRIGGER tables_contended BEFORE UPDATE ON tables
            BEGIN
                SELECT RAISE(IGNORE);
            END
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();
        let before = db.tables().list().await.unwrap();

        let err = db
            .allocator()
            .with_max_claim_attempts(2)
            .assign_customer_to_table(ana.customer_id)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::Conflict { table_number: 1, .. })
        ));
        assert!(err.is_retryable());
        assert_eq!(db.tables().list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_and_seated_customers_are_rejected() {
        let db = floor(3).await;

        let err = db.allocator().assign_customer_to_table(77).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let ana = db.customers().register("Ana", None).await.unwrap();
        db.allocator()
            .assign_customer_to_table(ana.customer_id)
            .await
            .unwrap();
        let err = db
            .allocator()
            .assign_customer_to_table(ana.customer_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Conflict { table_number: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_waiter_outcomes_without_work() {
        let db = floor(2).await;
        db.staff().add("Rosa", StaffType::Waiter).await.unwrap();

        assert_eq!(
            db.allocator().assign_waiter_to_tables().await.unwrap(),
            WaiterAssignment::NoUnstaffedTables
        );

        let db = floor(2).await;
        db.staff().add("Chef", StaffType::Kitchen).await.unwrap();
        seat(&db, "Ana").await;
        let before = db.tables().list().await.unwrap();

        assert_eq!(
            db.allocator().assign_waiter_to_tables().await.unwrap(),
            WaiterAssignment::NoAvailableWaiters
        );
        assert_eq!(db.tables().list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_single_mode_assigns_one_table() {
        let db = floor(3).await;
        db.staff().add("Rosa", StaffType::Waiter).await.unwrap();
        db.staff().add("Iker", StaffType::Waiter).await.unwrap();
        seat(&db, "Ana").await;
        seat(&db, "Ben").await;

        let outcome = db.allocator().assign_waiter_to_tables().await.unwrap();
        let assigned = outcome.assignments();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].table_number, 1);
        assert_eq!(db.tables().unstaffed_occupied().await.unwrap().len(), 1);

        // Second call serves the next table with the other waiter.
        let outcome = db.allocator().assign_waiter_to_tables().await.unwrap();
        assert_eq!(outcome.assignments()[0].table_number, 2);
        assert_ne!(outcome.assignments()[0].staff_id, assigned[0].staff_id);
    }

    #[tokio::test]
    async fn test_batch_mode_never_double_books() {
        let db = floor(4).await;
        db.staff().add("Rosa", StaffType::Waiter).await.unwrap();
        db.staff().add("Iker", StaffType::Waiter).await.unwrap();
        db.staff().add("Marta", StaffType::Manager).await.unwrap();
        for name in ["Ana", "Ben", "Cy"] {
            seat(&db, name).await;
        }

        let outcome = db
            .allocator()
            .with_mode(WaiterAssignmentMode::Batch)
            .assign_waiter_to_tables()
            .await
            .unwrap();

        let assigned = outcome.assignments();
        assert_eq!(assigned.len(), 2);
        let waiters: HashSet<i64> = assigned.iter().map(|a| a.staff_id).collect();
        assert_eq!(waiters.len(), 2);
        let tables: Vec<i64> = assigned.iter().map(|a| a.table_number).collect();
        assert_eq!(tables, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_table_pick_is_fixed_waiter_pick_is_random() {
        let mut tables_seen = HashSet::new();
        let mut waiters_seen = HashSet::new();

        for _ in 0..40 {
            let db = floor(2).await;
            db.staff().add("Rosa", StaffType::Waiter).await.unwrap();
            db.staff().add("Iker", StaffType::Waiter).await.unwrap();
            tables_seen.insert(seat(&db, "Ana").await);

            let outcome = db.allocator().assign_waiter_to_tables().await.unwrap();
            waiters_seen.insert(outcome.assignments()[0].staff_id);
        }

        assert_eq!(tables_seen.len(), 1);
        assert_eq!(waiters_seen.len(), 2);
    }
}
