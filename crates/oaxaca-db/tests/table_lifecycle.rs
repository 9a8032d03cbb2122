//! End-to-end table lifecycle against a file-backed database, so the pool
//! really hands out several connections at once.

use std::collections::HashSet;

use oaxaca_core::{CoreError, OrderItem, StaffType, TableState, WaiterAssignmentMode};
use oaxaca_db::{Database, DbConfig, DbError};
use tempfile::TempDir;

async fn file_database(dir: &TempDir, tables: u32) -> Database {
    let config = DbConfig::new(dir.path().join("floor.db")).max_connections(8);
    let db = Database::new(config).await.unwrap();
    db.tables().provision(tables).await.unwrap();
    db
}

/// No table row may hold a waiter without a customer.
async fn assert_floor_consistent(db: &Database) {
    for table in db.tables().list().await.unwrap() {
        assert!(
            table.state().is_ok(),
            "table {} is staffed but empty",
            table.table_number
        );
    }
}

#[tokio::test]
async fn test_floor_walkthrough() {
    let dir = TempDir::new().unwrap();
    let db = file_database(&dir, 3).await;
    let w1 = db.staff().add("Rosa", StaffType::Waiter).await.unwrap();

    let c1 = db.customers().register("C1", None).await.unwrap();
    let c2 = db.customers().register("C2", Some("shellfish")).await.unwrap();
    assert_eq!(
        db.allocator().assign_customer_to_table(c1.customer_id).await.unwrap(),
        1
    );
    assert_eq!(
        db.allocator().assign_customer_to_table(c2.customer_id).await.unwrap(),
        2
    );

    let outcome = db.allocator().assign_waiter_to_tables().await.unwrap();
    let assigned = outcome.assignments();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].table_number, 1);
    assert_eq!(assigned[0].staff_id, w1.staff_id);
    assert_eq!(
        db.tables().assigned_to(w1.staff_id).await.unwrap()[0].table_number,
        1
    );
    assert_floor_consistent(&db).await;

    let items = vec![OrderItem {
        dish_name: "Enmoladas".to_string(),
        quantity: 2,
    }];
    db.orders().place(c1.customer_id, &items, 2400).await.unwrap();
    db.orders().place(c2.customer_id, &items, 2400).await.unwrap();

    db.lifecycle().clear_table(1).await.unwrap();
    assert_eq!(db.lifecycle().state_of(1).await.unwrap(), TableState::Free);
    assert_eq!(
        db.lifecycle().state_of(2).await.unwrap(),
        TableState::OccupiedUnstaffed
    );
    assert!(db.orders().list_for_customer(c1.customer_id).await.unwrap().is_empty());
    assert_eq!(
        db.orders().list_for_customer(c2.customer_id).await.unwrap().len(),
        1
    );

    let c3 = db.customers().register("C3", None).await.unwrap();
    let table = db
        .allocator()
        .assign_customer_to_table(c3.customer_id)
        .await
        .unwrap();
    assert!(table == 1 || table == 3);
    assert_floor_consistent(&db).await;

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_get_distinct_tables() {
    let dir = TempDir::new().unwrap();
    let db = file_database(&dir, 10).await;

    let mut customers = Vec::new();
    for i in 0..10 {
        let customer = db
            .customers()
            .register(&format!("Guest {}", i), None)
            .await
            .unwrap();
        customers.push(customer.customer_id);
    }

    let handles: Vec<_> = customers
        .into_iter()
        .map(|customer_id| {
            let allocator = db.allocator().with_max_claim_attempts(32);
            tokio::spawn(async move { allocator.assign_customer_to_table(customer_id).await })
        })
        .collect();

    let mut claimed = HashSet::new();
    for handle in handles {
        let table = handle.await.unwrap().unwrap();
        assert!(claimed.insert(table), "table {} handed out twice", table);
    }
    assert_eq!(claimed.len(), 10);

    // Floor is full now; nothing changes on the next attempt.
    let before = db.tables().list().await.unwrap();
    let late = db.customers().register("Late", None).await.unwrap();
    let err = db
        .allocator()
        .assign_customer_to_table(late.customer_id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Domain(CoreError::NoCapacity { total: 10 })
    ));
    assert_eq!(db.tables().list().await.unwrap(), before);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_waiter_passes_never_double_book() {
    let dir = TempDir::new().unwrap();
    let db = file_database(&dir, 6).await;

    for name in ["Rosa", "Iker", "Lupita"] {
        db.staff().add(name, StaffType::Waiter).await.unwrap();
    }
    for i in 0..6 {
        let customer = db
            .customers()
            .register(&format!("Guest {}", i), None)
            .await
            .unwrap();
        db.allocator()
            .assign_customer_to_table(customer.customer_id)
            .await
            .unwrap();
    }

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let allocator = db
                .allocator()
                .with_mode(WaiterAssignmentMode::Batch)
                .with_max_claim_attempts(32);
            tokio::spawn(async move { allocator.assign_waiter_to_tables().await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let staffed: Vec<i64> = db
        .tables()
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|t| t.staff_id)
        .collect();
    let distinct: HashSet<i64> = staffed.iter().copied().collect();
    assert_eq!(staffed.len(), 3);
    assert_eq!(distinct.len(), 3);
    assert!(db.staff().available_waiters().await.unwrap().is_empty());
    assert_floor_consistent(&db).await;

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_clear_is_never_observed_half_done() {
    let dir = TempDir::new().unwrap();
    let db = file_database(&dir, 1).await;

    let ana = db.customers().register("Ana", None).await.unwrap();
    db.allocator()
        .assign_customer_to_table(ana.customer_id)
        .await
        .unwrap();
    let items = vec![OrderItem {
        dish_name: "Tamal".to_string(),
        quantity: 1,
    }];
    for _ in 0..5 {
        db.orders().place(ana.customer_id, &items, 500).await.unwrap();
    }

    let reader_db = db.clone();
    let customer_id = ana.customer_id;
    let reader = tokio::spawn(async move {
        for _ in 0..50 {
            let mut tx = reader_db.pool().begin().await.unwrap();
            let seated: Option<i64> =
                sqlx::query_scalar("SELECT customer_id FROM tables WHERE table_number = 1")
                    .fetch_one(&mut *tx)
                    .await
                    .unwrap();
            let orders: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = ?1")
                    .bind(customer_id)
                    .fetch_one(&mut *tx)
                    .await
                    .unwrap();
            tx.commit().await.unwrap();

            match seated {
                Some(_) => assert_eq!(orders, 5),
                None => assert_eq!(orders, 0),
            }
        }
    });

    db.lifecycle().clear_table(1).await.unwrap();
    reader.await.unwrap();

    db.close().await;
}
