//! # Customer Repository
//!
//! Registration of arriving customers. Customer rows are immutable and are
//! never deleted; clearing a table removes their orders, not the customer.

use chrono::Utc;
use oaxaca_core::validation::{validate_allergies, validate_name};
use oaxaca_core::Customer;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for customer records.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Registers a customer and returns the stored row with its generated id.
    ///
    /// Seating is a separate step, see
    /// [`TableAllocator::assign_customer_to_table`](crate::allocator::TableAllocator::assign_customer_to_table).
    pub async fn register(&self, name: &str, allergies: Option<&str>) -> DbResult<Customer> {
        validate_name("customer_name", name)?;
        let allergies = allergies.map(str::trim).filter(|a| !a.is_empty());
        if let Some(notes) = allergies {
            validate_allergies(notes)?;
        }

        let now = Utc::now();
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customer (customer_name, customer_allergies, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING customer_id, customer_name, customer_allergies, created_at
            "#,
        )
        .bind(name.trim())
        .bind(allergies)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(customer_id = customer.customer_id, "Customer registered");
        Ok(customer)
    }

    /// Gets a customer by id.
    pub async fn get(&self, customer_id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT customer_id, customer_name, customer_allergies, created_at
            FROM customer
            WHERE customer_id = ?1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }
}
