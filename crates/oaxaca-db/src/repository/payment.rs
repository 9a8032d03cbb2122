//! # Payment Repository
//!
//! Stores payments recorded by the payment collaborator. Payments belong to
//! the physical table, not to the customer, and are purged when the table
//! is cleared.

use chrono::Utc;
use oaxaca_core::validation::validate_payment;
use oaxaca_core::{NewPayment, Payment};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Repository for payments.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Records a payment. Only the last four card digits are stored.
    pub async fn record(&self, payment: &NewPayment) -> DbResult<Payment> {
        validate_payment(payment)?;

        let payment_id = generate_payment_id();
        debug!(
            payment_id = %payment_id,
            table_number = payment.table_number,
            amount = payment.amount_cents,
            "Recording payment"
        );

        let stored = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (
                payment_id, table_number, amount_cents,
                card_holder, card_last4, card_expiry, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING payment_id, table_number, amount_cents,
                      card_holder, card_last4, card_expiry, created_at
            "#,
        )
        .bind(&payment_id)
        .bind(payment.table_number)
        .bind(payment.amount_cents)
        .bind(payment.card_holder.trim())
        .bind(payment.card_last4())
        .bind(payment.card_expiry.trim())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => DbError::not_found("Table", payment.table_number),
            other => other,
        })?;

        Ok(stored)
    }

    /// Payments recorded against a table, oldest first.
    pub async fn list_for_table(&self, table_number: i64) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, table_number, amount_cents,
                   card_holder, card_last4, card_expiry, created_at
            FROM payments
            WHERE table_number = ?1
            ORDER BY created_at, payment_id
            "#,
        )
        .bind(table_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}

/// Generates a new payment ID.
pub fn generate_payment_id() -> String {
    Uuid::new_v4().to_string()
}
