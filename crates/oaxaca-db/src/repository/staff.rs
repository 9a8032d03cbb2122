//! # Staff Repository
//!
//! The staff roster. From the allocator's point of view the roster is
//! read-only; rows are added by the roster collaborator and the seed tool.

use oaxaca_core::validation::validate_name;
use oaxaca_core::{StaffMember, StaffType};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for staff members.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Adds a staff member to the roster.
    pub async fn add(&self, name: &str, staff_type: StaffType) -> DbResult<StaffMember> {
        validate_name("staff_name", name)?;

        let member = sqlx::query_as::<_, StaffMember>(
            r#"
            INSERT INTO staff (staff_name, staff_type)
            VALUES (?1, ?2)
            RETURNING staff_id, staff_name, staff_type
            "#,
        )
        .bind(name.trim())
        .bind(staff_type)
        .fetch_one(&self.pool)
        .await?;

        debug!(staff_id = member.staff_id, %staff_type, "Staff member added");
        Ok(member)
    }

    /// The whole roster, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<StaffMember>> {
        let staff = sqlx::query_as::<_, StaffMember>(
            "SELECT staff_id, staff_name, staff_type FROM staff ORDER BY staff_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(staff)
    }

    /// Gets a staff member by id.
    pub async fn get(&self, staff_id: i64) -> DbResult<Option<StaffMember>> {
        let member = sqlx::query_as::<_, StaffMember>(
            "SELECT staff_id, staff_name, staff_type FROM staff WHERE staff_id = ?1",
        )
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Ids of waiters not currently serving any table.
    pub async fn available_waiters(&self) -> DbResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT staff_id
            FROM staff
            WHERE staff_type = ?1
              AND staff_id NOT IN (SELECT staff_id FROM tables WHERE staff_id IS NOT NULL)
            ORDER BY staff_id
            "#,
        )
        .bind(StaffType::Waiter)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use oaxaca_core::StaffType;

    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_only_waiters_are_available() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let staff = db.staff();

        let w1 = staff.add("Rosa", StaffType::Waiter).await.unwrap();
        staff.add("Chef Tomas", StaffType::Kitchen).await.unwrap();
        let w2 = staff.add("Iker", StaffType::Waiter).await.unwrap();
        staff.add("Marta", StaffType::Manager).await.unwrap();

        assert_eq!(staff.list().await.unwrap().len(), 4);
        assert_eq!(
            staff.available_waiters().await.unwrap(),
            vec![w1.staff_id, w2.staff_id]
        );
        assert_eq!(
            staff.get(w2.staff_id).await.unwrap().unwrap().staff_type,
            StaffType::Waiter
        );
    }
}
