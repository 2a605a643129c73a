//! # Staff Repository
//!
//! Staff accounts. Passwords arrive here already hashed.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use fixit_core::{Role, StaffUser};

/// Repository for staff account operations.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    pub async fn insert(&self, user: &StaffUser) -> DbResult<()> {
        debug!(id = %user.id, email = %user.email, role = %user.role, "Inserting staff user");

        sqlx::query(
            r#"
            INSERT INTO staff_users (id, name, email, role, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StaffUser>> {
        let user = sqlx::query_as::<_, StaffUser>(
            "SELECT id, name, email, role, password_hash, created_at FROM staff_users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Looks up by email, ignoring case.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<StaffUser>> {
        let user = sqlx::query_as::<_, StaffUser>(
            r#"
            SELECT id, name, email, role, password_hash, created_at
            FROM staff_users
            WHERE LOWER(email) = LOWER(?1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// All accounts, oldest first. MAINTENANCE accounts only when asked for.
    pub async fn list(&self, include_maintenance: bool) -> DbResult<Vec<StaffUser>> {
        let users = sqlx::query_as::<_, StaffUser>(
            r#"
            SELECT id, name, email, role, password_hash, created_at
            FROM staff_users
            WHERE ?1 OR role != ?2
            ORDER BY created_at ASC
            "#,
        )
        .bind(include_maintenance)
        .bind(Role::Maintenance)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn set_password_hash(&self, id: &str, password_hash: &str) -> DbResult<bool> {
        let result = sqlx::query("UPDATE staff_users SET password_hash = ?2 WHERE id = ?1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM staff_users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support::{at, test_db};

    fn user(id: &str, email: &str, role: Role, hour: u32) -> StaffUser {
        StaffUser {
            id: id.into(),
            name: id.to_uppercase(),
            email: email.into(),
            role,
            password_hash: "$argon2id$stub".into(),
            created_at: at(2026, 10, 1, hour),
        }
    }

    #[tokio::test]
    async fn test_list_hides_maintenance_unless_asked() {
        let db = test_db().await;
        let repo = db.staff();
        repo.insert(&user("admin", "admin@shop.in", Role::Admin, 8))
            .await
            .unwrap();
        repo.insert(&user("tech", "tech@shop.in", Role::Maintenance, 9))
            .await
            .unwrap();
        repo.insert(&user("ravi", "ravi@shop.in", Role::Staff, 10))
            .await
            .unwrap();

        let visible: Vec<_> = repo
            .list(false)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(visible, ["admin", "ravi"]);
        assert_eq!(repo.list(true).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let db = test_db().await;
        let repo = db.staff();
        repo.insert(&user("a", "same@shop.in", Role::Staff, 8))
            .await
            .unwrap();
        let err = repo
            .insert(&user("b", "same@shop.in", Role::Staff, 9))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_email_lookup_ignores_case_and_password_reset() {
        let db = test_db().await;
        let repo = db.staff();
        repo.insert(&user("a", "Asha@Shop.in", Role::Admin, 8))
            .await
            .unwrap();

        let found = repo.get_by_email(" asha@shop.IN ").await.unwrap().unwrap();
        assert_eq!(found.id, "a");

        assert!(repo.set_password_hash("a", "$argon2id$new").await.unwrap());
        let reloaded = repo.get_by_id("a").await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "$argon2id$new");

        assert!(repo.delete("a").await.unwrap());
        assert!(repo.get_by_id("a").await.unwrap().is_none());
    }
}
