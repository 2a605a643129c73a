//! # Expenditure Repository
//!
//! Shop spending: parts, rent, tea. Freely editable.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use fixit_core::Expenditure;

/// Repository for expenditure database operations.
#[derive(Debug, Clone)]
pub struct ExpenditureRepository {
    pool: SqlitePool,
}

impl ExpenditureRepository {
    /// Creates a new ExpenditureRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenditureRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expenditure>> {
        let row = sqlx::query_as::<_, Expenditure>(
            r#"
            SELECT id, category, amount_paise, description, date, created_by, created_at
            FROM expenditures
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn insert(&self, expenditure: &Expenditure) -> DbResult<()> {
        debug!(
            id = %expenditure.id,
            category = %expenditure.category,
            amount = expenditure.amount_paise,
            "Inserting expenditure"
        );

        sqlx::query(
            r#"
            INSERT INTO expenditures (
                id, category, amount_paise, description, date, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&expenditure.id)
        .bind(&expenditure.category)
        .bind(expenditure.amount_paise)
        .bind(&expenditure.description)
        .bind(expenditure.date)
        .bind(&expenditure.created_by)
        .bind(expenditure.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Rewrites category, amount, description and date.
    pub async fn update(&self, expenditure: &Expenditure) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE expenditures SET
                category = ?2,
                amount_paise = ?3,
                description = ?4,
                date = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&expenditure.id)
        .bind(&expenditure.category)
        .bind(expenditure.amount_paise)
        .bind(&expenditure.description)
        .bind(expenditure.date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM expenditures WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every expenditure, latest `date` first.
    pub async fn list(&self) -> DbResult<Vec<Expenditure>> {
        let rows = sqlx::query_as::<_, Expenditure>(
            r#"
            SELECT id, category, amount_paise, description, date, created_by, created_at
            FROM expenditures
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
