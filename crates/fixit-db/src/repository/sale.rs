//! # Sale Repository
//!
//! Database operations for counter sales (accessories, chargers, covers).
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD                                                             │
//! │     └── insert() → total = quantity × unit price, fixed at write       │
//! │                                                                         │
//! │  2. (OPTIONAL) CORRECT                                                 │
//! │     └── update() → every field rewritten, total recomputed upstream    │
//! │                                                                         │
//! │  3. (OPTIONAL) DELETE                                                  │
//! │     └── delete() → gone from the ledger from the next dashboard on     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use fixit_core::Sale;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, item_name, category, quantity, unit_price_paise, total_price_paise,
                payment_mode, customer_name, customer_phone, created_by, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Inserts a sale.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, item = %sale.item_name, total = sale.total_price_paise, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, item_name, category, quantity, unit_price_paise, total_price_paise,
                payment_mode, customer_name, customer_phone, created_by, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11
            )
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.item_name)
        .bind(&sale.category)
        .bind(sale.quantity)
        .bind(sale.unit_price_paise)
        .bind(sale.total_price_paise)
        .bind(sale.payment_mode)
        .bind(&sale.customer_name)
        .bind(&sale.customer_phone)
        .bind(&sale.created_by)
        .bind(sale.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Rewrites a sale's editable fields. Returns false when no row matched.
    ///
    /// `created_by` and `created_at` are never rewritten.
    pub async fn update(&self, sale: &Sale) -> DbResult<bool> {
        debug!(id = %sale.id, "Updating sale");

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                item_name = ?2,
                category = ?3,
                quantity = ?4,
                unit_price_paise = ?5,
                total_price_paise = ?6,
                payment_mode = ?7,
                customer_name = ?8,
                customer_phone = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.item_name)
        .bind(&sale.category)
        .bind(sale.quantity)
        .bind(sale.unit_price_paise)
        .bind(sale.total_price_paise)
        .bind(sale.payment_mode)
        .bind(&sale.customer_name)
        .bind(&sale.customer_phone)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a sale. Returns false when no row matched.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Most recent sales first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, item_name, category, quantity, unit_price_paise, total_price_paise,
                payment_mode, customer_name, customer_phone, created_by, created_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{at, test_db};
    use fixit_core::PaymentMode;

    fn sale(id: &str, day: u32) -> Sale {
        Sale {
            id: id.into(),
            item_name: "Tempered glass".into(),
            category: "Accessories".into(),
            quantity: 2,
            unit_price_paise: 15_000,
            total_price_paise: 30_000,
            payment_mode: PaymentMode::Upi,
            customer_name: None,
            customer_phone: Some("9000000001".into()),
            created_by: Some("staff-1".into()),
            created_at: at(2026, 10, day, 10),
        }
    }

    #[tokio::test]
    async fn test_insert_get_update_delete() {
        let db = test_db().await;
        let repo = db.sales();

        let mut s = sale("s-1", 1);
        repo.insert(&s).await.unwrap();
        assert_eq!(repo.get_by_id("s-1").await.unwrap(), Some(s.clone()));

        s.quantity = 3;
        s.total_price_paise = 45_000;
        s.payment_mode = PaymentMode::Cash;
        assert!(repo.update(&s).await.unwrap());
        let loaded = repo.get_by_id("s-1").await.unwrap().unwrap();
        assert_eq!(loaded.total_price_paise, 45_000);
        assert_eq!(loaded.payment_mode, PaymentMode::Cash);

        assert!(repo.delete("s-1").await.unwrap());
        assert!(!repo.delete("s-1").await.unwrap());
        assert!(repo.get_by_id("s-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        let db = test_db().await;
        let repo = db.sales();
        for day in 1..=4 {
            repo.insert(&sale(&format!("s-{day}"), day)).await.unwrap();
        }

        let listed = repo.list(3).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s-4", "s-3", "s-2"]);
    }

    #[tokio::test]
    async fn test_update_missing_returns_false() {
        let db = test_db().await;
        assert!(!db.sales().update(&sale("ghost", 1)).await.unwrap());
    }
}
