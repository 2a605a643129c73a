//! # Ledger Snapshot Loader
//!
//! Reads the three income/expense streams for the dashboard.
//!
//! ## Consistency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    SELECT ... FROM repair_orders    ─┐                                  │
//! │    SELECT ... FROM sales             ├─ one read snapshot (WAL)         │
//! │    SELECT ... FROM expenditures     ─┘                                  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  A sale recorded mid-read is either in all totals or in none.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure here propagates. The dashboard never shows zeroes in place
//! of an error.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use fixit_core::ledger::{ExpenditureLedgerRow, OrderLedgerRow, SaleLedgerRow};
use fixit_core::LedgerSnapshot;

/// Loads [`LedgerSnapshot`]s.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Reads every order, sale and expenditure projection in one transaction.
    pub async fn snapshot(&self) -> DbResult<LedgerSnapshot> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let orders = sqlx::query_as::<_, OrderLedgerRow>(
            r#"
            SELECT
                id, estimated_cost_paise, advance_paise, status,
                payment_mode_advance, payment_mode_balance,
                created_at, balance_collected_at
            FROM repair_orders
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let sales = sqlx::query_as::<_, SaleLedgerRow>(
            "SELECT id, category, total_price_paise, payment_mode, created_at FROM sales",
        )
        .fetch_all(&mut *tx)
        .await?;

        let expenditures = sqlx::query_as::<_, ExpenditureLedgerRow>(
            "SELECT id, amount_paise, date FROM expenditures",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(
            orders = orders.len(),
            sales = sales.len(),
            expenditures = expenditures.len(),
            "Ledger snapshot loaded"
        );

        Ok(LedgerSnapshot {
            orders,
            sales,
            expenditures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{at, sample_order, test_db};
    use chrono::TimeZone;
    use fixit_core::{compute_dashboard, Money, Period};

    #[tokio::test]
    async fn test_snapshot_feeds_dashboard() {
        let db = test_db().await;
        let order = sample_order("o-1", "9000000001", at(2026, 10, 16, 4));
        db.orders().insert(&order).await.unwrap();

        let snapshot = db.ledger().snapshot().await.unwrap();
        assert_eq!(snapshot.orders.len(), 1);
        assert_eq!(snapshot.orders[0].advance_paise, Some(50_000));
        assert!(snapshot.sales.is_empty());

        let now = chrono::Utc.with_ymd_and_hms(2026, 10, 16, 6, 0, 0).unwrap();
        let stats = compute_dashboard(&snapshot, now, chrono_tz::Asia::Kolkata, Period::Week).unwrap();
        assert_eq!(stats.today_revenue, Money::from_paise(50_000));
        assert_eq!(stats.pending_collections, Money::from_paise(100_000));
        assert_eq!(stats.active_repairs, 1);
    }

    #[tokio::test]
    async fn test_snapshot_fails_loudly_when_store_is_gone() {
        let db = test_db().await;
        db.close().await;
        assert!(db.ledger().snapshot().await.is_err());
    }
}
