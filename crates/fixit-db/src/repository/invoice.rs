//! # Invoice Repository
//!
//! Printed bills for repair orders. An invoice copies the order's money
//! fields at the moment it is raised; deleting the order removes it
//! (see [`OrderRepository::delete`](super::order::OrderRepository::delete)).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use fixit_core::Invoice;

const INVOICE_COLUMNS: &str = r#"
    id, order_id, invoice_number, customer_name, customer_phone,
    device_brand, device_model, problem,
    estimated_cost_paise, advance_paise, balance_paise, warranty,
    created_by, created_at
"#;

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    pub async fn insert(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(
            id = %invoice.id,
            order_id = %invoice.order_id,
            number = %invoice.invoice_number,
            "Inserting invoice"
        );

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, order_id, invoice_number, customer_name, customer_phone,
                device_brand, device_model, problem,
                estimated_cost_paise, advance_paise, balance_paise, warranty,
                created_by, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14
            )
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.order_id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.customer_name)
        .bind(&invoice.customer_phone)
        .bind(&invoice.device_brand)
        .bind(&invoice.device_model)
        .bind(&invoice.problem)
        .bind(invoice.estimated_cost_paise)
        .bind(invoice.advance_paise)
        .bind(invoice.balance_paise)
        .bind(&invoice.warranty)
        .bind(&invoice.created_by)
        .bind(invoice.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    /// Newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Invoice>> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC LIMIT ?1"
        );
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(invoices)
    }

    /// Every invoice raised for one order, newest first.
    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<Invoice>> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE order_id = ?1 ORDER BY created_at DESC"
        );
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(invoices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support::{at, sample_order, test_db};
    use fixit_core::RepairOrder;

    fn invoice_for(order: &RepairOrder, id: &str, hour: u32) -> Invoice {
        let created_at = at(2026, 10, 5, hour);
        Invoice {
            id: id.into(),
            order_id: order.id.clone(),
            invoice_number: Invoice::number_for(created_at),
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            device_brand: order.device_brand.clone(),
            device_model: order.device_model.clone(),
            problem: order.problem.clone(),
            estimated_cost_paise: order.estimated_cost_paise,
            advance_paise: order.advance_paise,
            balance_paise: order.balance().paise(),
            warranty: order.warranty.clone(),
            created_by: None,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_deleting_order_removes_its_invoices() {
        let db = test_db().await;
        let order = sample_order("o-1", "9000000001", at(2026, 10, 1, 9));
        let keep = sample_order("o-2", "9000000002", at(2026, 10, 1, 10));
        db.orders().insert(&order).await.unwrap();
        db.orders().insert(&keep).await.unwrap();

        db.invoices().insert(&invoice_for(&order, "i-1", 9)).await.unwrap();
        db.invoices().insert(&invoice_for(&order, "i-2", 10)).await.unwrap();
        db.invoices().insert(&invoice_for(&keep, "i-3", 11)).await.unwrap();

        let removed = db.orders().delete("o-1").await.unwrap();
        assert_eq!(removed, 2);
        assert!(db.orders().get_by_id("o-1").await.unwrap().is_none());

        let left = db.invoices().list(100).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].order_id, "o-2");
    }

    #[tokio::test]
    async fn test_invoice_requires_existing_order() {
        let db = test_db().await;
        let ghost = sample_order("ghost", "9000000001", at(2026, 10, 1, 9));
        let result = db.invoices().insert(&invoice_for(&ghost, "i-1", 9)).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    }

    #[tokio::test]
    async fn test_list_for_order_newest_first() {
        let db = test_db().await;
        let order = sample_order("o-1", "9000000001", at(2026, 10, 1, 9));
        db.orders().insert(&order).await.unwrap();
        db.invoices().insert(&invoice_for(&order, "i-1", 9)).await.unwrap();
        db.invoices().insert(&invoice_for(&order, "i-2", 12)).await.unwrap();

        let listed = db.invoices().list_for_order("o-1").await.unwrap();
        assert_eq!(listed[0].id, "i-2");
        assert_eq!(listed[0].balance_paise, 100_000);
        assert_eq!(
            db.invoices().get_by_id("i-1").await.unwrap().map(|i| i.id),
            Some("i-1".to_string())
        );
    }
}
