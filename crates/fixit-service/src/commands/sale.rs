//! # Sale Commands
//!
//! Counter sales of accessories. The total is always recomputed from
//! quantity and unit price; a client-sent total is never trusted.

use tracing::{debug, info};
use uuid::Uuid;

use super::non_blank;
use crate::config::ListLimits;
use crate::error::{ServiceError, ServiceResult};
use crate::ShopService;
use fixit_core::validation::validate_sale_input;
use fixit_core::{Caller, Operation, Sale, SaleInput};

impl ShopService {
    pub async fn create_sale(&self, caller: &Caller, input: SaleInput) -> ServiceResult<Sale> {
        debug!(item = %input.item_name, quantity = input.quantity, "create_sale command");
        caller.authorize(Operation::CreateSale)?;
        validate_sale_input(&input)?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            item_name: input.item_name.trim().to_string(),
            category: input.resolved_category(),
            quantity: input.quantity,
            unit_price_paise: input.unit_price_paise,
            total_price_paise: input.total_price()?.paise(),
            payment_mode: input.payment_mode,
            customer_name: non_blank(input.customer_name),
            customer_phone: non_blank(input.customer_phone),
            created_by: caller.user_id().map(str::to_string),
            created_at: self.clock().now(),
        };

        self.db().sales().insert(&sale).await?;

        info!(
            id = %sale.id,
            total = %sale.total_price(),
            mode = ?sale.payment_mode,
            "Sale recorded"
        );

        Ok(sale)
    }

    /// Rewrites a sale. Its timestamp and author stay as recorded.
    pub async fn update_sale(
        &self,
        caller: &Caller,
        id: &str,
        input: SaleInput,
    ) -> ServiceResult<Sale> {
        debug!(id = %id, "update_sale command");
        caller.authorize(Operation::UpdateSale)?;
        validate_sale_input(&input)?;

        let existing = self
            .db()
            .sales()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Sale", id))?;

        let sale = Sale {
            item_name: input.item_name.trim().to_string(),
            category: input.resolved_category(),
            quantity: input.quantity,
            unit_price_paise: input.unit_price_paise,
            total_price_paise: input.total_price()?.paise(),
            payment_mode: input.payment_mode,
            customer_name: non_blank(input.customer_name),
            customer_phone: non_blank(input.customer_phone),
            ..existing
        };

        if !self.db().sales().update(&sale).await? {
            return Err(ServiceError::not_found("Sale", id));
        }

        info!(id = %id, total = %sale.total_price(), "Sale updated");
        Ok(sale)
    }

    pub async fn delete_sale(&self, caller: &Caller, id: &str) -> ServiceResult<()> {
        debug!(id = %id, "delete_sale command");
        caller.authorize(Operation::DeleteSale)?;

        if !self.db().sales().delete(id).await? {
            return Err(ServiceError::not_found("Sale", id));
        }

        info!(id = %id, deleted_by = ?caller.user_id(), "Sale deleted");
        Ok(())
    }

    /// Most recent sales first.
    pub async fn list_sales(&self, caller: &Caller, limit: Option<u32>) -> ServiceResult<Vec<Sale>> {
        debug!(?limit, "list_sales command");
        caller.authorize(Operation::ViewSales)?;

        let limit = ListLimits::resolve(limit, self.limits().sales);
        let sales = self.db().sales().list(limit).await?;
        Ok(sales)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::test_support::{admin, maintenance, service, staff};
    use fixit_core::{PaymentMode, SaleInput};

    fn glass(quantity: i64) -> SaleInput {
        SaleInput {
            item_name: " Tempered glass ".to_string(),
            category: None,
            quantity,
            unit_price_paise: 15_000,
            payment_mode: PaymentMode::Upi,
            customer_name: Some("  ".to_string()),
            customer_phone: None,
        }
    }

    #[tokio::test]
    async fn test_create_sale_computes_total() {
        let svc = service().await;
        let sale = svc.create_sale(&staff(), glass(3)).await.unwrap();

        assert_eq!(sale.item_name, "Tempered glass");
        assert_eq!(sale.category, "Accessories");
        assert_eq!(sale.total_price_paise, 45_000);
        assert_eq!(sale.customer_name, None);
        assert_eq!(sale.created_by.as_deref(), Some("staff-1"));
    }

    #[tokio::test]
    async fn test_quantity_bounds() {
        let svc = service().await;
        for bad in [0, -2, 1_000] {
            let err = svc.create_sale(&staff(), glass(bad)).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError, "quantity {bad}");
        }
        assert!(svc.list_sales(&staff(), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_price_rejected_without_panicking() {
        let svc = service().await;
        let mut huge = glass(3);
        huge.unit_price_paise = i64::MAX / 2;

        let err = svc.create_sale(&staff(), huge.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let sale = svc.create_sale(&staff(), glass(1)).await.unwrap();
        let err = svc.update_sale(&admin(), &sale.id, huge).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(svc.list_sales(&staff(), None).await.unwrap()[0].total_price_paise, 15_000);
    }

    #[tokio::test]
    async fn test_update_recomputes_and_keeps_author() {
        let svc = service().await;
        let sale = svc.create_sale(&staff(), glass(1)).await.unwrap();

        let mut edit = glass(4);
        edit.category = Some("Screen guards".into());
        let updated = svc.update_sale(&admin(), &sale.id, edit).await.unwrap();

        assert_eq!(updated.total_price_paise, 60_000);
        assert_eq!(updated.category, "Screen guards");
        assert_eq!(updated.created_by.as_deref(), Some("staff-1"));
        assert_eq!(updated.created_at, sale.created_at);

        let err = svc.update_sale(&admin(), "missing", glass(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_delete_sale_rules() {
        let svc = service().await;
        let sale = svc.create_sale(&staff(), glass(1)).await.unwrap();

        let err = svc.delete_sale(&staff(), &sale.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);

        svc.delete_sale(&admin(), &sale.id).await.unwrap();
        let err = svc.delete_sale(&admin(), &sale.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_list_sales_limit() {
        let svc = service().await;
        for _ in 0..3 {
            svc.create_sale(&staff(), glass(1)).await.unwrap();
        }
        assert_eq!(svc.list_sales(&maintenance(), Some(2)).await.unwrap().len(), 2);
        assert_eq!(svc.list_sales(&maintenance(), None).await.unwrap().len(), 3);

        let err = svc.create_sale(&maintenance(), glass(1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}
