//! # Invoice Commands
//!
//! An invoice freezes what the customer was quoted: customer, device and
//! money are copied off the order when it is raised. Rendering it to PDF
//! is the front end's job.

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ListLimits;
use crate::error::{ServiceError, ServiceResult};
use crate::ShopService;
use fixit_core::{Caller, Invoice, Operation};

impl ShopService {
    /// Raises an invoice for an order.
    pub async fn create_invoice(&self, caller: &Caller, order_id: &str) -> ServiceResult<Invoice> {
        debug!(order_id = %order_id, "create_invoice command");
        caller.authorize(Operation::CreateInvoice)?;

        let order = self
            .db()
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("RepairOrder", order_id))?;

        let now = self.clock().now();
        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            invoice_number: Invoice::number_for(now),
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            device_brand: order.device_brand.clone(),
            device_model: order.device_model.clone(),
            problem: order.problem.clone(),
            estimated_cost_paise: order.estimated_cost_paise,
            advance_paise: order.advance_paise,
            balance_paise: order.balance().paise(),
            warranty: order.warranty.clone(),
            created_by: caller.user_id().map(str::to_string),
            created_at: now,
        };

        self.db().invoices().insert(&invoice).await?;

        info!(
            id = %invoice.id,
            number = %invoice.invoice_number,
            order_id = %order_id,
            "Invoice created"
        );

        Ok(invoice)
    }

    /// Newest invoices first.
    pub async fn list_invoices(
        &self,
        caller: &Caller,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<Invoice>> {
        debug!(?limit, "list_invoices command");
        caller.authorize(Operation::ViewInvoices)?;

        let limit = ListLimits::resolve(limit, self.limits().invoices);
        let invoices = self.db().invoices().list(limit).await?;
        Ok(invoices)
    }

    /// Every invoice raised for one order, newest first.
    pub async fn list_order_invoices(
        &self,
        caller: &Caller,
        order_id: &str,
    ) -> ServiceResult<Vec<Invoice>> {
        debug!(order_id = %order_id, "list_order_invoices command");
        caller.authorize(Operation::ViewInvoices)?;

        let invoices = self.db().invoices().list_for_order(order_id).await?;
        Ok(invoices)
    }
}
