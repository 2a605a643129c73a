//! # Repair Order Commands
//!
//! ## Flow at the Counter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_order ──► NEW ──► transition_order_status ──► ... ──► DELIVERED │
//! │       │                                                                 │
//! │       │ advance realized at created_at                                  │
//! │       ▼                                                                 │
//! │  collect_balance ── set-if-null ──► remainder realized now              │
//! │                                                                         │
//! │  get_order ──► credential unsealed, reveal logged with the caller id    │
//! │  delete_order (ADMIN) ──► order + invoices, one transaction             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::ShopService;
use fixit_core::validation::{
    validate_order_input, validate_required, validate_search_query, validate_security,
};
use fixit_core::{
    Caller, CredentialUpdate, CustomerHistoryEntry, NewRepairOrder, Operation, OrderDetails,
    OrderFilter, OrderStatus, OrderStatusCounts, OrderUpdate, PaymentMode, RepairOrder,
    StatusChange, CUSTOMER_HISTORY_LIMIT,
};
use fixit_db::CollectOutcome;

impl ShopService {
    // =========================================================================
    // Mutations
    // =========================================================================

    /// Takes a device in. The order starts NEW with nothing collected.
    pub async fn create_order(
        &self,
        caller: &Caller,
        input: NewRepairOrder,
    ) -> ServiceResult<RepairOrder> {
        debug!("create_order command");
        caller.authorize(Operation::CreateOrder)?;

        validate_order_input(&input.details)?;
        if let Some(ref security) = input.security {
            validate_security(security)?;
        }

        let credential = input
            .security
            .as_ref()
            .and_then(|security| security.seal(self.vault()));

        let order = RepairOrder::intake(
            Uuid::new_v4().to_string(),
            input.details,
            credential,
            caller.user_id().map(str::to_string),
            self.clock().now(),
        );

        self.db().orders().insert(&order).await?;

        info!(
            id = %order.id,
            created_by = ?order.created_by,
            lock = ?order.lock_mode(),
            "Repair order created"
        );

        Ok(order)
    }

    /// Overwrites the editable fields and, if asked, the credential.
    pub async fn update_order(
        &self,
        caller: &Caller,
        id: &str,
        input: OrderUpdate,
    ) -> ServiceResult<RepairOrder> {
        debug!(id = %id, "update_order command");
        caller.authorize(Operation::UpdateOrder)?;

        validate_order_input(&input.details)?;
        if let CredentialUpdate::Replace(Some(ref security)) = input.credential {
            validate_security(security)?;
        }

        let mut order = self
            .db()
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("RepairOrder", id))?;

        order.apply_details(input.details);
        let credential_changed = order.apply_credential(input.credential, self.vault());

        if !self.db().orders().update(&order).await? {
            return Err(ServiceError::not_found("RepairOrder", id));
        }

        info!(id = %id, credential_changed, "Repair order updated");
        Ok(order)
    }

    /// Moves an order to any status. `status` is matched case-insensitively.
    pub async fn transition_order_status(
        &self,
        caller: &Caller,
        id: &str,
        status: &str,
    ) -> ServiceResult<StatusChange> {
        debug!(id = %id, status = %status, "transition_order_status command");
        caller.authorize(Operation::TransitionOrderStatus)?;

        let to: OrderStatus = status.parse()?;

        let order = self
            .db()
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("RepairOrder", id))?;

        let change = order.transition(to);

        if !self.db().orders().set_status(id, to).await? {
            return Err(ServiceError::not_found("RepairOrder", id));
        }

        if change.is_backwards() {
            warn!(id = %id, from = %change.from, to = %change.to, "Order status moved backwards");
        } else {
            info!(id = %id, from = %change.from, to = %change.to, "Order status changed");
        }

        Ok(change)
    }

    /// Marks the remaining balance as received. Collecting twice is a no-op.
    ///
    /// `mode` records how the balance was paid when it differs from what
    /// was noted at intake.
    pub async fn collect_balance(
        &self,
        caller: &Caller,
        id: &str,
        mode: Option<PaymentMode>,
    ) -> ServiceResult<CollectOutcome> {
        debug!(id = %id, ?mode, "collect_balance command");
        caller.authorize(Operation::CollectBalance)?;

        let outcome = self
            .db()
            .orders()
            .collect_balance(id, mode, self.clock().now())
            .await?;

        Ok(outcome)
    }

    /// Removes an order and every invoice raised for it.
    pub async fn delete_order(&self, caller: &Caller, id: &str) -> ServiceResult<()> {
        debug!(id = %id, "delete_order command");
        caller.authorize(Operation::DeleteOrder)?;

        let invoices = self.db().orders().delete(id).await?;

        info!(id = %id, invoices, deleted_by = ?caller.user_id(), "Repair order deleted");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Lists orders newest first.
    pub async fn list_orders(
        &self,
        caller: &Caller,
        filter: OrderFilter,
    ) -> ServiceResult<Vec<RepairOrder>> {
        debug!(?filter, "list_orders command");
        caller.authorize(Operation::ViewOrders)?;

        let search = match filter.search {
            Some(ref query) => Some(validate_search_query(query)?),
            None => None,
        };
        let filter = OrderFilter {
            search,
            limit: Some(filter.limit.unwrap_or(self.limits().orders)),
            ..filter
        };

        let orders = self.db().orders().list(&filter).await?;
        Ok(orders)
    }

    /// One order with its device credential unsealed.
    pub async fn get_order(&self, caller: &Caller, id: &str) -> ServiceResult<OrderDetails> {
        debug!(id = %id, "get_order command");
        caller.authorize(Operation::ViewOrders)?;
        caller.authorize(Operation::RevealCredential)?;

        let order = self
            .db()
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("RepairOrder", id))?;

        if let Some(mode) = order.lock_mode() {
            info!(
                id = %id,
                ?mode,
                revealed_to = ?caller.user_id(),
                "Device credential revealed"
            );
        }

        Ok(OrderDetails::new(order, self.vault()))
    }

    /// Earlier visits by the same phone number, newest first.
    pub async fn customer_history(
        &self,
        caller: &Caller,
        phone: &str,
        exclude_id: Option<&str>,
    ) -> ServiceResult<Vec<CustomerHistoryEntry>> {
        debug!(phone = %phone, ?exclude_id, "customer_history command");
        caller.authorize(Operation::ViewOrders)?;
        validate_required("customer_phone", phone)?;

        let entries = self
            .db()
            .orders()
            .customer_history(phone, exclude_id, CUSTOMER_HISTORY_LIMIT)
            .await?;

        Ok(entries)
    }

    /// Order counts per status.
    pub async fn count_orders_by_status(&self, caller: &Caller) -> ServiceResult<OrderStatusCounts> {
        debug!("count_orders_by_status command");
        caller.authorize(Operation::ViewOrders)?;

        let counts = self.db().orders().status_counts().await?;
        Ok(counts)
    }
}
