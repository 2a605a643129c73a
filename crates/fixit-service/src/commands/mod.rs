//! # Shop Operations
//!
//! Every operation the HTTP collaborator can call, as `impl ShopService`
//! blocks grouped by record family.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here
//! ├── order.rs        ◄─── Intake, edit, status, collection, delete, lookups
//! ├── sale.rs         ◄─── Accessory sales CRUD
//! ├── expenditure.rs  ◄─── Outgoing money CRUD
//! ├── dashboard.rs    ◄─── Revenue reconciliation
//! ├── invoice.rs      ◄─── Invoice snapshots of orders
//! ├── staff.rs        ◄─── Accounts (ADMIN)
//! └── settings.rs     ◄─── Maintenance mode
//! ```
//!
//! ## Shape of an Operation
//! ```rust,ignore
//! pub async fn delete_sale(&self, caller: &Caller, id: &str) -> ServiceResult<()> {
//!     debug!(id = %id, "delete_sale command");
//!     caller.authorize(Operation::DeleteSale)?;   // before any read
//!     ...validate...                              // before any write
//!     self.db().sales().delete(id).await?;
//!     info!(id = %id, "Sale deleted");
//!     Ok(())
//! }
//! ```

pub mod dashboard;
pub mod expenditure;
pub mod invoice;
pub mod order;
pub mod sale;
pub mod settings;
pub mod staff;

/// Trims optional free text; blank becomes `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
