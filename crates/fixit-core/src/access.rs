//! # Access Control Policy
//!
//! Which role may do what. A pure function of (role, operation); the
//! service layer consults it before every mutating or sensitive read.
//!
//! ## Capability Matrix
//! ```text
//! ┌──────────────────────────────┬───────┬───────┬─────────────┬──────┐
//! │ Operation                    │ ADMIN │ STAFF │ MAINTENANCE │ none │
//! ├──────────────────────────────┼───────┼───────┼─────────────┼──────┤
//! │ Create/Update order, sale,   │   ✓   │   ✓   │             │      │
//! │   expenditure                │       │       │             │      │
//! │ Transition status            │   ✓   │   ✓   │             │      │
//! │ Collect balance              │   ✓   │   ✓   │             │      │
//! │ Create invoice               │   ✓   │   ✓   │             │      │
//! │ Delete order/sale/expend.    │   ✓   │       │             │      │
//! │ Manage staff                 │   ✓   │       │             │      │
//! │ View orders/sales/expend.,   │   ✓   │   ✓   │      ✓      │      │
//! │   dashboard, invoices        │       │       │             │      │
//! │ Reveal device credential     │   ✓   │   ✓   │      ✓      │      │
//! │ View staff                   │   ✓   │       │      ✓      │      │
//! │ View maintenance mode        │   ✓   │   ✓   │      ✓      │      │
//! │ Toggle maintenance mode      │       │       │      ✓      │      │
//! └──────────────────────────────┴───────┴───────┴─────────────┴──────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

use crate::types::Role;

// =============================================================================
// Operations
// =============================================================================

/// Every operation the service layer gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Operation {
    CreateOrder,
    UpdateOrder,
    DeleteOrder,
    TransitionOrderStatus,
    CollectBalance,
    ViewOrders,
    RevealCredential,

    CreateSale,
    UpdateSale,
    DeleteSale,
    ViewSales,

    CreateExpenditure,
    UpdateExpenditure,
    DeleteExpenditure,
    ViewExpenditures,

    ViewDashboard,
    CreateInvoice,
    ViewInvoices,

    ViewStaff,
    ManageStaff,
    ViewMaintenanceMode,
    ToggleMaintenanceMode,
}

impl Operation {
    /// Operations that only read.
    pub const fn is_read(&self) -> bool {
        matches!(
            self,
            Operation::ViewOrders
                | Operation::RevealCredential
                | Operation::ViewSales
                | Operation::ViewExpenditures
                | Operation::ViewDashboard
                | Operation::ViewInvoices
                | Operation::ViewStaff
                | Operation::ViewMaintenanceMode
        )
    }

    /// Short human phrase for error messages.
    pub const fn describe(&self) -> &'static str {
        match self {
            Operation::CreateOrder => "create orders",
            Operation::UpdateOrder => "edit orders",
            Operation::DeleteOrder => "delete orders",
            Operation::TransitionOrderStatus => "change order status",
            Operation::CollectBalance => "collect balances",
            Operation::ViewOrders => "view orders",
            Operation::RevealCredential => "view device credentials",
            Operation::CreateSale => "record sales",
            Operation::UpdateSale => "edit sales",
            Operation::DeleteSale => "delete sales",
            Operation::ViewSales => "view sales",
            Operation::CreateExpenditure => "record expenditures",
            Operation::UpdateExpenditure => "edit expenditures",
            Operation::DeleteExpenditure => "delete expenditures",
            Operation::ViewExpenditures => "view expenditures",
            Operation::ViewDashboard => "view the dashboard",
            Operation::CreateInvoice => "create invoices",
            Operation::ViewInvoices => "view invoices",
            Operation::ViewStaff => "view staff",
            Operation::ManageStaff => "manage staff",
            Operation::ViewMaintenanceMode => "view maintenance mode",
            Operation::ToggleMaintenanceMode => "toggle maintenance mode",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

// =============================================================================
// Policy
// =============================================================================

/// The caller's role lacks the capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{} may not {operation}", .role.map(|r| r.as_str()).unwrap_or("unauthenticated caller"))]
pub struct AccessDenied {
    pub role: Option<Role>,
    pub operation: Operation,
}

impl Role {
    /// Whether this role may perform `op`.
    pub fn can(&self, op: Operation) -> bool {
        use Operation::*;
        match self {
            Role::Admin => !matches!(op, ToggleMaintenanceMode),
            Role::Staff => !matches!(
                op,
                DeleteOrder
                    | DeleteSale
                    | DeleteExpenditure
                    | ViewStaff
                    | ManageStaff
                    | ToggleMaintenanceMode
            ),
            Role::Maintenance => op.is_read() || matches!(op, ToggleMaintenanceMode),
        }
    }
}

/// Checks `op` for a caller with `role` (`None` = not signed in).
///
/// ## Example
/// ```rust
/// use fixit_core::access::{authorize, Operation};
/// use fixit_core::Role;
///
/// assert!(authorize(Some(Role::Admin), Operation::DeleteOrder).is_ok());
/// assert!(authorize(Some(Role::Staff), Operation::DeleteOrder).is_err());
/// assert!(authorize(None, Operation::ViewOrders).is_err());
/// ```
pub fn authorize(role: Option<Role>, op: Operation) -> Result<(), AccessDenied> {
    match role {
        Some(r) if r.can(op) => Ok(()),
        _ => Err(AccessDenied { role, operation: op }),
    }
}

// =============================================================================
// Caller
// =============================================================================

/// Who is asking, as established by the session collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Caller {
    Anonymous,
    Authenticated { user_id: String, role: Role },
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Caller::Authenticated {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated { role, .. } => Some(*role),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated { user_id, .. } => Some(user_id),
        }
    }

    /// Shorthand for [`authorize`] with this caller's role.
    pub fn authorize(&self, op: Operation) -> Result<(), AccessDenied> {
        authorize(self.role(), op)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_OPS: [Operation; 22] = [
        Operation::CreateOrder,
        Operation::UpdateOrder,
        Operation::DeleteOrder,
        Operation::TransitionOrderStatus,
        Operation::CollectBalance,
        Operation::ViewOrders,
        Operation::RevealCredential,
        Operation::CreateSale,
        Operation::UpdateSale,
        Operation::DeleteSale,
        Operation::ViewSales,
        Operation::CreateExpenditure,
        Operation::UpdateExpenditure,
        Operation::DeleteExpenditure,
        Operation::ViewExpenditures,
        Operation::ViewDashboard,
        Operation::CreateInvoice,
        Operation::ViewInvoices,
        Operation::ViewStaff,
        Operation::ManageStaff,
        Operation::ViewMaintenanceMode,
        Operation::ToggleMaintenanceMode,
    ];

    #[test]
    fn test_unauthenticated_is_denied_everything() {
        for op in ALL_OPS {
            assert!(authorize(None, op).is_err(), "{op:?} allowed without a role");
        }
    }

    #[test]
    fn test_staff_cannot_delete_or_manage_staff() {
        for op in [
            Operation::DeleteOrder,
            Operation::DeleteSale,
            Operation::DeleteExpenditure,
            Operation::ManageStaff,
        ] {
            assert!(!Role::Staff.can(op), "staff allowed {op:?}");
        }
        for op in [
            Operation::CreateOrder,
            Operation::UpdateOrder,
            Operation::CreateSale,
            Operation::UpdateSale,
            Operation::CollectBalance,
            Operation::TransitionOrderStatus,
        ] {
            assert!(Role::Staff.can(op), "staff denied {op:?}");
        }
    }

    #[test]
    fn test_admin_can_delete_and_manage() {
        assert!(Role::Admin.can(Operation::DeleteOrder));
        assert!(Role::Admin.can(Operation::ManageStaff));
        assert!(!Role::Admin.can(Operation::ToggleMaintenanceMode));
    }

    #[test]
    fn test_maintenance_is_read_only_for_shop_records() {
        assert!(!Role::Maintenance.can(Operation::CreateOrder));
        assert!(!Role::Maintenance.can(Operation::CollectBalance));
        assert!(Role::Maintenance.can(Operation::ViewDashboard));
        assert!(Role::Maintenance.can(Operation::ToggleMaintenanceMode));
    }

    #[test]
    fn test_denial_message() {
        let err = authorize(Some(Role::Staff), Operation::DeleteOrder).unwrap_err();
        assert_eq!(err.to_string(), "STAFF may not delete orders");
        let err = authorize(None, Operation::ViewSales).unwrap_err();
        assert_eq!(err.to_string(), "unauthenticated caller may not view sales");
    }

    #[test]
    fn test_caller_helpers() {
        let caller = Caller::new("u-1", Role::Staff);
        assert_eq!(caller.user_id(), Some("u-1"));
        assert!(caller.authorize(Operation::CreateSale).is_ok());
        assert!(Caller::Anonymous.authorize(Operation::CreateSale).is_err());
    }
}
