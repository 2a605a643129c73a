//! # Domain Types
//!
//! Shared enums and the non-order records of the shop.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sale       │   │   Expenditure   │   │     Invoice     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  item_name      │   │  category       │   │  order_id (FK)  │       │
//! │  │  quantity       │   │  amount_paise   │   │  invoice_number │       │
//! │  │  unit_price     │   │  date (local    │   │  snapshot of    │       │
//! │  │  total_price    │   │   midnight UTC) │   │  order money    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   OrderStatus   │   │   PaymentMode   │   │      Role       │       │
//! │  │  NEW  PENDING   │   │  CASH           │   │  ADMIN          │       │
//! │  │  REPAIRED       │   │  UPI            │   │  STAFF          │       │
//! │  │  DELIVERED  ◄─┐ │   │  CARD           │   │  MAINTENANCE    │       │
//! │  │  CANCELLED  ◄─┴ terminal              │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repair orders live in [`crate::order`] because they carry the lifecycle
//! rules and the sealed credential.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Order Status
// =============================================================================

/// Where a repair job stands.
///
/// ## Lifecycle
/// ```text
///   NEW ──► PENDING ──► REPAIRED ──► DELIVERED
///    │         │           │
///    └─────────┴───────────┴──────► CANCELLED
/// ```
/// The store accepts any status from any status, backwards included.
/// Only the two terminal states matter to the ledger: a DELIVERED or
/// CANCELLED order is no longer "active" and owes nothing "pending".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum OrderStatus {
    /// Just taken in at the counter.
    #[default]
    New,
    /// Waiting on parts or a technician.
    Pending,
    /// Fixed, waiting for pickup.
    Repaired,
    /// Handed back to the customer.
    Delivered,
    /// Abandoned or refused.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::New,
        OrderStatus::Pending,
        OrderStatus::Repaired,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// DELIVERED and CANCELLED.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Repaired => "REPAIRED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

/// How money changed hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum PaymentMode {
    #[default]
    Cash,
    Upi,
    Card,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 3] = [PaymentMode::Cash, PaymentMode::Upi, PaymentMode::Card];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::Upi => "UPI",
            PaymentMode::Card => "CARD",
        }
    }
}

impl FromStr for PaymentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        PaymentMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_mode".to_string(),
                allowed: PaymentMode::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Role
// =============================================================================

/// A staff account's role.
///
/// `Maintenance` is the privileged operator account: it can read everything
/// and flip maintenance mode, but never edits shop records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum Role {
    Admin,
    Staff,
    Maintenance,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "STAFF" => Ok(Role::Staff),
            "MAINTENANCE" => Ok(Role::Maintenance),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["ADMIN".into(), "STAFF".into(), "MAINTENANCE".into()],
            }),
        }
    }
}

// =============================================================================
// Dashboard Period
// =============================================================================

/// Trailing window for dashboard statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum Period {
    /// Last 7 local days, today included.
    #[default]
    Week,
    /// Last 30 local days, today included.
    Month,
}

impl Period {
    /// Number of calendar days in the window.
    pub const fn days(&self) -> u32 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
        }
    }

    /// strftime pattern for trend labels: "Mon" or "07 Oct".
    pub const fn label_format(&self) -> &'static str {
        match self {
            Period::Week => "%a",
            Period::Month => "%d %b",
        }
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WEEK" => Ok(Period::Week),
            "MONTH" => Ok(Period::Month),
            _ => Err(ValidationError::NotAllowed {
                field: "period".to_string(),
                allowed: vec!["WEEK".into(), "MONTH".into()],
            }),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// An over-the-counter accessory sale.
///
/// Unlike a repair order, a sale is freely editable; `total_price_paise` is
/// recomputed from quantity and unit price on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub item_name: String,
    pub category: String,
    pub quantity: i64,
    pub unit_price_paise: i64,
    pub total_price_paise: i64,
    pub payment_mode: PaymentMode,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_paise(self.total_price_paise)
    }
}

/// Fields a clerk fills in to record or edit a sale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleInput {
    pub item_name: String,
    /// Blank means [`crate::DEFAULT_SALE_CATEGORY`].
    #[serde(default)]
    pub category: Option<String>,
    pub quantity: i64,
    pub unit_price_paise: i64,
    #[serde(default)]
    pub payment_mode: PaymentMode,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

impl SaleInput {
    /// quantity × unit price, rejected if it overflows.
    pub fn total_price(&self) -> Result<Money, ValidationError> {
        Money::from_paise(self.unit_price_paise)
            .checked_multiply_quantity(self.quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "total_price".to_string(),
                min: 0,
                max: i64::MAX,
            })
    }

    /// Category with the blank case resolved.
    pub fn resolved_category(&self) -> String {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(crate::DEFAULT_SALE_CATEGORY)
            .to_string()
    }
}

// =============================================================================
// Expenditure
// =============================================================================

/// Money paid out of the shop (rent, parts, tea).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expenditure {
    pub id: String,
    pub category: String,
    pub amount_paise: i64,
    pub description: Option<String>,
    /// When the money was spent. Backdated entries sit at local midnight.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Expenditure {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }
}

/// Fields for recording or editing an expenditure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenditureInput {
    pub category: String,
    pub amount_paise: i64,
    #[serde(default)]
    pub description: Option<String>,
    /// Local calendar date the money was spent; `None` means now.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
}

// =============================================================================
// Staff
// =============================================================================

/// A shop account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StaffUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Argon2 PHC string. Never leaves the process.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Request to open a new staff account.
#[derive(Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStaffUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl fmt::Debug for NewStaffUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewStaffUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A printed bill for a repair order.
///
/// Money fields are copied from the order when the invoice is raised, so
/// reprinting shows what the customer was told at the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    pub order_id: String,
    /// `INV-` + last 8 digits of the creation time in unix milliseconds.
    pub invoice_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub device_brand: String,
    pub device_model: String,
    pub problem: String,
    pub estimated_cost_paise: i64,
    pub advance_paise: i64,
    pub balance_paise: i64,
    pub warranty: String,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Builds the invoice number for a creation instant.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use fixit_core::Invoice;
    ///
    /// let at = Utc.timestamp_millis_opt(1_760_000_123_456).unwrap();
    /// assert_eq!(Invoice::number_for(at), "INV-00123456");
    /// ```
    pub fn number_for(created_at: DateTime<Utc>) -> String {
        let millis = created_at.timestamp_millis().rem_euclid(100_000_000);
        format!("INV-{:08}", millis)
    }

    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_paise(self.balance_paise)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("repaired".parse::<OrderStatus>().unwrap(), OrderStatus::Repaired);
        assert_eq!(" CANCELLED ".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "FIXED".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { ref field, .. } if field == "status"));
    }

    #[test]
    fn test_terminal_statuses() {
        let terminal: Vec<_> = OrderStatus::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&OrderStatus::Delivered, &OrderStatus::Cancelled]);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
    }

    #[test]
    fn test_sale_input_total_and_category() {
        let input = SaleInput {
            item_name: "Tempered glass".to_string(),
            category: Some("  ".to_string()),
            quantity: 3,
            unit_price_paise: 15_000,
            ..Default::default()
        };
        assert_eq!(input.total_price().unwrap().paise(), 45_000);

        let overflowing = SaleInput {
            quantity: 3,
            unit_price_paise: i64::MAX / 2,
            ..input.clone()
        };
        assert!(overflowing.total_price().is_err());
        assert_eq!(input.resolved_category(), "Accessories");
    }

    #[test]
    fn test_invoice_number_keeps_leading_zeros() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_042).unwrap();
        assert_eq!(Invoice::number_for(at), "INV-00000042");
    }

    #[test]
    fn test_period_windows() {
        assert_eq!(Period::Week.days(), 7);
        assert_eq!(Period::Month.days(), 30);
        assert_eq!("month".parse::<Period>().unwrap(), Period::Month);
        assert!("YEAR".parse::<Period>().is_err());
    }

    #[test]
    fn test_new_staff_debug_hides_password() {
        let new_user = NewStaffUser {
            name: "Ravi".into(),
            email: "ravi@shop.test".into(),
            password: "hunter22".into(),
            role: Role::Staff,
        };
        assert!(!format!("{:?}", new_user).contains("hunter22"));
    }
}
