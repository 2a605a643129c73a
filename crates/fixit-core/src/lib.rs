//! # fixit-core: Pure Domain Logic for the FixIt Shop
//!
//! Everything the shop knows about its money, repair jobs, device
//! credentials and permissions, as plain functions over plain data.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        FixIt Shop Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            HTTP collaborator (routing, sessions, PDFs)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Caller + typed inputs                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  fixit-service (ShopService)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ fixit-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  order  │ │  vault  │ │ ledger  │ │ access  │ │  clock  │  │   │
//! │  │   │lifecycle│ │ AES-CTR │ │ revenue │ │ policy  │ │calendar │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │   types • money • validation • error                           │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO FILES • NO NETWORK                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  fixit-db (SQLite record store)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Shared enums and the sale/expenditure/staff/invoice records
//! - [`order`] - Repair orders, credential columns, lifecycle helpers
//! - [`money`] - Integer paise arithmetic
//! - [`vault`] - Sealing device unlock codes
//! - [`clock`] - Current instant, shop timezone, local-date conversion
//! - [`ledger`] - Revenue, pending collections, trend and breakdowns
//! - [`access`] - Role/operation policy
//! - [`validation`] - Input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use fixit_core::{Money, OrderInput, RepairOrder};
//! use chrono::Utc;
//!
//! let order = RepairOrder::intake(
//!     "o-1".into(),
//!     OrderInput {
//!         customer_name: "Asha".into(),
//!         customer_phone: "9876543210".into(),
//!         device_brand: "Samsung".into(),
//!         device_model: "M31".into(),
//!         problem: "Cracked screen".into(),
//!         estimated_cost_paise: 100_000,
//!         advance_paise: 30_000,
//!         ..Default::default()
//!     },
//!     None,
//!     None,
//!     Utc::now(),
//! );
//! assert_eq!(order.balance(), Money::from_paise(70_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod clock;
pub mod error;
pub mod ledger;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;
pub mod vault;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use access::{authorize, AccessDenied, Caller, Operation};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{compute_dashboard, DashboardStats, LedgerSnapshot};
pub use money::Money;
pub use order::*;
pub use types::*;
pub use vault::{SealedSecret, Vault, VaultError};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Pseudo-category all repair income is reported under.
pub const REPAIRS_CATEGORY: &str = "Repairs";

/// Category for sales recorded without one.
pub const DEFAULT_SALE_CATEGORY: &str = "Accessories";

/// Largest quantity accepted on one sale line.
///
/// ## Business Reason
/// Catches a clerk typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest single amount accepted: Rs. 10 crore.
///
/// Keeps every sale total (price × quantity) and every ledger sum well
/// inside i64.
pub const MAX_AMOUNT_PAISE: i64 = 10_000_000_000;
