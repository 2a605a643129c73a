//! # Repository Module
//!
//! Database repository implementations for the shop.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  ShopService operation                                                 │
//! │       │                                                                 │
//! │       │  db.orders().collect_balance(id, mode, now)                    │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── insert / get_by_id / list / customer_history                      │
//! │  ├── update / set_status / collect_balance                             │
//! │  └── delete (order + invoices, one transaction)                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`OrderRepository`](order::OrderRepository) - Repair orders
//! - [`SaleRepository`](sale::SaleRepository) - Counter sales
//! - [`ExpenditureRepository`](expenditure::ExpenditureRepository) - Shop spending
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Printed bills
//! - [`StaffRepository`](staff::StaffRepository) - Staff accounts
//! - [`SettingsRepository`](settings::SettingsRepository) - Key/value settings
//! - [`LedgerRepository`](ledger::LedgerRepository) - Dashboard snapshot

pub mod expenditure;
pub mod invoice;
pub mod ledger;
pub mod order;
pub mod sale;
pub mod settings;
pub mod staff;
