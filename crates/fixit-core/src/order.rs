//! # Repair Orders
//!
//! The repair job record and the rules that govern it.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Repair Order Lifecycle                            │
//! │                                                                         │
//! │  1. INTAKE                                                             │
//! │     └── RepairOrder::intake() → status NEW, balance not collected      │
//! │     └── advance is realized now (ledger entry at created_at)           │
//! │                                                                         │
//! │  2. WORK                                                               │
//! │     └── transition() → any status, backwards included                  │
//! │     └── apply_details() → customer/device/pricing overwritten          │
//! │                                                                         │
//! │  3. COLLECT                                                            │
//! │     └── balance_collected_at set once (set-if-null in the store)       │
//! │     └── remainder realized now (ledger entry at balance_collected_at)  │
//! │                                                                         │
//! │  4. DELETE (admin)                                                     │
//! │     └── order and its invoices removed in one transaction              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Device Credentials
//! The store keeps three nullable column pairs (PIN, pattern, password).
//! [`CredentialColumns`] is that raw shape; everything above the store sees
//! [`SealedCredential`] (one mode, one secret) or, once unsealed,
//! [`DeviceLock`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{OrderStatus, PaymentMode};
use crate::vault::{SealedSecret, Vault};

/// Orders returned by a listing when the caller gives no limit.
pub const DEFAULT_ORDER_LIST_LIMIT: u32 = 50;

/// Hard ceiling for a single listing.
pub const MAX_ORDER_LIST_LIMIT: u32 = 500;

/// Previous orders shown next to an order for the same phone number.
pub const CUSTOMER_HISTORY_LIMIT: u32 = 5;

/// Warranty label when none is given.
pub const DEFAULT_WARRANTY: &str = "No Warranty";

// =============================================================================
// Credentials
// =============================================================================

/// Which kind of screen lock the customer handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum LockMode {
    /// Digits only.
    Pin,
    /// Node indices joined by `-`, e.g. `0-1-2-5-8`.
    Pattern,
    Password,
}

/// A sealed credential with its mode made explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SealedCredential {
    pub mode: LockMode,
    pub secret: SealedSecret,
}

/// The raw credential columns of an order row.
///
/// Mode is implied by which pair is filled. When more than one pair is
/// present (legacy rows), PIN wins over pattern, and pattern over password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialColumns {
    pub pin_cipher: Option<String>,
    pub pin_iv: Option<String>,
    pub pattern_cipher: Option<String>,
    pub pattern_iv: Option<String>,
    pub password_cipher: Option<String>,
    pub password_iv: Option<String>,
}

impl CredentialColumns {
    /// Reads the populated pair, if any.
    pub fn to_sealed(&self) -> Option<SealedCredential> {
        fn pair(cipher: &Option<String>, iv: &Option<String>) -> Option<SealedSecret> {
            match (cipher.as_deref(), iv.as_deref()) {
                (Some(c), Some(i)) if !c.is_empty() && !i.is_empty() => Some(SealedSecret {
                    cipher_hex: c.to_string(),
                    iv_hex: i.to_string(),
                }),
                _ => None,
            }
        }

        [
            (LockMode::Pin, pair(&self.pin_cipher, &self.pin_iv)),
            (LockMode::Pattern, pair(&self.pattern_cipher, &self.pattern_iv)),
            (LockMode::Password, pair(&self.password_cipher, &self.password_iv)),
        ]
        .into_iter()
        .find_map(|(mode, secret)| secret.map(|secret| SealedCredential { mode, secret }))
    }

    /// Lays a credential out as columns. The other two pairs are always null.
    pub fn from_sealed(credential: Option<&SealedCredential>) -> Self {
        let mut columns = CredentialColumns::default();
        if let Some(c) = credential {
            let cipher = Some(c.secret.cipher_hex.clone());
            let iv = Some(c.secret.iv_hex.clone());
            match c.mode {
                LockMode::Pin => {
                    columns.pin_cipher = cipher;
                    columns.pin_iv = iv;
                }
                LockMode::Pattern => {
                    columns.pattern_cipher = cipher;
                    columns.pattern_iv = iv;
                }
                LockMode::Password => {
                    columns.password_cipher = cipher;
                    columns.password_iv = iv;
                }
            }
        }
        columns
    }
}

/// An unsealed credential as shown to staff.
///
/// Serializes as `{"mode": "PIN", "value": "1234"}` or `{"mode": "NONE"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "mode", content = "value", rename_all = "UPPERCASE")]
#[ts(export)]
pub enum DeviceLock {
    #[default]
    None,
    Pin(String),
    Pattern(String),
    Password(String),
}

impl DeviceLock {
    pub fn mode(&self) -> Option<LockMode> {
        match self {
            DeviceLock::None => None,
            DeviceLock::Pin(_) => Some(LockMode::Pin),
            DeviceLock::Pattern(_) => Some(LockMode::Pattern),
            DeviceLock::Password(_) => Some(LockMode::Password),
        }
    }

    /// Unseals a stored credential. A failed unseal keeps the mode with an
    /// empty value.
    pub fn reveal(credential: Option<&SealedCredential>, vault: &Vault) -> Self {
        match credential {
            None => DeviceLock::None,
            Some(c) => {
                let value = vault.unseal(&c.secret);
                match c.mode {
                    LockMode::Pin => DeviceLock::Pin(value),
                    LockMode::Pattern => DeviceLock::Pattern(value),
                    LockMode::Password => DeviceLock::Password(value),
                }
            }
        }
    }
}

/// Credential as typed at the counter.
#[derive(Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SecurityInput {
    pub mode: LockMode,
    pub value: String,
}

impl std::fmt::Debug for SecurityInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityInput")
            .field("mode", &self.mode)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl SecurityInput {
    /// Seals the value. Blank values yield no credential at all.
    pub fn seal(&self, vault: &Vault) -> Option<SealedCredential> {
        vault.seal(&self.value).map(|secret| SealedCredential {
            mode: self.mode,
            secret,
        })
    }
}

/// What an edit does to the stored credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(tag = "action", content = "security", rename_all = "UPPERCASE")]
#[ts(export)]
pub enum CredentialUpdate {
    /// Leave the stored credential as it is.
    #[default]
    Keep,
    /// Clear all three pairs, then seal this one (if any).
    Replace(Option<SecurityInput>),
}

// =============================================================================
// Repair Order
// =============================================================================

/// A device taken in for repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RepairOrder {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub device_brand: String,
    pub device_model: String,
    pub problem: String,
    pub imei: Option<String>,
    pub estimated_cost_paise: i64,
    pub advance_paise: i64,
    pub payment_mode_advance: PaymentMode,
    pub payment_mode_balance: PaymentMode,
    pub status: OrderStatus,
    #[ts(as = "Option<String>")]
    pub balance_collected_at: Option<DateTime<Utc>>,
    pub credential: Option<SealedCredential>,
    pub warranty: String,
    pub images: Vec<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl RepairOrder {
    /// Builds a freshly taken-in order: status NEW, balance not collected.
    pub fn intake(
        id: String,
        details: OrderInput,
        credential: Option<SealedCredential>,
        created_by: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut order = RepairOrder {
            id,
            customer_name: String::new(),
            customer_phone: String::new(),
            device_brand: String::new(),
            device_model: String::new(),
            problem: String::new(),
            imei: None,
            estimated_cost_paise: 0,
            advance_paise: 0,
            payment_mode_advance: PaymentMode::default(),
            payment_mode_balance: PaymentMode::default(),
            status: OrderStatus::New,
            balance_collected_at: None,
            credential,
            warranty: DEFAULT_WARRANTY.to_string(),
            images: Vec::new(),
            created_by,
            created_at: now,
        };
        order.apply_details(details);
        order
    }

    /// Overwrites every editable field.
    ///
    /// Status, the collection marker and the audit fields are untouched.
    pub fn apply_details(&mut self, details: OrderInput) {
        self.customer_name = details.customer_name.trim().to_string();
        self.customer_phone = details.customer_phone.trim().to_string();
        self.device_brand = details.device_brand.trim().to_string();
        self.device_model = details.device_model.trim().to_string();
        self.problem = details.problem.trim().to_string();
        self.imei = details
            .imei
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty());
        self.estimated_cost_paise = details.estimated_cost_paise;
        self.advance_paise = details.advance_paise;
        self.payment_mode_advance = details.payment_mode_advance;
        self.payment_mode_balance = details.payment_mode_balance;
        self.warranty = details
            .warranty
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| DEFAULT_WARRANTY.to_string());
        self.images = details.images;
    }

    /// Applies a credential edit. Returns true when the stored columns change.
    pub fn apply_credential(&mut self, update: CredentialUpdate, vault: &Vault) -> bool {
        match update {
            CredentialUpdate::Keep => false,
            CredentialUpdate::Replace(input) => {
                self.credential = input.as_ref().and_then(|s| s.seal(vault));
                true
            }
        }
    }

    #[inline]
    pub fn estimated_cost(&self) -> Money {
        Money::from_paise(self.estimated_cost_paise)
    }

    #[inline]
    pub fn advance(&self) -> Money {
        Money::from_paise(self.advance_paise)
    }

    /// estimated cost − advance. Negative when the advance exceeds the
    /// estimate.
    #[inline]
    pub fn balance(&self) -> Money {
        self.estimated_cost() - self.advance()
    }

    #[inline]
    pub fn is_balance_collected(&self) -> bool {
        self.balance_collected_at.is_some()
    }

    /// What the customer still owes right now.
    pub fn outstanding(&self) -> Money {
        if self.is_balance_collected() {
            Money::zero()
        } else {
            self.balance()
        }
    }

    /// Not yet delivered or cancelled.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn lock_mode(&self) -> Option<LockMode> {
        self.credential.as_ref().map(|c| c.mode)
    }

    /// Describes a move to `to`. Every move is allowed.
    pub fn transition(&self, to: OrderStatus) -> StatusChange {
        StatusChange {
            from: self.status,
            to,
        }
    }
}

/// A status move, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl StatusChange {
    fn rank(status: OrderStatus) -> u8 {
        match status {
            OrderStatus::New => 0,
            OrderStatus::Pending => 1,
            OrderStatus::Repaired => 2,
            OrderStatus::Delivered | OrderStatus::Cancelled => 3,
        }
    }

    /// A move against the usual NEW → DELIVERED direction, or out of a
    /// terminal state. Accepted, but worth a log line.
    pub fn is_backwards(&self) -> bool {
        (self.from.is_terminal() && self.from != self.to)
            || Self::rank(self.to) < Self::rank(self.from)
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Editable order fields, shared by intake and edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderInput {
    pub customer_name: String,
    pub customer_phone: String,
    pub device_brand: String,
    pub device_model: String,
    pub problem: String,
    #[serde(default)]
    pub imei: Option<String>,
    pub estimated_cost_paise: i64,
    #[serde(default)]
    pub advance_paise: i64,
    #[serde(default)]
    pub payment_mode_advance: PaymentMode,
    #[serde(default)]
    pub payment_mode_balance: PaymentMode,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Intake request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewRepairOrder {
    #[serde(flatten)]
    pub details: OrderInput,
    #[serde(default)]
    pub security: Option<SecurityInput>,
}

/// Edit request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderUpdate {
    #[serde(flatten)]
    pub details: OrderInput,
    #[serde(default)]
    pub credential: CredentialUpdate,
}

// =============================================================================
// Queries
// =============================================================================

/// Order listing filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderFilter {
    /// `None` lists every status.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// Case-insensitive match on name, phone, model or id.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl OrderFilter {
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_ORDER_LIST_LIMIT)
            .clamp(1, MAX_ORDER_LIST_LIMIT)
    }

    /// Trimmed search text, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// An order with its credential unsealed, for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetails {
    pub order: RepairOrder,
    pub lock: DeviceLock,
    pub balance: Money,
    pub outstanding: Money,
}

impl OrderDetails {
    pub fn new(order: RepairOrder, vault: &Vault) -> Self {
        let lock = DeviceLock::reveal(order.credential.as_ref(), vault);
        OrderDetails {
            balance: order.balance(),
            outstanding: order.outstanding(),
            lock,
            order,
        }
    }
}

/// A previous visit by the same phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CustomerHistoryEntry {
    pub id: String,
    pub device_brand: String,
    pub device_model: String,
    pub problem: String,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Orders per status, for the counter badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderStatusCounts {
    pub new: i64,
    pub pending: i64,
    pub repaired: i64,
    pub delivered: i64,
    pub cancelled: i64,
    /// Not delivered and not cancelled.
    pub active: i64,
    pub total: i64,
}

impl OrderStatusCounts {
    /// Folds `(status, count)` pairs from a GROUP BY.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (OrderStatus, i64)>) -> Self {
        let mut counts = OrderStatusCounts::default();
        for (status, n) in pairs {
            match status {
                OrderStatus::New => counts.new += n,
                OrderStatus::Pending => counts.pending += n,
                OrderStatus::Repaired => counts.repaired += n,
                OrderStatus::Delivered => counts.delivered += n,
                OrderStatus::Cancelled => counts.cancelled += n,
            }
            if !status.is_terminal() {
                counts.active += n;
            }
            counts.total += n;
        }
        counts
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
