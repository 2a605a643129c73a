//! # Repair Order Repository
//!
//! Database operations for repair orders.
//!
//! ## Order Lifecycle in the Store
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Repair Order Lifecycle                            │
//! │                                                                         │
//! │  1. INTAKE                                                             │
//! │     └── insert() → status NEW, balance_collected_at NULL               │
//! │                                                                         │
//! │  2. WORK                                                               │
//! │     └── set_status() → PENDING / REPAIRED / ... (any direction)        │
//! │     └── update() → details + credential columns, status untouched      │
//! │                                                                         │
//! │  3. COLLECT                                                            │
//! │     └── collect_balance() → UPDATE ... WHERE balance_collected_at      │
//! │                             IS NULL  (set once, racing calls agree)    │
//! │                                                                         │
//! │  4. (OPTIONAL) DELETE                                                  │
//! │     └── delete() → invoices + order in one transaction                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Credential Columns
//! The sealed credential is stored as three nullable cipher/iv pairs. The
//! row type reads all six and [`CredentialColumns`] decides the mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use fixit_core::{
    CredentialColumns, CustomerHistoryEntry, OrderFilter, OrderStatus, OrderStatusCounts,
    PaymentMode, RepairOrder,
};

const ORDER_COLUMNS: &str = r#"
    id, customer_name, customer_phone, device_brand, device_model, problem, imei,
    estimated_cost_paise, advance_paise, payment_mode_advance, payment_mode_balance,
    status, balance_collected_at,
    pin_cipher, pin_iv, pattern_cipher, pattern_iv, password_cipher, password_iv,
    warranty, images, created_by, created_at
"#;

// =============================================================================
// Row Mapping
// =============================================================================

/// One `repair_orders` row as stored.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_name: String,
    customer_phone: String,
    device_brand: String,
    device_model: String,
    problem: String,
    imei: Option<String>,
    estimated_cost_paise: i64,
    advance_paise: i64,
    payment_mode_advance: PaymentMode,
    payment_mode_balance: PaymentMode,
    status: OrderStatus,
    balance_collected_at: Option<DateTime<Utc>>,
    pin_cipher: Option<String>,
    pin_iv: Option<String>,
    pattern_cipher: Option<String>,
    pattern_iv: Option<String>,
    password_cipher: Option<String>,
    password_iv: Option<String>,
    warranty: String,
    images: String,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for RepairOrder {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        let credential = CredentialColumns {
            pin_cipher: row.pin_cipher,
            pin_iv: row.pin_iv,
            pattern_cipher: row.pattern_cipher,
            pattern_iv: row.pattern_iv,
            password_cipher: row.password_cipher,
            password_iv: row.password_iv,
        }
        .to_sealed();

        let images: Vec<String> = if row.images.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&row.images)?
        };

        Ok(RepairOrder {
            id: row.id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            device_brand: row.device_brand,
            device_model: row.device_model,
            problem: row.problem,
            imei: row.imei,
            estimated_cost_paise: row.estimated_cost_paise,
            advance_paise: row.advance_paise,
            payment_mode_advance: row.payment_mode_advance,
            payment_mode_balance: row.payment_mode_balance,
            status: row.status,
            balance_collected_at: row.balance_collected_at,
            credential,
            warranty: row.warranty,
            images,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a balance collection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectOutcome {
    /// This call set `balance_collected_at`.
    Collected,
    /// Someone already collected; nothing changed.
    AlreadyCollected,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for repair order database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.orders();
/// repo.insert(&order).await?;
/// let found = repo.get_by_id(&order.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a freshly taken-in order.
    pub async fn insert(&self, order: &RepairOrder) -> DbResult<()> {
        debug!(id = %order.id, phone = %order.customer_phone, "Inserting repair order");

        let creds = CredentialColumns::from_sealed(order.credential.as_ref());
        let images = serde_json::to_string(&order.images)?;

        sqlx::query(
            r#"
            INSERT INTO repair_orders (
                id, customer_name, customer_phone, device_brand, device_model, problem, imei,
                estimated_cost_paise, advance_paise, payment_mode_advance, payment_mode_balance,
                status, balance_collected_at,
                pin_cipher, pin_iv, pattern_cipher, pattern_iv, password_cipher, password_iv,
                warranty, images, created_by, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11,
                ?12, ?13,
                ?14, ?15, ?16, ?17, ?18, ?19,
                ?20, ?21, ?22, ?23
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.device_brand)
        .bind(&order.device_model)
        .bind(&order.problem)
        .bind(&order.imei)
        .bind(order.estimated_cost_paise)
        .bind(order.advance_paise)
        .bind(order.payment_mode_advance)
        .bind(order.payment_mode_balance)
        .bind(order.status)
        .bind(order.balance_collected_at)
        .bind(&creds.pin_cipher)
        .bind(&creds.pin_iv)
        .bind(&creds.pattern_cipher)
        .bind(&creds.pattern_iv)
        .bind(&creds.password_cipher)
        .bind(&creds.password_iv)
        .bind(&order.warranty)
        .bind(images)
        .bind(&order.created_by)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<RepairOrder>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM repair_orders WHERE id = ?1");

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(RepairOrder::try_from).transpose()
    }

    /// Whether an order with this ID exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM repair_orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Lists orders, newest first.
    ///
    /// ## Filtering
    /// - `status`: exact match when set
    /// - `search`: case-insensitive substring of name, phone, model or id
    /// - `limit`: defaults to 50, clamped to 1..=500
    pub async fn list(&self, filter: &OrderFilter) -> DbResult<Vec<RepairOrder>> {
        let pattern = filter.search_term().map(like_pattern);
        let limit = filter.effective_limit();

        debug!(status = ?filter.status, search = ?pattern, limit, "Listing repair orders");

        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM repair_orders
            WHERE (?1 IS NULL OR status = ?1)
              AND (
                ?2 IS NULL
                OR LOWER(customer_name) LIKE ?2 ESCAPE '\'
                OR LOWER(customer_phone) LIKE ?2 ESCAPE '\'
                OR LOWER(device_model) LIKE ?2 ESCAPE '\'
                OR LOWER(id) LIKE ?2 ESCAPE '\'
              )
            ORDER BY created_at DESC
            LIMIT ?3
            "#
        );

        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(filter.status)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(RepairOrder::try_from).collect()
    }

    /// Other orders from the same phone number, newest first.
    pub async fn customer_history(
        &self,
        phone: &str,
        exclude_id: Option<&str>,
        limit: u32,
    ) -> DbResult<Vec<CustomerHistoryEntry>> {
        let entries = sqlx::query_as::<_, CustomerHistoryEntry>(
            r#"
            SELECT id, device_brand, device_model, problem, status, created_at
            FROM repair_orders
            WHERE customer_phone = ?1
              AND (?2 IS NULL OR id != ?2)
            ORDER BY created_at DESC
            LIMIT ?3
            "#,
        )
        .bind(phone.trim())
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Overwrites the editable fields and credential columns.
    ///
    /// Status, `balance_collected_at`, `created_by` and `created_at` are not
    /// written. Returns false when no row has this ID.
    pub async fn update(&self, order: &RepairOrder) -> DbResult<bool> {
        debug!(id = %order.id, "Updating repair order");

        let creds = CredentialColumns::from_sealed(order.credential.as_ref());
        let images = serde_json::to_string(&order.images)?;

        let result = sqlx::query(
            r#"
            UPDATE repair_orders SET
                customer_name = ?2,
                customer_phone = ?3,
                device_brand = ?4,
                device_model = ?5,
                problem = ?6,
                imei = ?7,
                estimated_cost_paise = ?8,
                advance_paise = ?9,
                payment_mode_advance = ?10,
                payment_mode_balance = ?11,
                pin_cipher = ?12,
                pin_iv = ?13,
                pattern_cipher = ?14,
                pattern_iv = ?15,
                password_cipher = ?16,
                password_iv = ?17,
                warranty = ?18,
                images = ?19
            WHERE id = ?1
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.device_brand)
        .bind(&order.device_model)
        .bind(&order.problem)
        .bind(&order.imei)
        .bind(order.estimated_cost_paise)
        .bind(order.advance_paise)
        .bind(order.payment_mode_advance)
        .bind(order.payment_mode_balance)
        .bind(&creds.pin_cipher)
        .bind(&creds.pin_iv)
        .bind(&creds.pattern_cipher)
        .bind(&creds.pattern_iv)
        .bind(&creds.password_cipher)
        .bind(&creds.password_iv)
        .bind(&order.warranty)
        .bind(images)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrites the status. Returns false when no row has this ID.
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> DbResult<bool> {
        let result = sqlx::query("UPDATE repair_orders SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the remainder as collected, once.
    ///
    /// ## Concurrency
    /// ```text
    /// UPDATE ... SET balance_collected_at = ?at
    /// WHERE id = ?id AND balance_collected_at IS NULL
    ///
    /// caller A ──► 1 row  → Collected
    /// caller B ──► 0 rows → order exists → AlreadyCollected
    /// ```
    ///
    /// `mode` overrides the stored balance payment mode when given.
    pub async fn collect_balance(
        &self,
        id: &str,
        mode: Option<PaymentMode>,
        at: DateTime<Utc>,
    ) -> DbResult<CollectOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE repair_orders
            SET balance_collected_at = ?2,
                payment_mode_balance = COALESCE(?3, payment_mode_balance)
            WHERE id = ?1 AND balance_collected_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .bind(mode)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(id = %id, "Balance collected");
            return Ok(CollectOutcome::Collected);
        }

        if self.exists(id).await? {
            debug!(id = %id, "Balance already collected");
            Ok(CollectOutcome::AlreadyCollected)
        } else {
            Err(DbError::not_found("RepairOrder", id))
        }
    }

    /// Deletes an order and its invoices atomically.
    ///
    /// Returns how many invoices went with it. A missing order rolls back
    /// and reports NotFound.
    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let invoices = sqlx::query("DELETE FROM invoices WHERE order_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let orders = sqlx::query("DELETE FROM repair_orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if orders == 0 {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            return Err(DbError::not_found("RepairOrder", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, invoices, "Repair order deleted");
        Ok(invoices)
    }

    /// Order counts per status.
    pub async fn status_counts(&self) -> DbResult<OrderStatusCounts> {
        let pairs = sqlx::query_as::<_, (OrderStatus, i64)>(
            "SELECT status, COUNT(*) FROM repair_orders GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(OrderStatusCounts::from_pairs(pairs))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
