//! # fixit-service: Operations Layer for the FixIt Shop
//!
//! The surface the HTTP collaborator calls. Each operation takes the
//! [`Caller`](fixit_core::Caller) the session layer established, checks the access policy,
//! validates input and only then touches the store.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Operation Request Path                           │
//! │                                                                         │
//! │  HTTP handler (out of scope)                                           │
//! │       │  &Caller, input                                                │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 ShopService (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   1. caller.authorize(Operation::X)  ── AccessDenied ──┐        │   │
//! │  │   2. validate_*(input)               ── Validation ────┤        │   │
//! │  │   3. fixit-core rule (seal, intake, compute_dashboard) │        │   │
//! │  │   4. fixit-db repository             ── DbError ───────┤        │   │
//! │  │                                                        ▼        │   │
//! │  │                                              ServiceError       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Shared state: Database (SqlitePool), Vault, Clock. No locks held      │
//! │  across operations; concurrency is the store's job.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`commands`] - One file per record family (orders, sales, ...)
//! - [`config`] - TOML + environment configuration, vault key resolution
//! - [`error`] - [`ServiceError`] and conversions
//! - [`password`] - Staff password hashing
//!
//! ## Usage
//! ```rust,ignore
//! use fixit_service::{ShopConfig, ShopService};
//! use fixit_core::{Caller, Period, Role};
//!
//! let config = ShopConfig::load(None)?;
//! let service = ShopService::from_config(&config).await?;
//!
//! let caller = Caller::new("user-1", Role::Staff);
//! let stats = service.dashboard_stats(&caller, Period::Week).await?;
//! ```

use std::sync::Arc;

use chrono_tz::Tz;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fixit_core::{Clock, SystemClock, Vault};
use fixit_db::Database;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commands;
pub mod config;
pub mod error;
pub mod password;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, ListLimits, ShopConfig};
pub use error::{ErrorCode, ServiceError, ServiceResult};
pub use fixit_db::CollectOutcome;

// =============================================================================
// Shop Service
// =============================================================================

/// Everything an operation needs, cheap to clone into request handlers.
#[derive(Clone)]
pub struct ShopService {
    db: Database,
    vault: Arc<Vault>,
    clock: Arc<dyn Clock>,
    limits: ListLimits,
}

impl std::fmt::Debug for ShopService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopService")
            .field("db", &self.db)
            .field("vault", &self.vault)
            .field("timezone", &self.clock.timezone())
            .field("limits", &self.limits)
            .finish()
    }
}

impl ShopService {
    /// Assembles a service from already-built parts.
    pub fn new(db: Database, vault: Vault, clock: Arc<dyn Clock>) -> Self {
        ShopService {
            db,
            vault: Arc::new(vault),
            clock,
            limits: ListLimits::default(),
        }
    }

    /// Overrides the default page sizes.
    pub fn with_limits(mut self, limits: ListLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Opens the store, resolves the vault key and starts the wall clock.
    pub async fn from_config(config: &ShopConfig) -> ServiceResult<Self> {
        let tz = config.timezone()?;
        let vault = config.vault()?;
        let db = Database::new(config.db_config()?).await?;

        info!(shop = %config.shop.name, timezone = %tz, "Shop service ready");

        Ok(ShopService::new(db, vault, Arc::new(SystemClock::new(tz))).with_limits(config.limits))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn timezone(&self) -> Tz {
        self.clock.timezone()
    }

    pub(crate) fn vault(&self) -> &Vault {
        &self.vault
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn limits(&self) -> ListLimits {
        self.limits
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise shop crates log at debug and sqlx
/// only warns.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fixit=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// =============================================================================
// Test Support
// =============================================================================
