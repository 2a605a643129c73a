//! # Shop Configuration
//!
//! Where the store lives, which timezone the books close in, and where the
//! credential key comes from.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FIXIT_DB_PATH=/srv/fixit/fixit.db                                  │
//! │     FIXIT_TIMEZONE=Asia/Kolkata                                        │
//! │     FIXIT_ENCRYPTION_KEY=<32 bytes>                                    │
//! │     FIXIT_DB_MAX_CONNECTIONS=8                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/fixit-shop/config.toml (Linux)                           │
//! │     ~/Library/Application Support/com.fixit.shop/config.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     <data dir>/fixit.db, Asia/Kolkata, <data dir>/vault.key            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/fixit/fixit.db"
//! max_connections = 5
//!
//! [shop]
//! name = "FixIt Mobile Care"
//! timezone = "Asia/Kolkata"
//!
//! [vault]
//! key_file = "/srv/fixit/vault.key"
//!
//! [limits]
//! orders = 50
//! sales = 50
//! invoices = 100
//! ```
//!
//! ## Vault Key Resolution
//! ```text
//! FIXIT_ENCRYPTION_KEY / [vault].key set? ──yes──► 32-byte secret
//!          │ no
//!          ▼
//! key file exists? ──yes──► 64 hex chars
//!          │ no
//!          ▼
//! generate random key, write key file, warn once
//! ```

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use fixit_core::clock::DEFAULT_TIMEZONE;
use fixit_core::order::{DEFAULT_ORDER_LIST_LIMIT, MAX_ORDER_LIST_LIMIT};
use fixit_core::vault::{Vault, VaultError};
use fixit_db::DbConfig;

const DB_FILE_NAME: &str = "fixit.db";
const KEY_FILE_NAME: &str = "vault.key";

// =============================================================================
// Errors
// =============================================================================

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read or write config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown timezone: '{0}'")]
    UnknownTimezone(String),

    #[error("Encryption key unusable: {0}")]
    Key(#[from] VaultError),

    #[error("No platform directory available for {0}")]
    NoPlatformDir(&'static str),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to `fixit.db` in the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// `[shop]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopSettings {
    #[serde(default = "default_shop_name")]
    pub name: String,

    /// IANA name. Every "today" and every trend bucket uses it.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_shop_name() -> String {
    "FixIt Shop".to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.name().to_string()
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            name: default_shop_name(),
            timezone: default_timezone(),
        }
    }
}

/// `[vault]`
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct VaultSettings {
    /// Raw 32-byte secret. Prefer `FIXIT_ENCRYPTION_KEY` over writing it here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Hex key file used when no secret is given.
    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

impl std::fmt::Debug for VaultSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSettings")
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("key_file", &self.key_file)
            .finish()
    }
}

/// `[limits]`, default page sizes for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListLimits {
    #[serde(default = "default_order_limit")]
    pub orders: u32,

    #[serde(default = "default_sale_limit")]
    pub sales: u32,

    #[serde(default = "default_invoice_limit")]
    pub invoices: u32,
}

fn default_order_limit() -> u32 {
    DEFAULT_ORDER_LIST_LIMIT
}
fn default_sale_limit() -> u32 {
    50
}
fn default_invoice_limit() -> u32 {
    100
}

impl Default for ListLimits {
    fn default() -> Self {
        ListLimits {
            orders: default_order_limit(),
            sales: default_sale_limit(),
            invoices: default_invoice_limit(),
        }
    }
}

impl ListLimits {
    /// Caller's limit, or the configured default, clamped to a sane page.
    pub fn resolve(requested: Option<u32>, default: u32) -> u32 {
        requested.unwrap_or(default).clamp(1, MAX_ORDER_LIST_LIMIT)
    }
}

// =============================================================================
// Shop Configuration
// =============================================================================

/// Complete shop configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub shop: ShopSettings,

    #[serde(default)]
    pub vault: VaultSettings,

    #[serde(default)]
    pub limits: ListLimits,
}

impl ShopConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading shop config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load shop config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file. A vault secret set on `self` is written
    /// out in the clear, so clear `vault.key` first if it came from the
    /// environment.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPlatformDir("config"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Shop config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.timezone()?;

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if let Some(ref key) = self.vault.key {
            Vault::from_secret(key)?;
        }

        for (name, value) in [
            ("orders", self.limits.orders),
            ("sales", self.limits.sales),
            ("invoices", self.limits.invoices),
        ] {
            if value == 0 || value > MAX_ORDER_LIST_LIMIT {
                return Err(ConfigError::Invalid(format!(
                    "limits.{} must be between 1 and {}, got {}",
                    name, MAX_ORDER_LIST_LIMIT, value
                )));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("FIXIT_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Ok(tz) = std::env::var("FIXIT_TIMEZONE") {
            debug!(timezone = %tz, "Overriding timezone from environment");
            self.shop.timezone = tz;
        }

        if let Ok(key) = std::env::var("FIXIT_ENCRYPTION_KEY") {
            debug!("Using encryption key from environment");
            self.vault.key = Some(key);
        }

        if let Ok(max) = std::env::var("FIXIT_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring non-numeric FIXIT_DB_MAX_CONNECTIONS"),
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "fixit", "shop")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Resolved Values
    // =========================================================================

    /// The shop timezone.
    pub fn timezone(&self) -> ConfigResult<Tz> {
        self.shop
            .timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.shop.timezone.clone()))
    }

    /// Database file, falling back to the platform data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match self.database.path {
            Some(ref path) => Ok(path.clone()),
            None => Self::project_dirs()
                .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
                .ok_or(ConfigError::NoPlatformDir("database")),
        }
    }

    /// Store settings for [`fixit_db::Database::new`]. Creates the parent
    /// directory of the database file.
    pub fn db_config(&self) -> ConfigResult<DbConfig> {
        let path = self.database_path()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(DbConfig::new(path).max_connections(self.database.max_connections))
    }

    /// Key file location, falling back to the platform data directory.
    pub fn key_file_path(&self) -> ConfigResult<PathBuf> {
        match self.vault.key_file {
            Some(ref path) => Ok(path.clone()),
            None => Self::project_dirs()
                .map(|dirs| dirs.data_dir().join(KEY_FILE_NAME))
                .ok_or(ConfigError::NoPlatformDir("vault key")),
        }
    }

    /// Builds the credential vault from the configured key material.
    pub fn vault(&self) -> ConfigResult<Vault> {
        if let Some(ref secret) = self.vault.key {
            return Ok(Vault::from_secret(secret)?);
        }

        let path = self.key_file_path()?;
        if path.exists() {
            debug!(?path, "Loading vault key file");
            let encoded = std::fs::read_to_string(&path)?;
            return Ok(Vault::from_hex(&encoded)?);
        }

        write_new_key(&path)
    }
}

/// Generates a key, persists it, and returns the vault built from it.
fn write_new_key(path: &Path) -> ConfigResult<Vault> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let key = Vault::generate_key();
    std::fs::write(path, hex::encode(key))?;

    warn!(
        ?path,
        "No encryption key configured; generated a new one. Back this file up: \
         credentials sealed with it cannot be read without it"
    );
    Ok(Vault::new(key))
}
