//! # Settings Repository
//!
//! Key/value shop settings. The only key in use is
//! [`MAINTENANCE_MODE_KEY`], stored as `"true"` / `"false"`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

pub const MAINTENANCE_MODE_KEY: &str = "maintenance_mode";

/// Repository for shop settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM shop_settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    /// Inserts or overwrites a setting.
    pub async fn set(&self, key: &str, value: &str, at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO shop_settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(at)
        .execute(&self.pool)
        .await?;

        info!(key = %key, value = %value, "Shop setting changed");
        Ok(())
    }

    /// Maintenance mode flag; off when never set.
    pub async fn maintenance_mode(&self) -> DbResult<bool> {
        Ok(self
            .get(MAINTENANCE_MODE_KEY)
            .await?
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")))
    }

    pub async fn set_maintenance_mode(&self, enabled: bool, at: DateTime<Utc>) -> DbResult<()> {
        self.set(MAINTENANCE_MODE_KEY, if enabled { "true" } else { "false" }, at)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::test_support::{at, test_db};

    #[tokio::test]
    async fn test_maintenance_mode_defaults_off_and_toggles() {
        let db = test_db().await;
        let settings = db.settings();

        assert!(!settings.maintenance_mode().await.unwrap());

        settings
            .set_maintenance_mode(true, at(2026, 10, 16, 6))
            .await
            .unwrap();
        assert!(settings.maintenance_mode().await.unwrap());

        settings
            .set_maintenance_mode(false, at(2026, 10, 16, 7))
            .await
            .unwrap();
        assert!(!settings.maintenance_mode().await.unwrap());
        assert_eq!(
            settings.get("maintenance_mode").await.unwrap().as_deref(),
            Some("false")
        );
    }
}
