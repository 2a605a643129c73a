//! # Settings Commands
//!
//! Maintenance mode is a shop-wide flag the front end reads to put up a
//! "back soon" screen. Everyone signed in can read it; only the
//! MAINTENANCE role flips it.

use tracing::{debug, warn};

use crate::error::ServiceResult;
use crate::ShopService;
use fixit_core::{Caller, Operation};

impl ShopService {
    pub async fn maintenance_mode(&self, caller: &Caller) -> ServiceResult<bool> {
        debug!("maintenance_mode command");
        caller.authorize(Operation::ViewMaintenanceMode)?;

        let enabled = self.db().settings().maintenance_mode().await?;
        Ok(enabled)
    }

    /// Sets the flag and returns the new value.
    pub async fn set_maintenance_mode(&self, caller: &Caller, enabled: bool) -> ServiceResult<bool> {
        debug!(enabled, "set_maintenance_mode command");
        caller.authorize(Operation::ToggleMaintenanceMode)?;

        self.db()
            .settings()
            .set_maintenance_mode(enabled, self.clock().now())
            .await?;

        warn!(enabled, changed_by = ?caller.user_id(), "Maintenance mode changed");
        Ok(enabled)
    }
}
