//! # Staff Commands
//!
//! Account management for ADMIN. MAINTENANCE accounts are provisioned
//! outside the shop: an ADMIN can neither create one nor see, reset or
//! delete an existing one.

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::password::hash_password;
use crate::ShopService;
use fixit_core::validation::{validate_new_staff, validate_password};
use fixit_core::{Caller, NewStaffUser, Operation, Role, StaffUser, ValidationError};

impl ShopService {
    /// Opens an ADMIN or STAFF account.
    pub async fn create_staff(
        &self,
        caller: &Caller,
        input: NewStaffUser,
    ) -> ServiceResult<StaffUser> {
        debug!(email = %input.email, role = %input.role, "create_staff command");
        caller.authorize(Operation::ManageStaff)?;
        validate_new_staff(&input)?;

        if input.role == Role::Maintenance {
            return Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec![Role::Admin.to_string(), Role::Staff.to_string()],
            }
            .into());
        }

        let email = input.email.trim().to_lowercase();
        if self.db().staff().get_by_email(&email).await?.is_some() {
            return Err(ValidationError::Duplicate {
                field: "email".to_string(),
                value: email,
            }
            .into());
        }

        let user = StaffUser {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            email,
            role: input.role,
            password_hash: hash_password(&input.password)?,
            created_at: self.clock().now(),
        };

        self.db().staff().insert(&user).await?;

        info!(id = %user.id, role = %user.role, created_by = ?caller.user_id(), "Staff account created");
        Ok(user)
    }

    /// Accounts, oldest first. Only MAINTENANCE callers see MAINTENANCE
    /// accounts.
    pub async fn list_staff(&self, caller: &Caller) -> ServiceResult<Vec<StaffUser>> {
        debug!("list_staff command");
        caller.authorize(Operation::ViewStaff)?;

        let include_maintenance = caller.role() == Some(Role::Maintenance);
        let users = self.db().staff().list(include_maintenance).await?;
        Ok(users)
    }

    pub async fn reset_staff_password(
        &self,
        caller: &Caller,
        id: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        debug!(id = %id, "reset_staff_password command");
        caller.authorize(Operation::ManageStaff)?;
        validate_password(new_password)?;

        self.managed_account(id).await?;

        let hash = hash_password(new_password)?;
        if !self.db().staff().set_password_hash(id, &hash).await? {
            return Err(ServiceError::not_found("StaffUser", id));
        }

        info!(id = %id, reset_by = ?caller.user_id(), "Staff password reset");
        Ok(())
    }

    /// Removes an account. Nobody can delete their own.
    pub async fn delete_staff(&self, caller: &Caller, id: &str) -> ServiceResult<()> {
        debug!(id = %id, "delete_staff command");
        caller.authorize(Operation::ManageStaff)?;

        if caller.user_id() == Some(id) {
            return Err(ValidationError::Rejected("You cannot delete your own account".into()).into());
        }

        self.managed_account(id).await?;

        if !self.db().staff().delete(id).await? {
            return Err(ServiceError::not_found("StaffUser", id));
        }

        info!(id = %id, deleted_by = ?caller.user_id(), "Staff account deleted");
        Ok(())
    }

    /// An account ADMIN may act on. MAINTENANCE accounts read as missing.
    async fn managed_account(&self, id: &str) -> ServiceResult<StaffUser> {
        self.db()
            .staff()
            .get_by_id(id)
            .await?
            .filter(|user| user.role != Role::Maintenance)
            .ok_or_else(|| ServiceError::not_found("StaffUser", id))
    }
}
