//! # Expenditure Commands
//!
//! A clerk enters the calendar day the money went out, not a time. That
//! day is stored as its local midnight so it buckets back to the same day
//! on the dashboard whatever the server's own timezone is.

use tracing::{debug, info};
use uuid::Uuid;

use super::non_blank;
use crate::error::{ServiceError, ServiceResult};
use crate::ShopService;
use fixit_core::clock::local_midnight;
use fixit_core::validation::validate_expenditure_input;
use fixit_core::{Caller, Expenditure, ExpenditureInput, Operation};

impl ShopService {
    /// Records money paid out. Without a date it is dated now.
    pub async fn create_expenditure(
        &self,
        caller: &Caller,
        input: ExpenditureInput,
    ) -> ServiceResult<Expenditure> {
        debug!(category = %input.category, "create_expenditure command");
        caller.authorize(Operation::CreateExpenditure)?;
        validate_expenditure_input(&input)?;

        let now = self.clock().now();
        let expenditure = Expenditure {
            id: Uuid::new_v4().to_string(),
            category: input.category.trim().to_string(),
            amount_paise: input.amount_paise,
            description: non_blank(input.description),
            date: input
                .date
                .map(|day| local_midnight(day, self.timezone()))
                .unwrap_or(now),
            created_by: caller.user_id().map(str::to_string),
            created_at: now,
        };

        self.db().expenditures().insert(&expenditure).await?;

        info!(
            id = %expenditure.id,
            amount = %expenditure.amount(),
            date = %expenditure.date,
            "Expenditure recorded"
        );

        Ok(expenditure)
    }

    /// Rewrites an expenditure. Without a date the recorded one is kept.
    pub async fn update_expenditure(
        &self,
        caller: &Caller,
        id: &str,
        input: ExpenditureInput,
    ) -> ServiceResult<Expenditure> {
        debug!(id = %id, "update_expenditure command");
        caller.authorize(Operation::UpdateExpenditure)?;
        validate_expenditure_input(&input)?;

        let existing = self
            .db()
            .expenditures()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Expenditure", id))?;

        let expenditure = Expenditure {
            category: input.category.trim().to_string(),
            amount_paise: input.amount_paise,
            description: non_blank(input.description),
            date: input
                .date
                .map(|day| local_midnight(day, self.timezone()))
                .unwrap_or(existing.date),
            ..existing
        };

        if !self.db().expenditures().update(&expenditure).await? {
            return Err(ServiceError::not_found("Expenditure", id));
        }

        info!(id = %id, amount = %expenditure.amount(), "Expenditure updated");
        Ok(expenditure)
    }

    pub async fn delete_expenditure(&self, caller: &Caller, id: &str) -> ServiceResult<()> {
        debug!(id = %id, "delete_expenditure command");
        caller.authorize(Operation::DeleteExpenditure)?;

        if !self.db().expenditures().delete(id).await? {
            return Err(ServiceError::not_found("Expenditure", id));
        }

        info!(id = %id, deleted_by = ?caller.user_id(), "Expenditure deleted");
        Ok(())
    }

    /// Every expenditure, latest date first.
    pub async fn list_expenditures(&self, caller: &Caller) -> ServiceResult<Vec<Expenditure>> {
        debug!("list_expenditures command");
        caller.authorize(Operation::ViewExpenditures)?;

        let expenditures = self.db().expenditures().list().await?;
        Ok(expenditures)
    }
}
