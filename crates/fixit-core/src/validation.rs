//! # Validation Module
//!
//! Checks every input before it reaches the store.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end (TypeScript)                                       │
//! │  └── Empty-field hints, immediate feedback                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: ShopService (Rust)                                           │
//! │  ├── Deserialization into typed inputs                                 │
//! │  └── THIS MODULE: required fields, non-negative amounts, PIN digits    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE staff email, invoice → order foreign key                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fixit_core::validation::{validate_amount, validate_required};
//!
//! assert!(validate_required("customer_name", "Asha").is_ok());
//! assert!(validate_required("customer_name", "   ").is_err());
//! assert!(validate_amount("advance", -1).is_err());
//! ```

use crate::error::ValidationError;
use crate::order::{LockMode, OrderInput, SecurityInput};
use crate::types::{ExpenditureInput, NewStaffUser, SaleInput};
use crate::{MAX_AMOUNT_PAISE, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest free-text field accepted.
pub const MAX_TEXT_LEN: usize = 500;

/// Shortest staff password accepted.
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// Field Validators
// =============================================================================

/// Non-blank after trimming, and not absurdly long.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(())
}

/// Amounts may be zero but never negative, and never above
/// [`MAX_AMOUNT_PAISE`].
pub fn validate_amount(field: &str, paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    if paise > MAX_AMOUNT_PAISE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_PAISE,
        });
    }
    Ok(())
}

/// Validates a sale quantity.
///
/// ## Rules
/// - Must be at least 1
/// - Must not exceed MAX_ITEM_QUANTITY (typo guard)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a search query and returns it trimmed.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Checks a captured credential.
///
/// A blank value is fine (it means "no lock"); a PIN must be digits; a
/// pattern must be `-`-separated node numbers.
pub fn validate_security(input: &SecurityInput) -> ValidationResult<()> {
    let value = input.value.trim();
    if value.is_empty() {
        return Ok(());
    }

    match input.mode {
        LockMode::Pin if !value.chars().all(|c| c.is_ascii_digit()) => {
            Err(ValidationError::InvalidFormat {
                field: "pin".to_string(),
                reason: "must contain digits only".to_string(),
            })
        }
        LockMode::Pattern
            if !value
                .split('-')
                .all(|node| !node.is_empty() && node.chars().all(|c| c.is_ascii_digit())) =>
        {
            Err(ValidationError::InvalidFormat {
                field: "pattern".to_string(),
                reason: "must be node numbers joined by '-'".to_string(),
            })
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates intake and edit fields of a repair order.
///
/// The advance is allowed to exceed the estimate.
pub fn validate_order_input(input: &OrderInput) -> ValidationResult<()> {
    validate_required("customer_name", &input.customer_name)?;
    validate_required("customer_phone", &input.customer_phone)?;
    validate_required("device_brand", &input.device_brand)?;
    validate_required("device_model", &input.device_model)?;
    validate_required("problem", &input.problem)?;
    validate_amount("estimated_cost", input.estimated_cost_paise)?;
    validate_amount("advance", input.advance_paise)?;
    Ok(())
}

/// Validates a sale.
pub fn validate_sale_input(input: &SaleInput) -> ValidationResult<()> {
    validate_required("item_name", &input.item_name)?;
    validate_quantity(input.quantity)?;
    validate_amount("unit_price", input.unit_price_paise)?;
    input.total_price()?;
    Ok(())
}

/// Validates an expenditure.
pub fn validate_expenditure_input(input: &ExpenditureInput) -> ValidationResult<()> {
    validate_required("category", &input.category)?;
    validate_amount("amount", input.amount_paise)?;
    Ok(())
}

/// Validates a new staff account.
pub fn validate_new_staff(input: &NewStaffUser) -> ValidationResult<()> {
    validate_required("name", &input.name)?;
    validate_email(&input.email)?;
    validate_password(&input.password)?;
    Ok(())
}

pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_required("email", email)?;
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        }),
    }
}

pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::OutOfRange {
            field: "password length".to_string(),
            min: MIN_PASSWORD_LEN as i64,
            max: MAX_TEXT_LEN as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    fn order_input() -> OrderInput {
        OrderInput {
            customer_name: "Asha".into(),
            customer_phone: "9876543210".into(),
            device_brand: "Apple".into(),
            device_model: "iPhone 11".into(),
            problem: "Battery drains".into(),
            estimated_cost_paise: 250_000,
            advance_paise: 50_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_order() {
        assert!(validate_order_input(&order_input()).is_ok());
    }

    #[test]
    fn test_order_requires_problem() {
        let mut input = order_input();
        input.problem = "  ".into();
        assert_eq!(
            validate_order_input(&input),
            Err(ValidationError::required("problem"))
        );
    }

    #[test]
    fn test_order_rejects_negative_cost() {
        let mut input = order_input();
        input.estimated_cost_paise = -1;
        assert!(matches!(
            validate_order_input(&input),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_advance_may_exceed_estimate() {
        let mut input = order_input();
        input.advance_paise = input.estimated_cost_paise * 2;
        assert!(validate_order_input(&input).is_ok());
    }

    #[test]
    fn test_security_formats() {
        let check = |mode, value: &str| {
            validate_security(&SecurityInput {
                mode,
                value: value.to_string(),
            })
        };
        assert!(check(LockMode::Pin, "0042").is_ok());
        assert!(check(LockMode::Pin, "12a4").is_err());
        assert!(check(LockMode::Pattern, "0-1-2-5-8").is_ok());
        assert!(check(LockMode::Pattern, "0--1").is_err());
        assert!(check(LockMode::Password, "anything goes!").is_ok());
        assert!(check(LockMode::Pin, "").is_ok());
    }

    #[test]
    fn test_sale_quantity_bounds() {
        let mut input = SaleInput {
            item_name: "USB-C cable".into(),
            quantity: 0,
            unit_price_paise: 19_900,
            ..Default::default()
        };
        assert!(validate_sale_input(&input).is_err());
        input.quantity = 3;
        assert!(validate_sale_input(&input).is_ok());
    }

    #[test]
    fn test_amount_ceiling() {
        assert!(validate_amount("advance", MAX_AMOUNT_PAISE).is_ok());
        assert_eq!(
            validate_amount("advance", MAX_AMOUNT_PAISE + 1),
            Err(ValidationError::OutOfRange {
                field: "advance".into(),
                min: 0,
                max: MAX_AMOUNT_PAISE,
            })
        );

        let mut input = order_input();
        input.estimated_cost_paise = i64::MAX;
        assert!(matches!(
            validate_order_input(&input),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_huge_unit_price_rejected_before_multiplying() {
        let input = SaleInput {
            item_name: "Display panel".into(),
            quantity: 3,
            unit_price_paise: i64::MAX / 2,
            ..Default::default()
        };
        assert!(matches!(
            validate_sale_input(&input),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "unit_price"
        ));
    }

    #[test]
    fn test_expenditure_needs_category() {
        let input = ExpenditureInput {
            category: String::new(),
            amount_paise: 500,
            ..Default::default()
        };
        assert_eq!(
            validate_expenditure_input(&input),
            Err(ValidationError::required("category"))
        );
    }

    #[test]
    fn test_staff_validation() {
        let mut staff = NewStaffUser {
            name: "Ravi".into(),
            email: "ravi@shop.in".into(),
            password: "longenough".into(),
            role: Role::Staff,
        };
        assert!(validate_new_staff(&staff).is_ok());

        staff.email = "ravi".into();
        assert!(validate_new_staff(&staff).is_err());

        staff.email = "ravi@shop.in".into();
        staff.password = "123".into();
        assert!(validate_new_staff(&staff).is_err());
    }

    #[test]
    fn test_search_query_trimmed() {
        assert_eq!(validate_search_query("  asha ").unwrap(), "asha");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }
}
