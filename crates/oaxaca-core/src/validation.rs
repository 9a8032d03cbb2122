//! # Validation Module
//!
//! Input validation for data arriving from the HTTP layer and the seed tool.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (serde)                                      │
//! │  └── Type validation (deserialization)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Lengths, ranges, formats                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / FOREIGN KEY constraints                       │
//! │  └── CHECK (staff_id IS NULL OR customer_id IS NOT NULL)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{NewPayment, OrderItem};
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_LINES, MAX_TABLE_COUNT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 100;
const MAX_ALLERGIES_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a person's name (customer or staff).
///
/// ```rust
/// use oaxaca_core::validation::validate_name;
///
/// assert!(validate_name("customer_name", "Ana Lopez").is_ok());
/// assert!(validate_name("customer_name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates allergy notes. Empty notes are allowed.
pub fn validate_allergies(notes: &str) -> ValidationResult<()> {
    if notes.chars().count() > MAX_ALLERGIES_LEN {
        return Err(ValidationError::TooLong {
            field: "customer_allergies".to_string(),
            max: MAX_ALLERGIES_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an entity identifier or table number.
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates the number of tables on the floor.
pub fn validate_table_count(count: u32) -> ValidationResult<()> {
    if count == 0 || count > MAX_TABLE_COUNT {
        return Err(ValidationError::OutOfRange {
            field: "table_count".to_string(),
            min: 1,
            max: MAX_TABLE_COUNT as i64,
        });
    }
    Ok(())
}

/// Validates a monetary amount in cents.
pub fn validate_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates the lines of a new order.
pub fn validate_order_items(items: &[OrderItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }

    for item in items {
        validate_name("dish_name", &item.dish_name)?;
        if item.quantity < 1 || item.quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_LINE_QUANTITY,
            });
        }
    }

    Ok(())
}

/// Validates a payment submission.
///
/// ## Rules
/// - Positive table number and amount
/// - Card number of 12 to 19 digits (spaces and dashes ignored)
/// - Holder name present
/// - Expiry in `MM/YY` form
pub fn validate_payment(payment: &NewPayment) -> ValidationResult<()> {
    validate_id("table_number", payment.table_number)?;
    validate_amount("amount_cents", payment.amount_cents)?;
    validate_name("card_holder", &payment.card_holder)?;

    let digits = payment
        .card_number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect::<String>();
    if !(12..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "card_number".to_string(),
            reason: "must be 12 to 19 digits".to_string(),
        });
    }

    validate_card_expiry(&payment.card_expiry)
}

fn validate_card_expiry(expiry: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::InvalidFormat {
        field: "card_expiry".to_string(),
        reason: "expected MM/YY".to_string(),
    };

    let (month, year) = expiry.trim().split_once('/').ok_or_else(invalid)?;
    if month.len() != 2 || year.len() != 2 {
        return Err(invalid());
    }
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let _year: u8 = year.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> NewPayment {
        NewPayment {
            table_number: 2,
            amount_cents: 4550,
            card_number: "4111-1111-1111-1111".to_string(),
            card_holder: "Ana Lopez".to_string(),
            card_expiry: "09/28".to_string(),
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("staff_name", "Luis").is_ok());
        assert!(validate_name("staff_name", "").is_err());
        assert!(validate_name("staff_name", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_table_count() {
        assert!(validate_table_count(12).is_ok());
        assert!(validate_table_count(0).is_err());
        assert!(validate_table_count(MAX_TABLE_COUNT + 1).is_err());
    }

    #[test]
    fn test_validate_order_items() {
        let ok = vec![OrderItem {
            dish_name: "Tlayuda".to_string(),
            quantity: 2,
        }];
        assert!(validate_order_items(&ok).is_ok());
        assert!(validate_order_items(&[]).is_err());

        let zero = vec![OrderItem {
            dish_name: "Mole negro".to_string(),
            quantity: 0,
        }];
        assert!(matches!(
            validate_order_items(&zero),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_payment() {
        assert!(validate_payment(&payment()).is_ok());

        let mut bad = payment();
        bad.card_number = "1234".to_string();
        assert!(validate_payment(&bad).is_err());

        let mut bad = payment();
        bad.card_expiry = "13/28".to_string();
        assert!(validate_payment(&bad).is_err());

        let mut bad = payment();
        bad.amount_cents = 0;
        assert!(validate_payment(&bad).is_err());
    }
}
