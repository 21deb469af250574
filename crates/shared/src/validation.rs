//! Common validation utilities.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Largest unit price accepted; matches NUMERIC(12,2).
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Validates that a string has at least one non-whitespace character.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a unit price: non-negative, at most two decimal places, and
/// within the storable range.
pub fn validate_unit_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        let mut err = ValidationError::new("price_range");
        err.message = Some("Unit price must be non-negative".into());
        return Err(err);
    }

    if price.normalize().scale() > 2 {
        let mut err = ValidationError::new("price_scale");
        err.message = Some("Unit price must have at most two decimal places".into());
        return Err(err);
    }

    if *price > MAX_UNIT_PRICE {
        let mut err = ValidationError::new("price_range");
        err.message = Some("Unit price is too large".into());
        return Err(err);
    }

    Ok(())
}

/// Escapes `%`, `_` and `\` so user input matches literally inside a
/// `LIKE`/`ILIKE` pattern using the default `\` escape character.
///
/// # Example
/// ```
/// use shared::validation::escape_like;
///
/// assert_eq!(escape_like("100%_off"), "100\\%\\_off");
/// ```
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wraps escaped input in `%` for a substring match.
pub fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}
