//! Model and request types shared by the db and API layers

pub mod customer;
pub mod expense;
pub mod order;
pub mod product;
pub mod stats;

use crate::error::AppError;
use chrono::NaiveDate;

/// Validate a `YYYY-MM-DD` date string
pub fn validate_date(field: &str, value: &str) -> Result<(), AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::validation(format!("{field} must be a YYYY-MM-DD date")))
}

/// Validate a money amount: finite and non-negative
pub fn validate_amount(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_validation() {
        assert!(validate_date("order_date", "2026-08-25").is_ok());
        assert!(validate_date("order_date", "2026-8-25").is_err());
        assert!(validate_date("order_date", "not-a-date").is_err());
        assert!(validate_date("order_date", "2026-13-01").is_err());
    }

    #[test]
    fn amount_validation() {
        assert!(validate_amount("amount", 0.0).is_ok());
        assert!(validate_amount("amount", 19.99).is_ok());
        assert!(validate_amount("amount", -0.01).is_err());
        assert!(validate_amount("amount", f64::NAN).is_err());
        assert!(validate_amount("amount", f64::INFINITY).is_err());
    }
}
