//! Expense and expense-category models

use serde::{Deserialize, Serialize};

use super::{validate_amount, validate_date};
use crate::error::AppError;

pub const DEFAULT_PAYMENT_METHOD: &str = "现金";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Expense {
    pub id: i64,
    pub expense_no: String,
    pub category_id: Option<i64>,
    pub amount: f64,
    pub expense_date: String,
    pub payee: Option<String>,
    pub payment_method: String,
    pub note: Option<String>,
    pub attachment: Option<String>,
    pub created_at: String,
}

/// List/detail row: expense joined with its category name
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExpenseWithCategory {
    pub id: i64,
    pub expense_no: String,
    pub category_id: Option<i64>,
    pub amount: f64,
    pub expense_date: String,
    pub payee: Option<String>,
    pub payment_method: String,
    pub note: Option<String>,
    pub attachment: Option<String>,
    pub created_at: String,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpensePayload {
    #[serde(default)]
    pub category_id: Option<i64>,
    pub amount: f64,
    #[serde(default)]
    pub expense_date: Option<String>,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub attachment: Option<String>,
}

impl ExpensePayload {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_amount("amount", self.amount)?;
        if let Some(date) = &self.expense_date {
            validate_date("expense_date", date)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExpenseCategory {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl CategoryPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("name is required"));
        }
        Ok(())
    }
}
