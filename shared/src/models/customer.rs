//! Customer models

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerPayload {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl CustomerPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("name is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListQuery {
    #[serde(default)]
    pub keyword: Option<String>,
}

/// Spend aggregate for one customer (cancelled orders excluded)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerStats {
    pub order_count: i64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub unpaid_amount: f64,
}
