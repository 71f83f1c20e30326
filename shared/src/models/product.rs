//! Product models

use serde::{Deserialize, Serialize};

use super::validate_amount;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub spec: Option<String>,
    pub unit: Option<String>,
    pub unit_price: f64,
    pub photo: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable product fields, collected from multipart form data.
///
/// `photo` carries either the freshly uploaded file's URL or, on update,
/// the existing URL the client passed back.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub spec: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub description: Option<String>,
    pub photo: Option<String>,
}

impl ProductForm {
    /// Require a name and a sane price; other fields are optional.
    pub fn validate(&self) -> Result<(), AppError> {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => {}
            _ => return Err(AppError::validation("name is required")),
        }
        validate_amount("unit_price", self.unit_price.unwrap_or(0.0))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
}

/// A price change recorded when a product update alters `unit_price`
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PriceChange {
    pub id: i64,
    pub product_id: i64,
    pub old_price: f64,
    pub new_price: f64,
    pub changed_at: String,
}

/// Sales aggregate for one product (cancelled orders excluded)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductStats {
    pub total_quantity: i64,
    pub total_amount: f64,
    pub avg_price: f64,
    pub order_count: i64,
}

/// One order this product appeared in
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductOrderRow {
    pub id: i64,
    pub order_no: String,
    pub customer_id: Option<i64>,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub status: String,
    pub order_date: String,
    pub quantity: i64,
    pub item_price: f64,
    pub subtotal: f64,
    pub customer_name: Option<String>,
}
