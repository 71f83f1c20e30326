//! Order and order-item models
//!
//! The server is the source of truth for money math: `total_amount` and
//! per-item `subtotal` are always recomputed from the submitted items,
//! never taken from the client.

use serde::{Deserialize, Serialize};

use super::{validate_amount, validate_date};
use crate::error::AppError;

/// Order lifecycle states
pub const ORDER_STATUSES: &[&str] = &["待付款", "已付款", "已取消"];

pub const STATUS_PENDING: &str = "待付款";
pub const STATUS_CANCELLED: &str = "已取消";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub order_no: String,
    pub customer_id: Option<i64>,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub status: String,
    pub order_date: String,
    pub note: Option<String>,
    pub created_at: String,
}

/// List row: order joined with its customer's name
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderWithCustomer {
    pub id: i64,
    pub order_no: String,
    pub customer_id: Option<i64>,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub status: String,
    pub order_date: String,
    pub note: Option<String>,
    pub created_at: String,
    pub customer_name: Option<String>,
}

/// Detail row: adds the customer's phone for the detail view
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderDetailRow {
    pub id: i64,
    pub order_no: String,
    pub customer_id: Option<i64>,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub status: String,
    pub order_date: String,
    pub note: Option<String>,
    pub created_at: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
    pub note: Option<String>,
    pub product_name: Option<String>,
    pub product_spec: Option<String>,
    pub product_photo: Option<String>,
}

/// Full order detail: header fields flattened, items nested
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderDetailRow,
    pub items: Vec<OrderItemRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    #[serde(default)]
    pub product_id: Option<i64>,
    pub quantity: i64,
    pub unit_price: f64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderPayload {
    #[serde(default)]
    pub customer_id: Option<i64>,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub order_date: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl OrderPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.items.is_empty() {
            return Err(AppError::validation("items must not be empty"));
        }
        for item in &self.items {
            if item.quantity < 1 {
                return Err(AppError::validation("item quantity must be at least 1"));
            }
            validate_amount("item unit_price", item.unit_price)?;
        }
        if let Some(date) = &self.order_date {
            validate_date("order_date", date)?;
        }
        Ok(())
    }

    /// Σ(quantity × unit_price) over the submitted items
    pub fn total_amount(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.quantity as f64 * i.unit_price)
            .sum()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusPayload {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentPayload {
    pub paid_amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchIds {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchStatus {
    pub ids: Vec<i64>,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub keyword: Option<String>,
}

/// Date-range + status filter used by the order-history endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(items: Vec<OrderItemInput>) -> OrderPayload {
        OrderPayload {
            customer_id: None,
            items,
            order_date: None,
            note: None,
        }
    }

    fn item(quantity: i64, unit_price: f64) -> OrderItemInput {
        OrderItemInput {
            product_id: None,
            quantity,
            unit_price,
            note: None,
        }
    }

    #[test]
    fn total_is_sum_of_line_subtotals() {
        let p = payload(vec![item(3, 10.0), item(2, 7.5)]);
        assert_eq!(p.total_amount(), 45.0);
    }

    #[test]
    fn empty_items_rejected() {
        assert!(payload(vec![]).validate().is_err());
    }

    #[test]
    fn zero_quantity_rejected() {
        assert!(payload(vec![item(0, 10.0)]).validate().is_err());
    }

    #[test]
    fn negative_price_rejected() {
        assert!(payload(vec![item(1, -1.0)]).validate().is_err());
    }

    #[test]
    fn bad_order_date_rejected() {
        let mut p = payload(vec![item(1, 1.0)]);
        p.order_date = Some("25/08/2026".into());
        assert!(p.validate().is_err());
    }
}
