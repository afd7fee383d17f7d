//! Order models and checkout DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::{decode_list, DocumentError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    /// JSON array, the cart snapshot exactly as the client sent it
    pub items: String,
    pub total_price: f64,
    pub status: String,
    pub order_date: String,
}

impl Order {
    pub fn items(&self) -> Result<Vec<serde_json::Value>, DocumentError> {
        decode_list(&self.items)
    }
}

/// Orders are created `Pending`; nothing in this service moves them on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
        }
    }
}

/// `cart` and `total_price` stay loosely typed so bad values become field
/// validation errors rather than body parse failures.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    pub buyer_id: Option<String>,
    pub cart: Option<serde_json::Value>,
    pub total_price: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub order_id: String,
}
