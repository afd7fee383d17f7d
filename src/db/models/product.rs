//! Product models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image: String,
    pub seller_id: Option<String>,
    pub created_at: String,
}

/// Product as shown on the storefront, with the seller's username resolved
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductListing {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image: String,
    pub seller_id: Option<String>,
    pub seller_name: String,
    pub created_at: String,
}

pub const UNKNOWN_SELLER: &str = "Unknown";

#[derive(Debug, Default, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProductResponse {
    pub message: String,
    pub product_id: String,
}
