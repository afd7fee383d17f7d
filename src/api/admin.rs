//! Admin dashboard listings.
//!
//! Open by default; `admin.require_admin_role` puts them behind
//! [`super::auth::require_admin`].

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::db::{Product, Role, SellerResponse, User};
use crate::AppState;

use super::error::ApiError;

/// GET /api/admin/sellers
pub async fn list_sellers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SellerResponse>>, ApiError> {
    let sellers = sqlx::query_as::<_, User>("SELECT * FROM users WHERE role = ? ORDER BY rowid")
        .bind(Role::Seller.as_str())
        .fetch_all(&state.db)
        .await?;

    let pending_seller_id = &state.config.marketplace.pending_seller_id;
    let responses = sellers
        .into_iter()
        .map(|user| SellerResponse::new(user, pending_seller_id))
        .collect();

    Ok(Json(responses))
}

/// GET /api/admin/products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY rowid")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(products))
}
