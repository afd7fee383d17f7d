//! Storefront product endpoints.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

use crate::db::{
    new_id, non_empty, now, CreateProductRequest, CreateProductResponse, ProductListing,
    UNKNOWN_SELLER,
};
use crate::AppState;

use super::auth::Caller;
use super::error::{ApiError, ApiJson, ValidationErrorBuilder};
use super::validation::validate_price;

/// List every product with its seller's name.
///
/// Sellers that are missing or were never registered show as "Unknown".
///
/// GET /api/products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProductListing>>, ApiError> {
    let products = sqlx::query_as::<_, ProductListing>(
        r#"
        SELECT p.id, p.name, p.price, p.description, p.image, p.seller_id,
               COALESCE(u.username, ?) AS seller_name,
               p.created_at
        FROM products p
        LEFT JOIN users u ON u.id = p.seller_id
        ORDER BY p.rowid
        "#,
    )
    .bind(UNKNOWN_SELLER)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(products))
}

/// Add a product. The seller is the calling user.
///
/// POST /api/products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<CreateProductResponse>), ApiError> {
    let name = non_empty(req.name);
    let description = non_empty(req.description);
    let image = non_empty(req.image);

    let mut errors = ValidationErrorBuilder::new();
    errors
        .require("name", &name)
        .require("price", &req.price)
        .require("description", &description)
        .require("image", &image);
    if let Some(Err(e)) = req.price.map(validate_price) {
        errors.add("price", e);
    }
    errors.finish()?;

    let (Some(name), Some(price), Some(description), Some(image)) =
        (name, req.price, description, image)
    else {
        return Err(ApiError::bad_request("Missing required product data"));
    };

    let id = new_id();
    sqlx::query(
        r#"
        INSERT INTO products (id, name, price, description, image, seller_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&name)
    .bind(price)
    .bind(&description)
    .bind(&image)
    .bind(&caller.user_id)
    .bind(now())
    .execute(&state.db)
    .await?;

    info!(product_id = %id, seller_id = %caller.user_id, "Product added");

    Ok((
        StatusCode::CREATED,
        Json(CreateProductResponse {
            message: "Product added successfully".to_string(),
            product_id: id,
        }),
    ))
}
