//! Cart endpoints for the calling user.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::db::{
    encode_list, merge_item, non_empty, now, remove_item, AddToCartRequest, Cart, CartItem,
    MessageResponse,
};
use crate::AppState;

use super::auth::Caller;
use super::error::{ApiError, ApiJson, ValidationErrorBuilder};
use super::validation::{validate_price, validate_quantity};

/// Get the caller's cart items. A user without a cart has an empty one.
///
/// GET /api/cart
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> Result<Json<Vec<CartItem>>, ApiError> {
    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?")
        .bind(&caller.user_id)
        .fetch_optional(&state.db)
        .await?;

    let items = match cart {
        Some(cart) => cart.items()?,
        None => Vec::new(),
    };

    Ok(Json(items))
}

/// Add a product snapshot to the cart, or set the quantity of one already
/// in it.
///
/// POST /api/cart
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    ApiJson(req): ApiJson<AddToCartRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let product = req
        .product
        .ok_or_else(|| ApiError::validation_field("product", "Missing product data"))?;
    let product_id = non_empty(product.id)
        .ok_or_else(|| ApiError::validation_field("product.id", "Missing product data"))?;

    let name = non_empty(product.name);
    let image = non_empty(product.image);
    let quantity = req.quantity.unwrap_or(1);

    let mut errors = ValidationErrorBuilder::new();
    errors
        .require("product.name", &name)
        .require("product.price", &product.price)
        .require("product.image", &image);
    if let Some(Err(e)) = product.price.map(validate_price) {
        errors.add("product.price", e);
    }
    if let Err(e) = validate_quantity(quantity) {
        errors.add("quantity", e);
    }
    errors.finish()?;

    let (Some(name), Some(price), Some(image)) = (name, product.price, image) else {
        return Err(ApiError::bad_request("Missing product data"));
    };

    let item = CartItem {
        id: product_id,
        name,
        price,
        image,
        quantity,
    };
    let product_id = item.id.clone();

    let mut tx = state.db.begin().await?;

    // Lazily create the cart. Writing first takes the write lock before the
    // read below, so concurrent adds for one user queue instead of racing.
    sqlx::query(
        "INSERT INTO carts (user_id, items, updated_at) VALUES (?, '[]', ?) ON CONFLICT(user_id) DO NOTHING",
    )
    .bind(&caller.user_id)
    .bind(now())
    .execute(&mut *tx)
    .await?;

    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?")
        .bind(&caller.user_id)
        .fetch_one(&mut *tx)
        .await?;

    let mut items = cart.items()?;
    merge_item(&mut items, item);

    sqlx::query("UPDATE carts SET items = ?, updated_at = ? WHERE user_id = ?")
        .bind(encode_list(&items)?)
        .bind(now())
        .bind(&caller.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(user_id = %caller.user_id, product_id = %product_id, quantity, "Cart updated");

    Ok(Json(MessageResponse::new("Cart updated successfully")))
}

/// Remove a product from the cart. Removing something that isn't there
/// succeeds without changes.
///
/// DELETE /api/cart/:product_id
pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(product_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut tx = state.db.begin().await?;

    // Touch the cart first so the transaction holds the write lock
    let touched = sqlx::query("UPDATE carts SET updated_at = ? WHERE user_id = ?")
        .bind(now())
        .bind(&caller.user_id)
        .execute(&mut *tx)
        .await?;
    if touched.rows_affected() == 0 {
        return Err(ApiError::not_found("Cart not found"));
    }

    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?")
        .bind(&caller.user_id)
        .fetch_one(&mut *tx)
        .await?;

    let items = remove_item(cart.items()?, &product_id);

    sqlx::query("UPDATE carts SET items = ? WHERE user_id = ?")
        .bind(encode_list(&items)?)
        .bind(&caller.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(user_id = %caller.user_id, product_id = %product_id, "Removed product from cart");

    Ok(Json(MessageResponse::new("Product removed from cart successfully")))
}
