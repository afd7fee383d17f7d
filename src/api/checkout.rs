use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::db::{
    encode_list, new_id, non_empty, now, CheckoutRequest, CheckoutResponse, OrderStatus,
};
use crate::AppState;

use super::error::{ApiError, ApiJson, ValidationErrorBuilder};
use super::validation::{validate_total, validate_uuid};

/// Record an order for the submitted cart and clear the buyer's stored cart.
///
/// Items and total are taken as sent; nothing is priced server side. The
/// order insert and the cart delete commit together or not at all.
///
/// POST /api/checkout
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let buyer_id = non_empty(req.buyer_id).map(|id| id.trim().to_string());

    let mut errors = ValidationErrorBuilder::new();
    errors.require("buyer_id", &buyer_id);

    let items = match req.cart {
        None | Some(Value::Null) => {
            errors.add("cart", "cart is required");
            None
        }
        Some(Value::Array(items)) if items.is_empty() => {
            errors.add("cart", "cart must contain at least one item");
            None
        }
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            errors.add("cart", "cart must be a list of items");
            None
        }
    };

    let total_price = match req.total_price {
        None | Some(Value::Null) => {
            errors.add("total_price", "total_price is required");
            None
        }
        Some(total) => match validate_total(&total) {
            Ok(total) => Some(total),
            Err(e) => {
                errors.add("total_price", e);
                None
            }
        },
    };
    errors.finish()?;

    let (Some(buyer_id), Some(items), Some(total_price)) = (buyer_id, items, total_price) else {
        return Err(ApiError::bad_request("Missing required checkout data"));
    };

    validate_uuid(&buyer_id, "buyer ID").map_err(|e| ApiError::validation_field("buyer_id", e))?;

    let order_id = new_id();
    let encoded_items = encode_list(&items)?;

    let mut tx = state.db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO orders (id, buyer_id, items, total_price, status, order_date)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&order_id)
    .bind(&buyer_id)
    .bind(&encoded_items)
    .bind(total_price)
    .bind(OrderStatus::Pending.as_str())
    .bind(now())
    .execute(&mut *tx)
    .await?;

    let cleared = sqlx::query("DELETE FROM carts WHERE user_id = ?")
        .bind(&buyer_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        order_id = %order_id,
        buyer_id = %buyer_id,
        items = items.len(),
        total_price,
        cart_cleared = cleared.rows_affected() > 0,
        "Order placed"
    );

    Ok(Json(CheckoutResponse {
        message: "Checkout successful".to_string(),
        order_id,
    }))
}
