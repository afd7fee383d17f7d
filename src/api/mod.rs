mod admin;
pub mod auth;
mod cart;
mod checkout;
pub mod error;
mod products;
mod validation;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let mut admin_routes = Router::new()
        .route("/sellers", get(admin::list_sellers))
        .route("/products", get(admin::list_products));
    if state.config.admin.require_admin_role {
        admin_routes = admin_routes.layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));
    }

    let api_routes = Router::new()
        // Products
        .route("/products", get(products::list_products))
        .route("/products", post(products::create_product))
        // Checkout
        .route("/checkout", post(checkout::checkout))
        // Cart
        .route("/cart", get(cart::get_cart))
        .route("/cart", post(cart::add_to_cart))
        .route("/cart/:product_id", delete(cart::remove_from_cart))
        // Admin dashboard
        .nest("/admin", admin_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
