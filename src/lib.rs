//! Shop back office: a throttled HTTP API over a product/order catalogue
//! with CSV/JSON bulk import and matching exports.

pub mod config;
pub mod error;
pub mod export;
pub mod handlers;
pub mod importer;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod seed;
pub mod state;
pub mod store;
pub mod throttle;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_user_handler, download_products_csv_handler, export_orders_csv_handler,
    export_orders_json_handler, export_products_json_handler, health_handler,
    import_orders_handler, import_products_handler, list_orders_handler, list_products_handler,
    list_users_handler, metrics_handler, upload_products_csv_handler,
};
use crate::middleware::throttle_middleware;
use crate::state::AppState;

// creating the router with routes; every route sits behind the throttle
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/users", get(list_users_handler).post(create_user_handler))
        .route("/api/products", get(list_products_handler))
        .route("/api/products/upload_csv", post(upload_products_csv_handler))
        .route("/api/products/download_csv", get(download_products_csv_handler))
        .route("/api/orders", get(list_orders_handler))
        .route("/admin/shop/products/import", post(import_products_handler))
        .route("/admin/shop/orders/import", post(import_orders_handler))
        .route("/shop/products/export", get(export_products_json_handler))
        .route("/shop/orders/export", get(export_orders_json_handler))
        .route("/shop/orders/export.csv", get(export_orders_csv_handler))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            throttle_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
