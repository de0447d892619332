use axum::{
    Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::AppError;
use crate::export;
use crate::state::AppState;

fn csv_attachment(file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={file_name}"),
            ),
        ],
        body,
    )
        .into_response()
}

pub async fn download_products_csv_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let body = export::products_csv(&state.store.snapshot().await)?;
    Ok(csv_attachment("products-export.csv", body))
}

pub async fn export_products_json_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(export::products_json(&state.store.snapshot().await))
}

pub async fn export_orders_json_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(export::orders_json(&state.store.snapshot().await))
}

pub async fn export_orders_csv_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let body = export::orders_csv(&state.store.snapshot().await)?;
    Ok(csv_attachment("orders-export.csv", body))
}
