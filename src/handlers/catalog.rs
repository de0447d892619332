use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::error::AppError;
use crate::models::{Order, Product, User};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewUserRequest {
    pub username: String,
}

pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.store.create_user(&payload.username).await?;
    info!(user = %user.username, id = user.id, "user created");

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users_handler(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    Json(state.store.users().await)
}

pub async fn list_products_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Product>> {
    Json(state.store.products().await)
}

pub async fn list_orders_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.store.orders().await)
}
