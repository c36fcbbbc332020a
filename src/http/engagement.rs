//! Cart and favorites endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::auth::Principal;
use crate::error::ApiResult;
use crate::http::{success, AppJson, AppState};
use crate::sanitize;

/// `GET /cart`
pub async fn get_cart(
    State(state): State<AppState>,
    user: Principal,
) -> ApiResult<axum::Json<serde_json::Value>> {
    let lines = state.store.cart(&user).await?;
    Ok(success(lines))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: i32,
}

/// `POST /cart`: repeated adds merge quantities.
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: Principal,
    AppJson(req): AppJson<AddToCartRequest>,
) -> ApiResult<(StatusCode, axum::Json<serde_json::Value>)> {
    let product_id = sanitize::parse_id(&req.product_id)?;
    let line = state.store.add_to_cart(&user, product_id, req.quantity).await?;
    Ok((StatusCode::CREATED, success(line)))
}

/// `DELETE /cart/{productId}`
pub async fn remove_cart_item(
    State(state): State<AppState>,
    user: Principal,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let product_id = sanitize::parse_id(&id)?;
    state.store.remove_cart_item(&user, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /cart`
pub async fn clear_cart(State(state): State<AppState>, user: Principal) -> ApiResult<StatusCode> {
    state.store.clear_cart(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /favorites`
pub async fn list_favorites(
    State(state): State<AppState>,
    user: Principal,
) -> ApiResult<axum::Json<serde_json::Value>> {
    let favorites = state.store.favorites(&user).await?;
    Ok(success(favorites))
}

/// `POST /favorites/{productId}`: idempotent add; the client's
/// optimistic toggle reconciles against the canonical outcome.
pub async fn add_favorite(
    State(state): State<AppState>,
    user: Principal,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, axum::Json<serde_json::Value>)> {
    let product_id = sanitize::parse_id(&id)?;
    state.store.add_favorite(&user, product_id).await?;
    Ok((StatusCode::CREATED, success(serde_json::json!({ "productId": product_id }))))
}

/// `DELETE /favorites/{productId}`: idempotent remove.
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: Principal,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let product_id = sanitize::parse_id(&id)?;
    state.store.remove_favorite(&user, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
