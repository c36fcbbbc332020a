//! Order endpoints: the caller's history and order placement.

use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Principal;
use crate::domain::{Order, OrderItem, OrderItemInput};
use crate::error::ApiResult;
use crate::events;
use crate::http::{success, AppJson, AppState};

/// `GET /orders`: the authenticated user's orders, newest first.
pub async fn list_orders(
    State(state): State<AppState>,
    user: Principal,
) -> ApiResult<axum::Json<serde_json::Value>> {
    let orders = state.store.user_orders(&user).await?;
    Ok(success(orders))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderItemInput>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Serialize)]
struct OrderEvent {
    order_id: Uuid,
    user_id: Uuid,
    line_count: usize,
}

/// `POST /orders`: place an order from explicit line items.
pub async fn place_order(
    State(state): State<AppState>,
    user: Principal,
    AppJson(req): AppJson<PlaceOrderRequest>,
) -> ApiResult<(StatusCode, axum::Json<serde_json::Value>)> {
    let (order, items) = state.store.place_order(&user, &req.items).await?;
    state
        .events
        .publish(
            events::ORDER_PLACED,
            &OrderEvent { order_id: order.id, user_id: user.user_id, line_count: items.len() },
        )
        .await;
    Ok((StatusCode::CREATED, success(PlacedOrder { order, items })))
}
