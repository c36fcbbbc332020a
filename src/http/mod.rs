//! HTTP surface: routing, shared state, and the response envelope.

pub mod engagement;
pub mod orders;
pub mod products;
pub mod reviews;

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use validator::Validate;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::events::EventBus;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub events: EventBus,
    pub config: AppConfig,
}

/// `axum::Json` with rejections rendered through the service envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation("VALIDATION_ERROR", rejection.body_text())
    }
}

/// The `{success: true, data}` shape every success response uses.
pub fn success<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "data": data }))
}

/// Success with a human-readable message alongside the data.
pub fn success_with_message<T: Serialize>(message: &str, data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "message": message, "data": data }))
}

/// Run `validator` derive checks, folding the first failure into the
/// envelope taxonomy.
pub fn check_payload<T: Validate>(payload: &T) -> ApiResult<()> {
    payload.validate().map_err(|errors| {
        ApiError::validation("VALIDATION_ERROR", errors.to_string().replace('\n', "; "))
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async {
                Json(serde_json::json!({"status": "healthy", "service": "boutique-storefront"}))
            }),
        )
        .route("/products", get(products::list_products).post(products::create_product))
        .route("/products/:id", get(products::get_product))
        .route("/types", post(products::create_type))
        .route("/categories", post(products::create_category))
        .route("/orders", get(orders::list_orders).post(orders::place_order))
        .route("/orders/can_review/:id", get(reviews::can_review))
        .route("/review/:id", put(reviews::put_review))
        .route(
            "/cart",
            get(engagement::get_cart).post(engagement::add_to_cart).delete(engagement::clear_cart),
        )
        .route("/cart/:id", axum::routing::delete(engagement::remove_cart_item))
        .route("/favorites", get(engagement::list_favorites))
        .route(
            "/favorites/:id",
            post(engagement::add_favorite).delete(engagement::remove_favorite),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let Json(value) = success(serde_json::json!({"n": 1}));
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["n"], 1);
    }

    #[test]
    fn test_success_with_message_shape() {
        let Json(value) = success_with_message("Review created", 7);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Review created");
        assert_eq!(value["data"], 7);
    }
}
