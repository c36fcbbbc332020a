//! Review endpoints: eligibility probe and the review upsert.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Principal;
use crate::domain::{Product, Review};
use crate::error::{ApiError, ApiResult};
use crate::events;
use crate::http::{success, success_with_message, AppJson, AppState};
use crate::sanitize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanReviewData {
    pub can_review: bool,
    pub has_already_reviewed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// `GET /orders/can_review/{productId}`: read-only eligibility probe.
pub async fn can_review(
    State(state): State<AppState>,
    user: Principal,
    Path(id): Path<String>,
) -> ApiResult<axum::Json<serde_json::Value>> {
    let product_id = sanitize::parse_id(&id)?;
    let eligibility = state.store.review_eligibility(&user, product_id).await?;
    Ok(success(CanReviewData {
        can_review: eligibility.can_review,
        has_already_reviewed: eligibility.has_already_reviewed,
        reason: eligibility.reason,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub review_data: Option<ReviewData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewData {
    pub product_id: Option<String>,
    pub rating: Option<f64>,
    pub comment: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMeta {
    pub is_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_rating: Option<f64>,
    pub review_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponseData {
    pub review: Review,
    pub product: Product,
    pub meta: ReviewMeta,
}

#[derive(Serialize)]
struct ReviewEvent {
    product_id: Uuid,
    user_id: Uuid,
    rating: f64,
    is_update: bool,
}

/// `PUT /review/{productId}`: create (201) or replace (200) the caller's
/// review. Purchase eligibility is enforced by the eligibility probe
/// upstream, not re-checked here.
pub async fn put_review(
    State(state): State<AppState>,
    user: Principal,
    Path(id): Path<String>,
    AppJson(body): AppJson<ReviewBody>,
) -> ApiResult<(StatusCode, axum::Json<serde_json::Value>)> {
    let path_id = sanitize::parse_id(&id)?;
    let data = body
        .review_data
        .ok_or_else(|| ApiError::validation("VALIDATION_ERROR", "reviewData is required"))?;

    let body_id = data
        .product_id
        .as_deref()
        .ok_or_else(|| ApiError::validation("VALIDATION_ERROR", "reviewData.productId is required"))?;
    if sanitize::parse_id(body_id)? != path_id {
        return Err(ApiError::ProductIdMismatch);
    }

    let rating = sanitize::normalize_rating(data.rating)?;
    let comment = data
        .comment
        .as_deref()
        .ok_or_else(|| ApiError::validation("VALIDATION_ERROR", "reviewData.comment is required"))?;
    let comment = sanitize::sanitize_comment(comment)?;

    let outcome = state.store.upsert_review(&user, path_id, rating, &comment).await?;

    state
        .events
        .publish(
            events::REVIEW_UPSERTED,
            &ReviewEvent {
                product_id: path_id,
                user_id: user.user_id,
                rating,
                is_update: outcome.is_update,
            },
        )
        .await;

    let (status, message) = if outcome.is_update {
        (StatusCode::OK, "Review updated")
    } else {
        (StatusCode::CREATED, "Review created")
    };
    let meta = ReviewMeta {
        is_update: outcome.is_update,
        previous_rating: outcome.previous_rating,
        review_count: outcome.product.review_count,
    };
    Ok((
        status,
        success_with_message(
            message,
            ReviewResponseData { review: outcome.review, product: outcome.product, meta },
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_review_wire_shape() {
        let data = CanReviewData { can_review: true, has_already_reviewed: false, reason: None };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["canReview"], true);
        assert_eq!(value["hasAlreadyReviewed"], false);
        assert!(value.get("reason").is_none());
    }

    #[test]
    fn test_review_meta_wire_shape() {
        let meta = ReviewMeta { is_update: true, previous_rating: Some(4.5), review_count: 3 };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["isUpdate"], true);
        assert_eq!(value["previousRating"], 4.5);
        assert_eq!(value["reviewCount"], 3);
    }
}
