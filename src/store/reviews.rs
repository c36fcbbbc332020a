//! Review eligibility and the upsert/aggregation engine.

use serde::Serialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::domain::{aggregate_rating, evaluate_eligibility, Product, Review, ReviewEligibility};
use crate::error::{ApiError, ApiResult};
use crate::store::Store;

/// Result of one review write: the applied row, the product with its
/// freshly recomputed aggregate, and what happened.
#[derive(Clone, Debug, Serialize)]
pub struct ReviewOutcome {
    pub review: Review,
    pub product: Product,
    pub is_update: bool,
    pub previous_rating: Option<f64>,
}

impl Store {
    /// May this user review this product? Read-only; safe to call any
    /// number of times.
    pub async fn review_eligibility(
        &self,
        user: &Principal,
        product_id: Uuid,
    ) -> ApiResult<ReviewEligibility> {
        self.timed("review_eligibility", async {
            let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(ApiError::ProductNotFound)?;
            if !product.is_active {
                // No point consulting purchase history.
                return Ok(evaluate_eligibility(false, false, false));
            }
            let purchased = self.has_purchased(user.user_id, product_id).await?;
            let existing: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM reviews WHERE product_id = $1 AND user_id = $2)",
            )
            .bind(product_id)
            .bind(user.user_id)
            .fetch_one(&self.pool)
            .await?;
            Ok(evaluate_eligibility(true, purchased, existing))
        })
        .await
    }

    /// Insert or replace the user's review and recompute the product
    /// aggregate, all in one transaction.
    ///
    /// The row lock on the product serializes concurrent writers; the
    /// unique index on (product_id, user_id) backstops the one-review
    /// invariant at the constraint level. Purchase eligibility is the
    /// caller's policy, not enforced here.
    pub async fn upsert_review(
        &self,
        user: &Principal,
        product_id: Uuid,
        rating: f64,
        comment: &str,
    ) -> ApiResult<ReviewOutcome> {
        self.timed("upsert_review", async {
            let mut tx = self.pool.begin().await?;

            let product =
                sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or(ApiError::ProductNotFound)?;
            if !product.is_active {
                return Err(ApiError::ProductInactive);
            }

            let existing = sqlx::query_as::<_, Review>(
                "SELECT * FROM reviews WHERE product_id = $1 AND user_id = $2",
            )
            .bind(product_id)
            .bind(user.user_id)
            .fetch_optional(&mut *tx)
            .await?;

            let (review, is_update, previous_rating) = match existing {
                Some(prior) => {
                    // Replace in place: created_at survives, updated_at marks the edit.
                    let updated = sqlx::query_as::<_, Review>(
                        "UPDATE reviews SET rating = $2, comment = $3, updated_at = NOW() \
                         WHERE id = $1 RETURNING *",
                    )
                    .bind(prior.id)
                    .bind(rating)
                    .bind(comment)
                    .fetch_one(&mut *tx)
                    .await?;
                    (updated, true, Some(prior.rating))
                }
                None => {
                    let created = sqlx::query_as::<_, Review>(
                        "INSERT INTO reviews (id, product_id, user_id, rating, comment) \
                         VALUES ($1, $2, $3, $4, $5) RETURNING *",
                    )
                    .bind(Uuid::now_v7())
                    .bind(product_id)
                    .bind(user.user_id)
                    .bind(rating)
                    .bind(comment)
                    .fetch_one(&mut *tx)
                    .await?;
                    (created, false, None)
                }
            };

            let ratings: Vec<f64> =
                sqlx::query_scalar("SELECT rating FROM reviews WHERE product_id = $1")
                    .bind(product_id)
                    .fetch_all(&mut *tx)
                    .await?;
            let product = sqlx::query_as::<_, Product>(
                "UPDATE products SET ratings = $2, review_count = $3, updated_at = NOW() \
                 WHERE id = $1 RETURNING *",
            )
            .bind(product_id)
            .bind(aggregate_rating(&ratings))
            .bind(ratings.len() as i64)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(ReviewOutcome { review, product, is_update, previous_rating })
        })
        .await
    }
}
