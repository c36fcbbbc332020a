//! Cart and favorites, keyed by the authenticated principal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::domain::ProductLite;
use crate::error::{ApiError, ApiResult};
use crate::store::Store;

/// Cart row joined with its product for rendering.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub async fn cart(&self, user: &Principal) -> ApiResult<Vec<CartLine>> {
        self.timed("cart", async {
            let rows = sqlx::query_as::<_, CartLine>(
                "SELECT c.product_id, p.name, p.price, c.quantity, c.created_at \
                 FROM cart_items c JOIN products p ON p.id = c.product_id \
                 WHERE c.user_id = $1 ORDER BY c.created_at DESC",
            )
            .bind(user.user_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Add to cart; a second add of the same product merges quantities.
    pub async fn add_to_cart(
        &self,
        user: &Principal,
        product_id: Uuid,
        quantity: i32,
    ) -> ApiResult<CartLine> {
        if quantity <= 0 {
            return Err(ApiError::validation(
                "VALIDATION_ERROR",
                "quantity must be a positive integer",
            ));
        }
        self.timed("add_to_cart", async {
            let active: Option<bool> =
                sqlx::query_scalar("SELECT is_active FROM products WHERE id = $1")
                    .bind(product_id)
                    .fetch_optional(&self.pool)
                    .await?;
            match active {
                None => return Err(ApiError::ProductNotFound),
                Some(false) => return Err(ApiError::ProductInactive),
                Some(true) => {}
            }
            sqlx::query(
                "INSERT INTO cart_items (id, user_id, product_id, quantity) VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (user_id, product_id) \
                 DO UPDATE SET quantity = cart_items.quantity + $4",
            )
            .bind(Uuid::now_v7())
            .bind(user.user_id)
            .bind(product_id)
            .bind(quantity)
            .execute(&self.pool)
            .await?;
            let line = sqlx::query_as::<_, CartLine>(
                "SELECT c.product_id, p.name, p.price, c.quantity, c.created_at \
                 FROM cart_items c JOIN products p ON p.id = c.product_id \
                 WHERE c.user_id = $1 AND c.product_id = $2",
            )
            .bind(user.user_id)
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;
            Ok(line)
        })
        .await
    }

    pub async fn remove_cart_item(&self, user: &Principal, product_id: Uuid) -> ApiResult<()> {
        self.timed("remove_cart_item", async {
            sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                .bind(user.user_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    pub async fn clear_cart(&self, user: &Principal) -> ApiResult<()> {
        self.timed("clear_cart", async {
            sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
                .bind(user.user_id)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    pub async fn favorites(&self, user: &Principal) -> ApiResult<Vec<ProductLite>> {
        self.timed("favorites", async {
            let rows = sqlx::query_as::<_, ProductLite>(
                "SELECT p.id, p.name, p.price, p.ratings \
                 FROM favorites f JOIN products p ON p.id = f.product_id \
                 WHERE f.user_id = $1 ORDER BY f.created_at DESC",
            )
            .bind(user.user_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Idempotent: adding an existing favorite is a no-op.
    pub async fn add_favorite(&self, user: &Principal, product_id: Uuid) -> ApiResult<()> {
        self.timed("add_favorite", async {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                    .bind(product_id)
                    .fetch_one(&self.pool)
                    .await?;
            if !exists {
                return Err(ApiError::ProductNotFound);
            }
            sqlx::query(
                "INSERT INTO favorites (id, user_id, product_id) VALUES ($1, $2, $3) \
                 ON CONFLICT (user_id, product_id) DO NOTHING",
            )
            .bind(Uuid::now_v7())
            .bind(user.user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
            Ok(())
        })
        .await
    }

    /// Idempotent: removing an absent favorite is a no-op.
    pub async fn remove_favorite(&self, user: &Principal, product_id: Uuid) -> ApiResult<()> {
        self.timed("remove_favorite", async {
            sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
                .bind(user.user_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }
}
